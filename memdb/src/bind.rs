//! Positional `?` parameter binding.
//!
//! Placeholders are resolved on the SQL text itself, before tokenization.
//! A `?` inside a string literal or a quoted identifier is not a
//! placeholder.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::{
    error::{Error, Result},
    value::{format_real, Value},
};

/// Substitutes each `?` with the next positional parameter.
///
/// The number of placeholders must equal the number of parameters.
pub fn bind_parameters(sql: &str, params: &[Value]) -> Result<String> {
    let mut out = String::with_capacity(sql.len());
    let mut params_iter = params.iter();
    let mut used = 0usize;

    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            // string literals pass through untouched, including '' escapes
            '\'' | '"' => {
                let quote = ch;
                out.push(quote);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == quote {
                        // a doubled quote stays inside the literal
                        if chars.next_if_eq(&quote).is_some() {
                            out.push(quote);
                        } else {
                            break;
                        }
                    }
                }
            }
            '?' => match params_iter.next() {
                Some(param) => {
                    used += 1;
                    out.push_str(&render_parameter(param));
                }
                None => {
                    return Err(Error::UnevenNumberOfParameters(format!(
                        "statement has more than {} placeholders",
                        params.len()
                    )));
                }
            },
            ch => out.push(ch),
        }
    }

    if used != params.len() {
        return Err(Error::UnevenNumberOfParameters(format!(
            "statement has {} placeholders but {} parameters were given",
            used,
            params.len()
        )));
    }
    Ok(out)
}

/// Renders one parameter as a SQL literal.
fn render_parameter(value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => format_real(*v),
        Value::Bool(v) => if *v { "TRUE" } else { "FALSE" }.into(),
        Value::Text(v) => quote(v),
        Value::Blob(bytes) => quote(&BASE64.encode(bytes)),
        Value::Date(v) => quote(&v.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_positional_parameters() {
        let sql = bind_parameters(
            "INSERT INTO t VALUES (?, ?, ?)",
            &[
                Value::Integer(1),
                Value::Text("bolt".into()),
                Value::Bool(true),
            ],
        )
        .unwrap();
        assert_eq!(sql, "INSERT INTO t VALUES (1, 'bolt', TRUE)");
    }

    #[test]
    fn escapes_embedded_quotes() {
        let sql = bind_parameters("SELECT ?", &[Value::Text("it's".into())]).unwrap();
        assert_eq!(sql, "SELECT 'it''s'");
    }

    #[test]
    fn renders_reals_with_a_decimal_point() {
        let sql = bind_parameters("SELECT ?", &[Value::Real(2.0)]).unwrap();
        assert_eq!(sql, "SELECT 2.0");
    }

    #[test]
    fn blobs_are_base64_quoted() {
        let sql = bind_parameters("SELECT ?", &[Value::Blob(vec![1, 2, 3])]).unwrap();
        assert_eq!(sql, "SELECT 'AQID'");
    }

    #[test]
    fn placeholders_inside_strings_are_not_bound() {
        let sql = bind_parameters(
            "SELECT '?' , ?",
            &[Value::Integer(1)],
        )
        .unwrap();
        assert_eq!(sql, "SELECT '?' , 1");
    }

    #[test]
    fn count_mismatch_is_an_error() {
        assert!(matches!(
            bind_parameters("SELECT ?", &[]),
            Err(Error::UnevenNumberOfParameters(_))
        ));
        assert!(matches!(
            bind_parameters("SELECT 1", &[Value::Integer(1)]),
            Err(Error::UnevenNumberOfParameters(_))
        ));
        assert!(matches!(
            bind_parameters("SELECT ?, ?", &[Value::Integer(1)]),
            Err(Error::UnevenNumberOfParameters(_))
        ));
    }
}
