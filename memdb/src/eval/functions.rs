//! Scalar function implementations.
//!
//! Argument values arrive already evaluated. NULL inputs generally produce
//! NULL, following the SQLite core functions.

use chrono::{NaiveDateTime, Utc};
use memdb_ast::FunctionKind;

use crate::{
    error::{Error, Result},
    eval::{parse_datetime, EvalContext},
    value::Value,
};

pub(super) fn call_scalar(
    ctx: &EvalContext,
    kind: FunctionKind,
    args: &[Value],
) -> Result<Value> {
    use FunctionKind::*;
    match kind {
        Ltrim => trim_fn(kind, args, |s, chars| s.trim_start_matches(|c| chars.contains(c)).to_string()),
        Rtrim => trim_fn(kind, args, |s, chars| s.trim_end_matches(|c| chars.contains(c)).to_string()),
        Trim => trim_fn(kind, args, |s, chars| {
            s.trim_matches(|c| chars.contains(c)).to_string()
        }),
        Instr => instr(args),
        Replace => replace(args),
        Upper => text_fn(kind, args, |s| s.to_uppercase()),
        Lower => text_fn(kind, args, |s| s.to_lowercase()),
        Length => length(args),
        Substr => substr(args),
        Abs => abs(args),
        Round => round(args),
        Random => Ok(Value::Integer(rand::random::<i64>())),
        Date => date_format(args, "%Y-%m-%d"),
        Time => date_format(args, "%H:%M:%S"),
        Datetime => date_format(args, "%Y-%m-%d %H:%M:%S"),
        Julianday => julianday(args),
        Strftime => strftime(args),
        Now => Ok(Value::Date(now())),
        Coalesce => Ok(args
            .iter()
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or(Value::Null)),
        Ifnull => match args {
            [first, second] => Ok(if first.is_null() {
                second.clone()
            } else {
                first.clone()
            }),
            _ => arg_error(kind, "two arguments"),
        },
        Nullif => match args {
            [first, second] => Ok(if first == second {
                Value::Null
            } else {
                first.clone()
            }),
            _ => arg_error(kind, "two arguments"),
        },
        LastInsertRowid => Ok(Value::Integer(ctx.last_insert_rowid)),
        Compare => match args {
            [first, second] => Ok(Value::Integer(match first.sort_cmp(second) {
                core::cmp::Ordering::Less => -1,
                core::cmp::Ordering::Equal => 0,
                core::cmp::Ordering::Greater => 1,
            })),
            _ => arg_error(kind, "two arguments"),
        },
        Count | Sum | Avg | Min | Max => unreachable!("aggregates do not reach the scalar table"),
    }
}

fn arg_error(kind: FunctionKind, wanted: &str) -> Result<Value> {
    Err(Error::Syntax(format!("{} takes {}", kind, wanted)))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Null => String::new(),
        other => other.canonical_text(),
    }
}

fn text_fn(
    kind: FunctionKind,
    args: &[Value],
    f: impl Fn(&str) -> String,
) -> Result<Value> {
    match args {
        [Value::Null] => Ok(Value::Null),
        [value] => Ok(Value::Text(f(&text_of(value)))),
        _ => arg_error(kind, "one argument"),
    }
}

fn trim_fn(
    kind: FunctionKind,
    args: &[Value],
    f: impl Fn(&str, &str) -> String,
) -> Result<Value> {
    match args {
        [Value::Null] | [Value::Null, _] => Ok(Value::Null),
        [value] => Ok(Value::Text(f(&text_of(value), " \t\r\n"))),
        [value, chars] => {
            let chars = text_of(chars);
            Ok(Value::Text(f(&text_of(value), &chars)))
        }
        _ => arg_error(kind, "one or two arguments"),
    }
}

/// 1-based position of the first occurrence, 0 when absent.
fn instr(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Null, _] | [_, Value::Null] => Ok(Value::Null),
        [haystack, needle] => {
            let haystack = text_of(haystack);
            let needle = text_of(needle);
            Ok(Value::Integer(match haystack.find(&needle) {
                Some(byte_idx) => haystack[..byte_idx].chars().count() as i64 + 1,
                None => 0,
            }))
        }
        _ => arg_error(FunctionKind::Instr, "two arguments"),
    }
}

fn replace(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Null, _, _] => Ok(Value::Null),
        [haystack, from, to] => {
            let haystack = text_of(haystack);
            let from = text_of(from);
            let to = text_of(to);
            if from.is_empty() {
                return Ok(Value::Text(haystack));
            }
            Ok(Value::Text(haystack.replace(&from, &to)))
        }
        _ => arg_error(FunctionKind::Replace, "three arguments"),
    }
}

fn length(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Null] => Ok(Value::Null),
        [Value::Blob(bytes)] => Ok(Value::Integer(bytes.len() as i64)),
        [value] => Ok(Value::Integer(text_of(value).chars().count() as i64)),
        _ => arg_error(FunctionKind::Length, "one argument"),
    }
}

/// `SUBSTR(s, start [, len])`, 1-based; a negative start counts back from the
/// end of the string.
fn substr(args: &[Value]) -> Result<Value> {
    let (value, start, len) = match args {
        [Value::Null, ..] => return Ok(Value::Null),
        [value, Value::Integer(start)] => (value, *start, None),
        [value, Value::Integer(start), Value::Integer(len)] => (value, *start, Some(*len)),
        _ => return arg_error(FunctionKind::Substr, "a string and integer positions"),
    };
    let chars: Vec<char> = text_of(value).chars().collect();
    let total = chars.len() as i64;
    let begin = if start > 0 {
        start - 1
    } else if start < 0 {
        (total + start).max(0)
    } else {
        0
    };
    let begin = begin.min(total).max(0) as usize;
    let end = match len {
        Some(len) if len >= 0 => (begin + len as usize).min(chars.len()),
        Some(_) => begin,
        None => chars.len(),
    };
    Ok(Value::Text(chars[begin..end].iter().collect()))
}

fn abs(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Null] => Ok(Value::Null),
        [Value::Integer(v)] => Ok(Value::Integer(v.wrapping_abs())),
        [Value::Real(v)] => Ok(Value::Real(v.abs())),
        [other] => Err(Error::Syntax(format!(
            "ABS requires a number, got {}",
            other.type_name()
        ))),
        _ => arg_error(FunctionKind::Abs, "one argument"),
    }
}

/// `ROUND(x [, digits])`; always reports a real, like the SQLite original.
fn round(args: &[Value]) -> Result<Value> {
    let (value, digits) = match args {
        [Value::Null] | [Value::Null, _] => return Ok(Value::Null),
        [value] => (value, 0),
        [value, Value::Integer(digits)] => (value, *digits),
        _ => return arg_error(FunctionKind::Round, "a number and an optional digit count"),
    };
    let v = match value {
        Value::Integer(v) => *v as f64,
        Value::Real(v) => *v,
        other => {
            return Err(Error::Syntax(format!(
                "ROUND requires a number, got {}",
                other.type_name()
            )))
        }
    };
    let factor = 10f64.powi(digits.clamp(0, 15) as i32);
    Ok(Value::Real((v * factor).round() / factor))
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Resolves the optional time-string argument of the date functions.
fn datetime_arg(args: &[Value]) -> Result<Option<NaiveDateTime>> {
    match args {
        [] => Ok(Some(now())),
        [Value::Null] => Ok(None),
        [Value::Date(v)] => Ok(Some(*v)),
        [Value::Text(s)] if s.eq_ignore_ascii_case("now") => Ok(Some(now())),
        [Value::Text(s)] => Ok(parse_datetime(s)),
        [other] => Err(Error::Syntax(format!(
            "expected a time string, got {}",
            other.type_name()
        ))),
        _ => Err(Error::Syntax("expected at most one time string".into())),
    }
}

fn date_format(args: &[Value], format: &str) -> Result<Value> {
    Ok(match datetime_arg(args)? {
        Some(datetime) => Value::Text(datetime.format(format).to_string()),
        None => Value::Null,
    })
}

fn julianday(args: &[Value]) -> Result<Value> {
    use chrono::{Datelike, Timelike};
    Ok(match datetime_arg(args)? {
        Some(datetime) => {
            let days = datetime.num_days_from_ce() as f64 + 1_721_424.5;
            let seconds = datetime.num_seconds_from_midnight() as f64;
            Value::Real(days + seconds / 86_400.0)
        }
        None => Value::Null,
    })
}

fn strftime(args: &[Value]) -> Result<Value> {
    let (format, rest) = match args {
        [Value::Text(format), rest @ ..] => (format, rest),
        _ => return arg_error(FunctionKind::Strftime, "a format string first"),
    };
    Ok(match datetime_arg(rest)? {
        Some(datetime) => Value::Text(datetime.format(format).to_string()),
        None => Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        EvalContext::new(41)
    }

    fn call(kind: FunctionKind, args: &[Value]) -> Result<Value> {
        call_scalar(&ctx(), kind, args)
    }

    #[test]
    fn string_functions() {
        assert_eq!(
            call(FunctionKind::Upper, &[Value::Text("bolt".into())]).unwrap(),
            Value::Text("BOLT".into())
        );
        assert_eq!(
            call(FunctionKind::Trim, &[Value::Text("  pad  ".into())]).unwrap(),
            Value::Text("pad".into())
        );
        assert_eq!(
            call(
                FunctionKind::Ltrim,
                &[Value::Text("xxpad".into()), Value::Text("x".into())]
            )
            .unwrap(),
            Value::Text("pad".into())
        );
        assert_eq!(
            call(
                FunctionKind::Instr,
                &[Value::Text("bolt".into()), Value::Text("lt".into())]
            )
            .unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            call(
                FunctionKind::Replace,
                &[
                    Value::Text("bolt".into()),
                    Value::Text("o".into()),
                    Value::Text("e".into())
                ]
            )
            .unwrap(),
            Value::Text("belt".into())
        );
        assert_eq!(
            call(FunctionKind::Length, &[Value::Text("bolt".into())]).unwrap(),
            Value::Integer(4)
        );
    }

    #[test]
    fn substr_positions() {
        let s = Value::Text("stockroom".into());
        assert_eq!(
            call(
                FunctionKind::Substr,
                &[s.clone(), Value::Integer(1), Value::Integer(5)]
            )
            .unwrap(),
            Value::Text("stock".into())
        );
        assert_eq!(
            call(FunctionKind::Substr, &[s.clone(), Value::Integer(6)]).unwrap(),
            Value::Text("room".into())
        );
        assert_eq!(
            call(FunctionKind::Substr, &[s, Value::Integer(-4)]).unwrap(),
            Value::Text("room".into())
        );
    }

    #[test]
    fn numeric_functions() {
        assert_eq!(
            call(FunctionKind::Abs, &[Value::Integer(-5)]).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            call(
                FunctionKind::Round,
                &[Value::Real(3.14159), Value::Integer(2)]
            )
            .unwrap(),
            Value::Real(3.14)
        );
    }

    #[test]
    fn helper_functions() {
        assert_eq!(
            call(
                FunctionKind::Coalesce,
                &[Value::Null, Value::Null, Value::Integer(3)]
            )
            .unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            call(FunctionKind::Ifnull, &[Value::Null, Value::Integer(1)]).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            call(
                FunctionKind::Nullif,
                &[Value::Integer(1), Value::Integer(1)]
            )
            .unwrap(),
            Value::Null
        );
        assert_eq!(
            call(FunctionKind::LastInsertRowid, &[]).unwrap(),
            Value::Integer(41)
        );
        assert_eq!(
            call(
                FunctionKind::Compare,
                &[Value::Integer(1), Value::Integer(2)]
            )
            .unwrap(),
            Value::Integer(-1)
        );
    }

    #[test]
    fn date_functions() {
        let ts = Value::Text("2021-11-09 15:37:12".into());
        assert_eq!(
            call(FunctionKind::Date, &[ts.clone()]).unwrap(),
            Value::Text("2021-11-09".into())
        );
        assert_eq!(
            call(FunctionKind::Time, &[ts.clone()]).unwrap(),
            Value::Text("15:37:12".into())
        );
        assert_eq!(
            call(
                FunctionKind::Strftime,
                &[Value::Text("%Y/%m".into()), ts.clone()]
            )
            .unwrap(),
            Value::Text("2021/11".into())
        );
        // JD 2440587.5 is the Unix epoch
        assert_eq!(
            call(
                FunctionKind::Julianday,
                &[Value::Text("1970-01-01".into())]
            )
            .unwrap(),
            Value::Real(2_440_587.5)
        );
    }
}
