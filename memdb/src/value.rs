use core::cmp::Ordering;
use core::fmt;

use chrono::NaiveDateTime;
use memdb_ast::{DataType, Literal};

use crate::error::{Error, Result};

/// A runtime value: the tagged sum every record cell and every evaluated
/// expression carries.
///
/// Arithmetic and ordering are tag-matched; the exceptions are `+` (which
/// concatenates when either side is text) and comparisons between the two
/// numeric tags, which compare numerically.
#[derive(Clone, Debug)]
pub enum Value {
    /// The SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Boolean. First-class inside the core; collaborators that cannot carry
    /// booleans serialize them on their side of the boundary.
    Bool(bool),
    /// Byte string.
    Blob(Vec<u8>),
    /// Calendar date plus time of day.
    Date(NaiveDateTime),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Integer(a), Value::Real(b)) | (Value::Real(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(""),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => f.write_str(&format_real(*v)),
            Value::Text(v) => f.write_str(v),
            Value::Bool(v) => f.write_str(if *v { "TRUE" } else { "FALSE" }),
            Value::Blob(v) => write!(f, "<blob {} bytes>", v.len()),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Renders a float so that it parses back as a real, never an integer.
pub(crate) fn format_real(v: f64) -> String {
    if v.is_finite() && v == v.trunc() {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

impl Value {
    /// Builds a value from a parsed literal.
    pub fn from_literal(literal: &Literal) -> Result<Value> {
        Ok(match literal {
            Literal::Null => Value::Null,
            Literal::Boolean(v) => Value::Bool(*v),
            Literal::String(v) => Value::Text(v.clone()),
            Literal::Number(n) => {
                if let Ok(v) = n.parse::<i64>() {
                    Value::Integer(v)
                } else if let Ok(v) = n.parse::<f64>() {
                    Value::Real(v)
                } else {
                    return Err(Error::Syntax(format!("malformed number literal '{}'", n)));
                }
            }
        })
    }

    /// The name of the runtime tag, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Bool(_) => "BOOL",
            Value::Blob(_) => "BLOB",
            Value::Date(_) => "DATE",
        }
    }

    /// Whether the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The canonical text form, used by concatenation and text casts.
    pub fn canonical_text(&self) -> String {
        self.to_string()
    }

    /// Tag-matched ordering; numeric tags cross-compare. `None` when the
    /// values are not mutually orderable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Real(b)) => (*a as f64).partial_cmp(b),
            (Value::Real(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Blob(a), Value::Blob(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// A total order for sorting rows: NULL sorts first, then values by tag
    /// rank when they are not mutually orderable.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => (),
        }
        self.compare(other)
            .unwrap_or_else(|| self.tag_rank().cmp(&other.tag_rank()))
    }

    fn tag_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Real(_) => 1,
            Value::Bool(_) => 2,
            Value::Text(_) => 3,
            Value::Blob(_) => 4,
            Value::Date(_) => 5,
        }
    }

    /// `+`: tag-matched addition; concatenation when either side is text.
    pub fn add(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Text(_), _) | (_, Value::Text(_)) => Ok(Value::Text(format!(
                "{}{}",
                self.canonical_text(),
                other.canonical_text()
            ))),
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_add(*b))),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a + b)),
            _ => Err(self.arithmetic_error("+", other)),
        }
    }

    /// `-`: tag-matched subtraction.
    pub fn sub(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_sub(*b))),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a - b)),
            _ => Err(self.arithmetic_error("-", other)),
        }
    }

    /// `*`: tag-matched multiplication.
    pub fn mul(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_mul(*b))),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a * b)),
            _ => Err(self.arithmetic_error("*", other)),
        }
    }

    /// `/`: tag-matched division. Division by zero does not raise; it yields
    /// the text value `"Error: division by zero."`.
    pub fn div(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(_), Value::Integer(0)) => Ok(division_by_zero()),
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a / b)),
            (Value::Real(_), Value::Real(b)) if *b == 0.0 => Ok(division_by_zero()),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a / b)),
            _ => Err(self.arithmetic_error("/", other)),
        }
    }

    /// `%`: tag-matched remainder.
    pub fn rem(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(_), Value::Integer(0)) => Ok(division_by_zero()),
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a % b)),
            (Value::Real(_), Value::Real(b)) if *b == 0.0 => Ok(division_by_zero()),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a % b)),
            _ => Err(self.arithmetic_error("%", other)),
        }
    }

    fn arithmetic_error(&self, op: &str, other: &Value) -> Error {
        Error::Syntax(format!(
            "cannot apply {} to {} and {}",
            op,
            self.type_name(),
            other.type_name()
        ))
    }

    /// `CAST(<value> AS <type>)` coercion.
    ///
    /// NULL casts to NULL. Integer, Real, Bool and Text convert between each
    /// other; text-to-boolean treats `true`, `on`, `yes` and `1` as true.
    /// Inconvertible combinations are a syntax error.
    pub fn cast(&self, data_type: DataType) -> Result<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        let fail = || {
            Err(Error::Syntax(format!(
                "cannot cast {} to {}",
                self.type_name(),
                data_type
            )))
        };
        match data_type {
            DataType::Integer => match self {
                Value::Integer(v) => Ok(Value::Integer(*v)),
                Value::Real(v) => Ok(Value::Integer(*v as i64)),
                Value::Bool(v) => Ok(Value::Integer(i64::from(*v))),
                Value::Text(v) => match v.trim().parse::<i64>() {
                    Ok(parsed) => Ok(Value::Integer(parsed)),
                    Err(_) => fail(),
                },
                _ => fail(),
            },
            DataType::Real => match self {
                Value::Integer(v) => Ok(Value::Real(*v as f64)),
                Value::Real(v) => Ok(Value::Real(*v)),
                Value::Bool(v) => Ok(Value::Real(if *v { 1.0 } else { 0.0 })),
                Value::Text(v) => match v.trim().parse::<f64>() {
                    Ok(parsed) => Ok(Value::Real(parsed)),
                    Err(_) => fail(),
                },
                _ => fail(),
            },
            DataType::Boolean => match self {
                Value::Bool(v) => Ok(Value::Bool(*v)),
                Value::Integer(v) => Ok(Value::Bool(*v != 0)),
                Value::Real(v) => Ok(Value::Bool(*v != 0.0)),
                Value::Text(v) => Ok(Value::Bool(matches!(
                    v.to_lowercase().as_str(),
                    "true" | "on" | "yes" | "1"
                ))),
                _ => fail(),
            },
            DataType::Text | DataType::Color => match self {
                Value::Blob(_) => fail(),
                value => Ok(Value::Text(value.canonical_text())),
            },
            DataType::Date => match self {
                Value::Date(v) => Ok(Value::Date(*v)),
                Value::Text(v) => match crate::eval::parse_datetime(v) {
                    Some(parsed) => Ok(Value::Date(parsed)),
                    None => fail(),
                },
                _ => fail(),
            },
            DataType::Blob => match self {
                Value::Blob(v) => Ok(Value::Blob(v.clone())),
                Value::Text(v) => Ok(Value::Blob(v.clone().into_bytes())),
                _ => fail(),
            },
            DataType::None => Ok(self.clone()),
        }
    }
}

pub(crate) fn division_by_zero() -> Value {
    Value::Text("Error: division by zero.".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matched_arithmetic() {
        assert_eq!(
            Value::Integer(2).add(&Value::Integer(3)).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            Value::Real(1.5).mul(&Value::Real(2.0)).unwrap(),
            Value::Real(3.0)
        );
        // mixed numeric tags do not combine
        assert!(Value::Integer(1).add(&Value::Real(1.0)).is_err());
        assert!(Value::Bool(true).add(&Value::Bool(false)).is_err());
    }

    #[test]
    fn plus_concatenates_text() {
        assert_eq!(
            Value::Text("a".into()).add(&Value::Integer(1)).unwrap(),
            Value::Text("a1".into())
        );
        assert_eq!(
            Value::Integer(1).add(&Value::Text("a".into())).unwrap(),
            Value::Text("1a".into())
        );
    }

    #[test]
    fn division_by_zero_is_a_value() {
        assert_eq!(
            Value::Integer(1).div(&Value::Integer(0)).unwrap(),
            Value::Text("Error: division by zero.".into())
        );
    }

    #[test]
    fn comparisons() {
        assert_eq!(
            Value::Integer(1).compare(&Value::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Integer(1).compare(&Value::Real(0.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Text("a".into()).compare(&Value::Integer(1)), None);
        // NULL sorts first
        assert_eq!(Value::Null.sort_cmp(&Value::Integer(0)), Ordering::Less);
    }

    #[test]
    fn casts() {
        assert_eq!(
            Value::Text("42".into()).cast(DataType::Integer).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            Value::Text("on".into()).cast(DataType::Boolean).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::Text("no".into()).cast(DataType::Boolean).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            Value::Real(1.0).cast(DataType::Text).unwrap(),
            Value::Text("1.0".into())
        );
        assert!(Value::Text("nope".into()).cast(DataType::Integer).is_err());
        assert_eq!(Value::Null.cast(DataType::Integer).unwrap(), Value::Null);
    }

    #[test]
    fn real_formatting_keeps_the_decimal_point() {
        assert_eq!(format_real(1.0), "1.0");
        assert_eq!(format_real(1.25), "1.25");
    }
}
