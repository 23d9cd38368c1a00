use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{expression::Expr, utils::display_comma_separated};

/// A function call, e.g. `COUNT(*)` or `SUBSTR(name, 1, 3)`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Function {
    /// Which function is called.
    pub kind: FunctionKind,
    /// Aggregate functions may specify e.g. `COUNT(DISTINCT x)`.
    pub distinct: bool,
    /// The argument list; `COUNT(*)` carries a single [`Expr::Wildcard`].
    pub args: Vec<Expr>,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}({}{})",
            self.kind,
            if self.distinct { "DISTINCT " } else { "" },
            display_comma_separated(&self.args),
        )
    }
}

/// The closed set of functions the dialect understands.
///
/// An identifier followed by `(` that does not name one of these is a parse
/// error; there are no user-defined functions.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FunctionKind {
    // aggregates
    Count,
    Sum,
    Avg,
    Min,
    Max,
    // strings
    Ltrim,
    Trim,
    Rtrim,
    Instr,
    Replace,
    Upper,
    Lower,
    Length,
    Substr,
    // math
    Abs,
    Round,
    Random,
    // date and time
    Date,
    Time,
    Datetime,
    Julianday,
    Strftime,
    Now,
    // helpers
    Coalesce,
    Ifnull,
    Nullif,
    LastInsertRowid,
    Compare,
}

impl FunctionKind {
    /// Looks up a function by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<FunctionKind> {
        Some(match name.to_lowercase().as_str() {
            "count" => Self::Count,
            "sum" => Self::Sum,
            "avg" => Self::Avg,
            "min" => Self::Min,
            "max" => Self::Max,
            "ltrim" => Self::Ltrim,
            "trim" => Self::Trim,
            "rtrim" => Self::Rtrim,
            "instr" => Self::Instr,
            "replace" => Self::Replace,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "length" => Self::Length,
            "substr" => Self::Substr,
            "abs" => Self::Abs,
            "round" => Self::Round,
            "random" => Self::Random,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::Datetime,
            "julianday" => Self::Julianday,
            "strftime" => Self::Strftime,
            "now" => Self::Now,
            "coalesce" => Self::Coalesce,
            "ifnull" => Self::Ifnull,
            "nullif" => Self::Nullif,
            "last_insert_rowid" => Self::LastInsertRowid,
            "compare" => Self::Compare,
            _ => return None,
        })
    }

    /// The canonical spelling of the function name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Ltrim => "LTRIM",
            Self::Trim => "TRIM",
            Self::Rtrim => "RTRIM",
            Self::Instr => "INSTR",
            Self::Replace => "REPLACE",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
            Self::Length => "LENGTH",
            Self::Substr => "SUBSTR",
            Self::Abs => "ABS",
            Self::Round => "ROUND",
            Self::Random => "RANDOM",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Datetime => "DATETIME",
            Self::Julianday => "JULIANDAY",
            Self::Strftime => "STRFTIME",
            Self::Now => "NOW",
            Self::Coalesce => "COALESCE",
            Self::Ifnull => "IFNULL",
            Self::Nullif => "NULLIF",
            Self::LastInsertRowid => "LAST_INSERT_ROWID",
            Self::Compare => "COMPARE",
        }
    }

    /// Whether the function participates in the aggregate accumulation pass.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Self::Count | Self::Sum | Self::Avg | Self::Min | Self::Max
        )
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_lookup() {
        assert_eq!(FunctionKind::from_name("COUNT"), Some(FunctionKind::Count));
        assert_eq!(
            FunctionKind::from_name("last_insert_rowid"),
            Some(FunctionKind::LastInsertRowid)
        );
        assert_eq!(FunctionKind::from_name("no_such_fn"), None);
    }

    #[test]
    fn count_star_display() {
        let call = Function {
            kind: FunctionKind::Count,
            distinct: false,
            args: vec![Expr::Wildcard],
        };
        assert_eq!(call.to_string(), "COUNT(*)");
    }
}
