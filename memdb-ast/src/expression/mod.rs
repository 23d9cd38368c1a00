mod function;
mod operator;
mod query;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::{
    function::{Function, FunctionKind},
    operator::{BinaryOperator, UnaryOperator},
    query::*,
};
use crate::{
    types::{DataType, Ident, Literal, ObjectName},
    utils::display_comma_separated,
};

/// SQL expression type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal value, such as string, number or NULL.
    Literal(Literal),

    /// Identifier, e.g. a bare column name
    Identifier(Ident),
    /// Multi-part identifier, e.g. `table_alias.column`
    CompoundIdentifier(Vec<Ident>),

    /// Unqualified wildcard (`*`), allowed right after `SELECT` and as the
    /// argument of `COUNT(*)`.
    Wildcard,
    /// Qualified wildcard, e.g. `alias.*`.
    QualifiedWildcard(ObjectName),

    /// Nested expression, e.g. `(foo > bar)` or `(1)`
    Nested(Box<Expr>),

    /// Unary operation, e.g. `NOT foo`
    UnaryOp(UnaryOpExpr),
    /// Binary operation, e.g. `1 + 1` or `foo > bar`
    BinaryOp(BinaryOpExpr),

    /// `IS [NOT] NULL`, `ISNULL` and `NOTNULL` operators
    IsNull(IsNullExpr),

    /// `<expr> [NOT] {LIKE | GLOB | REGEXP | MATCH} <pattern>`
    TextMatch(TextMatchExpr),

    /// `<expr> [NOT] BETWEEN <low> AND <high>`
    Between(BetweenExpr),

    /// `<expr> [NOT] IN (val1, val2, ...)`
    InList(InListExpr),

    /// `CASE [<operand>] WHEN <condition> THEN <result> ... ELSE <result> END`
    Case(CaseExpr),

    /// `CAST(<expr> AS <type>)`
    Cast(CastExpr),

    /// `<expr> COLLATE <collation>`
    Collate(CollateExpr),

    /// Function call, e.g. `COUNT(*)` or `UPPER(name)`
    Function(Function),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{}", v),
            Self::Identifier(ident) => write!(f, "{}", ident),
            Self::CompoundIdentifier(idents) => {
                write!(f, "{}", crate::utils::display_separated(idents, "."))
            }
            Self::Wildcard => f.write_str("*"),
            Self::QualifiedWildcard(name) => write!(f, "{}.*", name),
            Self::Nested(expr) => write!(f, "({})", expr),
            Self::UnaryOp(expr) => write!(f, "{}", expr),
            Self::BinaryOp(expr) => write!(f, "{}", expr),
            Self::IsNull(expr) => write!(f, "{}", expr),
            Self::TextMatch(expr) => write!(f, "{}", expr),
            Self::Between(expr) => write!(f, "{}", expr),
            Self::InList(expr) => write!(f, "{}", expr),
            Self::Case(expr) => write!(f, "{}", expr),
            Self::Cast(expr) => write!(f, "{}", expr),
            Self::Collate(expr) => write!(f, "{}", expr),
            Self::Function(func) => write!(f, "{}", func),
        }
    }
}

/// Unary operation, e.g. `NOT foo`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnaryOpExpr {
    pub op: UnaryOperator,
    pub expr: Box<Expr>,
}

impl fmt::Display for UnaryOpExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.op {
            UnaryOperator::Not => write!(f, "{} {}", self.op, self.expr),
            _ => write!(f, "{}{}", self.op, self.expr),
        }
    }
}

/// Binary operation, e.g. `1 + 1` or `foo > bar`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryOpExpr {
    pub op: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

impl fmt::Display for BinaryOpExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// `<expr> IS [NOT] NULL` operator. `ISNULL` and `NOTNULL` parse to the same
/// node.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IsNullExpr {
    pub negated: bool,
    pub expr: Box<Expr>,
}

impl fmt::Display for IsNullExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} IS {}NULL",
            self.expr,
            if self.negated { "NOT " } else { "" }
        )
    }
}

/// The text predicate applied by a [`TextMatchExpr`].
#[doc(hidden)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextMatchOp {
    Like,
    Glob,
    Regexp,
    Match,
}

impl fmt::Display for TextMatchOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            TextMatchOp::Like => "LIKE",
            TextMatchOp::Glob => "GLOB",
            TextMatchOp::Regexp => "REGEXP",
            TextMatchOp::Match => "MATCH",
        })
    }
}

/// `<expr> [NOT] {LIKE | GLOB | REGEXP | MATCH} <pattern>`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextMatchExpr {
    pub op: TextMatchOp,
    pub negated: bool,
    pub expr: Box<Expr>,
    pub pattern: Box<Expr>,
}

impl fmt::Display for TextMatchExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}{} {}",
            self.expr,
            if self.negated { "NOT " } else { "" },
            self.op,
            self.pattern
        )
    }
}

/// `<expr> [NOT] BETWEEN <low> AND <high>`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BetweenExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
    pub low: Box<Expr>,
    pub high: Box<Expr>,
}

impl fmt::Display for BetweenExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}BETWEEN {} AND {}",
            self.expr,
            if self.negated { "NOT " } else { "" },
            self.low,
            self.high
        )
    }
}

/// `<expr> [NOT] IN (val1, val2, ...)`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InListExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
    pub list: Vec<Expr>,
}

impl fmt::Display for InListExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}IN ({})",
            self.expr,
            if self.negated { "NOT " } else { "" },
            display_comma_separated(&self.list)
        )
    }
}

/// `CASE [<operand>] WHEN <condition> THEN <result> ... ELSE <result> END`
///
/// The `ELSE` branch is mandatory in this dialect; the parser enforces it.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseExpr {
    pub operand: Option<Box<Expr>>,
    pub conditions: Vec<Expr>,
    pub results: Vec<Expr>,
    pub else_result: Box<Expr>,
}

impl fmt::Display for CaseExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("CASE")?;
        if let Some(operand) = &self.operand {
            write!(f, " {}", operand)?;
        }
        for (c, r) in self.conditions.iter().zip(&self.results) {
            write!(f, " WHEN {} THEN {}", c, r)?;
        }
        write!(f, " ELSE {} END", self.else_result)
    }
}

/// `CAST(<expr> AS <type>)`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub data_type: DataType,
}

impl fmt::Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CAST({} AS {})", self.expr, self.data_type)
    }
}

/// `<expr> COLLATE <collation>`
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollateExpr {
    pub expr: Box<Expr>,
    pub collation: Ident,
}

impl fmt::Display for CollateExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} COLLATE {}", self.expr, self.collation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_display() {
        let case = CaseExpr {
            operand: Some(Box::new(Expr::Identifier(Ident::new("kind")))),
            conditions: vec![Expr::Literal(Literal::Number("1".into()))],
            results: vec![Expr::Literal(Literal::String("one".into()))],
            else_result: Box::new(Expr::Literal(Literal::String("other".into()))),
        };
        assert_eq!(
            case.to_string(),
            "CASE kind WHEN 1 THEN 'one' ELSE 'other' END"
        );
    }

    #[test]
    fn between_display() {
        let between = BetweenExpr {
            expr: Box::new(Expr::Identifier(Ident::new("v"))),
            negated: true,
            low: Box::new(Expr::Literal(Literal::Number("1".into()))),
            high: Box::new(Expr::Literal(Literal::Number("9".into()))),
        };
        assert_eq!(between.to_string(), "v NOT BETWEEN 1 AND 9");
    }

    #[test]
    fn unary_display() {
        let minus = UnaryOpExpr {
            op: UnaryOperator::Minus,
            expr: Box::new(Expr::Literal(Literal::Number("3".into()))),
        };
        assert_eq!(minus.to_string(), "-3");
        let not = UnaryOpExpr {
            op: UnaryOperator::Not,
            expr: Box::new(Expr::Identifier(Ident::new("done"))),
        };
        assert_eq!(not.to_string(), "NOT done");
    }
}
