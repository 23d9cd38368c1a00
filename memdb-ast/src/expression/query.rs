use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    expression::Expr,
    types::{Ident, ObjectName},
    utils::display_comma_separated,
};

/// A `SELECT` query.
///
/// ```txt
/// SELECT [ ALL | DISTINCT ] <select list>
///     [ FROM <join tree> ]
///     [ WHERE <search condition> ]
///     [ GROUP BY <columns> [ HAVING <search condition> ] ]
///     [ ORDER BY <sort spec> [, ...] ]
///     [ LIMIT <count> [ OFFSET <skip> ] | LIMIT <skip>, <count> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Query {
    /// Set quantifier, `ALL` or `DISTINCT`
    pub quantifier: Option<SetQuantifier>,
    /// Projection expressions
    pub projection: Vec<SelectItem>,
    /// `FROM` clause
    pub from: Option<From>,
    /// `WHERE` clause
    pub selection: Option<Where>,
    /// `GROUP BY` clause
    pub group_by: Option<GroupBy>,
    /// `HAVING` clause
    pub having: Option<Having>,
    /// `ORDER BY` clause
    pub order_by: Option<OrderBy>,
    /// `LIMIT`/`OFFSET` clause
    pub limit: Option<Limit>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SELECT")?;
        if let Some(quantifier) = &self.quantifier {
            write!(f, " {}", quantifier)?;
        }
        write!(f, " {}", display_comma_separated(&self.projection))?;
        if let Some(from) = &self.from {
            write!(f, " {}", from)?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " {}", selection)?;
        }
        if let Some(group_by) = &self.group_by {
            write!(f, " {}", group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " {}", having)?;
        }
        if let Some(order_by) = &self.order_by {
            write!(f, " {}", order_by)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " {}", limit)?;
        }
        Ok(())
    }
}

/// One item of the comma-separated list following `SELECT`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectItem {
    /// An unqualified `*`
    Wildcard,
    /// `alias.*`
    QualifiedWildcard(ObjectName),
    /// An expression, maybe followed by `[ AS ] alias`
    #[doc(hidden)]
    DerivedColumn {
        expr: Box<Expr>,
        alias: Option<Ident>,
    },
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SelectItem::Wildcard => f.write_str("*"),
            SelectItem::QualifiedWildcard(prefix) => write!(f, "{}.*", prefix),
            SelectItem::DerivedColumn { expr, alias } => {
                if let Some(alias) = alias {
                    write!(f, "{} AS {}", expr, alias)
                } else {
                    write!(f, "{}", expr)
                }
            }
        }
    }
}

/// The option of the select list quantifier.
#[doc(hidden)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetQuantifier {
    All,
    Distinct,
}

impl fmt::Display for SetQuantifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::All => "ALL",
            Self::Distinct => "DISTINCT",
        })
    }
}

// ============================================================================
// from clause
// ============================================================================

/// From clause.
///
/// ```txt
/// <from clause> ::= FROM <table reference> [, ...]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct From {
    /// The table reference list. Multiple references form a Cartesian
    /// product, like `CROSS JOIN`.
    pub list: Vec<TableReference>,
}

impl fmt::Display for From {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FROM {}", display_comma_separated(&self.list))
    }
}

/// A table plus the chain of joins hanging off it, the parser's join tree.
///
/// ```txt
/// <table reference> ::= <table> [ <join> ... ]
/// <join> ::= [ NATURAL | INNER | LEFT [ OUTER ] | CROSS ] JOIN <table>
///     [ ON <search condition> | USING ( <column> [, ...] ) ]
/// ```
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableReference {
    pub relation: TableRef,
    pub joins: Vec<Join>,
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.relation)?;
        for join in &self.joins {
            write!(f, " {}", join)?;
        }
        Ok(())
    }
}

/// A table name with an optional alias.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableRef {
    /// Table name.
    pub name: Ident,
    /// Alias name.
    pub alias: Option<Ident>,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

/// The `JOIN` relation.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Join {
    pub op: JoinOperator,
    pub relation: TableRef,
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let spec = match &self.op {
            JoinOperator::Cross => return write!(f, "CROSS JOIN {}", self.relation),
            JoinOperator::Natural => return write!(f, "NATURAL JOIN {}", self.relation),
            JoinOperator::Inner(spec) => {
                write!(f, "INNER JOIN {}", self.relation)?;
                spec
            }
            JoinOperator::LeftOuter(spec) => {
                write!(f, "LEFT OUTER JOIN {}", self.relation)?;
                spec
            }
        };
        if let Some(spec) = spec {
            write!(f, "{}", spec)?;
        }
        Ok(())
    }
}

/// The join operator. The specification is optional; a join without `ON` or
/// `USING` degenerates to a Cartesian product.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinOperator {
    Cross,
    // default join if no join type is specified
    Inner(Option<JoinSpec>),
    LeftOuter(Option<JoinSpec>),
    Natural,
}

/// The join specification.
///
/// ```txt
/// <join specification> ::= ON <search condition> | USING ( <column> [, ...] )
/// ```
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinSpec {
    On(Box<Expr>),
    Using(Vec<Ident>),
}

impl fmt::Display for JoinSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::On(expr) => write!(f, " ON {}", expr),
            Self::Using(columns) => write!(f, " USING ({})", display_comma_separated(columns)),
        }
    }
}

// ============================================================================
// where / group by / having clauses
// ============================================================================

/// Where clause.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Where {
    /// The search condition.
    pub expr: Box<Expr>,
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WHERE {}", self.expr)
    }
}

/// Group by clause: a list of grouping column references.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupBy {
    /// The grouping columns.
    pub columns: Vec<ObjectName>,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GROUP BY {}", display_comma_separated(&self.columns))
    }
}

/// Having clause.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Having {
    /// The search condition.
    pub expr: Box<Expr>,
}

impl fmt::Display for Having {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HAVING {}", self.expr)
    }
}

// ============================================================================
// order by / limit clauses
// ============================================================================

/// `ORDER BY` clause.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBy {
    /// The sort specification list.
    pub list: Vec<SortSpec>,
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ORDER BY {}", display_comma_separated(&self.list))
    }
}

/// A sort specification.
///
/// ```txt
/// <sort specification> ::= <column> [ ASC | DESC ] [ COLLATE <name> ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SortSpec {
    /// Sort key, a possibly qualified column reference.
    pub column: ObjectName,
    /// Optional `ASC` or `DESC`
    pub asc: Option<bool>,
    /// Optional `COLLATE <name>`; accepted but has no effect.
    pub collate: Option<Ident>,
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.column)?;
        match self.asc {
            Some(true) => f.write_str(" ASC")?,
            Some(false) => f.write_str(" DESC")?,
            None => (),
        }
        if let Some(collate) = &self.collate {
            write!(f, " COLLATE {}", collate)?;
        }
        Ok(())
    }
}

/// Limit clause. A negative count or offset disables that bound.
///
/// Both spellings, `LIMIT <count> [ OFFSET <skip> ]` and
/// `LIMIT <skip>, <count>`, parse to this shape.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Limit {
    /// Maximum number of rows to keep.
    pub count: i64,
    /// Number of leading rows to drop.
    pub offset: Option<i64>,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LIMIT {}", self.count)?;
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_display() {
        let join = Join {
            op: JoinOperator::LeftOuter(Some(JoinSpec::Using(vec![Ident::new("k")]))),
            relation: TableRef {
                name: Ident::new("y"),
                alias: None,
            },
        };
        assert_eq!(join.to_string(), "LEFT OUTER JOIN y USING (k)");

        let join = Join {
            op: JoinOperator::Natural,
            relation: TableRef {
                name: Ident::new("y"),
                alias: Some(Ident::new("b")),
            },
        };
        assert_eq!(join.to_string(), "NATURAL JOIN y AS b");
    }

    #[test]
    fn limit_display() {
        let limit = Limit {
            count: 10,
            offset: Some(5),
        };
        assert_eq!(limit.to_string(), "LIMIT 10 OFFSET 5");
        let unbounded = Limit {
            count: -1,
            offset: None,
        };
        assert_eq!(unbounded.to_string(), "LIMIT -1");
    }
}
