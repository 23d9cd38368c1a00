use memdb_ast::{
    Expr, From, GroupBy, Having, Ident, Join, JoinOperator, JoinSpec, Limit, OrderBy, Query,
    SelectItem, SelectStmt, SetQuantifier, SortSpec, TableRef, TableReference, Where,
};
use memdb_lexer::{Keyword, Token, Word};

use crate::{error::ParserError, parser::Parser};

impl Parser {
    /// Parses a `SELECT` statement.
    pub fn parse_select_stmt(&mut self) -> Result<SelectStmt, ParserError> {
        Ok(SelectStmt(Box::new(self.parse_query()?)))
    }

    /// Parses a `SELECT` query.
    ///
    /// ```txt
    /// SELECT [ ALL | DISTINCT ] <select list>
    ///     [ FROM <join tree> ] [ WHERE <cond> ]
    ///     [ GROUP BY <columns> [ HAVING <cond> ] ]
    ///     [ ORDER BY <sort spec> [, ...] ] [ LIMIT ... ]
    /// ```
    pub fn parse_query(&mut self) -> Result<Query, ParserError> {
        self.expect_keyword(Keyword::SELECT)?;
        let quantifier = match self.parse_one_of_keywords(&[Keyword::ALL, Keyword::DISTINCT]) {
            Some(Keyword::ALL) => Some(SetQuantifier::All),
            Some(Keyword::DISTINCT) => Some(SetQuantifier::Distinct),
            _ => None,
        };
        let projection = self.parse_comma_separated(Self::parse_select_item)?;

        let from = if self.parse_keyword(Keyword::FROM) {
            Some(From {
                list: self.parse_comma_separated(Self::parse_table_reference)?,
            })
        } else {
            None
        };
        let selection = self.parse_where_clause()?;
        let (group_by, having) = self.parse_group_by_clause()?;
        let order_by = self.parse_order_by_clause()?;
        let limit = self.parse_limit_clause()?;

        Ok(Query {
            quantifier,
            projection,
            from,
            selection,
            group_by,
            having,
            order_by,
            limit,
        })
    }

    /// Parses one item of the select list.
    fn parse_select_item(&mut self) -> Result<SelectItem, ParserError> {
        let expr = self.parse_expr()?;
        Ok(match expr {
            Expr::Wildcard => SelectItem::Wildcard,
            Expr::QualifiedWildcard(prefix) => SelectItem::QualifiedWildcard(prefix),
            expr => SelectItem::DerivedColumn {
                expr: Box::new(expr),
                alias: self.parse_optional_alias()?,
            },
        })
    }

    /// Parses `[ AS ] <alias>`; a bare word is an alias only when it is not a
    /// reserved keyword.
    fn parse_optional_alias(&mut self) -> Result<Option<Ident>, ParserError> {
        if self.parse_keyword(Keyword::AS) {
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(self
                .next_token_if(|token| matches!(token, Token::Word(Word { keyword: None, .. })))
                .map(|token| match token {
                    Token::Word(w) => Ident {
                        value: w.value,
                        quote: w.quote,
                    },
                    _ => unreachable!(),
                }))
        }
    }

    // ========================================================================
    // from clause
    // ========================================================================

    /// Parses a table reference: a table plus its chain of joins.
    fn parse_table_reference(&mut self) -> Result<TableReference, ParserError> {
        let relation = self.parse_table_ref()?;
        let mut joins = vec![];
        while let Some(join) = self.parse_joined_table()? {
            joins.push(join);
        }
        Ok(TableReference { relation, joins })
    }

    /// Parses a table name with an optional alias.
    fn parse_table_ref(&mut self) -> Result<TableRef, ParserError> {
        let name = self.parse_identifier()?;
        let alias = self.parse_optional_alias()?;
        Ok(TableRef { name, alias })
    }

    /// Parses one join of the join tree.
    ///
    /// ```txt
    /// <join> ::= [ NATURAL | INNER | LEFT [ OUTER ] | CROSS ] JOIN <table>
    ///     [ ON <search condition> | USING ( <column> [, ...] ) ]
    /// ```
    fn parse_joined_table(&mut self) -> Result<Option<Join>, ParserError> {
        if self.parse_keyword(Keyword::CROSS) {
            self.expect_keyword(Keyword::JOIN)?;
            let relation = self.parse_table_ref()?;
            return Ok(Some(Join {
                op: JoinOperator::Cross,
                relation,
            }));
        }
        if self.parse_keyword(Keyword::NATURAL) {
            // NATURAL [ INNER ] JOIN
            self.parse_keyword(Keyword::INNER);
            self.expect_keyword(Keyword::JOIN)?;
            let relation = self.parse_table_ref()?;
            return Ok(Some(Join {
                op: JoinOperator::Natural,
                relation,
            }));
        }
        match self.parse_one_of_keywords(&[Keyword::JOIN, Keyword::INNER, Keyword::LEFT]) {
            Some(keyword @ (Keyword::JOIN | Keyword::INNER)) => {
                if keyword == Keyword::INNER {
                    self.expect_keyword(Keyword::JOIN)?;
                }
                let relation = self.parse_table_ref()?;
                let spec = self.parse_join_spec()?;
                Ok(Some(Join {
                    op: JoinOperator::Inner(spec),
                    relation,
                }))
            }
            Some(Keyword::LEFT) => {
                self.parse_keyword(Keyword::OUTER);
                self.expect_keyword(Keyword::JOIN)?;
                let relation = self.parse_table_ref()?;
                let spec = self.parse_join_spec()?;
                Ok(Some(Join {
                    op: JoinOperator::LeftOuter(spec),
                    relation,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Parses an optional join specification.
    fn parse_join_spec(&mut self) -> Result<Option<JoinSpec>, ParserError> {
        if self.parse_keyword(Keyword::ON) {
            Ok(Some(JoinSpec::On(Box::new(self.parse_expr()?))))
        } else if self.parse_keyword(Keyword::USING) {
            self.expect_token(&Token::LeftParen)?;
            let columns = self.parse_comma_separated(Self::parse_identifier)?;
            self.expect_token(&Token::RightParen)?;
            Ok(Some(JoinSpec::Using(columns)))
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // where / group by / having clauses
    // ========================================================================

    /// Parses a `WHERE` clause.
    pub(crate) fn parse_where_clause(&mut self) -> Result<Option<Where>, ParserError> {
        if self.parse_keyword(Keyword::WHERE) {
            Ok(Some(Where {
                expr: Box::new(self.parse_expr()?),
            }))
        } else {
            Ok(None)
        }
    }

    /// Parses `GROUP BY <columns> [ HAVING <cond> ]`.
    fn parse_group_by_clause(
        &mut self,
    ) -> Result<(Option<GroupBy>, Option<Having>), ParserError> {
        if !self.parse_keywords(&[Keyword::GROUP, Keyword::BY]) {
            return Ok((None, None));
        }
        let columns = self.parse_comma_separated(Self::parse_object_name)?;
        let having = if self.parse_keyword(Keyword::HAVING) {
            Some(Having {
                expr: Box::new(self.parse_expr()?),
            })
        } else {
            None
        };
        Ok((Some(GroupBy { columns }), having))
    }

    // ========================================================================
    // order by / limit clauses
    // ========================================================================

    /// Parses an `ORDER BY` clause.
    fn parse_order_by_clause(&mut self) -> Result<Option<OrderBy>, ParserError> {
        if !self.parse_keywords(&[Keyword::ORDER, Keyword::BY]) {
            return Ok(None);
        }
        let list = self.parse_comma_separated(Self::parse_sort_spec)?;
        Ok(Some(OrderBy { list }))
    }

    /// Parses `<column> [ ASC | DESC ] [ COLLATE <name> ]`.
    fn parse_sort_spec(&mut self) -> Result<SortSpec, ParserError> {
        let column = self.parse_object_name()?;
        let asc = match self.parse_one_of_keywords(&[Keyword::ASC, Keyword::DESC]) {
            Some(Keyword::ASC) => Some(true),
            Some(Keyword::DESC) => Some(false),
            _ => None,
        };
        let collate = if self.parse_keyword(Keyword::COLLATE) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        Ok(SortSpec {
            column,
            asc,
            collate,
        })
    }

    /// Parses `LIMIT <count> [ OFFSET <skip> ]` or `LIMIT <skip>, <count>`.
    ///
    /// Counts must be integers; negative values disable the bound.
    fn parse_limit_clause(&mut self) -> Result<Option<Limit>, ParserError> {
        if !self.parse_keyword(Keyword::LIMIT) {
            return Ok(None);
        }
        let first = self.parse_signed_int()?;
        if self.parse_keyword(Keyword::OFFSET) {
            let offset = self.parse_signed_int()?;
            Ok(Some(Limit {
                count: first,
                offset: Some(offset),
            }))
        } else if self.next_token_if_is(&Token::Comma) {
            // LIMIT <skip>, <count>
            let count = self.parse_signed_int()?;
            Ok(Some(Limit {
                count,
                offset: Some(first),
            }))
        } else {
            Ok(Some(Limit {
                count: first,
                offset: None,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_ast::ObjectName;

    fn query(sql: &str) -> Query {
        Parser::new_with_sql(sql).unwrap().parse_query().unwrap()
    }

    #[test]
    fn parse_bare_select() {
        let q = query("SELECT 1 + 1 AS two");
        assert!(q.from.is_none());
        assert_eq!(q.to_string(), "SELECT 1 + 1 AS two");
    }

    #[test]
    fn parse_select_wildcards() {
        let q = query("SELECT *, x.* FROM x");
        assert_eq!(
            q.projection,
            vec![
                SelectItem::Wildcard,
                SelectItem::QualifiedWildcard(ObjectName::new(vec!["x"])),
            ]
        );
    }

    #[test]
    fn parse_join_tree() {
        let q = query("SELECT x.v, y.w FROM x LEFT OUTER JOIN y ON x.k = y.k");
        let from = q.from.clone().expect("has from");
        assert_eq!(from.list.len(), 1);
        let reference = &from.list[0];
        assert_eq!(reference.relation.name, Ident::new("x"));
        assert_eq!(reference.joins.len(), 1);
        assert!(matches!(
            reference.joins[0].op,
            JoinOperator::LeftOuter(Some(JoinSpec::On(_)))
        ));
        assert_eq!(
            q.to_string(),
            "SELECT x.v, y.w FROM x LEFT OUTER JOIN y ON x.k = y.k"
        );
    }

    #[test]
    fn parse_natural_and_cross_joins() {
        let q = query("SELECT * FROM a NATURAL JOIN b CROSS JOIN c");
        let from = q.from.expect("has from");
        assert_eq!(from.list[0].joins.len(), 2);
        assert!(matches!(from.list[0].joins[0].op, JoinOperator::Natural));
        assert!(matches!(from.list[0].joins[1].op, JoinOperator::Cross));
    }

    #[test]
    fn parse_using_join() {
        let q = query("SELECT * FROM a JOIN b USING (k)");
        let from = q.from.expect("has from");
        assert!(matches!(
            &from.list[0].joins[0].op,
            JoinOperator::Inner(Some(JoinSpec::Using(columns))) if columns == &vec![Ident::new("k")]
        ));
    }

    #[test]
    fn parse_table_alias() {
        let q = query("SELECT a.v FROM x a");
        assert_eq!(
            q.from.expect("has from").list[0].relation,
            TableRef {
                name: Ident::new("x"),
                alias: Some(Ident::new("a")),
            }
        );
    }

    #[test]
    fn parse_group_order_limit() {
        let q = query(
            "SELECT g, COUNT(*) AS n FROM a WHERE g > 0 GROUP BY g HAVING n > 1 \
             ORDER BY g DESC LIMIT 10 OFFSET 2",
        );
        assert!(q.selection.is_some());
        assert_eq!(
            q.group_by,
            Some(GroupBy {
                columns: vec![ObjectName::new(vec!["g"])]
            })
        );
        assert!(q.having.is_some());
        assert_eq!(
            q.order_by,
            Some(OrderBy {
                list: vec![SortSpec {
                    column: ObjectName::new(vec!["g"]),
                    asc: Some(false),
                    collate: None,
                }]
            })
        );
        assert_eq!(
            q.limit,
            Some(Limit {
                count: 10,
                offset: Some(2)
            })
        );
    }

    #[test]
    fn parse_limit_comma_form() {
        let q = query("SELECT * FROM t LIMIT 2, 10");
        assert_eq!(
            q.limit,
            Some(Limit {
                count: 10,
                offset: Some(2)
            })
        );
    }

    #[test]
    fn limit_requires_integer() {
        let err = Parser::new_with_sql("SELECT * FROM t LIMIT 'x'")
            .unwrap()
            .parse_query()
            .unwrap_err();
        assert!(matches!(err, ParserError::ExpectedIntValue(_)));
    }
}
