mod functions;

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use memdb_ast::{
    BinaryOperator, CaseExpr, Expr, Function, TextMatchExpr, TextMatchOp, UnaryOperator,
};

use crate::{
    error::{Error, Result},
    record::{lookup_column, Record},
    value::Value,
};

/// Which half of the aggregate protocol an evaluation is running.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AggregatePass {
    /// Aggregate calls feed their accumulators; return values are ignored.
    Accumulate,
    /// Aggregate calls report their accumulated result.
    Report,
}

/// The state threaded through expression evaluation.
///
/// Owns the aggregate pass flag and the accumulator table, so concurrent
/// SELECT evaluations are independent of each other: nothing here is global.
/// Accumulators are keyed by the aggregate node's address inside the
/// statement tree, which is its identity — both passes walk the same tree.
pub struct EvalContext {
    pass: AggregatePass,
    accumulators: HashMap<usize, Accumulator>,
    pub(crate) last_insert_rowid: i64,
}

impl EvalContext {
    /// Creates a fresh context in report mode.
    pub fn new(last_insert_rowid: i64) -> Self {
        Self {
            pass: AggregatePass::Report,
            accumulators: HashMap::new(),
            last_insert_rowid,
        }
    }

    /// Switches between the accumulate and report passes.
    pub fn set_pass(&mut self, pass: AggregatePass) {
        self.pass = pass;
    }

    /// Drops all accumulated aggregate state.
    pub fn reset_accumulators(&mut self) {
        self.accumulators.clear();
    }

    /// Evaluates an expression against a row.
    pub fn eval(&mut self, expr: &Expr, row: &Record) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Value::from_literal(literal),

            Expr::Identifier(ident) => self.lookup(row, &ident.value),
            Expr::CompoundIdentifier(idents) => {
                let name = idents
                    .iter()
                    .map(|ident| ident.value.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                self.lookup(row, &name)
            }

            Expr::Wildcard | Expr::QualifiedWildcard(_) => Err(Error::Syntax(
                "* is only valid in a select list or COUNT(*)".into(),
            )),

            Expr::Nested(inner) => self.eval(inner, row),

            Expr::UnaryOp(op) => {
                let value = self.eval(&op.expr, row)?;
                match op.op {
                    UnaryOperator::Plus => Ok(value),
                    UnaryOperator::Minus => match value {
                        Value::Integer(v) => Ok(Value::Integer(-v)),
                        Value::Real(v) => Ok(Value::Real(-v)),
                        other => Err(Error::Syntax(format!(
                            "cannot negate {}",
                            other.type_name()
                        ))),
                    },
                    UnaryOperator::Not => match value {
                        Value::Bool(v) => Ok(Value::Bool(!v)),
                        other => Err(Error::Syntax(format!(
                            "NOT requires a boolean, got {}",
                            other.type_name()
                        ))),
                    },
                }
            }

            Expr::BinaryOp(op) => self.eval_binary(op.op, &op.left, &op.right, row),

            Expr::IsNull(test) => {
                let value = self.eval(&test.expr, row)?;
                Ok(Value::Bool(value.is_null() != test.negated))
            }

            Expr::TextMatch(test) => self.eval_text_match(test, row),

            Expr::Between(between) => {
                let value = self.eval(&between.expr, row)?;
                let low = self.eval(&between.low, row)?;
                let high = self.eval(&between.high, row)?;
                let inside = !value.is_null()
                    && value.compare(&low).map(|o| o.is_ge()).unwrap_or(false)
                    && value.compare(&high).map(|o| o.is_le()).unwrap_or(false);
                Ok(Value::Bool(inside != between.negated))
            }

            Expr::InList(list) => {
                let value = self.eval(&list.expr, row)?;
                let mut found = false;
                for item in &list.list {
                    let item = self.eval(item, row)?;
                    if !value.is_null() && value == item {
                        found = true;
                        break;
                    }
                }
                Ok(Value::Bool(found != list.negated))
            }

            Expr::Case(case) => self.eval_case(case, row),

            Expr::Cast(cast) => {
                let value = self.eval(&cast.expr, row)?;
                value.cast(cast.data_type)
            }

            // the collation has no effect in memory
            Expr::Collate(collate) => self.eval(&collate.expr, row),

            Expr::Function(func) => {
                if func.kind.is_aggregate() {
                    self.eval_aggregate(func, row)
                } else {
                    let mut args = Vec::with_capacity(func.args.len());
                    for arg in &func.args {
                        args.push(self.eval(arg, row)?);
                    }
                    functions::call_scalar(self, func.kind, &args)
                }
            }
        }
    }

    fn lookup(&self, row: &Record, name: &str) -> Result<Value> {
        lookup_column(row, name)
            .cloned()
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    fn eval_binary(
        &mut self,
        op: BinaryOperator,
        left: &Expr,
        right: &Expr,
        row: &Record,
    ) -> Result<Value> {
        // logical operators short-circuit
        match op {
            BinaryOperator::And => {
                return if self.eval_bool(left, row)? {
                    Ok(Value::Bool(self.eval_bool(right, row)?))
                } else {
                    Ok(Value::Bool(false))
                };
            }
            BinaryOperator::Or => {
                return if self.eval_bool(left, row)? {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(self.eval_bool(right, row)?))
                };
            }
            _ => (),
        }

        let lhs = self.eval(left, row)?;
        let rhs = self.eval(right, row)?;
        match op {
            BinaryOperator::Plus => lhs.add(&rhs),
            BinaryOperator::Minus => lhs.sub(&rhs),
            BinaryOperator::Multiply => lhs.mul(&rhs),
            BinaryOperator::Divide => lhs.div(&rhs),
            BinaryOperator::Modulo => lhs.rem(&rhs),
            BinaryOperator::StringConcat => Ok(Value::Text(format!(
                "{}{}",
                lhs.canonical_text(),
                rhs.canonical_text()
            ))),

            // comparisons against NULL are false
            BinaryOperator::Equal => Ok(Value::Bool(
                !lhs.is_null() && !rhs.is_null() && lhs == rhs,
            )),
            BinaryOperator::NotEqual => Ok(Value::Bool(
                !lhs.is_null() && !rhs.is_null() && lhs != rhs,
            )),
            BinaryOperator::Greater
            | BinaryOperator::GreaterOrEqual
            | BinaryOperator::Less
            | BinaryOperator::LessOrEqual => {
                if lhs.is_null() || rhs.is_null() {
                    return Ok(Value::Bool(false));
                }
                let ordering = lhs.compare(&rhs).ok_or_else(|| {
                    Error::Syntax(format!(
                        "cannot order {} against {}",
                        lhs.type_name(),
                        rhs.type_name()
                    ))
                })?;
                Ok(Value::Bool(match op {
                    BinaryOperator::Greater => ordering.is_gt(),
                    BinaryOperator::GreaterOrEqual => ordering.is_ge(),
                    BinaryOperator::Less => ordering.is_lt(),
                    BinaryOperator::LessOrEqual => ordering.is_le(),
                    _ => unreachable!(),
                }))
            }

            BinaryOperator::And | BinaryOperator::Or => unreachable!(),
        }
    }

    /// Evaluates an expression that must produce a boolean.
    pub fn eval_bool(&mut self, expr: &Expr, row: &Record) -> Result<bool> {
        match self.eval(expr, row)? {
            Value::Bool(v) => Ok(v),
            other => Err(Error::Syntax(format!(
                "expected a boolean condition, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_text_match(&mut self, test: &TextMatchExpr, row: &Record) -> Result<Value> {
        let value = self.eval(&test.expr, row)?;
        let pattern = self.eval(&test.pattern, row)?;
        if value.is_null() || pattern.is_null() {
            return Ok(Value::Bool(test.negated));
        }
        let (value, pattern) = match (&value, &pattern) {
            (Value::Text(v), Value::Text(p)) => (v, p),
            _ => {
                return Err(Error::Syntax(format!(
                    "{} requires text operands, got {} and {}",
                    test.op,
                    value.type_name(),
                    pattern.type_name()
                )))
            }
        };
        let matched = match test.op {
            TextMatchOp::Like => like_regex(pattern, false)?.is_match(value),
            TextMatchOp::Glob => like_regex(pattern, true)?.is_match(value),
            TextMatchOp::Regexp => regex::Regex::new(pattern)
                .map_err(|e| Error::Syntax(format!("bad REGEXP pattern: {}", e)))?
                .is_match(value),
            TextMatchOp::Match => value.to_lowercase().contains(&pattern.to_lowercase()),
        };
        Ok(Value::Bool(matched != test.negated))
    }

    fn eval_case(&mut self, case: &CaseExpr, row: &Record) -> Result<Value> {
        match &case.operand {
            Some(operand) => {
                // evaluate the operand once, return the first equal branch
                let operand = self.eval(operand, row)?;
                for (condition, result) in case.conditions.iter().zip(&case.results) {
                    let condition = self.eval(condition, row)?;
                    if !operand.is_null() && operand == condition {
                        return self.eval(result, row);
                    }
                }
            }
            None => {
                for (condition, result) in case.conditions.iter().zip(&case.results) {
                    if self.eval_bool(condition, row)? {
                        return self.eval(result, row);
                    }
                }
            }
        }
        self.eval(&case.else_result, row)
    }

    fn eval_aggregate(&mut self, func: &Function, row: &Record) -> Result<Value> {
        use memdb_ast::FunctionKind::*;

        // the node's address inside the statement tree is its identity;
        // accumulate and report walk the same tree
        let key = func as *const Function as usize;
        match self.pass {
            AggregatePass::Accumulate => {
                let observed = match func.args.first() {
                    // COUNT(*) and bare COUNT() observe the row itself
                    None | Some(Expr::Wildcard) => Some(Value::Integer(1)),
                    Some(arg) => {
                        let value = self.eval(arg, row)?;
                        if value.is_null() {
                            None
                        } else {
                            Some(value)
                        }
                    }
                };
                if let Some(value) = observed {
                    self.accumulators
                        .entry(key)
                        .or_default()
                        .observe(value, func.distinct)?;
                }
                Ok(Value::Null)
            }
            AggregatePass::Report => {
                let acc = self.accumulators.get(&key);
                Ok(match func.kind {
                    Count => Value::Integer(acc.map(|a| a.count).unwrap_or(0)),
                    Sum => acc.and_then(|a| a.sum.clone()).unwrap_or(Value::Null),
                    Min => acc.and_then(|a| a.min.clone()).unwrap_or(Value::Null),
                    Max => acc.and_then(|a| a.max.clone()).unwrap_or(Value::Null),
                    Avg => match acc {
                        Some(acc) if acc.count > 0 => {
                            let sum = match &acc.sum {
                                Some(Value::Integer(v)) => *v as f64,
                                Some(Value::Real(v)) => *v,
                                _ => {
                                    return Err(Error::Syntax(
                                        "AVG requires numeric input".into(),
                                    ))
                                }
                            };
                            Value::Real(sum / acc.count as f64)
                        }
                        _ => Value::Null,
                    },
                    _ => unreachable!("not an aggregate"),
                })
            }
        }
    }
}

/// Per-aggregate accumulated state.
#[derive(Default)]
struct Accumulator {
    seen: Vec<Value>,
    count: i64,
    sum: Option<Value>,
    min: Option<Value>,
    max: Option<Value>,
}

impl Accumulator {
    fn observe(&mut self, value: Value, distinct: bool) -> Result<()> {
        if distinct {
            if self.seen.contains(&value) {
                return Ok(());
            }
            self.seen.push(value.clone());
        }
        self.count += 1;
        self.sum = Some(match self.sum.take() {
            None => value.clone(),
            Some(prev) => prev.add(&value)?,
        });
        let better = |best: &Option<Value>, want_less: bool| match best {
            None => true,
            Some(best) => value
                .compare(best)
                .map(|o| if want_less { o.is_lt() } else { o.is_gt() })
                .unwrap_or(false),
        };
        if better(&self.min, true) {
            self.min = Some(value.clone());
        }
        if better(&self.max, false) {
            self.max = Some(value);
        }
        Ok(())
    }
}

/// Whether the expression contains an aggregate function call.
pub fn contains_aggregate(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_)
        | Expr::Identifier(_)
        | Expr::CompoundIdentifier(_)
        | Expr::Wildcard
        | Expr::QualifiedWildcard(_) => false,
        Expr::Nested(inner) => contains_aggregate(inner),
        Expr::UnaryOp(op) => contains_aggregate(&op.expr),
        Expr::BinaryOp(op) => contains_aggregate(&op.left) || contains_aggregate(&op.right),
        Expr::IsNull(test) => contains_aggregate(&test.expr),
        Expr::TextMatch(test) => {
            contains_aggregate(&test.expr) || contains_aggregate(&test.pattern)
        }
        Expr::Between(between) => {
            contains_aggregate(&between.expr)
                || contains_aggregate(&between.low)
                || contains_aggregate(&between.high)
        }
        Expr::InList(list) => {
            contains_aggregate(&list.expr) || list.list.iter().any(contains_aggregate)
        }
        Expr::Case(case) => {
            case.operand.as_deref().map(contains_aggregate).unwrap_or(false)
                || case.conditions.iter().any(contains_aggregate)
                || case.results.iter().any(contains_aggregate)
                || contains_aggregate(&case.else_result)
        }
        Expr::Cast(cast) => contains_aggregate(&cast.expr),
        Expr::Collate(collate) => contains_aggregate(&collate.expr),
        Expr::Function(func) => {
            func.kind.is_aggregate() || func.args.iter().any(contains_aggregate)
        }
    }
}

/// Translates a LIKE or GLOB pattern into an anchored regex.
fn like_regex(pattern: &str, glob: bool) -> Result<regex::Regex> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    if !glob {
        // LIKE is case-insensitive, GLOB is not
        translated.push_str("(?is)");
    } else {
        translated.push_str("(?s)");
    }
    translated.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' if !glob => translated.push_str(".*"),
            '_' if !glob => translated.push('.'),
            '*' if glob => translated.push_str(".*"),
            '?' if glob => translated.push('.'),
            ch => {
                if regex_syntax_char(ch) {
                    translated.push('\\');
                }
                translated.push(ch);
            }
        }
    }
    translated.push('$');
    regex::Regex::new(&translated)
        .map_err(|e| Error::Syntax(format!("bad match pattern '{}': {}", pattern, e)))
}

fn regex_syntax_char(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
    )
}

/// Parses the date/time spellings the engine accepts.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_parser::Parser;

    fn eval(sql: &str, row: &Record) -> Result<Value> {
        let expr = Parser::new_with_sql(sql).unwrap().parse_expr().unwrap();
        EvalContext::new(0).eval(&expr, row)
    }

    fn eval_empty(sql: &str) -> Result<Value> {
        eval(sql, &Record::new())
    }

    #[test]
    fn literals_and_arithmetic() {
        assert_eq!(eval_empty("1 + 2 * 3").unwrap(), Value::Integer(7));
        assert_eq!(eval_empty("-(1 + 2)").unwrap(), Value::Integer(-3));
        assert_eq!(
            eval_empty("1 / 0").unwrap(),
            Value::Text("Error: division by zero.".into())
        );
        assert_eq!(
            eval_empty("'a' + 'b'").unwrap(),
            Value::Text("ab".into())
        );
    }

    #[test]
    fn column_references() {
        let row = Record::from([
            ("x.k".to_string(), Value::Integer(7)),
            ("name".to_string(), Value::Text("bolt".into())),
        ]);
        assert_eq!(eval("x.k", &row).unwrap(), Value::Integer(7));
        assert_eq!(eval("k", &row).unwrap(), Value::Integer(7));
        assert_eq!(eval("name", &row).unwrap(), Value::Text("bolt".into()));
        assert_eq!(
            eval("missing", &row),
            Err(Error::UnknownColumn("missing".into()))
        );
    }

    #[test]
    fn logic_and_comparison() {
        assert_eq!(eval_empty("1 < 2 AND 2 < 3").unwrap(), Value::Bool(true));
        assert_eq!(eval_empty("1 > 2 OR 3 = 3").unwrap(), Value::Bool(true));
        assert_eq!(eval_empty("NOT 1 = 1").unwrap(), Value::Bool(false));
        // comparisons against NULL are false
        assert_eq!(eval_empty("NULL = NULL").unwrap(), Value::Bool(false));
        assert_eq!(eval_empty("1 <> NULL").unwrap(), Value::Bool(false));
        assert_eq!(eval_empty("NULL IS NULL").unwrap(), Value::Bool(true));
        assert_eq!(eval_empty("1 ISNULL").unwrap(), Value::Bool(false));
        assert_eq!(eval_empty("1 NOTNULL").unwrap(), Value::Bool(true));
    }

    #[test]
    fn between_and_in() {
        assert_eq!(eval_empty("2 BETWEEN 1 AND 3").unwrap(), Value::Bool(true));
        assert_eq!(
            eval_empty("2 NOT BETWEEN 1 AND 3").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(eval_empty("2 IN (1, 2, 3)").unwrap(), Value::Bool(true));
        assert_eq!(eval_empty("9 IN (1, 2, 3)").unwrap(), Value::Bool(false));
        assert_eq!(eval_empty("9 NOT IN (1, 2, 3)").unwrap(), Value::Bool(true));
    }

    #[test]
    fn text_predicates() {
        assert_eq!(eval_empty("'bolt' LIKE 'b%'").unwrap(), Value::Bool(true));
        assert_eq!(eval_empty("'bolt' LIKE 'B_LT'").unwrap(), Value::Bool(true));
        assert_eq!(eval_empty("'bolt' GLOB 'b*'").unwrap(), Value::Bool(true));
        // GLOB is case-sensitive
        assert_eq!(eval_empty("'bolt' GLOB 'B*'").unwrap(), Value::Bool(false));
        assert_eq!(
            eval_empty("'bolt' REGEXP '^b.*t$'").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(eval_empty("'bolt' MATCH 'OL'").unwrap(), Value::Bool(true));
        assert_eq!(
            eval_empty("'bolt' NOT LIKE 'n%'").unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn case_expressions() {
        assert_eq!(
            eval_empty("CASE 2 WHEN 1 THEN 'one' WHEN 2 THEN 'two' ELSE 'other' END").unwrap(),
            Value::Text("two".into())
        );
        assert_eq!(
            eval_empty("CASE WHEN 1 > 2 THEN 'a' ELSE 'b' END").unwrap(),
            Value::Text("b".into())
        );
    }

    #[test]
    fn casts() {
        assert_eq!(
            eval_empty("CAST('42' AS INTEGER) + 1").unwrap(),
            Value::Integer(43)
        );
        assert_eq!(
            eval_empty("CAST(1 AS BOOLEAN)").unwrap(),
            Value::Bool(true)
        );
        assert!(eval_empty("CAST('nope' AS INTEGER)").is_err());
    }

    #[test]
    fn aggregate_two_pass_protocol() {
        let expr = Parser::new_with_sql("SUM(v)").unwrap().parse_expr().unwrap();
        let mut ctx = EvalContext::new(0);
        ctx.set_pass(AggregatePass::Accumulate);
        for v in [1, 2, 3] {
            let row = Record::from([("v".to_string(), Value::Integer(v))]);
            ctx.eval(&expr, &row).unwrap();
        }
        ctx.set_pass(AggregatePass::Report);
        assert_eq!(
            ctx.eval(&expr, &Record::new()).unwrap(),
            Value::Integer(6)
        );

        // an unaccumulated SUM reports NULL, an unaccumulated COUNT zero
        let mut fresh = EvalContext::new(0);
        assert_eq!(fresh.eval(&expr, &Record::new()).unwrap(), Value::Null);
        let count = Parser::new_with_sql("COUNT(*)")
            .unwrap()
            .parse_expr()
            .unwrap();
        assert_eq!(
            fresh.eval(&count, &Record::new()).unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn aggregate_distinct_and_min_max() {
        let sum = Parser::new_with_sql("SUM(DISTINCT v)")
            .unwrap()
            .parse_expr()
            .unwrap();
        let min = Parser::new_with_sql("MIN(v)").unwrap().parse_expr().unwrap();
        let max = Parser::new_with_sql("MAX(v)").unwrap().parse_expr().unwrap();
        let mut ctx = EvalContext::new(0);
        ctx.set_pass(AggregatePass::Accumulate);
        for v in [2, 2, 5, 1] {
            let row = Record::from([("v".to_string(), Value::Integer(v))]);
            ctx.eval(&sum, &row).unwrap();
            ctx.eval(&min, &row).unwrap();
            ctx.eval(&max, &row).unwrap();
        }
        ctx.set_pass(AggregatePass::Report);
        assert_eq!(ctx.eval(&sum, &Record::new()).unwrap(), Value::Integer(8));
        assert_eq!(ctx.eval(&min, &Record::new()).unwrap(), Value::Integer(1));
        assert_eq!(ctx.eval(&max, &Record::new()).unwrap(), Value::Integer(5));
    }

    #[test]
    fn contains_aggregate_walks_the_tree() {
        let expr = Parser::new_with_sql("1 + COUNT(*)")
            .unwrap()
            .parse_expr()
            .unwrap();
        assert!(contains_aggregate(&expr));
        let expr = Parser::new_with_sql("UPPER(name)")
            .unwrap()
            .parse_expr()
            .unwrap();
        assert!(!contains_aggregate(&expr));
    }
}
