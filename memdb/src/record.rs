use indexmap::IndexMap;

use crate::value::Value;

/// A single row: an insertion-ordered mapping from column name to value.
/// Column names are case-sensitive.
pub type Record = IndexMap<String, Value>;

/// An ordered sequence of records. Order is meaningful after `ORDER BY`;
/// otherwise it equals insertion order.
pub type RecordSet = Vec<Record>;

/// Looks up a column in a row.
///
/// The fully qualified spelling wins; then the bare name; then, for a bare
/// name, a qualified key whose base matches — but only when exactly one
/// qualified key does, otherwise the reference is ambiguous and stays
/// unresolved.
pub(crate) fn lookup_column<'a>(row: &'a Record, name: &str) -> Option<&'a Value> {
    if let Some(value) = row.get(name) {
        return Some(value);
    }
    if let Some((_, base)) = name.rsplit_once('.') {
        return row.get(base);
    }
    let suffix = format!(".{}", name);
    let mut matches = row.iter().filter(|(key, _)| key.ends_with(&suffix));
    match (matches.next(), matches.next()) {
        (Some((_, value)), None) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_lookup_falls_back_to_bare() {
        let row = Record::from([
            ("x.k".to_string(), Value::Integer(1)),
            ("v".to_string(), Value::Integer(2)),
        ]);
        assert_eq!(lookup_column(&row, "x.k"), Some(&Value::Integer(1)));
        assert_eq!(lookup_column(&row, "x.v"), Some(&Value::Integer(2)));
        assert_eq!(lookup_column(&row, "k"), Some(&Value::Integer(1)));
        assert_eq!(lookup_column(&row, "missing"), None);
    }

    #[test]
    fn ambiguous_bare_lookup_stays_unresolved() {
        let row = Record::from([
            ("x.k".to_string(), Value::Integer(1)),
            ("y.k".to_string(), Value::Integer(2)),
        ]);
        assert_eq!(lookup_column(&row, "k"), None);
    }
}
