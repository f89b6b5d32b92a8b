//! Builder for `sysparm_query` encoded query strings.
//!
//! The table API filters with a compact expression language: conditions are
//! joined with `^` (AND) or `^OR` (OR), e.g.
//! `priority=5^state=1^assignment_group!=abc^ORassignment_group=NULL`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joiner {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    joiner: Joiner,
    expr: String,
}

/// An encoded query, built one condition at a time.
///
/// # Example
///
/// ```
/// use snowcap::models::EncodedQuery;
///
/// let query = EncodedQuery::new()
///     .eq("priority", "1")
///     .eq("active", "true");
/// assert_eq!(query.to_string(), "priority=1^active=true");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedQuery {
    clauses: Vec<Clause>,
}

impl EncodedQuery {
    /// Creates an empty query (matches every record).
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, joiner: Joiner, expr: String) -> Self {
        self.clauses.push(Clause { joiner, expr });
        self
    }

    /// ANDs `field=value`.
    pub fn eq(self, field: &str, value: impl fmt::Display) -> Self {
        self.push(Joiner::And, format!("{}={}", field, value))
    }

    /// ANDs `field!=value`.
    pub fn ne(self, field: &str, value: impl fmt::Display) -> Self {
        self.push(Joiner::And, format!("{}!={}", field, value))
    }

    /// ORs `field=value` with the preceding condition.
    pub fn or_eq(self, field: &str, value: impl fmt::Display) -> Self {
        self.push(Joiner::Or, format!("{}={}", field, value))
    }

    /// ORs `field!=value` with the preceding condition.
    pub fn or_ne(self, field: &str, value: impl fmt::Display) -> Self {
        self.push(Joiner::Or, format!("{}!={}", field, value))
    }

    /// ANDs a check that `field` has no value.
    pub fn empty(self, field: &str) -> Self {
        self.push(Joiner::And, format!("{}ISEMPTY", field))
    }

    /// ANDs a check that `field` has a value.
    pub fn not_empty(self, field: &str) -> Self {
        self.push(Joiner::And, format!("{}ISNOTEMPTY", field))
    }

    /// ANDs a pre-encoded expression verbatim.
    pub fn raw(self, expr: impl Into<String>) -> Self {
        self.push(Joiner::And, expr.into())
    }

    /// Sorts ascending by `field`.
    pub fn order_by(self, field: &str) -> Self {
        self.push(Joiner::And, format!("ORDERBY{}", field))
    }

    /// Sorts descending by `field`.
    pub fn order_by_desc(self, field: &str) -> Self {
        self.push(Joiner::And, format!("ORDERBYDESC{}", field))
    }

    /// Returns true if no conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for EncodedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            // The first clause never carries a joiner.
            if i > 0 {
                match clause.joiner {
                    Joiner::And => f.write_str("^")?,
                    Joiner::Or => f.write_str("^OR")?,
                }
            }
            f.write_str(&clause.expr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        let query = EncodedQuery::new();
        assert!(query.is_empty());
        assert_eq!(query.to_string(), "");
    }

    #[test]
    fn test_and_or_chain() {
        let query = EncodedQuery::new()
            .eq("priority", 5)
            .eq("state", 1)
            .ne("assignment_group", "5ee74940b70022108d4406dd1e11a91")
            .or_eq("assignment_group", "NULL");
        assert_eq!(
            query.to_string(),
            "priority=5^state=1^assignment_group!=5ee74940b70022108d4406dd1e11a91^ORassignment_group=NULL"
        );
    }

    #[test]
    fn test_leading_or_has_no_prefix() {
        let query = EncodedQuery::new().or_eq("state", 1).or_ne("state", 7);
        assert_eq!(query.to_string(), "state=1^ORstate!=7");
    }

    #[test]
    fn test_empty_checks_and_ordering() {
        let query = EncodedQuery::new()
            .empty("assignment_group")
            .not_empty("caller_id")
            .order_by_desc("sys_created_on");
        assert_eq!(
            query.to_string(),
            "assignment_groupISEMPTY^caller_idISNOTEMPTY^ORDERBYDESCsys_created_on"
        );
    }

    #[test]
    fn test_raw_and_order_by() {
        let query = EncodedQuery::new().raw("active=true").order_by("number");
        assert_eq!(query.to_string(), "active=true^ORDERBYnumber");
    }
}
