//! Data access for articles and tags.
//!
//! Functions take a borrowed `Connection` so callers decide the transaction
//! boundary; a `rusqlite::Transaction` derefs to `Connection` and can be
//! passed directly.

pub mod articles;
pub mod tags;

/// Upper bound on ids bound into a single `IN (...)` list.
pub(crate) const MAX_BOUND_IDS: usize = 500;

/// Numbered placeholders `?{first}, ?{first+1}, ...` for `count` parameters.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::placeholders;

    #[test]
    fn placeholders_are_numbered_from_first() {
        assert_eq!(placeholders(1, 3), "?1, ?2, ?3");
        assert_eq!(placeholders(4, 1), "?4");
        assert_eq!(placeholders(1, 0), "");
    }
}
