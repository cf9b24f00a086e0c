use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::FeedQuery;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 50;

/// Offset pagination resolved from the raw `page`/`limit` query strings.
///
/// Negative values are kept as given. A negative `limit` asks the store for a
/// single batch of `|limit|` documents; a negative skip is rejected by
/// [`Pagination::skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn from_query(query: &FeedQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(parse_int)
            .unwrap_or(DEFAULT_PAGE);

        let limit = query
            .limit
            .as_deref()
            .and_then(parse_int)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        Self { page, limit }
    }

    pub fn skip(&self) -> Result<u64> {
        let skip = self.page.saturating_sub(1).saturating_mul(self.limit);
        u64::try_from(skip)
            .map_err(|_| anyhow!("skip value must be non-negative, but received: {}", skip))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn leading_int_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").ok()).as_ref()
}

/// Reads the leading integer of `raw` ("12abc" -> 12, " 3" -> 3, "2.5" -> 2).
///
/// Input that does not start with a number, or that yields zero, is treated
/// as absent so the caller's default applies.
pub fn parse_int(raw: &str) -> Option<i64> {
    let caps = leading_int_regex()?.captures(raw)?;
    let digits = &caps[1];
    let value = match digits.parse::<i64>() {
        Ok(v) => v,
        // More digits than fit: saturate
        Err(_) if digits.starts_with('-') => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value).filter(|v| *v != 0)
}
