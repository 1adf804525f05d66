use crate::{Error, Result};

/// Article volume and lookback window selected by a quota token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPlan {
    pub article_count: u32,
    pub lookback_days: u32,
}

const QUOTA_TABLE: [(&str, QuotaPlan); 3] = [
    ("1", QuotaPlan { article_count: 6, lookback_days: 1 }),
    ("3", QuotaPlan { article_count: 10, lookback_days: 7 }),
    ("7", QuotaPlan { article_count: 20, lookback_days: 30 }),
];

/// Exact lookup against the fixed quota table.
pub fn resolve(quota: &str) -> Result<QuotaPlan> {
    QUOTA_TABLE
        .iter()
        .find(|(token, _)| *token == quota)
        .map(|(_, plan)| *plan)
        .ok_or_else(|| Error::InvalidQuota(quota.to_string()))
}
