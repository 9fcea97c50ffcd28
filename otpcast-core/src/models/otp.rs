use serde::{Deserialize, Serialize};

/// One SMS record pulled from a feed row.
///
/// Feed rows are positional arrays: time, country, phone, service, text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRecord {
    pub time: String,
    pub country: String,
    pub phone: String,
    pub service: String,
    pub text: String,
}

impl SmsRecord {
    /// Deduplication key. Globally unique once inserted into the
    /// sent-history store.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!("{}_{}", self.phone, self.time)
    }
}
