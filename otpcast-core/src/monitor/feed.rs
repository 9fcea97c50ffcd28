//! Feed decoding: JSON `aaData` tables into SMS records.

use serde_json::Value;

use crate::models::SmsRecord;

/// Render a JSON value the way the feeds mix types: bare strings stay
/// bare, everything else keeps its JSON form.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a feed response body into SMS records.
///
/// The body is expected to carry an `aaData` array of positional rows
/// (time, country, phone, service, text). Anything that does not match
/// that shape is skipped: a missing or non-array `aaData`, rows that are
/// not arrays, rows with fewer than five fields, and rows with an empty
/// or `"0"` phone.
#[must_use]
pub fn parse_feed(body: &Value) -> Vec<SmsRecord> {
    let Some(rows) = body.get("aaData").and_then(Value::as_array) else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let fields = row.as_array()?;
            if fields.len() < 5 {
                return None;
            }

            let phone = stringify(&fields[2]);
            if phone.is_empty() || phone == "0" {
                return None;
            }

            Some(SmsRecord {
                time: stringify(&fields[0]),
                country: stringify(&fields[1]),
                phone,
                service: stringify(&fields[3]),
                text: stringify(&fields[4]),
            })
        })
        .collect()
}
