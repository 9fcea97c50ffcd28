//! Text utilities for SMS records: OTP extraction, phone masking and
//! country-name normalization.

use regex::Regex;
use std::sync::LazyLock;

/// Matches split codes like "123-456" / "1234 5678" as well as plain
/// 4-8 digit codes.
static OTP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3,4}[-\s]?\d{3,4}\b|\b\d{4,8}\b").expect("valid OTP pattern")
});

/// Extract the first OTP-looking code from a message body.
#[must_use]
pub fn extract_otp(msg: &str) -> String {
    OTP_RE
        .find(msg)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Mask a phone number, keeping the first three and last four digits.
///
/// Numbers shorter than six characters are returned unchanged.
#[must_use]
pub fn mask_phone(phone: &str) -> String {
    if phone.chars().count() < 6 {
        return phone.to_string();
    }
    let chars: Vec<char> = phone.chars().collect();
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}\u{2022}\u{2022}\u{2022}{tail}")
}

/// Reduce a raw feed country field to a single word.
///
/// Feeds report values like "Ivory Coast - MTN"; only the first word
/// before any dash is kept.
#[must_use]
pub fn clean_country(name: &str) -> String {
    if name.is_empty() {
        return "Unknown".to_string();
    }
    let before_dash = name.split('-').next().unwrap_or("");
    before_dash
        .split_whitespace()
        .next()
        .map_or_else(|| "Unknown".to_string(), ToString::to_string)
}

/// Strip device (`:N`) and server (`@host`) suffixes from a messaging id,
/// leaving the bare phone number.
#[must_use]
pub fn clean_id(id: &str) -> String {
    let id = id.split(':').next().unwrap_or(id);
    let id = id.split('@').next().unwrap_or(id);
    id.to_string()
}

/// Normalize a user-supplied phone number for pairing: strip "+", spaces
/// and dashes, then any messaging-id suffixes.
#[must_use]
pub fn normalize_number(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '+' | ' ' | '-'))
        .collect();
    clean_id(&stripped)
}

/// Emoji flag for a cleaned country name, with a globe fallback.
#[must_use]
pub fn country_flag(country: &str) -> &'static str {
    match country.to_lowercase().as_str() {
        "afghanistan" => "\u{1F1E6}\u{1F1EB}",
        "argentina" => "\u{1F1E6}\u{1F1F7}",
        "bangladesh" => "\u{1F1E7}\u{1F1E9}",
        "brazil" => "\u{1F1E7}\u{1F1F7}",
        "canada" => "\u{1F1E8}\u{1F1E6}",
        "china" => "\u{1F1E8}\u{1F1F3}",
        "colombia" => "\u{1F1E8}\u{1F1F4}",
        "egypt" => "\u{1F1EA}\u{1F1EC}",
        "france" => "\u{1F1EB}\u{1F1F7}",
        "germany" => "\u{1F1E9}\u{1F1EA}",
        "ghana" => "\u{1F1EC}\u{1F1ED}",
        "india" => "\u{1F1EE}\u{1F1F3}",
        "indonesia" => "\u{1F1EE}\u{1F1E9}",
        "ivory" => "\u{1F1E8}\u{1F1EE}",
        "kenya" => "\u{1F1F0}\u{1F1EA}",
        "malaysia" => "\u{1F1F2}\u{1F1FE}",
        "mexico" => "\u{1F1F2}\u{1F1FD}",
        "morocco" => "\u{1F1F2}\u{1F1E6}",
        "myanmar" => "\u{1F1F2}\u{1F1F2}",
        "nigeria" => "\u{1F1F3}\u{1F1EC}",
        "pakistan" => "\u{1F1F5}\u{1F1F0}",
        "philippines" => "\u{1F1F5}\u{1F1ED}",
        "russia" => "\u{1F1F7}\u{1F1FA}",
        "senegal" => "\u{1F1F8}\u{1F1F3}",
        "tanzania" => "\u{1F1F9}\u{1F1FF}",
        "thailand" => "\u{1F1F9}\u{1F1ED}",
        "uganda" => "\u{1F1FA}\u{1F1EC}",
        "ukraine" => "\u{1F1FA}\u{1F1E6}",
        "usa" | "united" => "\u{1F1FA}\u{1F1F8}",
        "uzbekistan" => "\u{1F1FA}\u{1F1FF}",
        "vietnam" => "\u{1F1FB}\u{1F1F3}",
        _ => "\u{1F30D}",
    }
}

/// Flatten a message body to a single line.
#[must_use]
pub fn flatten(msg: &str) -> String {
    msg.replace('\n', " ").replace('\r', "")
}
