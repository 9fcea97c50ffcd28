//! Notification rendering for broadcast messages.

use crate::models::SmsRecord;
use crate::text::{clean_country, country_flag, extract_otp, flatten, mask_phone};

/// Per-record notification fields, computed once per record and rendered
/// once per user (only the footer link varies between users).
#[derive(Debug, Clone)]
pub struct Notification {
    pub flag: &'static str,
    pub service: String,
    pub feed_index: usize,
    pub time: String,
    pub country: String,
    pub masked_phone: String,
    pub otp: String,
    pub flat_text: String,
}

impl Notification {
    #[must_use]
    pub fn from_record(record: &SmsRecord, feed_index: usize) -> Self {
        let country = clean_country(&record.country);
        Self {
            flag: country_flag(&country),
            service: record.service.clone(),
            feed_index,
            time: record.time.clone(),
            country,
            masked_phone: mask_phone(&record.phone),
            otp: extract_otp(&record.text),
            flat_text: flatten(&record.text),
        }
    }

    /// Render the outbound message body with a user's footer link.
    #[must_use]
    pub fn render(&self, link: &str) -> String {
        format!(
            "\u{2728} *{flag} | {service} Message {idx}* \u{26A1}\n\n\
             > *Time:* {time}\n\
             > *Country:* {flag} {country}\n\
             \u{20}  *Number:* *{phone}*\n\
             > *Service:* {raw_service}\n\
             \u{20}  *OTP:* *{otp}*\n\n\
             > *Join For Numbers:* \n\
             > {link}\n\n\
             *Full Message:*\n\
             {text}",
            flag = self.flag,
            service = self.service.to_uppercase(),
            idx = self.feed_index,
            time = self.time,
            country = self.country,
            phone = self.masked_phone,
            raw_service = self.service,
            otp = self.otp,
            link = link,
            text = self.flat_text,
        )
        .trim()
        .to_string()
    }
}
