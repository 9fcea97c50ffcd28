use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user broadcast settings.
///
/// Created on the first command from a user, mutated by the
/// add/remove/set operations, never deleted. The channel list holds no
/// duplicate entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Opaque user identifier (bare phone number).
    pub jid: String,
    /// Ordered destination-channel ids the user broadcasts to.
    pub channels: Vec<String>,
    /// Footer link rendered into every notification for this user.
    pub custom_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    /// Settings for a user with no stored row yet.
    #[must_use]
    pub fn empty(jid: &str, default_link: &str) -> Self {
        let now = Utc::now();
        Self {
            jid: jid.to_string(),
            channels: Vec::new(),
            custom_link: default_link.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings() {
        let s = UserSettings::empty("923001234567", "https://example.com/join");
        assert_eq!(s.jid, "923001234567");
        assert!(!s.has_channels());
        assert_eq!(s.custom_link, "https://example.com/join");
    }
}
