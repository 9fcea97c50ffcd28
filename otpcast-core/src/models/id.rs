use serde::{Deserialize, Serialize};

/// Session id: the bare phone number that owns a messaging session,
/// with device and server suffixes already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Build from any raw messaging id, stripping `:device` and `@server`
    /// parts.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        Self(crate::text::clean_id(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self::from_raw(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_strips_suffixes() {
        let id = SessionId::from_raw("923001234567:3@s.whatsapp.net");
        assert_eq!(id.as_str(), "923001234567");
    }
}
