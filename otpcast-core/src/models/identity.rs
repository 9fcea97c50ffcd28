use serde::{Deserialize, Serialize};

/// Mapping from a secondary messaging identity (LID) to the canonical
/// phone number it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAlias {
    pub lid: String,
    pub phone: String,
}
