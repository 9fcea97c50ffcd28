use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::repository::IdentityLinkRepository;
use crate::text::clean_id;
use crate::Result;

/// In-memory identity cache mapping secondary ids (LIDs) to canonical
/// phone numbers.
///
/// Read-mostly: lookups hit the map directly and fall back to the input
/// unchanged. The only refresh primitive is a wholesale reload from the
/// identity-link store.
#[derive(Clone)]
pub struct IdentityCache {
    map: Arc<RwLock<HashMap<String, String>>>,
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Rebuild the cache from the store, replacing the current map.
    pub async fn reload(&self, repo: &IdentityLinkRepository) -> Result<usize> {
        let aliases = repo.list_all().await?;

        let mut fresh = HashMap::with_capacity(aliases.len());
        for alias in aliases {
            let lid = clean_id(&alias.lid);
            let phone = clean_id(&alias.phone);
            if !lid.is_empty() && !phone.is_empty() {
                fresh.insert(lid, phone);
            }
        }

        let count = fresh.len();
        *self.map.write().await = fresh;
        tracing::info!(count, "Identity cache reloaded");
        Ok(count)
    }

    /// Resolve a messaging id to its canonical phone number.
    ///
    /// Unknown ids come back unchanged (minus suffixes).
    pub async fn resolve(&self, raw_id: &str) -> String {
        let clean = clean_id(raw_id);

        let map = self.map.read().await;
        match map.get(&clean) {
            Some(phone) => {
                tracing::debug!(lid = %clean, phone = %phone, "Identity cache hit");
                phone.clone()
            }
            None => clean,
        }
    }

    /// Insert one alias pair without a full reload.
    pub async fn insert(&self, lid: &str, phone: &str) {
        let lid = clean_id(lid);
        let phone = clean_id(phone);
        if lid.is_empty() || phone.is_empty() {
            return;
        }
        self.map.write().await.insert(lid, phone);
    }

    pub async fn len(&self) -> usize {
        self.map.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.map.read().await.is_empty()
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}
