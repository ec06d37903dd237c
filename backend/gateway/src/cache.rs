//! In-memory response cache keyed by upload content.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use billscope_core::{AnalysisResult, ContentSignature};

#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<HashMap<ContentSignature, (Instant, AnalysisResult)>>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    /// Returns a live entry, dropping it if it has expired.
    pub async fn get(&self, key: &ContentSignature) -> Option<AnalysisResult> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((stored, result)) if stored.elapsed() < self.ttl => {
                debug!(%key, "Cache hit");
                Some(result.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a result, evicting the oldest entry when full.
    pub async fn insert(&self, key: ContentSignature, result: AnalysisResult) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock().await;
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, (stored, _))| *stored)
                .map(|(k, _)| *k);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, (Instant::now(), result));
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
