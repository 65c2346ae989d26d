use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

use crate::{constants::REGISTRANT_CACHE_CAPACITY, models::WorkerRecord};

#[derive(Debug, Default)]
struct CacheInner {
    mobiles: HashMap<String, String>,
    national_ids: HashMap<String, String>,
    // (mobile, national id) in insertion order, oldest first
    order: VecDeque<(String, String)>,
}

/// Process local memo of committed mobiles and national ids.
/// Only a fast pre-flight check, the worker store stays authoritative.
/// Holds at most `capacity` workers, the oldest entry is evicted first.
#[derive(Debug)]
pub struct RegistrantCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

impl Default for RegistrantCache {
    fn default() -> Self {
        Self::with_capacity(REGISTRANT_CACHE_CAPACITY)
    }
}

impl RegistrantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub async fn remember(&self, worker: &WorkerRecord) {
        let mut inner = self.inner.write().await;
        if inner.mobiles.get(&worker.mobile) == Some(&worker.worker_id) {
            return;
        }
        inner
            .mobiles
            .insert(worker.mobile.clone(), worker.worker_id.clone());
        inner
            .national_ids
            .insert(worker.national_id.clone(), worker.worker_id.clone());
        inner
            .order
            .push_back((worker.mobile.clone(), worker.national_id.clone()));
        while inner.order.len() > self.capacity {
            let Some((mobile, national_id)) = inner.order.pop_front() else {
                break;
            };
            inner.mobiles.remove(&mobile);
            inner.national_ids.remove(&national_id);
        }
    }

    /// Worker id registered with the mobile, if known locally
    pub async fn by_mobile(&self, mobile: &str) -> Option<String> {
        self.inner.read().await.mobiles.get(mobile).cloned()
    }

    /// Worker id registered with the national id, if known locally
    pub async fn by_national_id(&self, national_id: &str) -> Option<String> {
        self.inner.read().await.national_ids.get(national_id).cloned()
    }

    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.order.len()
    }
}
