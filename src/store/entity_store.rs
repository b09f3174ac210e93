use crate::entity::Entity;
use crate::store::clock::{Clock, SystemClock};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cached entity plus the instant it stops being visible
#[derive(Clone, Debug)]
struct CachedEntity {
    entity: Entity,
    /// None when `set time + ttl` is beyond what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CachedEntity {
    fn is_live(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// EntityStore keeps the latest snapshot per entity id for a fixed TTL.
///
/// Writes replace the whole cached value under the shard lock, so readers
/// never see a partially written entity. Expired entries are hidden from
/// every read and physically removed by `get` (lazily) or `purge_expired`.
pub struct EntityStore {
    /// Sharded concurrent map; one writer, many readers
    entries: DashMap<String, CachedEntity>,

    /// Uniform time-to-live applied on every `set`
    ttl: Duration,

    clock: Arc<dyn Clock>,
}

impl EntityStore {
    /// Create a store using the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a store with an injected clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or replace the entry for `id`, restarting its expiry clock
    pub fn set(&self, id: impl Into<String>, entity: Entity) {
        let expires_at = self.clock.now().checked_add(self.ttl);
        self.entries
            .insert(id.into(), CachedEntity { entity, expires_at });
    }

    /// Get a live entity by id. An expired entry is evicted on the way out.
    pub fn get(&self, id: &str) -> Option<Entity> {
        let now = self.clock.now();

        if let Some(cached) = self.entries.get(id) {
            if cached.is_live(now) {
                return Some(cached.entity.clone());
            }
        }

        // Guard dropped above; re-check so a concurrent `set` is not lost
        self.entries.remove_if(id, |_, cached| !cached.is_live(now));
        None
    }

    /// All live entities, ordered by id.
    ///
    /// The returned values are owned copies; callers hold no lock while
    /// iterating them.
    pub fn snapshot(&self) -> Vec<Entity> {
        let now = self.clock.now();

        let mut live: Vec<(String, Entity)> = self
            .entries
            .iter()
            .filter(|e| e.value().is_live(now))
            .map(|e| (e.key().clone(), e.value().entity.clone()))
            .collect();

        live.sort_by(|a, b| a.0.cmp(&b.0));
        live.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Remove every expired entry and return how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, cached| {
            let live = cached.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });

        if removed > 0 {
            debug!(removed = removed, remaining = self.entries.len(), "Purged expired entities");
        }

        removed
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|e| e.value().is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
