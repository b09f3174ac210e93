//! Background refresh loop.
//!
//! On every tick the refresher fetches the full upstream entity set, runs it
//! through the include/exclude rules and writes the survivors into the
//! [`EntityStore`]. A failed cycle leaves the store untouched; cached
//! entries keep aging toward expiry until the next successful cycle.

use crate::filter::{FilterError, FilterRules};
use crate::store::EntityStore;
use crate::upstream::{EntitySource, FetchError};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};


/// Why a refresh cycle was skipped
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("unable to fetch entity status: {0}")]
    Fetch(#[from] FetchError),

    #[error("unable to filter entities: {0}")]
    Filter(#[from] FilterError),
}

/// Refresh loop phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPhase {
    /// Waiting for the next tick
    Idle,
    /// Upstream request in flight
    Fetching,
}

/// Status information for the refresh loop
#[derive(Clone, Debug)]
pub struct RefreshStatus {
    pub phase: RefreshPhase,
    /// Last successful refresh timestamp
    pub last_refresh: Option<DateTime<Utc>>,
    /// Last error message (cleared on success)
    pub last_error: Option<String>,
    /// Total number of successful cycles
    pub refresh_count: u64,
    /// Total number of failed cycles
    pub error_count: u64,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            phase: RefreshPhase::Idle,
            last_refresh: None,
            last_error: None,
            refresh_count: 0,
            error_count: 0,
        }
    }
}

/// Periodically repopulates the entity store from upstream.
///
/// The refresher is the only writer to the store.
pub struct Refresher {
    source: Arc<dyn EntitySource>,
    store: Arc<EntityStore>,
    rules: FilterRules,
    interval: Duration,
    status: Arc<RwLock<RefreshStatus>>,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn EntitySource>,
        store: Arc<EntityStore>,
        rules: FilterRules,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            rules,
            interval,
            status: Arc::new(RwLock::new(RefreshStatus::default())),
        }
    }

    /// Copy of the current status
    pub fn status(&self) -> RefreshStatus {
        self.status
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Shared status handle for monitoring after `start` consumes the refresher
    pub fn status_handle(&self) -> Arc<RwLock<RefreshStatus>> {
        Arc::clone(&self.status)
    }

    /// Run one fetch → filter → store cycle.
    ///
    /// Returns the number of entities written. Nothing is written on error.
    pub async fn refresh_once(&self) -> Result<usize, RefreshError> {
        self.set_phase(RefreshPhase::Fetching);
        let result = self.fetch_and_store().await;
        self.record(&result);
        result
    }

    async fn fetch_and_store(&self) -> Result<usize, RefreshError> {
        let purged = self.store.purge_expired();
        if purged > 0 {
            debug!(purged = purged, "Dropped expired entities");
        }

        // No store lock is held across the fetch
        let entities = self.source.fetch_entities().await?;
        let fetched = entities.len();

        let filter = self.rules.compile()?;
        let eligible = filter.apply(entities);
        let stored = eligible.len();

        for entity in eligible {
            self.store.set(entity.id.clone(), entity);
        }

        debug!(fetched = fetched, stored = stored, "Refreshed entity status");
        Ok(stored)
    }

    fn set_phase(&self, phase: RefreshPhase) {
        let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
        status.phase = phase;
    }

    fn record(&self, result: &Result<usize, RefreshError>) {
        let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
        status.phase = RefreshPhase::Idle;
        match result {
            Ok(_) => {
                status.last_refresh = Some(Utc::now());
                status.last_error = None;
                status.refresh_count += 1;
            }
            Err(e) => {
                status.last_error = Some(e.to_string());
                status.error_count += 1;
            }
        }
    }

    /// Starts the refresh loop (non-blocking).
    ///
    /// The first cycle runs immediately. A cycle that overruns the interval
    /// delays the next tick instead of bursting. The loop ends when
    /// `shutdown` changes or its sender is dropped, abandoning any fetch in
    /// flight.
    pub fn start(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs_f64(),
                ttl_secs = self.store.ttl().as_secs_f64(),
                "Starting entity refresher"
            );

            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }

                tokio::select! {
                    result = self.refresh_once() => {
                        if let Err(e) = result {
                            let status = self.status();
                            warn!(
                                error = %e,
                                error_count = status.error_count,
                                last_refresh = ?status.last_refresh,
                                cached = self.store.len(),
                                "Refresh cycle failed, keeping cached entities"
                            );
                        }
                    }
                    _ = shutdown.changed() => {
                        self.set_phase(RefreshPhase::Idle);
                        break;
                    }
                }
            }

            info!("Entity refresher stopped");
        })
    }
}
