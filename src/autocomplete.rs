//! Debounced, cached airport lookups.
//!
//! Each call to [`Autocompleter::lookup`] takes a sequence number, waits out
//! the debounce period and only proceeds if no newer call arrived in the
//! meantime. A response that lands after a newer call started is cached but
//! reported as [`Lookup::Superseded`].
//!
//! `lookup` feeds a dropdown, so only rate limiting reaches the caller there.
//! [`Autocompleter::fetch`] and [`Autocompleter::resolve`] serve one-shot
//! callers and return every provider error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::FlightError;
use crate::fetch::FlightApi;
use crate::model::Airport;
use crate::query::Locale;

pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Fetched from the provider.
    Results(Vec<Airport>),
    /// Served from the cache without a network call.
    Cached(Vec<Airport>),
    /// A newer lookup started before this one finished.
    Superseded,
}

impl Lookup {
    pub fn airports(self) -> Option<Vec<Airport>> {
        match self {
            Self::Results(a) | Self::Cached(a) => Some(a),
            Self::Superseded => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct AirportCache {
    entries: HashMap<String, Vec<Airport>>,
}

impl AirportCache {
    pub fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    pub fn get(&self, query: &str) -> Option<Vec<Airport>> {
        self.entries.get(&Self::key(query)).cloned()
    }

    pub fn insert(&mut self, query: &str, airports: Vec<Airport>) {
        self.entries.insert(Self::key(query), airports);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type SharedCache = Arc<Mutex<AirportCache>>;

#[derive(Debug)]
pub struct Autocompleter<A> {
    api: A,
    locale: Locale,
    debounce: Duration,
    cache: SharedCache,
    latest: AtomicU64,
}

impl<A: FlightApi> Autocompleter<A> {
    pub fn new(api: A, locale: Locale, debounce: Duration) -> Self {
        Self::with_cache(api, locale, debounce, SharedCache::default())
    }

    /// Origin and destination fields keep separate timers but share results.
    pub fn with_cache(api: A, locale: Locale, debounce: Duration, cache: SharedCache) -> Self {
        Self {
            api,
            locale,
            debounce,
            cache,
            latest: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> SharedCache {
        Arc::clone(&self.cache)
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != seq
    }

    /// Debounced lookup for a keystroke. Only rate limiting is returned as an
    /// error; other failures are logged and yield an empty list.
    pub async fn lookup(&self, query: &str) -> Result<Lookup, FlightError> {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if self.is_stale(seq) {
            debug!(seq, query, "lookup superseded before fetch");
            return Ok(Lookup::Superseded);
        }

        let outcome = match self.fetch(query).await {
            Err(FlightError::RateLimited) => {
                warn!(query, "airport lookup rate limited");
                Err(FlightError::RateLimited)
            }
            Err(e) => {
                warn!(query, error = %e, "airport lookup failed");
                Ok(Lookup::Results(Vec::new()))
            }
            ok => ok,
        };
        if self.is_stale(seq) {
            debug!(seq, query, "lookup superseded after fetch");
            return Ok(Lookup::Superseded);
        }
        outcome
    }

    /// Cache-or-network lookup without the debounce timer. Provider errors
    /// are returned as-is and never cached.
    pub async fn fetch(&self, query: &str) -> Result<Lookup, FlightError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Lookup::Results(Vec::new()));
        }

        let cached = self.cache.lock().await.get(query);
        if let Some(airports) = cached {
            debug!(query, hits = airports.len(), "airport cache hit");
            return Ok(Lookup::Cached(airports));
        }

        let airports = self.api.search_airport(query, &self.locale).await?;
        self.cache.lock().await.insert(query, airports.clone());
        Ok(Lookup::Results(airports))
    }

    /// Picks the airport a free-text query most plausibly names: an exact
    /// id match, otherwise the first result.
    pub async fn resolve(&self, query: &str) -> Result<Airport, FlightError> {
        let airports = self.fetch(query).await?.airports().unwrap_or_default();
        select_airport(query, airports)
            .ok_or_else(|| FlightError::Validation(format!("no airport matches \"{query}\"")))
    }
}

pub fn select_airport(query: &str, airports: Vec<Airport>) -> Option<Airport> {
    let wanted = query.trim();
    let exact = airports
        .iter()
        .position(|a| a.id.eq_ignore_ascii_case(wanted));
    match exact {
        Some(i) => airports.into_iter().nth(i),
        None => airports.into_iter().next(),
    }
}
