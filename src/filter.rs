//! Client-side filtering of a flight list.
//!
//! Every constraint in [`FilterState`] is optional; an absent constraint
//! accepts every flight. Active constraints combine with logical AND and the
//! input order is preserved.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::Flight;

/// Inclusive hour-of-day window, `start..=end`. A window whose start is
/// after its end wraps midnight (e.g. 22-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if start > 23 || end > 23 {
            return None;
        }
        Some(Self { start, end })
    }

    /// Parses `START-END`, e.g. `6-12`.
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.split_once('-')?;
        Self::new(start.trim().parse().ok()?, end.trim().parse().ok()?)
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            (self.start..=self.end).contains(&hour)
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub stops: BTreeSet<u32>,
    pub airlines: BTreeSet<String>,
    pub max_duration: Option<u32>,
    pub departure_hours: Option<HourRange>,
    pub arrival_hours: Option<HourRange>,
}

/// Partial update; `Some` fields overwrite, `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub stops: Option<BTreeSet<u32>>,
    pub airlines: Option<BTreeSet<String>>,
    pub max_duration: Option<u32>,
    pub departure_hours: Option<HourRange>,
    pub arrival_hours: Option<HourRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Merge(FilterPatch),
    Replace(FilterState),
    ToggleStops(u32),
    ToggleAirline(String),
    Clear,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, flight: &Flight) -> bool {
        if self.min_price.is_some_and(|min| flight.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| flight.price > max) {
            return false;
        }
        if !self.stops.is_empty() && !self.stops.contains(&flight.stops) {
            return false;
        }
        if self.max_duration.is_some_and(|max| flight.duration.raw > max) {
            return false;
        }
        if !self.airlines.is_empty()
            && !flight
                .airline
                .as_ref()
                .is_some_and(|a| self.airlines.contains(a))
        {
            return false;
        }
        if let Some(window) = self.departure_hours {
            if !flight.departure_hour().is_some_and(|h| window.contains(h)) {
                return false;
            }
        }
        if let Some(window) = self.arrival_hours {
            if !flight.arrival_hour().is_some_and(|h| window.contains(h)) {
                return false;
            }
        }
        true
    }

    pub fn merge(&mut self, patch: FilterPatch) {
        if patch.min_price.is_some() {
            self.min_price = patch.min_price;
        }
        if patch.max_price.is_some() {
            self.max_price = patch.max_price;
        }
        if let Some(stops) = patch.stops {
            self.stops = stops;
        }
        if let Some(airlines) = patch.airlines {
            self.airlines = airlines;
        }
        if patch.max_duration.is_some() {
            self.max_duration = patch.max_duration;
        }
        if patch.departure_hours.is_some() {
            self.departure_hours = patch.departure_hours;
        }
        if patch.arrival_hours.is_some() {
            self.arrival_hours = patch.arrival_hours;
        }
    }

    pub fn apply_op(&mut self, op: FilterOp) {
        match op {
            FilterOp::Merge(patch) => self.merge(patch),
            FilterOp::Replace(state) => *self = state,
            FilterOp::ToggleStops(stops) => {
                if !self.stops.remove(&stops) {
                    self.stops.insert(stops);
                }
            }
            FilterOp::ToggleAirline(airline) => {
                if !self.airlines.remove(&airline) {
                    self.airlines.insert(airline);
                }
            }
            FilterOp::Clear => *self = Self::default(),
        }
    }
}

pub fn apply(flights: &[Flight], filters: &FilterState) -> Vec<Flight> {
    flights
        .iter()
        .filter(|f| filters.matches(f))
        .cloned()
        .collect()
}

/// Distinct airlines in first-appearance order.
pub fn available_airlines(flights: &[Flight]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    flights
        .iter()
        .filter_map(|f| f.airline.as_deref())
        .filter(|a| !a.is_empty() && seen.insert(*a))
        .map(String::from)
        .collect()
}

/// `(lowest, highest)` price, `None` for an empty list.
pub fn price_bounds(flights: &[Flight]) -> Option<(f64, f64)> {
    flights.iter().map(|f| f.price).fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
}

/// Keeps the `n` cheapest flights, cheapest first.
pub fn cheapest(flights: &mut Vec<Flight>, n: usize) {
    flights.sort_by(|a, b| a.price.total_cmp(&b.price));
    flights.truncate(n);
}
