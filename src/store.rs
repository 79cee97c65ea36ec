//! Application state and its reducer.
//!
//! [`reduce`] is pure: it takes the current state and an [`Action`] and
//! returns the next state. Any action touching `flights` or `filters`
//! recomputes `filtered_flights` from scratch.

use tracing::debug;

use crate::filter::{self, FilterOp, FilterState};
use crate::model::{Airport, Flight, PricePoint};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub origin: Option<Airport>,
    pub destination: Option<Airport>,
    pub departure_date: String,
    pub return_date: String,
    pub passengers: u32,
    pub flights: Vec<Flight>,
    pub filtered_flights: Vec<Flight>,
    pub loading: bool,
    /// User-visible message: validation errors, failures, or "no results".
    pub message: Option<String>,
    pub filters: FilterState,
    pub price_graph: Vec<PricePoint>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            departure_date: String::new(),
            return_date: String::new(),
            passengers: 1,
            flights: Vec::new(),
            filtered_flights: Vec::new(),
            loading: false,
            message: None,
            filters: FilterState::default(),
            price_graph: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetOrigin(Option<Airport>),
    SetDestination(Option<Airport>),
    SetDepartureDate(String),
    SetReturnDate(String),
    SetPassengers(u32),
    SearchStarted,
    SearchSucceeded(Vec<Flight>),
    SearchFailed(String),
    SetMessage(Option<String>),
    Filter(FilterOp),
    SetPriceGraph(Vec<PricePoint>),
}

pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetOrigin(airport) => state.origin = airport,
        Action::SetDestination(airport) => state.destination = airport,
        Action::SetDepartureDate(date) => state.departure_date = date,
        Action::SetReturnDate(date) => state.return_date = date,
        Action::SetPassengers(count) => state.passengers = count,
        Action::SearchStarted => {
            state.loading = true;
            state.message = None;
        }
        Action::SearchSucceeded(flights) => {
            state.loading = false;
            state.flights = flights;
            refilter(&mut state);
        }
        Action::SearchFailed(message) => {
            state.loading = false;
            state.message = Some(message);
        }
        Action::SetMessage(message) => state.message = message,
        Action::Filter(op) => {
            state.filters.apply_op(op);
            refilter(&mut state);
        }
        Action::SetPriceGraph(points) => state.price_graph = points,
    }
    state
}

fn refilter(state: &mut AppState) {
    state.filtered_flights = filter::apply(&state.flights, &state.filters);
    debug!(
        total = state.flights.len(),
        shown = state.filtered_flights.len(),
        "filters applied"
    );
}

impl AppState {
    pub fn dispatch(&mut self, action: Action) {
        *self = reduce(std::mem::take(self), action);
    }
}
