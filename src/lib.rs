pub mod autocomplete;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod mcp;
pub mod model;
pub mod query;
pub mod search;
pub mod store;
pub mod table;
pub mod trend;

use serde::Serialize;

use autocomplete::Autocompleter;
use error::{FlightError, MISSING_FIELDS_MESSAGE};
use fetch::FlightApi;
use filter::{FilterOp, FilterState};
use model::{Airport, Flight};
use query::Passengers;
use search::SearchCoordinator;
use store::{Action, AppState};

/// A complete search as typed by a person: free-text places plus filters.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub from: String,
    pub to: String,
    pub date: String,
    pub return_date: Option<String>,
    pub adults: u32,
    pub filters: FilterState,
    pub top: Option<usize>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            date: String::new(),
            return_date: None,
            adults: 1,
            filters: FilterState::default(),
            top: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub origin: Airport,
    pub destination: Airport,
    pub total: usize,
    pub flights: Vec<Flight>,
    /// Airlines present in the unfiltered results, for narrowing further.
    pub airlines: Vec<String>,
    pub price_range: Option<(f64, f64)>,
    pub message: Option<String>,
}

/// Resolves both places, runs the search and applies the filters.
///
/// Missing fields and bad passenger counts are rejected before any lookup
/// goes out.
pub async fn run_search<A: FlightApi>(
    places: &Autocompleter<A>,
    coordinator: &SearchCoordinator<A>,
    request: SearchRequest,
) -> Result<SearchReport, FlightError> {
    if [&request.from, &request.to, &request.date]
        .iter()
        .any(|f| f.trim().is_empty())
    {
        return Err(FlightError::Validation(MISSING_FIELDS_MESSAGE.into()));
    }
    Passengers::adults(request.adults).validate()?;

    let origin = places.resolve(&request.from).await?;
    let destination = places.resolve(&request.to).await?;

    let mut state = AppState::default();
    state.dispatch(Action::SetOrigin(Some(origin.clone())));
    state.dispatch(Action::SetDestination(Some(destination.clone())));
    state.dispatch(Action::SetDepartureDate(request.date));
    state.dispatch(Action::SetReturnDate(request.return_date.unwrap_or_default()));
    state.dispatch(Action::SetPassengers(request.adults));
    state.dispatch(Action::Filter(FilterOp::Replace(request.filters)));

    let total = coordinator.submit(&mut state).await?;

    let airlines = filter::available_airlines(&state.flights);
    let price_range = filter::price_bounds(&state.flights);

    let mut flights = state.filtered_flights;
    if let Some(n) = request.top {
        filter::cheapest(&mut flights, n);
    }

    Ok(SearchReport {
        origin,
        destination,
        total,
        flights,
        airlines,
        price_range,
        message: state.message,
    })
}
