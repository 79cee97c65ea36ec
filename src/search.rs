use tracing::{info, warn};

use crate::error::{FlightError, MISSING_FIELDS_MESSAGE};
use crate::fetch::FlightApi;
use crate::query::{FlightSearchParams, Locale, Passengers, PriceGraphParams, TravelClass};
use crate::store::{Action, AppState};

pub const NO_FLIGHTS_MESSAGE: &str = "No flights found for this route";

/// Builds the request for the current selection. Fails without touching the
/// network when origin, destination or departure date is missing.
pub fn build_request(
    state: &AppState,
    travel_class: TravelClass,
    locale: &Locale,
) -> Result<FlightSearchParams, FlightError> {
    let (Some(origin), Some(destination)) = (&state.origin, &state.destination) else {
        return Err(FlightError::Validation(MISSING_FIELDS_MESSAGE.into()));
    };
    if state.departure_date.trim().is_empty() {
        return Err(FlightError::Validation(MISSING_FIELDS_MESSAGE.into()));
    }

    let return_date = Some(state.return_date.trim())
        .filter(|d| !d.is_empty())
        .map(String::from);

    let params = FlightSearchParams {
        departure_id: origin.id.clone(),
        arrival_id: destination.id.clone(),
        outbound_date: state.departure_date.trim().to_string(),
        return_date,
        passengers: Passengers::adults(state.passengers),
        travel_class,
        locale: locale.clone(),
    };
    params.validate()?;
    Ok(params)
}

#[derive(Debug)]
pub struct SearchCoordinator<A> {
    api: A,
    travel_class: TravelClass,
    locale: Locale,
}

impl<A: FlightApi> SearchCoordinator<A> {
    pub fn new(api: A, travel_class: TravelClass, locale: Locale) -> Self {
        Self {
            api,
            travel_class,
            locale,
        }
    }

    /// Runs one search for the current selection and stores the flights.
    ///
    /// Returns the number of flights found. Every failure is also recorded
    /// as the state's user-visible message.
    pub async fn submit(&self, state: &mut AppState) -> Result<usize, FlightError> {
        let params = match build_request(state, self.travel_class, &self.locale) {
            Ok(p) => p,
            Err(e) => {
                state.dispatch(Action::SetMessage(Some(e.user_message())));
                return Err(e);
            }
        };

        state.dispatch(Action::SearchStarted);
        info!(
            from = %params.departure_id,
            to = %params.arrival_id,
            date = %params.outbound_date,
            "searching flights"
        );

        match self.api.search_flights(&params).await {
            Ok(flights) => {
                let count = flights.len();
                state.dispatch(Action::SearchSucceeded(flights));
                if count == 0 {
                    state.dispatch(Action::SetMessage(Some(NO_FLIGHTS_MESSAGE.into())));
                }
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "flight search failed");
                state.dispatch(Action::SearchFailed(e.user_message()));
                Err(e)
            }
        }
    }

    /// Fetches price-graph points for the selected route. Earlier points are
    /// dropped when the request fails.
    pub async fn load_price_graph(&self, state: &mut AppState) -> Result<usize, FlightError> {
        let params = PriceGraphParams::from_search(&build_request(
            state,
            self.travel_class,
            &self.locale,
        )?);

        match self.api.price_graph(&params).await {
            Ok(points) => {
                let count = points.len();
                state.dispatch(Action::SetPriceGraph(points));
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "price graph request failed");
                state.dispatch(Action::SetPriceGraph(Vec::new()));
                Err(e)
            }
        }
    }
}
