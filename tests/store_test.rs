mod common;

use std::collections::BTreeSet;

use common::{airport, flight};
use faresight::filter::{self, FilterOp, FilterPatch};
use faresight::model::PricePoint;
use faresight::store::{reduce, Action, AppState};

fn loaded() -> AppState {
    reduce(
        AppState::default(),
        Action::SearchSucceeded(vec![
            flight(100.0, 0, Some("Delta")),
            flight(200.0, 1, Some("United")),
            flight(300.0, 2, Some("Delta")),
            flight(150.0, 0, None),
        ]),
    )
}

fn assert_consistent(state: &AppState) {
    assert_eq!(
        state.filtered_flights,
        filter::apply(&state.flights, &state.filters)
    );
}

#[test]
fn default_state() {
    let state = AppState::default();
    assert_eq!(state.passengers, 1);
    assert!(state.origin.is_none());
    assert!(state.flights.is_empty());
    assert!(!state.loading);
    assert!(state.filters.is_empty());
}

#[test]
fn new_flights_show_unfiltered_when_no_filters() {
    let state = loaded();
    assert_eq!(state.flights.len(), 4);
    assert_eq!(state.filtered_flights, state.flights);
}

#[test]
fn filter_change_recomputes_view() {
    let state = reduce(loaded(), Action::Filter(FilterOp::ToggleStops(0)));
    assert_eq!(state.filtered_flights.len(), 2);
    assert_consistent(&state);

    let state = reduce(
        state,
        Action::Filter(FilterOp::Merge(FilterPatch {
            min_price: Some(120.0),
            ..Default::default()
        })),
    );
    assert_eq!(state.filtered_flights.len(), 1);
    assert_eq!(state.filtered_flights[0].price, 150.0);
    assert_consistent(&state);
}

#[test]
fn new_flights_respect_existing_filters() {
    let mut state = AppState::default();
    state.dispatch(Action::Filter(FilterOp::ToggleAirline("Delta".into())));
    state.dispatch(Action::SearchSucceeded(vec![
        flight(100.0, 0, Some("Delta")),
        flight(200.0, 0, Some("United")),
    ]));
    assert_eq!(state.filtered_flights.len(), 1);
    assert_consistent(&state);
}

#[test]
fn clearing_filters_restores_full_list() {
    let mut state = loaded();
    state.dispatch(Action::Filter(FilterOp::Merge(FilterPatch {
        stops: Some(BTreeSet::from([2])),
        ..Default::default()
    })));
    assert_eq!(state.filtered_flights.len(), 1);
    state.dispatch(Action::Filter(FilterOp::Clear));
    assert_eq!(state.filtered_flights, state.flights);
}

#[test]
fn unrelated_actions_leave_view_alone() {
    let mut state = reduce(loaded(), Action::Filter(FilterOp::ToggleStops(1)));
    let before = state.filtered_flights.clone();
    state.dispatch(Action::SetOrigin(Some(airport("LAX", "Los Angeles"))));
    state.dispatch(Action::SetDepartureDate("2026-04-01".into()));
    state.dispatch(Action::SetPriceGraph(vec![PricePoint {
        departure: "2026-04-01".into(),
        price: 99.0,
    }]));
    assert_eq!(state.filtered_flights, before);
    assert_eq!(state.price_graph.len(), 1);
}

#[test]
fn search_lifecycle_flags() {
    let mut state = AppState::default();
    state.dispatch(Action::SetMessage(Some("old".into())));
    state.dispatch(Action::SearchStarted);
    assert!(state.loading);
    assert!(state.message.is_none());

    state.dispatch(Action::SearchFailed("Failed to search flights. Please try again.".into()));
    assert!(!state.loading);
    assert_eq!(
        state.message.as_deref(),
        Some("Failed to search flights. Please try again.")
    );
}

#[test]
fn passenger_count_is_stored_as_given() {
    let state = reduce(AppState::default(), Action::SetPassengers(0));
    assert_eq!(state.passengers, 0);
    let state = reduce(state, Action::SetPassengers(12));
    assert_eq!(state.passengers, 12);
}
