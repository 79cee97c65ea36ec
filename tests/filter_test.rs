mod common;

use std::collections::BTreeSet;

use common::{flight, timed};
use faresight::filter::{
    apply, available_airlines, cheapest, price_bounds, FilterOp, FilterPatch, FilterState,
    HourRange,
};
use faresight::model::Flight;

fn prices(flights: &[Flight]) -> Vec<f64> {
    flights.iter().map(|f| f.price).collect()
}

fn sample() -> Vec<Flight> {
    vec![
        flight(100.0, 0, Some("Delta")),
        flight(250.0, 1, Some("United")),
        flight(180.0, 2, None),
        flight(320.0, 0, Some("Delta")),
        flight(90.0, 1, Some("JetBlue")),
    ]
}

#[test]
fn empty_state_keeps_everything() {
    let flights = sample();
    assert_eq!(apply(&flights, &FilterState::default()), flights);
}

#[test]
fn min_price_is_inclusive_lower_bound() {
    let flights = vec![
        flight(100.0, 0, None),
        flight(200.0, 0, None),
        flight(300.0, 0, None),
    ];
    let filters = FilterState {
        min_price: Some(150.0),
        ..Default::default()
    };
    assert_eq!(prices(&apply(&flights, &filters)), vec![200.0, 300.0]);

    let filters = FilterState {
        min_price: Some(200.0),
        ..Default::default()
    };
    assert_eq!(prices(&apply(&flights, &filters)), vec![200.0, 300.0]);
}

#[test]
fn max_price_is_inclusive_upper_bound() {
    let filters = FilterState {
        max_price: Some(180.0),
        ..Default::default()
    };
    assert_eq!(prices(&apply(&sample(), &filters)), vec![100.0, 180.0, 90.0]);
}

#[test]
fn stop_membership_keeps_order() {
    let flights = vec![
        flight(1.0, 0, None),
        flight(2.0, 1, None),
        flight(3.0, 2, None),
        flight(4.0, 0, None),
    ];
    let filters = FilterState {
        stops: BTreeSet::from([0]),
        ..Default::default()
    };
    let out = apply(&flights, &filters);
    assert_eq!(prices(&out), vec![1.0, 4.0]);
    assert!(out.iter().all(|f| f.stops == 0));
}

#[test]
fn airline_membership_rejects_unknown_airline() {
    let filters = FilterState {
        airlines: BTreeSet::from(["Delta".to_string(), "JetBlue".to_string()]),
        ..Default::default()
    };
    let out = apply(&sample(), &filters);
    assert_eq!(prices(&out), vec![100.0, 320.0, 90.0]);
}

#[test]
fn max_duration_bound() {
    let flights = vec![
        timed("05-04-2025 07:50 AM", "05-04-2025 10:10 AM", 140),
        timed("05-04-2025 08:00 AM", "05-04-2025 01:30 PM", 330),
    ];
    let filters = FilterState {
        max_duration: Some(140),
        ..Default::default()
    };
    let out = apply(&flights, &filters);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].duration.raw, 140);
}

#[test]
fn departure_window_uses_twelve_hour_clock() {
    let flights = vec![
        timed("05-04-2025 07:50 AM", "05-04-2025 10:10 AM", 140),
        timed("05-04-2025 12:15 PM", "05-04-2025 02:40 PM", 145),
        timed("05-04-2025 12:05 AM", "05-04-2025 02:40 AM", 155),
        timed("05-04-2025 09:30 PM", "05-04-2025 11:55 PM", 145),
    ];
    let morning = FilterState {
        departure_hours: HourRange::new(6, 12),
        ..Default::default()
    };
    let out = apply(&flights, &morning);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].departure_clock(), "07:50 AM");
    assert_eq!(out[1].departure_clock(), "12:15 PM");

    let late_arrival = FilterState {
        arrival_hours: HourRange::new(22, 3),
        ..Default::default()
    };
    let out = apply(&flights, &late_arrival);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].arrival_clock(), "02:40 AM");
    assert_eq!(out[1].arrival_clock(), "11:55 PM");
}

#[test]
fn unparseable_time_fails_an_active_window() {
    let flights = vec![timed("sometime", "later", 60)];
    let filters = FilterState {
        departure_hours: HourRange::new(0, 23),
        ..Default::default()
    };
    assert!(apply(&flights, &filters).is_empty());
    assert_eq!(apply(&flights, &FilterState::default()).len(), 1);
}

#[test]
fn predicates_combine_with_and() {
    let filters = FilterState {
        min_price: Some(95.0),
        max_price: Some(300.0),
        stops: BTreeSet::from([0, 1]),
        airlines: BTreeSet::from(["Delta".to_string(), "United".to_string()]),
        ..Default::default()
    };
    let out = apply(&sample(), &filters);
    assert_eq!(prices(&out), vec![100.0, 250.0]);
}

#[test]
fn result_is_exactly_the_matching_subset() {
    let flights = sample();
    let states = [
        FilterState::default(),
        FilterState {
            min_price: Some(120.0),
            stops: BTreeSet::from([1, 2]),
            ..Default::default()
        },
        FilterState {
            max_price: Some(99.0),
            airlines: BTreeSet::from(["Delta".to_string()]),
            ..Default::default()
        },
    ];
    for filters in &states {
        let out = apply(&flights, filters);
        let expected: Vec<Flight> = flights
            .iter()
            .filter(|f| filters.matches(f))
            .cloned()
            .collect();
        assert_eq!(out, expected);
        assert!(flights
            .iter()
            .filter(|f| !filters.matches(f))
            .all(|f| !out.contains(f)));
    }
}

#[test]
fn applying_twice_is_idempotent() {
    let filters = FilterState {
        max_price: Some(260.0),
        stops: BTreeSet::from([0, 1]),
        ..Default::default()
    };
    let once = apply(&sample(), &filters);
    let twice = apply(&once, &filters);
    assert_eq!(once, twice);
}

#[test]
fn merge_overwrites_only_given_fields() {
    let mut state = FilterState {
        min_price: Some(50.0),
        stops: BTreeSet::from([0]),
        ..Default::default()
    };
    state.apply_op(FilterOp::Merge(FilterPatch {
        max_price: Some(400.0),
        stops: Some(BTreeSet::from([1, 2])),
        ..Default::default()
    }));
    assert_eq!(state.min_price, Some(50.0));
    assert_eq!(state.max_price, Some(400.0));
    assert_eq!(state.stops, BTreeSet::from([1, 2]));
}

#[test]
fn replace_and_clear() {
    let mut state = FilterState::default();
    state.apply_op(FilterOp::ToggleAirline("Delta".into()));
    state.apply_op(FilterOp::Replace(FilterState {
        max_duration: Some(300),
        ..Default::default()
    }));
    assert!(state.airlines.is_empty());
    assert_eq!(state.max_duration, Some(300));

    state.apply_op(FilterOp::Clear);
    assert!(state.is_empty());
}

#[test]
fn airlines_listed_once_in_first_seen_order() {
    assert_eq!(
        available_airlines(&sample()),
        vec!["Delta".to_string(), "United".to_string(), "JetBlue".to_string()]
    );
}

#[test]
fn price_bounds_of_list() {
    assert_eq!(price_bounds(&sample()), Some((90.0, 320.0)));
    assert_eq!(price_bounds(&[]), None);
}

#[test]
fn cheapest_sorts_and_truncates() {
    let mut flights = sample();
    cheapest(&mut flights, 2);
    assert_eq!(prices(&flights), vec![90.0, 100.0]);
}
