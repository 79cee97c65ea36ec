#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use faresight::error::FlightError;
use faresight::fetch::FlightApi;
use faresight::model::{Airport, Flight, FlightDuration, PricePoint};
use faresight::query::{FlightSearchParams, Locale, PriceGraphParams};

pub fn airport(id: &str, title: &str) -> Airport {
    Airport {
        id: id.into(),
        kind: "airport".into(),
        title: title.into(),
        subtitle: format!("{title} International Airport"),
        city: title.into(),
    }
}

pub fn flight(price: f64, stops: u32, airline: Option<&str>) -> Flight {
    Flight {
        departure_time: "05-04-2025 07:50 AM".into(),
        arrival_time: "05-04-2025 10:10 AM".into(),
        duration: FlightDuration::from_minutes(140),
        price,
        stops,
        airline: airline.map(String::from),
        flight_number: None,
    }
}

pub fn timed(departure: &str, arrival: &str, minutes: u32) -> Flight {
    Flight {
        departure_time: departure.into(),
        arrival_time: arrival.into(),
        duration: FlightDuration::from_minutes(minutes),
        price: 100.0,
        stops: 0,
        airline: Some("Delta".into()),
        flight_number: None,
    }
}

/// What the fake returns for flight searches.
pub enum Flights {
    List(Vec<Flight>),
    Fail(fn() -> FlightError),
}

/// In-memory provider that counts every call.
pub struct FakeApi {
    pub airports: Vec<Airport>,
    pub airport_error: Option<fn() -> FlightError>,
    pub flights: Flights,
    pub points: Vec<PricePoint>,
    pub latency: Duration,
    pub airport_calls: AtomicUsize,
    pub flight_calls: AtomicUsize,
    pub graph_calls: AtomicUsize,
    pub airport_queries: Mutex<Vec<String>>,
    pub last_search: Mutex<Option<FlightSearchParams>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            airports: vec![airport("LAX", "Los Angeles"), airport("JFK", "New York")],
            airport_error: None,
            flights: Flights::List(Vec::new()),
            points: Vec::new(),
            latency: Duration::ZERO,
            airport_calls: AtomicUsize::new(0),
            flight_calls: AtomicUsize::new(0),
            graph_calls: AtomicUsize::new(0),
            airport_queries: Mutex::new(Vec::new()),
            last_search: Mutex::new(None),
        }
    }

    pub fn with_flights(mut self, flights: Vec<Flight>) -> Self {
        self.flights = Flights::List(flights);
        self
    }

    pub fn failing_search(mut self, err: fn() -> FlightError) -> Self {
        self.flights = Flights::Fail(err);
        self
    }

    pub fn failing_airports(mut self, err: fn() -> FlightError) -> Self {
        self.airport_error = Some(err);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn airport_calls(&self) -> usize {
        self.airport_calls.load(Ordering::SeqCst)
    }

    pub fn flight_calls(&self) -> usize {
        self.flight_calls.load(Ordering::SeqCst)
    }

    pub fn graph_calls(&self) -> usize {
        self.graph_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlightApi for FakeApi {
    async fn search_airport(
        &self,
        query: &str,
        _locale: &Locale,
    ) -> Result<Vec<Airport>, FlightError> {
        self.airport_calls.fetch_add(1, Ordering::SeqCst);
        self.airport_queries.lock().unwrap().push(query.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(err) = self.airport_error {
            return Err(err());
        }
        let wanted = query.to_lowercase();
        Ok(self
            .airports
            .iter()
            .filter(|a| {
                a.id.to_lowercase().contains(&wanted) || a.title.to_lowercase().contains(&wanted)
            })
            .cloned()
            .collect())
    }

    async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> Result<Vec<Flight>, FlightError> {
        self.flight_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some(params.clone());
        match &self.flights {
            Flights::List(list) => Ok(list.clone()),
            Flights::Fail(err) => Err(err()),
        }
    }

    async fn price_graph(&self, _params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError> {
        self.graph_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.points.clone())
    }

    async fn calendar(&self, _params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError> {
        self.graph_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.points.clone())
    }
}
