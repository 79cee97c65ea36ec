use serde::{Deserialize, Serialize};

/// Response envelope shared by every provider endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: i64,
    pub data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Airport {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlightDuration {
    pub raw: u32,
    #[serde(default)]
    pub text: String,
}

impl FlightDuration {
    pub fn from_minutes(raw: u32) -> Self {
        Self {
            raw,
            text: format!("{} hr {} min", raw / 60, raw % 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Flight {
    /// Provider format `MM-DD-YYYY hh:mm AM`.
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: FlightDuration,
    pub price: f64,
    #[serde(default)]
    pub stops: u32,
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub flight_number: Option<String>,
}

impl Flight {
    pub fn departure_clock(&self) -> &str {
        clock_part(&self.departure_time)
    }

    pub fn arrival_clock(&self) -> &str {
        clock_part(&self.arrival_time)
    }

    pub fn departure_hour(&self) -> Option<u32> {
        parse_hour(&self.departure_time)
    }

    pub fn arrival_hour(&self) -> Option<u32> {
        parse_hour(&self.arrival_time)
    }
}

fn clock_part(timestamp: &str) -> &str {
    timestamp
        .split_once(' ')
        .map(|(_, clock)| clock)
        .unwrap_or(timestamp)
}

/// Hour of day (0-23) from `MM-DD-YYYY hh:mm AM`. A missing meridiem is
/// read as a 24-hour clock.
pub fn parse_hour(timestamp: &str) -> Option<u32> {
    let mut parts = clock_part(timestamp).split_whitespace();
    let clock = parts.next()?;
    let meridiem = parts.next().map(str::to_ascii_uppercase);

    let (hour, minute) = clock.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let _minute: u32 = minute.parse().ok()?;

    match meridiem.as_deref() {
        Some("AM") if (1..=12).contains(&hour) => Some(hour % 12),
        Some("PM") if (1..=12).contains(&hour) => Some(hour % 12 + 12),
        None if hour < 24 => Some(hour),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Itineraries {
    #[serde(rename = "topFlights", default)]
    pub top_flights: Vec<Flight>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FlightSearchData {
    #[serde(default)]
    pub itineraries: Option<Itineraries>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    /// `YYYY-MM-DD`
    #[serde(alias = "date")]
    pub departure: String,
    pub price: f64,
}

pub type AirportResponse = Envelope<Vec<Airport>>;
pub type FlightSearchResponse = Envelope<FlightSearchData>;
pub type PriceGraphResponse = Envelope<Vec<PricePoint>>;

impl FlightSearchResponse {
    /// `data.itineraries.topFlights`, empty when any step of the path is absent.
    pub fn into_flights(self) -> Vec<Flight> {
        self.data
            .and_then(|d| d.itineraries)
            .map(|i| i.top_flights)
            .unwrap_or_default()
    }
}

impl<T: Default> Envelope<T> {
    pub fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}
