use crate::error::FlightError;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_COUNTRY: &str = "US";

#[derive(Debug, Clone, PartialEq)]
pub struct Passengers {
    pub adults: u32,
    pub children: u32,
    pub infants_in_seat: u32,
    pub infants_on_lap: u32,
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants_in_seat: 0,
            infants_on_lap: 0,
        }
    }
}

impl Passengers {
    pub fn adults(adults: u32) -> Self {
        Self {
            adults,
            ..Default::default()
        }
    }

    /// `None` when the counts overflow `u32`.
    pub fn total(&self) -> Option<u32> {
        self.adults
            .checked_add(self.children)?
            .checked_add(self.infants_in_seat)?
            .checked_add(self.infants_on_lap)
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        let total = match self.total() {
            Some(total) if total <= 9 => total,
            Some(total) => {
                return Err(FlightError::Validation(format!(
                    "total passengers ({total}) exceeds maximum of 9"
                )))
            }
            None => {
                return Err(FlightError::Validation(
                    "total passengers exceeds maximum of 9".into(),
                ))
            }
        };

        if total == 0 {
            return Err(FlightError::Validation(
                "at least one passenger required".into(),
            ));
        }

        if self.infants_on_lap > self.adults {
            return Err(FlightError::Validation(
                "infants on lap cannot exceed number of adults".into(),
            ));
        }

        Ok(())
    }

    fn push_params(&self, params: &mut Vec<(String, String)>) {
        params.push(("adults".into(), self.adults.to_string()));
        if self.children > 0 {
            params.push(("children".into(), self.children.to_string()));
        }
        if self.infants_in_seat > 0 {
            params.push(("infant_in_seat".into(), self.infants_in_seat.to_string()));
        }
        if self.infants_on_lap > 0 {
            params.push(("infant_on_lap".into(), self.infants_on_lap.to_string()));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "economy" => Ok(Self::Economy),
            "premium-economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(FlightError::Validation(format!("invalid travel class: {s}"))),
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }
}

/// Locale settings; an empty field falls back to the provider defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locale {
    pub currency: String,
    pub language_code: String,
    pub country_code: String,
}

impl Locale {
    pub fn currency(&self) -> &str {
        or_default(&self.currency, DEFAULT_CURRENCY)
    }

    pub fn language_code(&self) -> &str {
        or_default(&self.language_code, DEFAULT_LANGUAGE)
    }

    pub fn country_code(&self) -> &str {
        or_default(&self.country_code, DEFAULT_COUNTRY)
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchParams {
    pub departure_id: String,
    pub arrival_id: String,
    pub outbound_date: String,
    pub return_date: Option<String>,
    pub passengers: Passengers,
    pub travel_class: TravelClass,
    pub locale: Locale,
}

fn validate_place(id: &str, field: &str) -> Result<(), FlightError> {
    if id.trim().is_empty() {
        return Err(FlightError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub fn validate_date(date: &str) -> Result<(), FlightError> {
    let invalid = || FlightError::InvalidDate(date.to_string());

    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 || parts[1].len() != 2 || parts[2].len() != 2 {
        return Err(invalid());
    }
    let year: u32 = parts[0].parse().map_err(|_| invalid())?;
    let month: u32 = parts[1].parse().map_err(|_| invalid())?;
    let day: u32 = parts[2].parse().map_err(|_| invalid())?;

    if year < 2000 || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    if day < 1 || day > days_in_month(year, month) {
        return Err(invalid());
    }

    Ok(())
}

impl FlightSearchParams {
    pub fn validate(&self) -> Result<(), FlightError> {
        validate_place(&self.departure_id, "departure airport")?;
        validate_place(&self.arrival_id, "arrival airport")?;
        validate_date(&self.outbound_date)?;
        if let Some(ref ret) = self.return_date {
            validate_date(ret)?;
            if ret.as_str() < self.outbound_date.as_str() {
                return Err(FlightError::Validation(format!(
                    "return date {ret} is before departure date {}",
                    self.outbound_date
                )));
            }
        }
        self.passengers.validate()
    }

    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("departure_id".to_string(), self.departure_id.clone()),
            ("arrival_id".to_string(), self.arrival_id.clone()),
            ("outbound_date".to_string(), self.outbound_date.clone()),
        ];
        if let Some(ref ret) = self.return_date {
            params.push(("return_date".into(), ret.clone()));
        }
        self.passengers.push_params(&mut params);
        params.push(("travel_class".into(), self.travel_class.as_param().into()));
        params.push(("currency".into(), self.locale.currency().into()));
        params.push(("language_code".into(), self.locale.language_code().into()));
        params.push(("country_code".into(), self.locale.country_code().into()));
        params
    }
}

/// Parameters for the price-graph and calendar endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceGraphParams {
    pub departure_id: String,
    pub arrival_id: String,
    pub outbound_date: String,
    pub return_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub passengers: Passengers,
    pub travel_class: TravelClass,
    pub locale: Locale,
}

impl PriceGraphParams {
    pub fn from_search(search: &FlightSearchParams) -> Self {
        Self {
            departure_id: search.departure_id.clone(),
            arrival_id: search.arrival_id.clone(),
            outbound_date: search.outbound_date.clone(),
            return_date: search.return_date.clone(),
            start_date: None,
            end_date: None,
            passengers: search.passengers.clone(),
            travel_class: search.travel_class,
            locale: search.locale.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        validate_place(&self.departure_id, "departure airport")?;
        validate_place(&self.arrival_id, "arrival airport")?;
        validate_date(&self.outbound_date)?;
        for date in [&self.return_date, &self.start_date, &self.end_date]
            .into_iter()
            .flatten()
        {
            validate_date(date)?;
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            if end < start {
                return Err(FlightError::Validation(format!(
                    "end date {end} is before start date {start}"
                )));
            }
        }
        self.passengers.validate()
    }

    fn base_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("departure_id".to_string(), self.departure_id.clone()),
            ("arrival_id".to_string(), self.arrival_id.clone()),
            ("outbound_date".to_string(), self.outbound_date.clone()),
        ];
        if let Some(ref start) = self.start_date {
            params.push(("start_date".into(), start.clone()));
        }
        if let Some(ref end) = self.end_date {
            params.push(("end_date".into(), end.clone()));
        }
        self.passengers.push_params(&mut params);
        params.push(("travel_class".into(), self.travel_class.as_param().into()));
        params.push(("currency".into(), self.locale.currency().into()));
        params.push(("country_code".into(), self.locale.country_code().into()));
        params
    }

    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut params = self.base_params();
        if let Some(ref ret) = self.return_date {
            params.insert(3, ("return_date".into(), ret.clone()));
        }
        params
    }

    /// The calendar endpoint takes the same parameters minus the return date.
    pub fn to_calendar_params(&self) -> Vec<(String, String)> {
        self.base_params()
    }
}

pub fn airport_params(query: &str, locale: &Locale) -> Vec<(String, String)> {
    vec![
        ("query".to_string(), query.to_string()),
        ("language_code".to_string(), locale.language_code().to_string()),
        ("country_code".to_string(), locale.country_code().to_string()),
    ]
}
