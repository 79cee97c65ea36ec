use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;
use tracing::info;

use crate::autocomplete::Autocompleter;
use crate::config::Config;
use crate::error::FlightError;
use crate::fetch::{FlightApi, HttpApi};
use crate::filter::{FilterState, HourRange};
use crate::query::{Locale, Passengers, PriceGraphParams, TravelClass};
use crate::search::SearchCoordinator;
use crate::trend::PriceTrend;
use crate::SearchRequest;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AirportsArgs {
    #[schemars(description = "City or airport name or code, at least 2 characters. Example: LAX, Los Angeles")]
    query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    #[schemars(description = "Departure city/airport name or code. Example: LAX, Helsinki")]
    from: String,
    #[schemars(description = "Arrival city/airport name or code. Example: JFK, Barcelona")]
    to: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format. Example: 2026-03-01")]
    date: String,
    #[schemars(description = "Return date in YYYY-MM-DD for round-trip")]
    return_date: Option<String>,
    #[schemars(description = "Adult passengers (1-9). Default: 1")]
    adults: Option<u32>,
    #[schemars(
        description = "One of: economy, premium-economy, business, first. Default: economy"
    )]
    travel_class: Option<String>,
    #[schemars(description = "Currency code. Examples: USD, EUR, JPY. Default: USD")]
    currency: Option<String>,
    #[schemars(description = "Only flights costing at least this much")]
    min_price: Option<f64>,
    #[schemars(description = "Only flights costing at most this much")]
    max_price: Option<f64>,
    #[schemars(description = "Accepted stop counts. Example: [0, 1]. Omit for any")]
    stops: Option<Vec<u32>>,
    #[schemars(description = "Accepted airline names as shown in results. Example: [\"Delta\"]")]
    airlines: Option<Vec<String>>,
    #[schemars(description = "Maximum total duration in minutes")]
    max_duration: Option<u32>,
    #[schemars(description = "Departure hour window START-END (0-23). Example: 6-12")]
    departure_hours: Option<String>,
    #[schemars(description = "Arrival hour window START-END (0-23). Example: 18-23")]
    arrival_hours: Option<String>,
    #[schemars(description = "Return only N cheapest results")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct PriceGraphArgs {
    #[schemars(description = "Departure airport code. Example: LAX")]
    from: String,
    #[schemars(description = "Arrival airport code. Example: JFK")]
    to: String,
    #[schemars(description = "Outbound date in YYYY-MM-DD format")]
    date: String,
    #[schemars(description = "First day of the price window, YYYY-MM-DD")]
    start_date: Option<String>,
    #[schemars(description = "Last day of the price window, YYYY-MM-DD")]
    end_date: Option<String>,
    #[schemars(description = "Currency code. Default: USD")]
    currency: Option<String>,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => tool_error(format!("failed to encode result: {e}")),
    }
}

fn parse_hours(raw: Option<&str>, field: &str) -> Result<Option<HourRange>, FlightError> {
    raw.map(|s| {
        HourRange::parse(s).ok_or_else(|| {
            FlightError::Validation(format!("{field} must be START-END with hours 0-23, got \"{s}\""))
        })
    })
    .transpose()
}

fn build_filters(args: &SearchArgs) -> Result<FilterState, FlightError> {
    Ok(FilterState {
        min_price: args.min_price,
        max_price: args.max_price,
        stops: args.stops.clone().unwrap_or_default().into_iter().collect(),
        airlines: args.airlines.clone().unwrap_or_default().into_iter().collect(),
        max_duration: args.max_duration,
        departure_hours: parse_hours(args.departure_hours.as_deref(), "departure_hours")?,
        arrival_hours: parse_hours(args.arrival_hours.as_deref(), "arrival_hours")?,
    })
}

fn locale_with_currency(base: &Locale, currency: Option<String>) -> Locale {
    Locale {
        currency: currency.unwrap_or_else(|| base.currency.clone()),
        ..base.clone()
    }
}

#[derive(Debug, Clone)]
struct FaresightMcp {
    api: Arc<HttpApi>,
    places: Arc<Autocompleter<Arc<HttpApi>>>,
    config: Config,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FaresightMcp {
    fn new(config: Config) -> Result<Self, FlightError> {
        let api = Arc::new(HttpApi::new(config.fetch_options()?)?);
        let places = Arc::new(Autocompleter::new(
            Arc::clone(&api),
            config.locale.clone(),
            config.debounce,
        ));
        Ok(Self {
            api,
            places,
            config,
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        description = "Look up airports and cities matching a name or code. Returns ids usable as 'from'/'to' in faresight_search. Results are cached per query."
    )]
    async fn faresight_airports(
        &self,
        Parameters(args): Parameters<AirportsArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.places.fetch(&args.query).await {
            Ok(lookup) => json_result(&lookup.airports().unwrap_or_default()),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(
        description = "Search flights between two places on a date and return the filtered itineraries as JSON. Places may be names or codes; the best airport match is used. Filters: price range, stop counts, airlines, maximum duration, departure/arrival hour windows."
    )]
    async fn faresight_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let filters = match build_filters(&args) {
            Ok(f) => f,
            Err(e) => return tool_error(e.to_string()),
        };
        let travel_class = match args
            .travel_class
            .as_deref()
            .map(TravelClass::from_str_loose)
            .transpose()
        {
            Ok(c) => c.unwrap_or_default(),
            Err(e) => return tool_error(e.to_string()),
        };

        let coordinator = SearchCoordinator::new(
            Arc::clone(&self.api),
            travel_class,
            locale_with_currency(&self.config.locale, args.currency),
        );

        let request = SearchRequest {
            from: args.from,
            to: args.to,
            date: args.date,
            return_date: args.return_date,
            adults: args.adults.unwrap_or(1),
            filters,
            top: args.top,
        };

        match crate::run_search(&*self.places, &coordinator, request).await {
            Ok(report) => json_result(&report),
            Err(e) if e.is_validation() => tool_error(e.to_string()),
            Err(e) => tool_error(e.user_message()),
        }
    }

    #[tool(
        description = "Price trend for a route: daily lowest prices over a date window plus lowest/average/highest summary."
    )]
    async fn faresight_price_graph(
        &self,
        Parameters(args): Parameters<PriceGraphArgs>,
    ) -> Result<CallToolResult, McpError> {
        let params = PriceGraphParams {
            departure_id: args.from.trim().to_uppercase(),
            arrival_id: args.to.trim().to_uppercase(),
            outbound_date: args.date,
            return_date: None,
            start_date: args.start_date,
            end_date: args.end_date,
            passengers: Passengers::default(),
            travel_class: TravelClass::Economy,
            locale: locale_with_currency(&self.config.locale, args.currency),
        };
        if let Err(e) = params.validate() {
            return tool_error(e.to_string());
        }

        match self.api.price_graph(&params).await {
            Ok(points) => json_result(&serde_json::json!({
                "trend": PriceTrend::from_points(&points),
                "points": points,
            })),
            Err(e) => tool_error(e.user_message()),
        }
    }
}

#[tool_handler]
impl ServerHandler for FaresightMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "faresight".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Flight search tools. Workflow: (1) faresight_airports to find place ids if a name is ambiguous. (2) faresight_search with filters to list itineraries. (3) faresight_price_graph to see how prices move across nearby dates.".into(),
            ),
        }
    }
}

pub async fn run(config: Config) -> Result<(), FlightError> {
    let server = FaresightMcp::new(config)?;
    info!("starting MCP server on stdio");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| FlightError::Config(format!("failed to start MCP server: {e}")))?;
    service
        .waiting()
        .await
        .map_err(|e| FlightError::Config(format!("MCP server error: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SearchArgs {
        SearchArgs {
            from: "LAX".into(),
            to: "JFK".into(),
            date: "2026-03-01".into(),
            return_date: None,
            adults: None,
            travel_class: None,
            currency: None,
            min_price: None,
            max_price: None,
            stops: None,
            airlines: None,
            max_duration: None,
            departure_hours: None,
            arrival_hours: None,
            top: None,
        }
    }

    #[test]
    fn no_filter_args_build_empty_state() {
        assert!(build_filters(&args()).unwrap().is_empty());
    }

    #[test]
    fn filter_args_carry_through() {
        let mut a = args();
        a.min_price = Some(100.0);
        a.stops = Some(vec![0, 1, 0]);
        a.airlines = Some(vec!["Delta".into()]);
        a.departure_hours = Some("6-12".into());

        let f = build_filters(&a).unwrap();
        assert_eq!(f.min_price, Some(100.0));
        assert_eq!(f.stops.len(), 2);
        assert!(f.airlines.contains("Delta"));
        assert_eq!(f.departure_hours, HourRange::new(6, 12));
    }

    #[test]
    fn bad_hour_window_is_rejected() {
        let mut a = args();
        a.arrival_hours = Some("25-3".into());
        assert!(build_filters(&a).is_err());
    }

    #[test]
    fn currency_override_keeps_rest_of_locale() {
        let base = Locale {
            currency: "USD".into(),
            language_code: "de-DE".into(),
            country_code: "DE".into(),
        };
        let l = locale_with_currency(&base, Some("EUR".into()));
        assert_eq!(l.currency, "EUR");
        assert_eq!(l.country_code, "DE");
        assert_eq!(locale_with_currency(&base, None), base);
    }
}
