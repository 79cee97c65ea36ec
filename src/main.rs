use std::collections::{BTreeMap, BTreeSet};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use faresight::autocomplete::Autocompleter;
use faresight::config::Config;
use faresight::error::{FlightError, MISSING_FIELDS_MESSAGE};
use faresight::fetch::{FlightApi, HttpApi};
use faresight::filter::{FilterState, HourRange};
use faresight::query::{self, Locale, Passengers, PriceGraphParams, TravelClass};
use faresight::search::SearchCoordinator;
use faresight::trend::{self, PriceTrend};
use faresight::{table, SearchReport, SearchRequest};

#[derive(Parser)]
#[command(
    name = "faresight",
    about = "Search flights, filter itineraries and chart price trends from the terminal",
    version,
    after_help = "\
Examples:
  faresight airports \"los angeles\"
  faresight search -f LAX -t JFK -d 2026-04-01
  faresight search -f LAX -t JFK -d 2026-04-01 --stops 0 --max-price 350 --json --pretty
  faresight search -f Helsinki -t BCN,ATH -d 2026-03-01 --compact --top 3
  faresight price-graph -f LAX -t JFK -d 2026-04-01

Requires RAPIDAPI_KEY in the environment (or --api-key)."
)]
struct Cli {
    #[arg(long, global = true, value_name = "KEY", help = "Provider API key (overrides RAPIDAPI_KEY)")]
    api_key: Option<String>,

    #[arg(long, global = true, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, global = true, value_name = "SECS", help = "Request timeout [default: 30]")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(about = "Look up airports and cities by name or code")]
    Airports(AirportsArgs),
    #[command(
        about = "Search for flights",
        long_about = "Search for flights between two places on a date, then narrow the \
            results with client-side filters. Places may be codes or names; the best \
            airport match is used. Comma-separate -t for multi-destination.",
        after_help = "\
Examples:
  One-way:      faresight search -f LAX -t JFK -d 2026-04-01
  Round-trip:   faresight search -f LAX -t JFK -d 2026-04-01 --return-date 2026-04-08
  Direct only:  faresight search -f LAX -t JFK -d 2026-04-01 --stops 0
  Morning:      faresight search -f LAX -t JFK -d 2026-04-01 --depart-hours 6-11
  JSON output:  faresight search -f LAX -t JFK -d 2026-04-01 --json --pretty
  Compare:      faresight search -f HEL -t BCN,ATH,AYT -d 2026-03-01 --compact --top 3"
    )]
    Search(SearchArgs),
    #[command(about = "Show the price trend for a route over nearby dates")]
    PriceGraph(TrendArgs),
    #[command(about = "Show calendar prices for a route")]
    Calendar(TrendArgs),
    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp,
}

#[derive(clap::Args)]
struct AirportsArgs {
    #[arg(value_name = "QUERY", help = "City or airport name or code (at least 2 characters)")]
    query: String,

    #[arg(long, help = "Output as JSON")]
    json: bool,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(short, long, value_name = "PLACE", help = "Departure airport code or city name")]
    from: Option<String>,

    #[arg(
        short, long,
        value_name = "PLACE",
        help = "Arrival airport code or city name (comma-separate for multi-destination)"
    )]
    to: Option<String>,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Departure date")]
    date: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Return date (round-trip)")]
    return_date: Option<String>,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of adult passengers")]
    adults: u32,

    #[arg(
        long = "class",
        default_value = "economy",
        value_name = "CLASS",
        help = "Travel class [economy, premium-economy, business, first]"
    )]
    travel_class: String,

    #[arg(long, value_name = "CODE", help = "Currency code (e.g. USD, EUR) [default: USD]")]
    currency: Option<String>,

    #[arg(long, value_name = "AMOUNT", help = "Only flights costing at least this much")]
    min_price: Option<f64>,

    #[arg(long, value_name = "AMOUNT", help = "Only flights costing at most this much")]
    max_price: Option<f64>,

    #[arg(long, value_name = "0,1,...", help = "Accepted stop counts (0 = direct only)")]
    stops: Option<String>,

    #[arg(long, value_name = "NAME,...", help = "Accepted airlines (comma-separated names)")]
    airlines: Option<String>,

    #[arg(long, value_name = "MINUTES", help = "Maximum total duration in minutes")]
    max_duration: Option<u32>,

    #[arg(long, value_name = "START-END", help = "Departure hour window, e.g. 6-12")]
    depart_hours: Option<String>,

    #[arg(long, value_name = "START-END", help = "Arrival hour window, e.g. 18-23")]
    arrive_hours: Option<String>,

    #[arg(long, value_name = "N", help = "Show only the N cheapest results")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-flight output")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,
}

#[derive(clap::Args)]
struct TrendArgs {
    #[arg(short, long, value_name = "CODE", help = "Departure airport code")]
    from: String,

    #[arg(short, long, value_name = "CODE", help = "Arrival airport code")]
    to: String,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Outbound date")]
    date: String,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Return date (price graph only)")]
    return_date: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "First day of the price window")]
    start_date: Option<String>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Last day of the price window")]
    end_date: Option<String>,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of adult passengers")]
    adults: u32,

    #[arg(long, value_name = "CODE", help = "Currency code [default: USD]")]
    currency: Option<String>,

    #[arg(long, help = "Output as JSON")]
    json: bool,
}

fn error_code(err: &FlightError) -> i32 {
    match err {
        FlightError::InvalidDate(_)
        | FlightError::Validation(_)
        | FlightError::MissingApiKey
        | FlightError::Config(_) => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_) => 3,
        FlightError::RateLimited | FlightError::Unauthorized(_) => 4,
        FlightError::HttpStatus(_) | FlightError::Provider(_) => 5,
        FlightError::Decode(_) => 6,
    }
}

fn error_kind(err: &FlightError) -> &'static str {
    match err {
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Validation(_) => "validation_error",
        FlightError::MissingApiKey => "missing_api_key",
        FlightError::Config(_) => "config_error",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::RateLimited => "rate_limited",
        FlightError::Unauthorized(_) => "unauthorized",
        FlightError::HttpStatus(_) => "http_error",
        FlightError::Provider(_) => "provider_error",
        FlightError::Decode(_) => "parse_error",
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, FlightError> {
    let mut config = Config::load()?;
    if let Some(ref key) = cli.api_key {
        config.api_key = Some(key.clone());
    }
    if cli.proxy.is_some() {
        config.proxy = cli.proxy.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    Ok(config)
}

fn connect(config: &Config) -> Result<Arc<HttpApi>, FlightError> {
    Ok(Arc::new(HttpApi::new(config.fetch_options()?)?))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_hours(raw: Option<&str>, flag: &str) -> Result<Option<HourRange>, FlightError> {
    raw.map(|s| {
        HourRange::parse(s).ok_or_else(|| {
            FlightError::Validation(format!("{flag} must be START-END with hours 0-23, got \"{s}\""))
        })
    })
    .transpose()
}

fn build_filters(args: &SearchArgs) -> Result<FilterState, FlightError> {
    let stops: BTreeSet<u32> = match args.stops.as_deref() {
        Some(raw) => split_list(raw)
            .map(|s| {
                s.parse::<u32>().map_err(|_| {
                    FlightError::Validation(format!("--stops takes numbers like 0,1, got \"{s}\""))
                })
            })
            .collect::<Result<_, _>>()?,
        None => BTreeSet::new(),
    };
    let airlines: BTreeSet<String> = args
        .airlines
        .as_deref()
        .map(|raw| split_list(raw).map(String::from).collect())
        .unwrap_or_default();

    if let (Some(min), Some(max)) = (args.min_price, args.max_price) {
        if min > max {
            return Err(FlightError::Validation(format!(
                "--min-price {min} is above --max-price {max}"
            )));
        }
    }

    Ok(FilterState {
        min_price: args.min_price,
        max_price: args.max_price,
        stops,
        airlines,
        max_duration: args.max_duration,
        departure_hours: parse_hours(args.depart_hours.as_deref(), "--depart-hours")?,
        arrival_hours: parse_hours(args.arrive_hours.as_deref(), "--arrive-hours")?,
    })
}

/// Everything that can be checked without the network.
fn check_search_args(args: &SearchArgs) -> Result<(String, Vec<String>, String), FlightError> {
    let missing = || FlightError::Validation(MISSING_FIELDS_MESSAGE.into());
    let from = args.from.as_deref().map(str::trim).filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let date = args.date.as_deref().map(str::trim).filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let destinations: Vec<String> = args
        .to
        .as_deref()
        .map(|t| split_list(t).map(String::from).collect())
        .unwrap_or_default();
    if destinations.is_empty() {
        return Err(missing());
    }

    query::validate_date(date)?;
    if let Some(ref ret) = args.return_date {
        query::validate_date(ret)?;
    }
    TravelClass::from_str_loose(&args.travel_class)?;
    Passengers::adults(args.adults).validate()?;

    Ok((from.to_string(), destinations, date.to_string()))
}

fn locale_for(config: &Config, currency: Option<&str>) -> Locale {
    Locale {
        currency: currency.map(String::from).unwrap_or_else(|| config.locale.currency.clone()),
        ..config.locale.clone()
    }
}

fn print_report(report: &SearchReport, args: &SearchArgs, currency: &str) {
    if args.json || args.pretty {
        let output = if args.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        match output {
            Ok(s) => println!("{s}"),
            Err(e) => die(&FlightError::Decode(e.to_string()), true),
        }
        return;
    }

    if report.flights.is_empty() {
        match report.message {
            Some(ref msg) => println!("{msg}."),
            None => println!("No flights match the current filters ({} found).", report.total),
        }
        return;
    }

    if args.compact {
        println!("{}", table::render_compact(&report.flights, currency));
    } else {
        println!(
            "{} → {}: showing {} of {} flights",
            report.origin.title,
            report.destination.title,
            report.flights.len(),
            report.total
        );
        println!("{}", table::render(&report.flights, currency));
        if let Some((low, high)) = report.price_range {
            println!(
                "Prices {} to {} | Airlines: {}",
                table::format_price(Some(low), currency),
                table::format_price(Some(high), currency),
                report.airlines.join(", ")
            );
        }
    }
}

async fn run_airports(args: AirportsArgs, config: Config) -> Result<(), FlightError> {
    let api = connect(&config)?;
    let places = Autocompleter::new(api, config.locale.clone(), config.debounce);
    let airports = places.fetch(&args.query).await?.airports().unwrap_or_default();

    if args.json {
        let json = serde_json::to_string(&airports).map_err(|e| FlightError::Decode(e.to_string()))?;
        println!("{json}");
    } else if airports.is_empty() {
        println!("No airports found.");
    } else {
        println!("{}", table::render_airports(&airports));
    }
    Ok(())
}

async fn run_search(args: SearchArgs, config: Config) -> Result<(), FlightError> {
    let json_mode = args.json || args.pretty;
    let (from, destinations, date) = check_search_args(&args)?;
    let filters = build_filters(&args)?;
    let travel_class = TravelClass::from_str_loose(&args.travel_class)?;
    let locale = locale_for(&config, args.currency.as_deref());
    let currency = locale.currency().to_string();

    let api = connect(&config)?;
    let places = Arc::new(Autocompleter::new(
        Arc::clone(&api),
        config.locale.clone(),
        config.debounce,
    ));
    let coordinator = Arc::new(SearchCoordinator::new(api, travel_class, locale));

    let request_for = |to: &str| SearchRequest {
        from: from.clone(),
        to: to.to_string(),
        date: date.clone(),
        return_date: args.return_date.clone(),
        adults: args.adults,
        filters: filters.clone(),
        top: args.top,
    };

    if destinations.len() == 1 {
        let report = faresight::run_search(&*places, &*coordinator, request_for(&destinations[0])).await?;
        print_report(&report, &args, &currency);
        return Ok(());
    }

    // Every task then finds the origin in the shared cache.
    places.resolve(&from).await?;

    let mut join_set = JoinSet::new();
    for dest in &destinations {
        let places = Arc::clone(&places);
        let coordinator = Arc::clone(&coordinator);
        let request = request_for(dest);
        let dest = dest.clone();
        join_set.spawn(async move {
            let result = faresight::run_search(&*places, &*coordinator, request).await;
            (dest, result)
        });
    }

    let mut reports: BTreeMap<String, SearchReport> = BTreeMap::new();
    while let Some(joined) = join_set.join_next().await {
        let (dest, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "search task failed");
                continue;
            }
        };
        match result {
            Ok(report) => {
                reports.insert(dest, report);
            }
            Err(e) => eprintln!("error: {dest}: {e}"),
        }
    }

    if json_mode {
        let output = if args.pretty {
            serde_json::to_string_pretty(&reports)
        } else {
            serde_json::to_string(&reports)
        };
        println!("{}", output.map_err(|e| FlightError::Decode(e.to_string()))?);
        return Ok(());
    }

    for (dest, report) in &reports {
        println!("=== {dest} ===");
        print_report(report, &args, &currency);
        println!();
    }
    Ok(())
}

async fn run_trend(args: TrendArgs, config: Config, calendar: bool) -> Result<(), FlightError> {
    let locale = locale_for(&config, args.currency.as_deref());
    let params = PriceGraphParams {
        departure_id: args.from.trim().to_uppercase(),
        arrival_id: args.to.trim().to_uppercase(),
        outbound_date: args.date,
        return_date: if calendar { None } else { args.return_date },
        start_date: args.start_date,
        end_date: args.end_date,
        passengers: Passengers::adults(args.adults),
        travel_class: TravelClass::Economy,
        locale,
    };
    params.validate()?;

    let api = connect(&config)?;
    let points = if calendar {
        api.calendar(&params).await?
    } else {
        api.price_graph(&params).await?
    };

    if args.json {
        let json = serde_json::json!({
            "trend": PriceTrend::from_points(&points),
            "points": points,
        });
        println!("{json}");
    } else if points.is_empty() {
        println!("No price data for this route.");
    } else {
        println!("{}", trend::render_chart(&points, params.locale.currency()));
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let json_mode = match &cli.command {
        Commands::Airports(a) => a.json,
        Commands::Search(a) => a.json || a.pretty,
        Commands::PriceGraph(a) | Commands::Calendar(a) => a.json,
        Commands::Mcp => false,
    };

    // Required-field checks run before the environment is consulted.
    if let Commands::Search(ref args) = cli.command {
        if let Err(e) = check_search_args(args).and_then(|_| build_filters(args).map(|_| ())) {
            die(&e, json_mode);
        }
    }

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => die(&e, json_mode),
    };

    let result = match cli.command {
        Commands::Airports(args) => run_airports(args, config).await,
        Commands::Search(args) => run_search(args, config).await,
        Commands::PriceGraph(args) => run_trend(args, config, false).await,
        Commands::Calendar(args) => run_trend(args, config, true).await,
        Commands::Mcp => faresight::mcp::run(config).await,
    };

    if let Err(e) = result {
        die(&e, json_mode);
    }
}
