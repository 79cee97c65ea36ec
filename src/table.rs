use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::{Airport, Flight};

pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

pub fn format_price(price: Option<f64>, currency: &str) -> String {
    let p = match price {
        Some(p) => format_amount(p),
        None => return "—".to_string(),
    };
    match currency {
        "USD" => format!("${p}"),
        "EUR" => format!("€{p}"),
        "GBP" => format!("£{p}"),
        "JPY" | "CNY" => format!("¥{p}"),
        "KRW" => format!("₩{p}"),
        "INR" => format!("₹{p}"),
        "THB" => format!("฿{p}"),
        _ => format!("{p} {currency}"),
    }
}

pub fn stops_text(stops: u32) -> String {
    match stops {
        0 => "Direct".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    }
}

pub fn render(flights: &[Flight], currency: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Airline", "Flight", "Depart", "Arrive", "Duration", "Stops", "Price",
        ]);

    for flight in flights {
        table.add_row(vec![
            flight.airline.clone().unwrap_or_default(),
            flight.flight_number.clone().unwrap_or_default(),
            flight.departure_time.clone(),
            flight.arrival_time.clone(),
            flight.duration.text.clone(),
            stops_text(flight.stops),
            format_price(Some(flight.price), currency),
        ]);
    }

    table.to_string()
}

/// One line per flight: `price | depart>arrive | duration | stops | airline`.
pub fn render_compact(flights: &[Flight], currency: &str) -> String {
    flights
        .iter()
        .map(|f| {
            let airline = match (&f.airline, &f.flight_number) {
                (Some(a), Some(n)) => format!("{a} {n}"),
                (Some(a), None) => a.clone(),
                (None, Some(n)) => n.clone(),
                (None, None) => "—".to_string(),
            };
            format!(
                "{} | {}>{} | {}h{:02}m | {} | {airline}",
                format_price(Some(f.price), currency),
                f.departure_clock(),
                f.arrival_clock(),
                f.duration.raw / 60,
                f.duration.raw % 60,
                stops_text(f.stops),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_airports(airports: &[Airport]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Id", "Type", "Title", "Subtitle", "City"]);

    for airport in airports {
        table.add_row(vec![
            &airport.id,
            &airport.kind,
            &airport.title,
            &airport.subtitle,
            &airport.city,
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FlightDuration;

    fn flight() -> Flight {
        Flight {
            departure_time: "05-04-2025 07:50 AM".into(),
            arrival_time: "05-04-2025 10:10 AM".into(),
            duration: FlightDuration {
                raw: 140,
                text: "2 hr 20 min".into(),
            },
            price: 129.0,
            stops: 0,
            airline: Some("Delta".into()),
            flight_number: Some("DL 123".into()),
        }
    }

    #[test]
    fn prices_drop_trailing_zero_cents() {
        assert_eq!(format_price(Some(129.0), "USD"), "$129");
        assert_eq!(format_price(Some(129.5), "EUR"), "€129.50");
        assert_eq!(format_price(Some(99.0), "SEK"), "99 SEK");
        assert_eq!(format_price(None, "USD"), "—");
    }

    #[test]
    fn stops_wording() {
        assert_eq!(stops_text(0), "Direct");
        assert_eq!(stops_text(1), "1 stop");
        assert_eq!(stops_text(3), "3 stops");
    }

    #[test]
    fn compact_line_shows_clock_times() {
        let line = render_compact(&[flight()], "USD");
        assert_eq!(line, "$129 | 07:50 AM>10:10 AM | 2h20m | Direct | Delta DL 123");
    }

    #[test]
    fn table_contains_every_column() {
        let out = render(&[flight()], "USD");
        for needle in ["Airline", "Delta", "DL 123", "2 hr 20 min", "Direct", "$129"] {
            assert!(out.contains(needle), "missing {needle}");
        }
    }
}
