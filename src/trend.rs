use serde::Serialize;

use crate::model::PricePoint;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceTrend {
    pub lowest: f64,
    pub average: f64,
    pub highest: f64,
}

impl PriceTrend {
    /// Summary over points with a positive price; zeros when there are none.
    pub fn from_points(points: &[PricePoint]) -> Self {
        let prices: Vec<f64> = points
            .iter()
            .map(|p| p.price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();

        if prices.is_empty() {
            return Self::default();
        }

        let lowest = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = (prices.iter().sum::<f64>() / prices.len() as f64).round();

        Self {
            lowest,
            average,
            highest,
        }
    }
}

pub fn month_abbr(m: u32) -> &'static str {
    match m {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    }
}

/// `2025-04-01` -> `Apr 1`. Unrecognized input is returned unchanged.
pub fn short_date(date: &str) -> String {
    let mut parts = date.split('-').skip(1);
    let month = parts.next().and_then(|m| m.parse::<u32>().ok());
    let day = parts.next().and_then(|d| d.parse::<u32>().ok());
    match (month, day) {
        (Some(m), Some(d)) if (1..=12).contains(&m) => format!("{} {d}", month_abbr(m)),
        _ => date.to_string(),
    }
}

/// One bar per point, scaled to the highest price.
pub fn render_chart(points: &[PricePoint], currency: &str) -> String {
    let trend = PriceTrend::from_points(points);
    let mut lines = Vec::with_capacity(points.len() + 2);

    lines.push(format!(
        "Lowest: {}  Average: {}  Highest: {}",
        crate::table::format_price(Some(trend.lowest), currency),
        crate::table::format_price(Some(trend.average), currency),
        crate::table::format_price(Some(trend.highest), currency),
    ));

    for point in points {
        let width = if trend.highest > 0.0 && point.price > 0.0 {
            ((point.price / trend.highest) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let label = if point.price > 0.0 {
            crate::table::format_price(Some(point.price), currency)
        } else {
            "N/A".to_string()
        };
        lines.push(format!(
            "{:>6} | {:<bar$} {label}",
            short_date(&point.departure),
            "█".repeat(width.min(BAR_WIDTH)),
            bar = BAR_WIDTH,
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, price: f64) -> PricePoint {
        PricePoint {
            departure: date.into(),
            price,
        }
    }

    #[test]
    fn trend_ignores_non_positive_prices() {
        let points = vec![
            point("2025-04-01", 120.0),
            point("2025-04-02", 0.0),
            point("2025-04-03", 181.0),
            point("2025-04-04", 100.0),
        ];
        let trend = PriceTrend::from_points(&points);
        assert_eq!(trend.lowest, 100.0);
        assert_eq!(trend.highest, 181.0);
        assert_eq!(trend.average, 134.0);
    }

    #[test]
    fn trend_of_nothing_is_zero() {
        assert_eq!(PriceTrend::from_points(&[]), PriceTrend::default());
        assert_eq!(
            PriceTrend::from_points(&[point("2025-04-01", 0.0)]),
            PriceTrend::default()
        );
    }

    #[test]
    fn short_date_formats() {
        assert_eq!(short_date("2025-04-01"), "Apr 1");
        assert_eq!(short_date("2025-12-25"), "Dec 25");
        assert_eq!(short_date("tomorrow"), "tomorrow");
    }

    #[test]
    fn chart_has_header_and_one_row_per_point() {
        let points = vec![point("2025-04-01", 100.0), point("2025-04-02", 200.0)];
        let chart = render_chart(&points, "USD");
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Lowest: $100"));
        assert!(lines[0].contains("Highest: $200"));
        assert!(lines[2].contains("Apr 2"));
        assert!(lines[2].contains(&"█".repeat(BAR_WIDTH)));
    }
}
