use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Daily closing prices for a single ticker, ordered by date.
///
/// Construction sorts the points and keeps one close per date; when the
/// source repeats a date, the later point wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<(Date, f64)>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: impl IntoIterator<Item = (Date, f64)>) -> Self {
        let mut sorted: Vec<(Date, f64)> = points.into_iter().collect();
        // Stable sort keeps source order among equal dates
        sorted.sort_by_key(|(date, _)| *date);

        let mut points: Vec<(Date, f64)> = Vec::with_capacity(sorted.len());
        for (date, close) in sorted {
            match points.last_mut() {
                Some(last) if last.0 == date => last.1 = close,
                _ => points.push((date, close)),
            }
        }

        Self {
            ticker: ticker.into(),
            points,
        }
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub fn points(&self) -> &[(Date, f64)] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|(date, _)| *date)
    }

    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|(date, _)| *date)
    }

    /// Fractional day-over-day returns, dated by the later observation.
    ///
    /// Returns that are not finite (a zero previous close) are dropped.
    #[must_use]
    pub fn daily_returns(&self) -> Vec<(Date, f64)> {
        self.points
            .windows(2)
            .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
            .filter(|(_, r)| r.is_finite())
            .collect()
    }
}
