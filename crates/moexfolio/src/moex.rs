//! MOEX ISS client for daily closing prices
//!
//! Candles come back as a column-oriented JSON table:
//! `{"candles": {"columns": [...], "data": [[...], ...]}}`.
//! The server pages results, so requests are repeated with a growing
//! `start` offset until a page comes back with no rows.

use std::time::Duration;

use jiff::civil::Date;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use moexfolio_core::PriceSeries;

use crate::config::AnalysisConfig;

pub const DEFAULT_BASE_URL: &str = "https://iss.moex.com";
/// Main board for Russian shares
pub const DEFAULT_BOARD: &str = "TQBR";
/// ISS interval code for daily candles
const DAILY_INTERVAL: u32 = 24;
/// Upper bound on pages per ticker (ISS serves 500 candles per page)
const MAX_PAGES: usize = 100;

/// Anything that can produce a closing-price history for a ticker.
pub trait PriceSource {
    fn fetch_closes(&self, ticker: &str, from: Date, till: Date)
    -> Result<PriceSeries, FetchError>;
}

#[derive(Debug)]
pub enum FetchError {
    /// The server returned no candles for the ticker and range
    NoData(String),
    Http(reqwest::Error),
    /// The response was not a candle table we understand
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NoData(ticker) => write!(f, "no price data for {}", ticker),
            FetchError::Http(e) => write!(f, "HTTP error: {}", e),
            FetchError::Decode(msg) => write!(f, "unexpected ISS response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e)
    }
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    candles: Option<CandlesTable>,
}

#[derive(Debug, Deserialize)]
struct CandlesTable {
    columns: Vec<String>,
    data: Option<Vec<Vec<serde_json::Value>>>,
}

/// One page of the candles table
#[derive(Debug, Clone, PartialEq)]
pub struct CandlePage {
    /// Rows the server sent, including those without a close
    pub rows: usize,
    pub points: Vec<(Date, f64)>,
}

/// Parse one ISS candles page.
///
/// Returns `NoData` when the `candles` block or its `data` is absent. Rows
/// with a null close are counted but yield no point. The trading date is
/// the day part of the `end` timestamp.
pub fn parse_candles(ticker: &str, body: &str) -> Result<CandlePage, FetchError> {
    let response: CandlesResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let Some(table) = response.candles else {
        return Err(FetchError::NoData(ticker.to_string()));
    };
    let Some(rows) = table.data else {
        return Err(FetchError::NoData(ticker.to_string()));
    };

    let column = |name: &str| {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FetchError::Decode(format!("missing '{name}' column")))
    };
    let close_idx = column("close")?;
    let end_idx = column("end")?;

    let mut points = Vec::with_capacity(rows.len());
    for row in &rows {
        let Some(close) = row.get(close_idx).and_then(serde_json::Value::as_f64) else {
            continue;
        };
        let end = row
            .get(end_idx)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| FetchError::Decode("candle without 'end' timestamp".to_string()))?;
        points.push((parse_trading_day(end)?, close));
    }

    Ok(CandlePage {
        rows: rows.len(),
        points,
    })
}

/// Request pages with a growing `start` offset until the server runs dry.
///
/// The offset advances by raw rows, so rows without a close do not shift
/// the next page. Stops on a page with no rows, after `MAX_PAGES`, or when a page
/// does not move past the last date already collected.
pub fn collect_pages<F>(ticker: &str, mut fetch_page: F) -> Result<Vec<(Date, f64)>, FetchError>
where
    F: FnMut(usize) -> Result<CandlePage, FetchError>,
{
    let mut points: Vec<(Date, f64)> = Vec::new();
    let mut start = 0;

    for page in 0..MAX_PAGES {
        let CandlePage { rows, points: page_points } = fetch_page(start)?;
        debug!(
            ticker,
            page,
            start,
            rows,
            points = page_points.len(),
            "Fetched candles page"
        );

        if rows == 0 {
            break;
        }
        // A server that ignores `start` keeps replaying the first page
        let replayed = match (page_points.first(), points.last()) {
            (Some(&(first, _)), Some(&(last, _))) => first <= last,
            _ => false,
        };
        if replayed {
            break;
        }

        start += rows;
        points.extend(page_points);
    }

    Ok(points)
}

/// `"2024-03-01 23:59:59"` -> `2024-03-01`
fn parse_trading_day(timestamp: &str) -> Result<Date, FetchError> {
    let day = timestamp.get(..10).unwrap_or(timestamp);
    day.parse::<Date>()
        .map_err(|e| FetchError::Decode(format!("bad timestamp '{timestamp}': {e}")))
}

/// Blocking client for the ISS candles endpoint
pub struct MoexClient {
    http: Client,
    base_url: String,
    board: String,
}

impl MoexClient {
    pub fn new(base_url: &str, board: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            board: board.to_string(),
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.base_url,
            &config.board,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn candles_url(&self, ticker: &str) -> String {
        format!(
            "{}/iss/engines/stock/markets/shares/boards/{}/securities/{}/candles.json",
            self.base_url, self.board, ticker
        )
    }

    fn fetch_page(
        &self,
        ticker: &str,
        from: Date,
        till: Date,
        start: usize,
    ) -> Result<CandlePage, FetchError> {
        let body = self
            .http
            .get(self.candles_url(ticker))
            .query(&[
                ("from", from.to_string()),
                ("till", till.to_string()),
                ("interval", DAILY_INTERVAL.to_string()),
                ("start", start.to_string()),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        parse_candles(ticker, &body)
    }
}

impl PriceSource for MoexClient {
    fn fetch_closes(
        &self,
        ticker: &str,
        from: Date,
        till: Date,
    ) -> Result<PriceSeries, FetchError> {
        let points = collect_pages(ticker, |start| self.fetch_page(ticker, from, till, start))?;

        if points.is_empty() {
            return Err(FetchError::NoData(ticker.to_string()));
        }

        Ok(PriceSeries::new(ticker, points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    const PAGE: &str = r#"{
        "candles": {
            "columns": ["open", "close", "high", "low", "value", "volume", "begin", "end"],
            "data": [
                [270.1, 271.5, 272.0, 269.8, 1.0e9, 3690000, "2024-03-01 00:00:00", "2024-03-01 23:59:59"],
                [271.5, 274.25, 275.0, 270.0, 1.2e9, 4400000, "2024-03-04 00:00:00", "2024-03-04 23:59:59"],
                [274.0, null, 274.0, 274.0, 0, 0, "2024-03-05 00:00:00", "2024-03-05 23:59:59"]
            ]
        }
    }"#;

    #[test]
    fn test_parse_candles_reads_close_and_end() {
        let page = parse_candles("SBER", PAGE).unwrap();

        assert_eq!(page.rows, 3);
        assert_eq!(
            page.points,
            vec![(date(2024, 3, 1), 271.5), (date(2024, 3, 4), 274.25)]
        );
    }

    #[test]
    fn test_parse_candles_uses_column_names() {
        let body = r#"{"candles": {"columns": ["end", "close"], "data": [["2024-01-09 23:59:59", 10]]}}"#;

        let page = parse_candles("GAZP", body).unwrap();
        assert_eq!(page.points, vec![(date(2024, 1, 9), 10.0)]);
    }

    #[test]
    fn test_parse_candles_empty_page() {
        let body = r#"{"candles": {"columns": ["close", "end"], "data": []}}"#;
        let page = parse_candles("LKOH", body).unwrap();
        assert_eq!(page.rows, 0);
        assert!(page.points.is_empty());
    }

    #[test]
    fn test_parse_candles_missing_block_is_no_data() {
        assert!(matches!(
            parse_candles("XXXX", r#"{"securities": {}}"#),
            Err(FetchError::NoData(t)) if t == "XXXX"
        ));
        assert!(matches!(
            parse_candles("XXXX", r#"{"candles": {"columns": ["close", "end"]}}"#),
            Err(FetchError::NoData(_))
        ));
    }

    #[test]
    fn test_parse_candles_rejects_malformed() {
        assert!(matches!(
            parse_candles("SBER", "<html>"),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            parse_candles("SBER", r#"{"candles": {"columns": ["open"], "data": []}}"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            parse_candles(
                "SBER",
                r#"{"candles": {"columns": ["close", "end"], "data": [[1.0, "not a date"]]}}"#
            ),
            Err(FetchError::Decode(_))
        ));
    }

    /// Serve `closes` three rows per page, one row per day from 2024-01-01
    fn paged(closes: &[Option<f64>], start: usize) -> Result<CandlePage, FetchError> {
        let data: Vec<String> = closes
            .iter()
            .enumerate()
            .skip(start)
            .take(3)
            .map(|(i, close)| {
                let close = close.map_or("null".to_string(), |c| c.to_string());
                format!(r#"[{close}, "2024-01-{:02} 23:59:59"]"#, i + 1)
            })
            .collect();
        let body = format!(
            r#"{{"candles": {{"columns": ["close", "end"], "data": [{}]}}}}"#,
            data.join(",")
        );
        parse_candles("SBER", &body)
    }

    #[test]
    fn test_collect_pages_advances_by_raw_rows() {
        let closes = [
            Some(10.0),
            None,
            Some(12.0),
            Some(13.0),
            Some(14.0),
            Some(15.0),
        ];
        let mut starts = Vec::new();

        let points = collect_pages("SBER", |start| {
            starts.push(start);
            paged(&closes, start)
        })
        .unwrap();

        assert_eq!(starts, vec![0, 3, 6]);
        assert_eq!(points.len(), 5);
        assert_eq!(points[1], (date(2024, 1, 3), 12.0));
        assert_eq!(points[4], (date(2024, 1, 6), 15.0));
    }

    #[test]
    fn test_collect_pages_continues_past_page_without_closes() {
        let closes = [Some(10.0), None, None, None, Some(11.0)];

        let points = collect_pages("SBER", |start| paged(&closes, start)).unwrap();

        assert_eq!(
            points,
            vec![(date(2024, 1, 1), 10.0), (date(2024, 1, 5), 11.0)]
        );
    }

    #[test]
    fn test_collect_pages_stops_when_server_replays_first_page() {
        let closes = [Some(10.0), Some(11.0), Some(12.0), Some(13.0)];
        let mut calls = 0;

        let points = collect_pages("SBER", |_| {
            calls += 1;
            paged(&closes, 0)
        })
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_candles_url_layout() {
        let client =
            MoexClient::new("https://iss.moex.com/", "TQBR", Duration::from_secs(5)).unwrap();

        assert_eq!(
            client.candles_url("SBER"),
            "https://iss.moex.com/iss/engines/stock/markets/shares/boards/TQBR/securities/SBER/candles.json"
        );
    }
}
