//! CSV file price data adapter.
//!
//! Columns are located by header name (case-insensitive), so exports with
//! extra columns such as Yahoo's `Adj Close` load unchanged.

use crate::domain::error::CoinlensError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    path: PathBuf,
}

struct ColumnIndex([usize; 6]);

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, CoinlensError> {
        let mut idx = [0usize; 6];
        for (slot, name) in idx.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| CoinlensError::DataSource {
                    reason: format!("missing {} column", name),
                })?;
        }
        Ok(Self(idx))
    }
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize, name: &str) -> Result<&'a str, CoinlensError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| CoinlensError::DataSource {
            reason: format!("missing {} value", name),
        })
}

fn number(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, CoinlensError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| CoinlensError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parse CSV content into bars for `symbol`, keeping rows inside the range.
    pub fn parse(
        content: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoinlensError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| CoinlensError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?;
        let ColumnIndex([date_i, open_i, high_i, low_i, close_i, volume_i]) =
            ColumnIndex::from_headers(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| CoinlensError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, date_i, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                CoinlensError::DataSource {
                    reason: format!("invalid date format: {}", e),
                }
            })?;
            if date < start_date || date > end_date {
                continue;
            }

            // Yahoo exports mark missing days with "null".
            if record.iter().any(|v| v.trim().eq_ignore_ascii_case("null")) {
                debug!(%date, "skipping row with null fields");
                continue;
            }

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                open: number(&record, open_i, "open")?,
                high: number(&record, high_i, "high")?,
                low: number(&record, low_i, "low")?,
                close: number(&record, close_i, "close")?,
                volume: number(&record, volume_i, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoinlensError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CoinlensError::DataSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        Self::parse(&content, symbol, start_date, end_date)
    }
}
