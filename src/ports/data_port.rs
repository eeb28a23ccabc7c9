//! Price data access port trait.

use crate::domain::error::CoinlensError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` within `[start_date, end_date]`, oldest first.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoinlensError>;
}
