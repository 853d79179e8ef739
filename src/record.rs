use serde::{Deserialize, Serialize};

/// Column names of the output file, in order
pub const COLUMNS: [&str; 4] = ["stock_code", "stock_name", "sales", "operating_profit"];

/// Financial figures collected for one ticker
///
/// Only `stock_code` is guaranteed. The remaining fields are filled on a
/// best-effort basis; `None` means the value could not be located or parsed,
/// not necessarily that the company reported nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub sales: Option<f64>,
    pub operating_profit: Option<f64>,
}

impl TickerRecord {
    /// Creates the record emitted when a ticker could not be searched or filtered
    pub fn unresolved(stock_code: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            stock_name: None,
            sales: None,
            operating_profit: None,
        }
    }

    /// Returns true if both financial fields were extracted
    pub fn has_financials(&self) -> bool {
        self.sales.is_some() && self.operating_profit.is_some()
    }

    /// Returns true if nothing beyond the stock code was collected
    pub fn is_unresolved(&self) -> bool {
        self.stock_name.is_none() && self.sales.is_none() && self.operating_profit.is_none()
    }
}
