//! Extraction of the financial figures from a rendered result page

use crate::config::ExtractSelectors;
use crate::record::TickerRecord;
use scraper::{Html, Selector};

/// Builds the record for `code` from the rendered page markup
///
/// Both figures are read from fixed table positions. A missing cell, an
/// unparsable cell or an invalid selector leaves that field empty; extraction
/// itself never fails.
pub fn extract(
    markup: &str,
    code: &str,
    display_name: Option<&str>,
    selectors: &ExtractSelectors,
) -> TickerRecord {
    let document = Html::parse_document(markup);

    let sales = cell_amount(&document, &selectors.sales_cell, code, "sales");
    let operating_profit = cell_amount(
        &document,
        &selectors.operating_profit_cell,
        code,
        "operating profit",
    );

    TickerRecord {
        stock_code: code.to_string(),
        stock_name: display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        sales,
        operating_profit,
    }
}

/// Parses a displayed amount such as `"1,234,567"`
///
/// Returns None for empty, non-numeric or non-finite text.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn cell_amount(document: &Html, selector: &str, code: &str, field: &str) -> Option<f64> {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid {} selector '{}': {:?}", field, selector, e);
            return None;
        }
    };

    let Some(cell) = document.select(&selector).next() else {
        tracing::debug!("{}: no {} cell on page", code, field);
        return None;
    };

    let text = cell.text().collect::<String>();
    let amount = parse_amount(&text);
    if amount.is_none() {
        tracing::debug!("{}: could not parse {} from '{}'", code, field, text.trim());
    }
    amount
}
