// =============================================================================
// Quote Feed Client — daily OHLC download from a remote CSV endpoint
// =============================================================================
//
// The default template targets Stooq's daily CSV export, which answers with
// `Date,Open,High,Low,Close,Volume`.  Any endpoint that returns a header row
// plus daily rows under either accepted label set works; the body goes through
// the same normalizer as an uploaded file.
// =============================================================================

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::market_data::table::PriceTable;

/// Placeholder substituted with the requested symbol.
const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Fetches daily price tables over HTTP.
#[derive(Clone)]
pub struct QuoteFeedClient {
    client: reqwest::Client,
    url_template: String,
}

impl QuoteFeedClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(url_template: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client for QuoteFeedClient");
        Self::with_client(client, url_template)
    }

    /// Create a client that re-uses an existing HTTP client.
    pub fn with_client(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    /// Expand the URL template for `symbol`.  The symbol is form-encoded, so
    /// `S&P500` or `^N225` reach the feed as one query value.
    pub fn url_for(&self, symbol: &str) -> Result<reqwest::Url> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            anyhow::bail!("symbol must not be empty");
        }
        let encoded: String = url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect();
        let raw = self.url_template.replace(SYMBOL_PLACEHOLDER, &encoded);
        reqwest::Url::parse(&raw).with_context(|| format!("invalid quote feed URL {raw}"))
    }

    /// Download the daily table for `symbol`.
    #[instrument(skip(self), name = "quote_feed::fetch_daily")]
    pub async fn fetch_daily(&self, symbol: &str) -> Result<PriceTable> {
        let url = self.url_for(symbol)?;

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET daily quotes for {symbol}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read quote feed response body")?;

        if !status.is_success() {
            anyhow::bail!("quote feed returned {}: {}", status, body);
        }

        let table = parse_feed_body(&body)
            .with_context(|| format!("quote feed body for {symbol} is not a price table"))?;

        debug!(symbol, rows = table.len(), "daily quotes fetched");
        Ok(table)
    }
}

/// Turn a feed response body into a table.
///
/// Feeds answer unknown symbols with a plain-text message and a 200 status, so
/// an empty table is treated as an error rather than an empty series.
pub fn parse_feed_body(body: &str) -> Result<PriceTable> {
    let table = PriceTable::from_csv_str(body)?;
    if table.is_empty() {
        warn!(first_line = body.lines().next().unwrap_or(""), "quote feed returned no rows");
        anyhow::bail!("quote feed returned no data rows");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitution() {
        let feed = QuoteFeedClient::with_client(
            reqwest::Client::new(),
            "https://stooq.com/q/d/l/?s={symbol}&i=d",
        );
        let url = feed.url_for(" ^spx ").unwrap();
        assert_eq!(url.host_str(), Some("stooq.com"));
        assert!(url.query().unwrap().starts_with("s="));
        assert!(url.query().unwrap().ends_with("&i=d"));
    }

    #[test]
    fn reserved_characters_stay_inside_the_symbol() {
        let feed = QuoteFeedClient::with_client(
            reqwest::Client::new(),
            "https://stooq.com/q/d/l/?s={symbol}&i=d",
        );
        let url = feed.url_for("S&P500").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("s".to_string(), "S&P500".to_string()),
                ("i".to_string(), "d".to_string()),
            ]
        );

        let url = feed.url_for("^N225").unwrap();
        assert_eq!(url.query_pairs().next().unwrap().1, "^N225");
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let feed = QuoteFeedClient::with_client(reqwest::Client::new(), "https://x/{symbol}");
        assert!(feed.url_for("  ").is_err());
    }

    #[test]
    fn feed_body_with_rows() {
        let body = "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,100\n";
        let table = parse_feed_body(body).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.headers[4], "Close");
    }

    #[test]
    fn feed_body_without_rows_is_an_error() {
        assert!(parse_feed_body("No data").is_err());
    }
}
