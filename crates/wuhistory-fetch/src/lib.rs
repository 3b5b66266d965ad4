//! Page-fetching collaborator: renders a daily-history URL into raw table
//! rows. The scraping pipeline only depends on [`PageFetcher`], so the HTTP
//! implementation can be swapped for any other rendering mechanism.

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use wuhistory_parser::RawRow;

/// CSS selector for the daily observation table on a history page.
pub const OBSERVATION_TABLE_SELECTOR: &str = "table.observation-table";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid table selector '{selector}'")]
    Selector { selector: String },

    #[error("page at {url} has no observation table")]
    TableMissing { url: String },

    #[error("observation table at {url} has no header row")]
    HeaderMissing { url: String },
}

/// Returns every row of the page's observation table, header row first.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<RawRow>, FetchError>;
}

/// Fetches pages over plain HTTP and extracts the table from the response
/// body with CSS selectors.
pub struct HttpTableFetcher {
    client: reqwest::blocking::Client,
    table_selector: String,
}

impl HttpTableFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_table_selector(OBSERVATION_TABLE_SELECTOR)
    }

    /// Overrides the CSS selector used to locate the observation table.
    pub fn with_table_selector(selector: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("wuhistory/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            table_selector: selector.into(),
        })
    }
}

impl PageFetcher for HttpTableFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<RawRow>, FetchError> {
        debug!(%url, "requesting daily history page");
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
        debug!(%url, bytes = body.len(), "received page body");
        parse_observation_rows(&body, &self.table_selector, url)
    }
}

/// Extracts the observation table from an HTML document: the first `tr`'s
/// `th` texts become the header row, every later `tr`'s `td` texts a data
/// row. A `tr` without `td` cells yields a blank separator row.
pub fn parse_observation_rows(
    html: &str,
    table_selector: &str,
    url: &str,
) -> Result<Vec<RawRow>, FetchError> {
    let table_selector =
        Selector::parse(table_selector).map_err(|_| FetchError::Selector {
            selector: table_selector.to_string(),
        })?;
    let row_selector = Selector::parse("tr").unwrap();
    let header_cell_selector = Selector::parse("th").unwrap();
    let data_cell_selector = Selector::parse("td").unwrap();

    let document = Html::parse_document(html);
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| FetchError::TableMissing {
            url: url.to_string(),
        })?;

    let mut table_rows = table.select(&row_selector);
    let header = table_rows
        .next()
        .map(|tr| {
            tr.select(&header_cell_selector)
                .map(cell_text)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .ok_or_else(|| FetchError::HeaderMissing {
            url: url.to_string(),
        })?;

    let mut rows = Vec::with_capacity(table_rows.size_hint().0 + 1);
    rows.push(RawRow::new(header));
    for tr in table_rows {
        let cells = tr.select(&data_cell_selector).map(cell_text).collect();
        rows.push(RawRow::new(cells));
    }

    debug!(%url, rows = rows.len(), "extracted observation rows");
    Ok(rows)
}

fn cell_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
