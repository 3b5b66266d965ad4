//! Sequential orchestration over the date range and the CSV sink.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{info, warn};

use wuhistory_fetch::PageFetcher;
use wuhistory_parser::{RawRow, RawTable};

/// Sortable serialization for the `datetime` column in the output file.
pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn daily_url(template: &str, date: NaiveDate) -> String {
    format!("{template}/{}", date.format("%Y-%m-%d"))
}

/// Fetches every date in `[start, end]` ascending, one page at a time, and
/// concatenates the surviving pages into one raw table: the first successful
/// page's header row becomes the canonical columns, every page's own header
/// row is stripped, and one blank separator row is inserted between page
/// groups so the normalizer sees a day boundary at each page transition.
///
/// A failed fetch is logged and skipped. Returns `None` when every fetch
/// failed, which callers report as "no data" without writing a file.
pub fn scrape_range(
    fetcher: &dyn PageFetcher,
    template: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<RawTable> {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();
    let mut fetched = 0usize;
    let mut skipped = 0usize;

    let mut date = start;
    while date <= end {
        let url = daily_url(template, date);
        info!(%date, %url, "scraping daily history");
        match fetcher.fetch(&url) {
            Ok(page_rows) => {
                let mut page = page_rows.into_iter();
                if let Some(header) = page.next() {
                    if columns.is_empty() {
                        columns = header.cells;
                    }
                    if fetched > 0 {
                        rows.push(RawRow::blank());
                    }
                    rows.extend(page);
                    fetched += 1;
                }
            }
            Err(err) => {
                warn!(%date, error = %err, "skipping date, page fetch failed");
                skipped += 1;
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    info!(fetched, skipped, "finished scraping date range");
    if fetched == 0 {
        return None;
    }
    Some(RawTable::new(columns, rows))
}

pub fn write_observations(observations: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    CsvWriter::new(file)
        .with_datetime_format(Some(CSV_DATETIME_FORMAT.to_string()))
        .finish(observations)
        .with_context(|| format!("failed to write observation table to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use wuhistory_fetch::FetchError;

    use super::*;

    struct ScriptedFetcher {
        responses: RefCell<VecDeque<Result<Vec<RawRow>, FetchError>>>,
        urls: RefCell<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<Vec<RawRow>, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageFetcher for ScriptedFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<RawRow>, FetchError> {
            self.urls.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(FetchError::TableMissing {
                        url: url.to_string(),
                    })
                })
        }
    }

    fn day(dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, dom).expect("valid test date")
    }

    fn page(times: &[&str]) -> Vec<RawRow> {
        let mut rows = vec![RawRow::new(vec![
            "Time".to_string(),
            "Temperature".to_string(),
        ])];
        for time in times {
            rows.push(RawRow::new(vec![time.to_string(), "50 F".to_string()]));
        }
        rows
    }

    #[test]
    fn builds_one_url_per_date_in_order() {
        let fetcher = ScriptedFetcher::new(vec![Ok(page(&["12:00 AM"])), Ok(page(&["12:00 AM"]))]);
        scrape_range(&fetcher, "https://t/date", day(1), day(2)).expect("expected a table");
        assert_eq!(
            *fetcher.urls.borrow(),
            vec!["https://t/date/2024-03-01", "https://t/date/2024-03-02"]
        );
    }

    #[test]
    fn strips_headers_and_separates_page_groups() {
        let fetcher =
            ScriptedFetcher::new(vec![Ok(page(&["11:00 PM"])), Ok(page(&["12:00 AM"]))]);
        let table = scrape_range(&fetcher, "https://t/date", day(1), day(2))
            .expect("expected a table");

        assert_eq!(table.columns, vec!["Time", "Temperature"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].cells[0], "11:00 PM");
        assert!(table.rows[1].is_blank());
        assert_eq!(table.rows[2].cells[0], "12:00 AM");
    }

    #[test]
    fn failed_dates_are_skipped_without_aborting() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(&["11:00 PM"])),
            Err(FetchError::TableMissing {
                url: "https://t/date/2024-03-02".to_string(),
            }),
            Ok(page(&["12:00 AM"])),
        ]);
        let table = scrape_range(&fetcher, "https://t/date", day(1), day(3))
            .expect("expected a table");

        // The skipped day leaves a single page boundary between its
        // neighbors, so the surviving groups stay separated by one blank.
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[1].is_blank());
    }

    #[test]
    fn all_failures_yield_no_table() {
        let fetcher = ScriptedFetcher::new(vec![]);
        assert!(scrape_range(&fetcher, "https://t/date", day(1), day(3)).is_none());
    }
}
