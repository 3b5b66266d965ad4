/// Name of the derived timestamp column, always first in the output schema.
pub const DATETIME_COLUMN: &str = "datetime";

/// Name of the scraped time-of-day column, consumed into [`DATETIME_COLUMN`].
pub const TIME_COLUMN: &str = "Time";

/// Scraped column names that carry unit-suffixed numeric readings, paired
/// with the output name each is renamed to. Rows missing any of these
/// readings are dropped whole.
pub const UNIT_SUFFIXED_COLUMNS: [(&str, &str); 7] = [
    ("Temperature", "Temperature (F)"),
    ("Dew Point", "Dew Point (F)"),
    ("Humidity", "Humidity (%)"),
    ("Wind Speed", "Wind Speed (mph)"),
    ("Wind Gust", "Wind Gust (mph)"),
    ("Pressure", "Pressure (in)"),
    ("Precip.", "Precipitation (in)"),
];

pub fn unit_suffixed_name(raw: &str) -> Option<&'static str> {
    UNIT_SUFFIXED_COLUMNS
        .iter()
        .find(|(source, _)| *source == raw)
        .map(|(_, renamed)| *renamed)
}

/// One scraped HTML table row: the cell texts in column order. A separator
/// row scrapes with no populated cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    /// True when the row has no cells or only empty/whitespace cells.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }

    /// Cell text at `index`, or `""` when the row is shorter than the header.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// The normalizer's input: canonical column names plus the concatenated data
/// rows of every scraped page, in date order, separator rows included.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }
}
