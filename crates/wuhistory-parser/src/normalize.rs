use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

use crate::boundary::{BlankRowSentinel, DayBoundaryPolicy, RowDisposition};
use crate::errors::NormalizeError;
use crate::model::{
    unit_suffixed_name, RawTable, DATETIME_COLUMN, TIME_COLUMN, UNIT_SUFFIXED_COLUMNS,
};

/// First signed/unsigned decimal number embedded in a unit-suffixed cell.
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("numeric pattern must compile"));

enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

struct ColumnPlan {
    source: usize,
    name: String,
    values: ColumnValues,
}

/// Normalizes concatenated raw rows into the typed observation frame using
/// the blank-row sentinel convention for day boundaries.
///
/// Rows are dated by a single forward walk starting at `start_date`; rows
/// whose reconstructed date would exceed `end_date`, whose `Time` cell does
/// not parse, or which miss any unit-suffixed numeric reading are dropped.
/// The result preserves raw row order and always has `datetime` as its first
/// column. Filtering is silent: malformed input yields fewer rows, never an
/// error.
pub fn normalize(
    table: &RawTable,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<DataFrame, NormalizeError> {
    let mut policy = BlankRowSentinel::default();
    normalize_with_policy(table, start_date, end_date, &mut policy)
}

/// [`normalize`] with an explicit day-boundary policy, for sources that
/// demarcate days by something other than blank separator rows.
pub fn normalize_with_policy(
    table: &RawTable,
    start_date: NaiveDate,
    end_date: NaiveDate,
    policy: &mut dyn DayBoundaryPolicy,
) -> Result<DataFrame, NormalizeError> {
    let time_index = table.columns.iter().position(|name| name == TIME_COLUMN);

    let mut plans: Vec<ColumnPlan> = Vec::with_capacity(table.columns.len());
    for (index, name) in table.columns.iter().enumerate() {
        if name == TIME_COLUMN {
            continue;
        }
        let plan = match unit_suffixed_name(name) {
            Some(renamed) => ColumnPlan {
                source: index,
                name: renamed.to_string(),
                values: ColumnValues::Numeric(Vec::new()),
            },
            None => ColumnPlan {
                source: index,
                name: name.clone(),
                values: ColumnValues::Text(Vec::new()),
            },
        };
        plans.push(plan);
    }

    let numeric_count = plans
        .iter()
        .filter(|plan| matches!(plan.values, ColumnValues::Numeric(_)))
        .count();

    let has_required_columns = UNIT_SUFFIXED_COLUMNS
        .iter()
        .all(|(source, _)| table.columns.iter().any(|name| name == source));

    let mut timestamps: Vec<i64> = Vec::new();
    let mut current_date = start_date;

    // Without a Time column no row can gain a timestamp, and without every
    // unit-suffixed column no row can satisfy the missing-field policy, so
    // either way every row drops and the output is an empty frame with the
    // derived schema.
    if let (Some(time_index), true) = (time_index, has_required_columns) {
        let mut scratch: Vec<f64> = Vec::with_capacity(numeric_count);

        'rows: for row in &table.rows {
            let date = match policy.observe(row) {
                RowDisposition::Marker => continue,
                RowDisposition::NewDay => {
                    let Some(next) = current_date.succ_opt() else {
                        continue;
                    };
                    current_date = next;
                    current_date
                }
                RowDisposition::Data => current_date,
            };

            if date > end_date {
                continue;
            }

            let Some(timestamp) = parse_observation_time(date, row.cell(time_index)) else {
                continue;
            };

            scratch.clear();
            for plan in &plans {
                if matches!(plan.values, ColumnValues::Numeric(_)) {
                    match extract_number(row.cell(plan.source)) {
                        Some(value) => scratch.push(value),
                        None => continue 'rows,
                    }
                }
            }

            timestamps.push(timestamp);
            let mut next_numeric = 0;
            for plan in &mut plans {
                match &mut plan.values {
                    ColumnValues::Numeric(values) => {
                        values.push(scratch[next_numeric]);
                        next_numeric += 1;
                    }
                    ColumnValues::Text(values) => {
                        values.push(row.cell(plan.source).to_string());
                    }
                }
            }
        }
    }

    let height = timestamps.len();
    let datetime_series = Series::new(DATETIME_COLUMN.into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let mut columns: Vec<Column> = Vec::with_capacity(plans.len() + 1);
    columns.push(datetime_series.into());
    for plan in plans {
        let (len, series) = match plan.values {
            ColumnValues::Numeric(values) => {
                (values.len(), Series::new(plan.name.as_str().into(), values))
            }
            ColumnValues::Text(values) => {
                (values.len(), Series::new(plan.name.as_str().into(), values))
            }
        };
        if len != height {
            return Err(NormalizeError::ColumnLength {
                column: plan.name,
                found: len,
                expected: height,
            });
        }
        columns.push(series.into());
    }

    DataFrame::new(columns).map_err(NormalizeError::from)
}

/// Combines a reconstructed date with the scraped time-of-day cell and
/// parses the pair as one timestamp, in microseconds since the epoch.
fn parse_observation_time(date: NaiveDate, time: &str) -> Option<i64> {
    static FORMATS: &[&str] = &["%Y-%m-%d %I:%M %p", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    let candidate = format!("{} {}", date.format("%Y-%m-%d"), time.trim());
    for fmt in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&candidate, fmt) {
            return Some(parsed.and_utc().timestamp_micros());
        }
    }
    None
}

fn extract_number(value: &str) -> Option<f64> {
    NUMBER_PATTERN
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
