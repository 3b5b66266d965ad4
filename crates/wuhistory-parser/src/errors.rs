use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to assemble observation dataframe: {0}")]
    Polars(#[from] PolarsError),

    #[error("normalized column '{column}' had {found} rows, expected {expected}")]
    ColumnLength {
        column: String,
        found: usize,
        expected: usize,
    },
}
