pub mod boundary;
pub mod errors;
pub mod model;
mod normalize;

pub use boundary::{BlankRowSentinel, DayBoundaryPolicy, KnownRowsPerDay, RowDisposition};
pub use errors::NormalizeError;
pub use model::{unit_suffixed_name, RawRow, RawTable, DATETIME_COLUMN, TIME_COLUMN};
pub use normalize::{normalize, normalize_with_policy};
