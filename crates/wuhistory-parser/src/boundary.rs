use crate::model::RawRow;

/// What the reconstruction pass should do with a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisposition {
    /// Positional day-boundary marker carrying no observation payload.
    Marker,
    /// Observation row belonging to the current day.
    Data,
    /// Observation row that begins the next calendar day.
    NewDay,
}

/// Detects calendar-day boundaries in a row stream that demarcates them only
/// positionally. Policies are stateful and observe every row exactly once,
/// in order.
pub trait DayBoundaryPolicy {
    fn observe(&mut self, row: &RawRow) -> RowDisposition;
}

/// Treats a blank row as the day-boundary marker: the first data row after
/// one or more blanks starts the next day.
///
/// Inherited limitation: a page that scrapes zero blank rows contributes no
/// day advance, and a blank row appearing between data rows of the same day
/// drifts every later date by one. The convention matches the source table
/// layout and is not corrected here.
#[derive(Debug, Default)]
pub struct BlankRowSentinel {
    pending_advance: bool,
    seen_data: bool,
}

impl DayBoundaryPolicy for BlankRowSentinel {
    fn observe(&mut self, row: &RawRow) -> RowDisposition {
        if row.is_blank() {
            // A separator before the first data row never arms an advance:
            // the first day is never skipped by a leading blank.
            if self.seen_data {
                self.pending_advance = true;
            }
            return RowDisposition::Marker;
        }

        self.seen_data = true;
        if self.pending_advance {
            self.pending_advance = false;
            RowDisposition::NewDay
        } else {
            RowDisposition::Data
        }
    }
}

/// Starts a new day after a known fixed number of data rows, for sources
/// whose pages render no blank separator at all. Blank rows are skipped
/// without counting.
#[derive(Debug)]
pub struct KnownRowsPerDay {
    rows_per_day: usize,
    seen_today: usize,
}

impl KnownRowsPerDay {
    pub fn new(rows_per_day: usize) -> Self {
        Self {
            rows_per_day: rows_per_day.max(1),
            seen_today: 0,
        }
    }
}

impl DayBoundaryPolicy for KnownRowsPerDay {
    fn observe(&mut self, row: &RawRow) -> RowDisposition {
        if row.is_blank() {
            return RowDisposition::Marker;
        }

        if self.seen_today == self.rows_per_day {
            self.seen_today = 1;
            RowDisposition::NewDay
        } else {
            self.seen_today += 1;
            RowDisposition::Data
        }
    }
}
