//! Analytics: query windows, plan gating and CSV export

pub mod countries;
pub mod export;
pub mod interval;
pub mod query;

pub use export::{ExportColumns, create_csv_stream, parse_columns};
pub use interval::{Interval, valid_date_range_for_plan};
pub use query::{EventType, EventsParams, EventsQuery};
