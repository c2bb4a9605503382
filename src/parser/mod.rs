pub mod columns;
pub mod deserializers;
pub mod pipeline;
pub mod sheet;
pub mod types;

pub use pipeline::{load_bytes, load_file, normalize, LoadOutput};
pub use types::{CellValue, ParseWarning, RawSheet, Ticket, TicketTable};
