//! Core of the classcal ecosystem.
//!
//! This crate holds everything that does not depend on the terminal:
//! - `schedule` reads and validates a schedule JSON export
//! - `entry` maps raw records to display fields (location, description, dates)
//! - `export` renders Google Calendar CSV and iCalendar documents
//! - `emit` saves a rendered document
//! - `analysis` computes aggregate statistics over the entries

pub mod analysis;
pub mod emit;
pub mod entry;
pub mod error;
pub mod export;
pub mod schedule;

pub use entry::ScheduleEntry;
pub use error::{ClassCalError, ClassCalResult};
pub use export::{ExportDocument, ExportFormat};
