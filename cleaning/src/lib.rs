//! Turns a decoded match record into a consistent, analysis ready one.
//!
//! ```no_run
//! let mut diagnostics = cleaning::Diagnostics::new();
//! let mut cleaner = cleaning::DemoCleaner::new(
//!     cleaning::ParserConfig::default(),
//!     cleaning::CleanConfig::default(),
//!     &mut diagnostics,
//! );
//! cleaner.read_json("match.json".as_ref(), &mut diagnostics)?;
//! cleaner.clean(&mut diagnostics)?;
//! # Ok::<(), cleaning::Error>(())
//! ```

pub mod decoder;
pub mod diagnostics;
pub mod filters;
pub mod invariants;
pub mod pipeline;
pub mod renumber;
pub mod roster;
pub mod schema;
pub mod scoring;
pub mod tables;

mod error;

pub use decoder::{Decoder, ParserConfig};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use pipeline::{clean_record, CleanConfig, DemoCleaner, Stage};
pub use tables::Tables;
