mod assembler;
mod error;
mod plural;
mod processor;
mod settings;
mod tally;

pub use assembler::ReportAssembler;
pub use error::{ReportError, Result};
pub use plural::Plural;
pub use processor::{Batch, Processor};
pub use settings::{ReportSettings, SummaryWording, DEFAULT_EARLY_CUTOFF_HOUR};
pub use tally::{Classification, EarlyFilter, Tally};
