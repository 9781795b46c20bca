pub mod error;
pub mod guard;
pub mod host;
pub mod source;
pub mod sweep;

pub use error::SyncError;
pub use host::{BankImportSink, HttpHostSink, JobId};
pub use source::{EvStatementSource, StatementSource};
pub use sweep::{run_if_due, run_sweep, SweepReport};
