pub mod api;
pub mod banking;
pub mod csrf;
pub mod error;
pub mod session;

pub use api::{Booking, EvApi, EvInvoice, DEFAULT_API_BASE};
pub use banking::{ImportTask, PollConfig, TaskDetails, TaskList};
pub use error::ClientError;
pub use session::{EvSession, DEFAULT_WEB_BASE};
