pub mod config;
pub mod statement;

pub use config::{parse_bankaccount_ids, ConfigError, EvCredentials, OrganizerConfig};
pub use statement::BankStatementRow;
