pub mod invoice;
pub mod statement;

pub use invoice::{find_invoice, invoice_map};
pub use statement::normalize_statement;
