//! Reshapes EV booking records into the host platform's statement rows.

use rust_decimal::Decimal;

use evsync_client::Booking;
use evsync_core::BankStatementRow;

/// Converts a batch of bookings into statement rows.
///
/// Records missing date, amount or description cannot form a valid row and
/// are dropped silently; upstream marks all of these optional, so gaps are
/// normal rather than an error. Outgoing payments (amount ≤ 0) are dropped
/// too — only incoming money is relevant for order reconciliation.
pub fn normalize_statement(bookings: impl IntoIterator<Item = Booking>) -> Vec<BankStatementRow> {
    bookings.into_iter().filter_map(normalize_booking).collect()
}

fn normalize_booking(b: Booking) -> Option<BankStatementRow> {
    let date = b.date?.date_naive();
    let amount = b.amount?;
    if amount <= Decimal::ZERO {
        tracing::debug!(%date, "dropping non-incoming booking");
        return None;
    }
    let reference = b.description.filter(|s| !s.is_empty())?;

    Some(BankStatementRow {
        date,
        amount: amount.to_string(),
        reference,
        payer: b.receiver.filter(|s| !s.is_empty()),
        iban: b.counterpart_iban.filter(|s| !s.is_empty()),
        bic: b.counterpart_bic.filter(|s| !s.is_empty()),
    })
}
