//! Correlates host-platform invoice numbers with EV invoice records.
//!
//! Exact number match wins outright. Failing that, the download URL's query
//! string often carries the original filename, which embeds the number —
//! that fuzzy path only counts when it identifies exactly one record.

use std::collections::HashMap;

use url::Url;

use evsync_client::EvInvoice;

/// Builds the invoice-number → invoice map. EV invoices without a number
/// cannot be matched by anything and are left out.
pub fn invoice_map(invoices: Vec<EvInvoice>) -> HashMap<String, EvInvoice> {
    invoices
        .into_iter()
        .filter_map(|inv| inv.inv_number.clone().map(|n| (n, inv)))
        .collect()
}

/// Finds the EV invoice for a host-platform invoice number, if any.
///
/// An exact key hit short-circuits the fuzzy scan entirely. A fuzzy hit
/// requires the invoice path to be a well-formed URL whose query string
/// contains the number as a substring; more than one such hit is ambiguous
/// and treated as no match rather than a guess.
pub fn find_invoice<'a>(
    number: &str,
    invoices: &'a HashMap<String, EvInvoice>,
) -> Option<&'a EvInvoice> {
    if let Some(exact) = invoices.get(number) {
        return Some(exact);
    }

    let mut candidates = invoices.values().filter(|inv| {
        inv.path
            .as_deref()
            .and_then(|p| Url::parse(p).ok())
            .and_then(|u| u.query().map(|q| q.contains(number)))
            .unwrap_or(false)
    });

    let first = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }
    Some(first)
}
