//! EV's documented read API (API-key authenticated, paginated).
//!
//! Unlike the web-UI session this is a plain bearer-token API; it only ever
//! reads bookings and invoices, never mutates anything on the EV side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_API_BASE: &str = "https://easyverein.com/api/v1.7";

/// Server-side field projection for booking queries; keeps responses small.
const BOOKING_FIELDS: &str = "{date,amount,description,receiver,counterpartIban,counterpartBic}";
const BOOKING_PAGE_SIZE: u32 = 100;
const INVOICE_PAGE_SIZE: u32 = 1000;

/// A bank-transaction record as EV's read API reports it. Every field is
/// optional upstream; the normalizer decides what survives.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub counterpart_iban: Option<String>,
    #[serde(default)]
    pub counterpart_bic: Option<String>,
}

/// An EV invoice record, used only as a matching target.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvInvoice {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub inv_number: Option<String>,
    /// Download URL, possibly carrying the original filename in its query.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

pub struct EvApi {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EvApi {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetches all booking records, optionally limited server-side to dates
    /// strictly after midnight of (today − `days_back`). The result is a
    /// bounded in-memory vector, exhausting pagination at 100 per page.
    pub async fn fetch_bookings(
        &self,
        days_back: Option<u32>,
    ) -> Result<Vec<Booking>, ClientError> {
        let mut query = vec![
            ("query".to_string(), BOOKING_FIELDS.to_string()),
            ("limit".to_string(), BOOKING_PAGE_SIZE.to_string()),
        ];
        if let Some(days) = days_back {
            let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).date_naive();
            query.push((
                "date__gt".to_string(),
                format!("{}T00:00:00", cutoff.format("%Y-%m-%d")),
            ));
        }
        self.fetch_all("/booking", &query).await
    }

    /// Fetches all invoice records, exhausting pagination at 1000 per page.
    pub async fn fetch_invoices(&self) -> Result<Vec<EvInvoice>, ClientError> {
        let query = vec![("limit".to_string(), INVOICE_PAGE_SIZE.to_string())];
        self.fetch_all("/invoice", &query).await
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, ClientError> {
        let mut records = Vec::new();
        let mut url = format!("{}{}", self.base_url, path);
        let mut first = true;
        loop {
            let mut req = self.http.get(&url).bearer_auth(&self.api_key);
            if first {
                // The `next` URL already carries the full query string.
                req = req.query(query);
            }
            let page: Page<T> = req.send().await?.error_for_status()?.json().await?;
            records.extend(page.results);
            match page.next {
                Some(next) => {
                    url = next;
                    first = false;
                }
                None => break,
            }
        }
        Ok(records)
    }
}
