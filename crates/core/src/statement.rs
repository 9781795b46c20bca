use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized bank-statement row in the shape the host platform's
/// bank-transfer import expects. The date serializes as an ISO calendar date
/// and the amount stays a decimal string; the host converts both back on its
/// side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStatementRow {
    pub date: NaiveDate,
    /// Strictly positive decimal string. Outgoing payments never reach here.
    pub amount: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_date_as_iso_and_skips_absent_optionals() {
        let row = BankStatementRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: "49.99".to_string(),
            reference: "Membership fee".to_string(),
            payer: Some("Jane Doe".to_string()),
            iban: None,
            bic: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["amount"], "49.99");
        assert_eq!(json["payer"], "Jane Doe");
        assert!(json.get("iban").is_none());
        assert!(json.get("bic").is_none());
    }
}
