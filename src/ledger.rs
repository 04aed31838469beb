//! Ledger entries and their aggregation
//!
//! A [`LedgerLine`] is the outcome of turning one raw record into a
//! [`LedgerEntry`]: either the entry or the reason it was rejected. One bad
//! record never stops the others from being built.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::error::LedgerError;
use crate::{parse, MonetaryAmount};

/// One labelled line item: a bill, budget category or account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    label: String,
    amount: MonetaryAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
}

impl LedgerEntry {
    /// Create an entry; the label must not be blank
    pub fn new(
        label: impl Into<String>,
        amount: MonetaryAmount,
        due_date: Option<String>,
    ) -> Result<Self, LedgerError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(LedgerError::InvalidEntry(
                "entry label cannot be empty".into(),
            ));
        }
        Ok(Self {
            label,
            amount,
            due_date,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> &MonetaryAmount {
        &self.amount
    }

    /// Free text, not validated as a date
    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }
}

/// Tagged result of building one ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LedgerLine {
    Valid(LedgerEntry),
    Invalid {
        label: String,
        raw: String,
        reason: String,
    },
}

impl LedgerLine {
    /// Parse `raw` and build an entry, capturing any failure in the line itself
    pub fn from_raw(label: &str, raw: &str, due_date: Option<&str>) -> Self {
        let built = parse(raw)
            .and_then(|amount| LedgerEntry::new(label, amount, due_date.map(str::to_string)));
        match built {
            Ok(entry) => LedgerLine::Valid(entry),
            Err(err) => {
                warn!(label, raw, error = %err, "skipping invalid ledger entry");
                LedgerLine::Invalid {
                    label: label.to_string(),
                    raw: raw.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LedgerLine::Valid(entry) => entry.label(),
            LedgerLine::Invalid { label, .. } => label,
        }
    }

    pub fn entry(&self) -> Option<&LedgerEntry> {
        match self {
            LedgerLine::Valid(entry) => Some(entry),
            LedgerLine::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, LedgerLine::Valid(_))
    }

    /// Primary value of a valid line
    pub fn primary_value(&self) -> Option<Decimal> {
        self.entry().map(|entry| entry.amount().primary_value())
    }
}

impl From<LedgerEntry> for LedgerLine {
    fn from(entry: LedgerEntry) -> Self {
        LedgerLine::Valid(entry)
    }
}

/// Sum the primary values of `lines`.
///
/// An empty sequence totals zero. Secondary amounts are never added. Fails
/// with [`LedgerError::Aggregation`] on the first invalid line, and with
/// [`LedgerError::Overflow`] if the total no longer fits a `Decimal`.
pub fn sum_primary<'a, I>(lines: I) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = &'a LedgerLine>,
{
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |total, line| match line {
            LedgerLine::Valid(entry) => checked_total(total, entry),
            LedgerLine::Invalid { label, .. } => Err(LedgerError::Aggregation {
                label: label.clone(),
            }),
        })
}

/// Sum the primary values of already validated entries
pub fn sum_entries(entries: &[LedgerEntry]) -> Result<Decimal, LedgerError> {
    entries.iter().try_fold(Decimal::ZERO, checked_total)
}

fn checked_total(total: Decimal, entry: &LedgerEntry) -> Result<Decimal, LedgerError> {
    total
        .checked_add(entry.amount().primary_value())
        .ok_or_else(|| LedgerError::Overflow {
            label: entry.label().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bill(label: &str, raw: &str) -> LedgerLine {
        LedgerLine::from_raw(label, raw, Some("1st June"))
    }

    #[test]
    fn test_entry_rejects_blank_label() {
        let amount = parse("$62.80").unwrap();
        let err = LedgerEntry::new("  ", amount, None).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidEntry(_)));
    }

    #[test]
    fn test_from_raw_valid() {
        let line = bill("O2 - Internet", "$39.99 (Monthly)");
        let entry = line.entry().unwrap();
        assert_eq!(entry.label(), "O2 - Internet");
        assert_eq!(entry.due_date(), Some("1st June"));
        assert_eq!(entry.amount().cadence(), Some("Monthly"));
        assert_eq!(line.primary_value(), Some(dec!(39.99)));
    }

    #[test]
    fn test_from_raw_invalid_is_tagged() {
        let line = bill("Broken", "39.99");
        assert!(!line.is_valid());
        assert_eq!(line.label(), "Broken");
        assert_eq!(line.primary_value(), None);
        match line {
            LedgerLine::Invalid { raw, reason, .. } => {
                assert_eq!(raw, "39.99");
                assert!(reason.contains("missing currency symbol"));
            }
            LedgerLine::Valid(_) => panic!("expected an invalid line"),
        }
    }

    #[test]
    fn test_from_raw_blank_label_is_tagged() {
        assert!(!bill("", "$1.00").is_valid());
    }

    #[test]
    fn test_sum_empty_is_zero() {
        let lines: Vec<LedgerLine> = Vec::new();
        assert_eq!(sum_primary(&lines).unwrap(), Decimal::ZERO);
        assert_eq!(sum_entries(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_sum_monthly_bills() {
        let lines = vec![
            bill("Germany Rent Payment", "$1,800.00 (Monthly)"),
            bill("O2 - Internet", "$39.99 (Monthly)"),
            bill("REWAG - Utilities", "$30.00 (Monthly)"),
        ];
        assert_eq!(sum_primary(&lines).unwrap(), dec!(1869.99));
    }

    #[test]
    fn test_sum_ignores_secondary() {
        let lines = vec![
            bill("Spent", "$3,166.19 (€3,036.30)"),
            bill("Other", "$2,801.97 (€2,687.30)"),
        ];
        assert_eq!(sum_primary(&lines).unwrap(), dec!(5968.16));
    }

    #[test]
    fn test_sum_entries_from_parse() {
        let raws = ["$1,800.00 (Monthly)", "$39.99 (Monthly)", "$30.00 (Monthly)"];
        let entries: Vec<LedgerEntry> = raws
            .iter()
            .map(|raw| LedgerEntry::new("bill", parse(raw).unwrap(), None).unwrap())
            .collect();
        assert_eq!(sum_entries(&entries).unwrap(), dec!(1869.99));

        let lines: Vec<LedgerLine> = entries.into_iter().map(LedgerLine::from).collect();
        assert_eq!(sum_primary(&lines).unwrap(), dec!(1869.99));
    }

    #[test]
    fn test_sum_fails_on_invalid_line() {
        let lines = vec![bill("Rent", "$1,800.00"), bill("Broken", "n/a")];
        match sum_primary(&lines) {
            Err(LedgerError::Aggregation { label }) => assert_eq!(label, "Broken"),
            other => panic!("expected aggregation error, got {other:?}"),
        }
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let max = "$79,228,162,514,264,337,593,543,950,335";
        let lines = vec![bill("Huge", max), bill("One more", "$1.00")];
        assert!(lines.iter().all(LedgerLine::is_valid));
        match sum_primary(&lines) {
            Err(LedgerError::Overflow { label }) => assert_eq!(label, "One more"),
            other => panic!("expected overflow error, got {other:?}"),
        }

        let entries: Vec<LedgerEntry> = lines
            .iter()
            .filter_map(LedgerLine::entry)
            .cloned()
            .collect();
        assert!(matches!(
            sum_entries(&entries),
            Err(LedgerError::Overflow { .. })
        ));
    }
}
