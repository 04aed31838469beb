//! Read-only ledger dataset
//!
//! The dataset is loaded once at startup, from a JSON file or the built-in
//! sample, and handed to the report builder. Amounts stay raw strings here;
//! parsing happens per entry when the report is built.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use nom::combinator::all_consuming;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LedgerError;
use crate::util::date;

const SAMPLE_LEDGER: &str = include_str!("../data/sample_ledger.json");

/// A raw labelled amount as it appears in the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub label: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl RawEntry {
    pub fn new(label: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            amount: amount.into(),
            due_date: None,
        }
    }

    pub fn due(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }
}

/// One household budget with its spending categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub name: String,
    pub total: String,
    /// Stated amount spent; the category total is used when absent
    #[serde(default)]
    pub spent: Option<String>,
    #[serde(default)]
    pub categories: Vec<RawEntry>,
}

/// A group of accounts with an optional stated total and free-text note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountGroup {
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub accounts: Vec<RawEntry>,
    #[serde(default)]
    pub note: Option<String>,
}

/// The full dashboard dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerDataset {
    /// Reporting month
    pub period: NaiveDate,
    pub balance: String,
    pub budgets: Vec<BudgetRecord>,
    pub bills: Vec<RawEntry>,
    pub credit_cards: AccountGroup,
    pub investments: AccountGroup,
}

/// On-disk shape of a dataset; the period is validated after decoding
#[derive(Deserialize)]
struct DatasetFile {
    period: String,
    balance: String,
    #[serde(default)]
    budgets: Vec<BudgetRecord>,
    #[serde(default)]
    bills: Vec<RawEntry>,
    #[serde(default)]
    credit_cards: AccountGroup,
    #[serde(default)]
    investments: AccountGroup,
}

impl TryFrom<DatasetFile> for LedgerDataset {
    type Error = LedgerError;

    fn try_from(file: DatasetFile) -> Result<Self, Self::Error> {
        Ok(Self {
            period: Self::parse_period(&file.period)?,
            balance: file.balance,
            budgets: file.budgets,
            bills: file.bills,
            credit_cards: file.credit_cards,
            investments: file.investments,
        })
    }
}

impl LedgerDataset {
    /// Decode a dataset from JSON
    pub fn from_json_str(json: &str) -> Result<Self, LedgerError> {
        let file: DatasetFile = serde_json::from_str(json)?;
        let dataset = Self::try_from(file)?;
        debug!(
            period = %dataset.period,
            budgets = dataset.budgets.len(),
            bills = dataset.bills.len(),
            "decoded ledger dataset"
        );
        Ok(dataset)
    }

    /// Load a dataset from a JSON file
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        debug!(path = %path.display(), "loading ledger dataset");
        let contents = fs::read_to_string(path).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// The built-in sample household
    pub fn sample() -> Result<Self, LedgerError> {
        Self::from_json_str(SAMPLE_LEDGER)
    }

    /// Parse a period string such as `2024-05-01` or `2024/5/1`
    pub fn parse_period(s: &str) -> Result<NaiveDate, LedgerError> {
        all_consuming(date)(s.trim())
            .map(|(_, period)| period)
            .map_err(|_| LedgerError::Config(format!("invalid period '{}'", s)))
    }
}
