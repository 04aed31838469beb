//! household-ledger: parse and total the currency strings of a household
//! finance dashboard.
//!
//! Amounts arrive as semi-structured strings such as `"$1,800.00 (Monthly)"` or
//! `"$3,166.19 (€3,036.30)"`. [`parse`] turns one into a [`MonetaryAmount`],
//! [`LedgerLine`] keeps a per-entry success or failure, and [`sum_primary`]
//! totals the primary currency. [`DashboardReport`] builds the whole dashboard
//! from a [`LedgerDataset`].
//!
//! ```
//! use household_ledger::parse;
//!
//! let rent = parse("$1,800.00 (Monthly)").unwrap();
//! assert_eq!(rent.primary_symbol(), "$");
//! assert_eq!(rent.cadence(), Some("Monthly"));
//! ```

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::{take_till1, take_until, take_while1},
    character::complete::char,
    combinator::all_consuming,
    sequence::delimited,
    IResult,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::trace;

pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod report;
pub mod util;

pub use config::LedgerDataset;
pub use error::LedgerError;
pub use ledger::{sum_entries, sum_primary, LedgerEntry, LedgerLine};
pub use report::DashboardReport;

use util::{group_thousands, plain_decimal};

/// A non-negative value in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyValue {
    pub symbol: String,
    pub value: Decimal,
}

impl CurrencyValue {
    pub fn new(symbol: impl Into<String>, value: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            value,
        }
    }
}

impl fmt::Display for CurrencyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol, group_thousands(self.value))
    }
}

/// A parsed amount: primary currency, an optional converted amount in a
/// secondary currency, and an optional cadence such as `Monthly`.
///
/// Secondary amount and cadence come from the same parenthesized annotation,
/// so at most one of them is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonetaryAmount {
    primary: CurrencyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    secondary: Option<CurrencyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cadence: Option<String>,
}

impl MonetaryAmount {
    pub fn primary(&self) -> &CurrencyValue {
        &self.primary
    }

    pub fn primary_value(&self) -> Decimal {
        self.primary.value
    }

    pub fn primary_symbol(&self) -> &str {
        &self.primary.symbol
    }

    pub fn secondary(&self) -> Option<&CurrencyValue> {
        self.secondary.as_ref()
    }

    pub fn secondary_value(&self) -> Option<Decimal> {
        self.secondary.as_ref().map(|s| s.value)
    }

    pub fn secondary_symbol(&self) -> Option<&str> {
        self.secondary.as_ref().map(|s| s.symbol.as_str())
    }

    pub fn cadence(&self) -> Option<&str> {
        self.cadence.as_deref()
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)?;
        if let Some(secondary) = &self.secondary {
            write!(f, " ({})", secondary)?;
        } else if let Some(cadence) = &self.cadence {
            write!(f, " ({})", cadence)?;
        }
        Ok(())
    }
}

impl FromStr for MonetaryAmount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn is_symbol_char(c: char) -> bool {
    !(c.is_ascii_digit() || c.is_whitespace() || matches!(c, ',' | '.' | '(' | ')' | '+' | '-'))
}

/// Leading currency glyphs, e.g. `$`, `€` or `CHF`
pub fn currency_symbol(input: &str) -> IResult<&str, &str> {
    take_while1(is_symbol_char)(input)
}

/// Everything up to the first whitespace or opening parenthesis
pub fn numeric_field(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || c == '(')(input)
}

/// Content of one parenthesized group
pub fn annotation(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_until(")"), char(')'))(input)
}

fn field_value(field: &str) -> Result<Decimal, &'static str> {
    let digits: String = field.chars().filter(|&c| c != ',').collect();
    all_consuming(plain_decimal)(digits.as_str())
        .map_err(|_| "numeric field is not a decimal")?;
    let value =
        Decimal::from_str(&digits).map_err(|_| "numeric field is out of range")?;

    // from_str rounds away digits past 28 significant places
    let fraction = digits.split_once('.').map_or("", |(_, fraction)| fraction);
    let kept = value.scale() as usize;
    if fraction.len() > kept && fraction[kept..].bytes().any(|b| b != b'0') {
        return Err("numeric field has more precision than an amount can hold");
    }
    Ok(value)
}

/// Parse a currency string such as `"$3,166.19 (€3,036.30)"`.
///
/// Only the first parenthesized group is interpreted. If its content is itself
/// a plain amount it becomes the secondary amount, otherwise it is kept
/// verbatim as the cadence.
pub fn parse(raw: &str) -> Result<MonetaryAmount, LedgerError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(LedgerError::malformed(raw, "empty input"));
    }

    let (rest, symbol) = currency_symbol(input)
        .map_err(|_| LedgerError::malformed(raw, "missing currency symbol"))?;
    let (rest, field) =
        numeric_field(rest).map_err(|_| LedgerError::malformed(raw, "missing numeric field"))?;
    let value =
        field_value(field).map_err(|reason| LedgerError::malformed(raw, reason))?;
    let primary = CurrencyValue::new(symbol, value);

    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(MonetaryAmount {
            primary,
            secondary: None,
            cadence: None,
        });
    }

    let (ignored, content) = annotation(rest)
        .map_err(|_| LedgerError::malformed(raw, "expected a parenthesized annotation"))?;
    let ignored = ignored.trim();
    if !ignored.is_empty() {
        trace!(input = raw, ignored, "ignoring text after first annotation");
    }

    let (secondary, cadence) = classify_annotation(content);
    Ok(MonetaryAmount {
        primary,
        secondary,
        cadence,
    })
}

fn classify_annotation(content: &str) -> (Option<CurrencyValue>, Option<String>) {
    if content.trim().is_empty() {
        return (None, None);
    }
    match parse(content) {
        Ok(MonetaryAmount {
            primary,
            secondary: None,
            cadence: None,
        }) => (Some(primary), None),
        _ => (None, Some(content.to_string())),
    }
}
