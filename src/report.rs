//! Dashboard report
//!
//! Builds every section of the household dashboard from a [`LedgerDataset`]:
//! parsed lines, computed totals, remaining budget, and reconciliation of
//! stated totals against their breakdown. Building never fails; bad lines are
//! carried as [`LedgerLine::Invalid`] and any total that depends on them is
//! `None`.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AccountGroup, BudgetRecord, LedgerDataset, RawEntry};
use crate::ledger::{sum_primary, LedgerLine};
use crate::util::group_thousands;

const REPORT_WIDTH: usize = 56;
const LABEL_WIDTH: usize = 28;
const DEFAULT_SYMBOL: &str = "$";

/// A stated total that disagrees with the sum of its breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub stated: Decimal,
    pub computed: Decimal,
}

/// Bills, credit cards or investments
#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub title: String,
    pub stated_total: Option<LedgerLine>,
    pub lines: Vec<LedgerLine>,
    /// Sum of `lines`, `None` when any line is invalid
    pub computed_total: Option<Decimal>,
    pub mismatch: Option<Mismatch>,
    pub note: Option<String>,
}

impl SectionReport {
    fn build(
        title: &str,
        stated_total: Option<&str>,
        entries: &[RawEntry],
        note: Option<&str>,
    ) -> Self {
        let stated_total = stated_total.map(|raw| LedgerLine::from_raw(title, raw, None));
        let lines = build_lines(entries);
        let computed_total = sum_primary(&lines).ok();
        let mismatch = reconcile(title, stated_total.as_ref(), computed_total);
        Self {
            title: title.to_string(),
            stated_total,
            lines,
            computed_total,
            mismatch,
            note: note.map(str::to_string),
        }
    }

    fn from_group(title: &str, group: &AccountGroup) -> Self {
        Self::build(
            title,
            group.total.as_deref(),
            &group.accounts,
            group.note.as_deref(),
        )
    }

    /// Stated total when valid, otherwise the computed one
    pub fn total(&self) -> Option<Decimal> {
        self.stated_total
            .as_ref()
            .and_then(LedgerLine::primary_value)
            .or(self.computed_total)
    }

    pub fn invalid_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_valid()).count()
    }
}

/// One household budget
#[derive(Debug, Clone, Serialize)]
pub struct BudgetReport {
    pub name: String,
    pub total: LedgerLine,
    pub spent: Option<LedgerLine>,
    pub categories: Vec<LedgerLine>,
    pub category_total: Option<Decimal>,
    /// Total minus spent; spent falls back to the category total
    pub remaining: Option<Decimal>,
    pub mismatch: Option<Mismatch>,
}

impl BudgetReport {
    fn build(record: &BudgetRecord) -> Self {
        let total = LedgerLine::from_raw(&record.name, &record.total, None);
        let spent = record
            .spent
            .as_deref()
            .map(|raw| LedgerLine::from_raw(&record.name, raw, None));
        let categories = build_lines(&record.categories);
        let category_total = sum_primary(&categories).ok();
        let mismatch = reconcile(&record.name, spent.as_ref(), category_total);

        let spent_value = match &spent {
            Some(line) => line.primary_value(),
            None => category_total,
        };
        let remaining = match (total.primary_value(), spent_value) {
            (Some(total), Some(spent)) => Some(total - spent),
            _ => None,
        };

        Self {
            name: record.name.clone(),
            total,
            spent,
            categories,
            category_total,
            remaining,
            mismatch,
        }
    }
}

/// The whole dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub period: NaiveDate,
    pub currency: String,
    pub balance: LedgerLine,
    pub budgets: Vec<BudgetReport>,
    pub bills: SectionReport,
    pub credit_cards: SectionReport,
    pub investments: SectionReport,
    /// Remaining across all budgets, `None` if any budget could not be computed
    /// or the total overflows
    pub remaining_total: Option<Decimal>,
}

impl DashboardReport {
    pub fn build(dataset: &LedgerDataset) -> Self {
        let balance = LedgerLine::from_raw("Balance", &dataset.balance, None);
        let currency = balance
            .entry()
            .map(|entry| entry.amount().primary_symbol().to_string())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        let budgets: Vec<BudgetReport> =
            dataset.budgets.iter().map(BudgetReport::build).collect();
        let remaining_total = budgets.iter().try_fold(Decimal::ZERO, |total, budget| {
            total.checked_add(budget.remaining?)
        });

        let report = Self {
            period: dataset.period,
            currency,
            balance,
            budgets,
            bills: SectionReport::build("Bills", None, &dataset.bills, None),
            credit_cards: SectionReport::from_group("Credit Cards", &dataset.credit_cards),
            investments: SectionReport::from_group("Investments", &dataset.investments),
            remaining_total,
        };
        info!(
            period = %report.period,
            invalid = report.invalid_count(),
            "built dashboard report"
        );
        report
    }

    /// Total of the bills section
    pub fn total_due(&self) -> Option<Decimal> {
        self.bills.computed_total
    }

    /// Number of lines across the report that failed to parse
    pub fn invalid_count(&self) -> usize {
        let budget_lines = self.budgets.iter().flat_map(|budget| {
            std::iter::once(&budget.total)
                .chain(budget.spent.iter())
                .chain(budget.categories.iter())
        });
        let section_lines = [&self.bills, &self.credit_cards, &self.investments]
            .into_iter()
            .flat_map(|section| section.stated_total.iter().chain(section.lines.iter()));

        std::iter::once(&self.balance)
            .chain(budget_lines)
            .chain(section_lines)
            .filter(|line| !line.is_valid())
            .count()
    }

    /// One-line remaining budget summary, e.g.
    /// `You have $231.84 remaining across 2 budgets for May 2024.`
    pub fn summary(&self) -> Option<String> {
        if self.budgets.is_empty() {
            return None;
        }
        let remaining = self.remaining_total?;
        let budgets = match self.budgets.len() {
            1 => "1 budget".to_string(),
            n => format!("{} budgets", n),
        };
        let period = self.period.format("%B %Y");
        if remaining.is_sign_negative() && !remaining.is_zero() {
            Some(format!(
                "You are {} over across {} for {}.",
                self.money(remaining.abs()),
                budgets,
                period
            ))
        } else {
            Some(format!(
                "You have {} remaining across {} for {}.",
                self.money(remaining),
                budgets,
                period
            ))
        }
    }

    fn money(&self, value: Decimal) -> String {
        format!("{}{}", self.currency, group_thousands(value))
    }

    fn money_or_na(&self, value: Option<Decimal>) -> String {
        value.map_or_else(|| "n/a".to_string(), |value| self.money(value))
    }
}

fn build_lines(entries: &[RawEntry]) -> Vec<LedgerLine> {
    entries
        .iter()
        .map(|entry| LedgerLine::from_raw(&entry.label, &entry.amount, entry.due_date.as_deref()))
        .collect()
}

fn reconcile(
    context: &str,
    stated: Option<&LedgerLine>,
    computed: Option<Decimal>,
) -> Option<Mismatch> {
    let stated = stated?.primary_value()?;
    let computed = computed?;
    if stated == computed {
        return None;
    }
    warn!(context, %stated, %computed, "stated total does not match its breakdown");
    Some(Mismatch { stated, computed })
}

fn separator(width: usize) -> String {
    "─".repeat(width)
}

fn double_separator(width: usize) -> String {
    "═".repeat(width)
}

fn write_line(f: &mut fmt::Formatter<'_>, indent: &str, line: &LedgerLine) -> fmt::Result {
    match line {
        LedgerLine::Valid(entry) => {
            write!(f, "{indent}{:<LABEL_WIDTH$}{}", entry.label(), entry.amount())?;
            if let Some(due) = entry.due_date() {
                write!(f, "  (due {})", due)?;
            }
            writeln!(f)
        }
        LedgerLine::Invalid { label, reason, .. } => {
            writeln!(f, "{indent}{:<LABEL_WIDTH$}!! {}", label, reason)
        }
    }
}

fn write_mismatch(
    f: &mut fmt::Formatter<'_>,
    report: &DashboardReport,
    mismatch: Option<Mismatch>,
) -> fmt::Result {
    if let Some(mismatch) = mismatch {
        writeln!(
            f,
            "  !! stated {} but breakdown sums to {}",
            report.money(mismatch.stated),
            report.money(mismatch.computed)
        )?;
    }
    Ok(())
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    report: &DashboardReport,
    section: &SectionReport,
    total_label: &str,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", section.title)?;
    writeln!(f, "{}", separator(REPORT_WIDTH))?;
    for line in &section.lines {
        write_line(f, "  ", line)?;
    }
    writeln!(
        f,
        "  {:<LABEL_WIDTH$}{}",
        total_label,
        report.money_or_na(section.total())
    )?;
    write_mismatch(f, report, section.mismatch)?;
    if let Some(note) = &section.note {
        writeln!(f, "  {}", note)?;
    }
    Ok(())
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Household Ledger: {}", self.period.format("%B %Y"))?;
        writeln!(f, "{}", double_separator(REPORT_WIDTH))?;
        write_line(f, "", &self.balance)?;

        if !self.budgets.is_empty() {
            writeln!(f)?;
            writeln!(f, "Monthly Spending")?;
            writeln!(f, "{}", separator(REPORT_WIDTH))?;
        }
        for budget in &self.budgets {
            writeln!(f, "{}", budget.name)?;
            match &budget.total {
                LedgerLine::Valid(entry) => {
                    writeln!(f, "  {:<LABEL_WIDTH$}{}", "Total budget", entry.amount())?
                }
                invalid => write_line(f, "  ", invalid)?,
            }
            match &budget.spent {
                Some(LedgerLine::Valid(entry)) => {
                    writeln!(f, "  {:<LABEL_WIDTH$}{}", "Spent", entry.amount())?
                }
                Some(invalid) => write_line(f, "  ", invalid)?,
                None => writeln!(
                    f,
                    "  {:<LABEL_WIDTH$}{}",
                    "Spent",
                    self.money_or_na(budget.category_total)
                )?,
            }
            writeln!(
                f,
                "  {:<LABEL_WIDTH$}{}",
                "Remaining",
                self.money_or_na(budget.remaining)
            )?;
            write_mismatch(f, self, budget.mismatch)?;
            for category in &budget.categories {
                write_line(f, "    ", category)?;
            }
        }
        if let Some(summary) = self.summary() {
            writeln!(f)?;
            writeln!(f, "{}", summary)?;
        }

        write_section(f, self, &self.bills, "Total due")?;
        write_section(f, self, &self.credit_cards, "Total debt")?;
        write_section(f, self, &self.investments, "Total investments")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_report() -> DashboardReport {
        DashboardReport::build(&LedgerDataset::sample().unwrap())
    }

    #[test]
    fn test_sample_totals() {
        let report = sample_report();
        assert_eq!(report.currency, "$");
        assert_eq!(report.total_due(), Some(dec!(1869.99)));
        assert_eq!(report.credit_cards.computed_total, Some(dec!(5420.10)));
        assert_eq!(report.investments.computed_total, Some(dec!(53926.44)));
        assert_eq!(report.invalid_count(), 0);
    }

    #[test]
    fn test_sample_reconciles() {
        let report = sample_report();
        assert_eq!(report.credit_cards.mismatch, None);
        assert_eq!(report.investments.mismatch, None);
        for budget in &report.budgets {
            assert_eq!(budget.mismatch, None, "{} does not reconcile", budget.name);
        }
    }

    #[test]
    fn test_sample_remaining() {
        let report = sample_report();
        assert_eq!(report.budgets[0].remaining, Some(dec!(33.81)));
        assert_eq!(report.budgets[1].remaining, Some(dec!(198.03)));
        assert_eq!(report.remaining_total, Some(dec!(231.84)));
        assert_eq!(
            report.summary().as_deref(),
            Some("You have $231.84 remaining across 2 budgets for May 2024.")
        );
    }

    #[test]
    fn test_spent_falls_back_to_categories() {
        let mut dataset = LedgerDataset::sample().unwrap();
        dataset.budgets[0].spent = None;
        let report = DashboardReport::build(&dataset);
        assert_eq!(report.budgets[0].spent, None);
        assert_eq!(report.budgets[0].remaining, Some(dec!(33.81)));
    }

    #[test]
    fn test_mismatch_detected() {
        let mut dataset = LedgerDataset::sample().unwrap();
        dataset.investments.total = Some("$50,000.00".into());
        let report = DashboardReport::build(&dataset);
        assert_eq!(
            report.investments.mismatch,
            Some(Mismatch {
                stated: dec!(50000.00),
                computed: dec!(53926.44)
            })
        );
        assert_eq!(report.investments.total(), Some(dec!(50000.00)));
    }

    #[test]
    fn test_invalid_line_does_not_break_report() {
        let mut dataset = LedgerDataset::sample().unwrap();
        dataset.bills[1].amount = "thirty-nine".into();
        dataset.budgets[1].categories[0].amount = "".into();
        let report = DashboardReport::build(&dataset);

        assert_eq!(report.invalid_count(), 2);
        assert_eq!(report.bills.invalid_count(), 1);
        assert_eq!(report.total_due(), None);
        assert!(report.bills.lines[0].is_valid());
        assert_eq!(report.budgets[1].category_total, None);
        // stated spent still gives a remaining figure
        assert_eq!(report.budgets[1].remaining, Some(dec!(198.03)));
        assert_eq!(report.investments.computed_total, Some(dec!(53926.44)));
    }

    #[test]
    fn test_overspent_summary() {
        let mut dataset = LedgerDataset::sample().unwrap();
        dataset.budgets.truncate(1);
        dataset.budgets[0].total = "$3,000.00".into();
        let report = DashboardReport::build(&dataset);
        assert_eq!(report.remaining_total, Some(dec!(-166.19)));
        assert_eq!(
            report.summary().as_deref(),
            Some("You are $166.19 over across 1 budget for May 2024.")
        );
    }

    #[test]
    fn test_huge_budgets_do_not_overflow() {
        let huge = BudgetRecord {
            name: "Huge".into(),
            total: "$79,228,162,514,264,337,593,543,950,335".into(),
            spent: Some("$0.00".into()),
            categories: Vec::new(),
        };
        let mut dataset = LedgerDataset::sample().unwrap();
        dataset.budgets = vec![huge.clone(), huge];
        dataset.investments.accounts = vec![
            RawEntry::new("A", "$79,228,162,514,264,337,593,543,950,335"),
            RawEntry::new("B", "$1.00"),
        ];
        let report = DashboardReport::build(&dataset);

        assert_eq!(report.budgets[0].remaining, Some(Decimal::MAX));
        assert_eq!(report.remaining_total, None);
        assert_eq!(report.summary(), None);
        assert_eq!(report.investments.computed_total, None);
        assert_eq!(report.investments.invalid_count(), 0);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset =
            LedgerDataset::from_json_str(r#"{"period": "2024-05-01", "balance": "$0.00"}"#)
                .unwrap();
        let report = DashboardReport::build(&dataset);
        assert_eq!(report.total_due(), Some(Decimal::ZERO));
        assert_eq!(report.remaining_total, Some(Decimal::ZERO));
        assert_eq!(report.summary(), None);
    }

    #[test]
    fn test_render_text() {
        let text = sample_report().to_string();
        assert!(text.starts_with("Household Ledger: May 2024\n"));
        assert!(text.contains("$25,580.75 (€24,526.50)"));
        assert!(text.contains("$1,800.00 (Monthly)  (due 1st June)"));
        assert!(text.contains("$1,869.99"));
        assert!(text.contains("$33.81"));
        assert!(text.contains("You have $231.84 remaining"));
        assert!(text.contains("utilization rate"));
        assert!(!text.contains("!!"));
    }

    #[test]
    fn test_serialize_json() {
        let value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(value["period"], "2024-05-01");
        assert_eq!(value["remaining_total"], "231.84");
        assert_eq!(value["bills"]["computed_total"], "1869.99");
        assert_eq!(value["bills"]["lines"][0]["status"], "valid");
        assert_eq!(value["bills"]["lines"][0]["amount"]["cadence"], "Monthly");
    }
}
