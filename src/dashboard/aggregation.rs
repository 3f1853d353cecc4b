//! Summary totals and monthly aggregates of transactions.
//!
//! Amounts are read as magnitudes, so expenses count the same whether they
//! were stored negative or positive. Sums are accumulated in whole cents to
//! make the results independent of the order of the input.

use std::collections::BTreeMap;

use time::{Date, Duration, Month};

use crate::transaction::{Transaction, TransactionType};

/// The number of most recent months in the monthly series.
pub const MONTHS_SHOWN: usize = 6;

/// Totals over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// The sum of income.
    pub total_income: f64,
    /// The sum of expenses as a non-negative number.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// The income and expenses of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAggregate {
    /// The first day of the month.
    pub month: Date,
    /// The month for display, e.g. "Jan 2025".
    pub label: String,
    /// The sum of income in the month.
    pub income: f64,
    /// The sum of expenses in the month as a non-negative number.
    pub expenses: f64,
    /// Income minus expenses for the month.
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct CentTotals {
    income: i64,
    expenses: i64,
}

impl CentTotals {
    fn add(&mut self, transaction: &Transaction) {
        let cents = to_cents(transaction.magnitude());

        match transaction.type_ {
            TransactionType::Income => self.income = self.income.saturating_add(cents),
            TransactionType::Expense => self.expenses = self.expenses.saturating_add(cents),
        }
    }

    fn income(&self) -> f64 {
        from_cents(self.income)
    }

    fn expenses(&self) -> f64 {
        from_cents(self.expenses)
    }

    fn balance(&self) -> f64 {
        from_cents(self.income.saturating_sub(self.expenses))
    }
}

/// Casting saturates, so amounts beyond the range of `i64` cents clamp to its limits.
fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn first_day_of_month(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(date.day()) - 1))
}

fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Format the month of `date` as, e.g., "Jan 2025".
pub fn format_month_label(date: Date) -> String {
    format!("{} {}", month_abbreviation(date.month()), date.year())
}

/// Total the income and expenses of `transactions`.
pub fn compute_summary(transactions: &[Transaction]) -> Summary {
    let mut totals = CentTotals::default();

    for transaction in transactions {
        totals.add(transaction);
    }

    Summary {
        total_income: totals.income(),
        total_expenses: totals.expenses(),
        balance: totals.balance(),
    }
}

/// Group `transactions` by calendar month and total each month.
///
/// Returns at most the [MONTHS_SHOWN] most recent months that have
/// transactions, oldest first. Months without transactions are skipped.
pub fn compute_monthly_series(transactions: &[Transaction]) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<Date, CentTotals> = BTreeMap::new();

    for transaction in transactions {
        months
            .entry(first_day_of_month(transaction.date))
            .or_default()
            .add(transaction);
    }

    let skip = months.len().saturating_sub(MONTHS_SHOWN);

    months
        .into_iter()
        .skip(skip)
        .map(|(month, totals)| MonthlyAggregate {
            month,
            label: format_month_label(month),
            income: totals.income(),
            expenses: totals.expenses(),
            balance: totals.balance(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{Date, OffsetDateTime, macros::date};

    use super::{Summary, compute_monthly_series, compute_summary, format_month_label};
    use crate::transaction::{Transaction, TransactionType};

    fn create_test_transaction(amount: f64, type_: TransactionType, date: Date) -> Transaction {
        Transaction {
            id: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            amount,
            type_,
            category: "Other".to_owned(),
            description: String::new(),
            date,
            owner_id: None,
        }
    }

    fn income(amount: f64, date: Date) -> Transaction {
        create_test_transaction(amount, TransactionType::Income, date)
    }

    fn expense(amount: f64, date: Date) -> Transaction {
        create_test_transaction(amount, TransactionType::Expense, date)
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        assert_eq!(compute_summary(&[]), Summary::default());
    }

    #[test]
    fn huge_amounts_do_not_overflow() {
        let transactions = [
            income(1e17, date!(2024 - 01 - 01)),
            income(1e17, date!(2024 - 01 - 02)),
            expense(-1e17, date!(2024 - 01 - 03)),
            expense(-1e17, date!(2024 - 01 - 04)),
        ];

        let summary = compute_summary(&transactions);
        let series = compute_monthly_series(&transactions);

        assert!(summary.total_income > 0.0);
        assert!(summary.total_expenses > 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].income, summary.total_income);
    }

    #[test]
    fn summary_reads_expense_magnitudes() {
        let transactions = [
            income(1000.0, date!(2024 - 01 - 01)),
            expense(-250.0, date!(2024 - 01 - 02)),
            // Written by an older client that stored expenses as positive amounts.
            expense(50.0, date!(2024 - 01 - 03)),
        ];

        let summary = compute_summary(&transactions);

        assert_eq!(
            summary,
            Summary {
                total_income: 1000.0,
                total_expenses: 300.0,
                balance: 700.0,
            }
        );
    }

    #[test]
    fn summary_can_be_negative() {
        let transactions = [
            income(10.0, date!(2024 - 01 - 01)),
            expense(-25.5, date!(2024 - 01 - 02)),
        ];

        assert_eq!(compute_summary(&transactions).balance, -15.5);
    }

    #[test]
    fn summary_is_exact_in_cents() {
        let transactions = [
            income(0.1, date!(2024 - 01 - 01)),
            income(0.2, date!(2024 - 01 - 01)),
        ];

        assert_eq!(compute_summary(&transactions).total_income, 0.3);
    }

    #[test]
    fn summary_is_independent_of_order() {
        let mut transactions = vec![
            income(0.1, date!(2024 - 01 - 01)),
            expense(-19.99, date!(2024 - 02 - 01)),
            income(1234.56, date!(2024 - 03 - 01)),
            expense(0.7, date!(2024 - 04 - 01)),
        ];
        let want = compute_summary(&transactions);

        transactions.reverse();
        assert_eq!(compute_summary(&transactions), want);
        transactions.swap(0, 2);
        assert_eq!(compute_summary(&transactions), want);
    }

    #[test]
    fn monthly_series_groups_by_month() {
        let transactions = [
            income(3000.0, date!(2024 - 02 - 28)),
            expense(-100.0, date!(2024 - 01 - 15)),
            expense(-50.0, date!(2024 - 01 - 31)),
            income(20.0, date!(2024 - 01 - 01)),
        ];

        let series = compute_monthly_series(&transactions);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, date!(2024 - 01 - 01));
        assert_eq!(series[0].label, "Jan 2024");
        assert_eq!(series[0].income, 20.0);
        assert_eq!(series[0].expenses, 150.0);
        assert_eq!(series[0].balance, -130.0);
        assert_eq!(series[1].month, date!(2024 - 02 - 01));
        assert_eq!(series[1].label, "Feb 2024");
        assert_eq!(series[1].income, 3000.0);
        assert_eq!(series[1].expenses, 0.0);
        assert_eq!(series[1].balance, 3000.0);
    }

    #[test]
    fn monthly_series_keeps_last_six_months() {
        let transactions: Vec<_> = (1u8..=8)
            .map(|month| {
                let date = Date::from_calendar_date(2024, month.try_into().unwrap(), 10).unwrap();
                income(f64::from(month), date)
            })
            .collect();

        let series = compute_monthly_series(&transactions);

        let labels: Vec<_> = series.iter().map(|month| month.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Mar 2024", "Apr 2024", "May 2024", "Jun 2024", "Jul 2024", "Aug 2024"
            ]
        );
        assert_eq!(series[0].income, 3.0);
    }

    #[test]
    fn monthly_series_orders_across_years() {
        let transactions = [
            expense(-1.0, date!(2025 - 01 - 05)),
            expense(-1.0, date!(2024 - 12 - 05)),
        ];

        let series = compute_monthly_series(&transactions);

        let labels: Vec<_> = series.iter().map(|month| month.label.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2024", "Jan 2025"]);
    }

    #[test]
    fn monthly_series_is_independent_of_order() {
        let mut transactions = vec![
            income(0.1, date!(2024 - 01 - 01)),
            expense(-0.2, date!(2024 - 01 - 09)),
            income(0.3, date!(2024 - 02 - 01)),
            expense(-0.4, date!(2024 - 02 - 20)),
        ];
        let want = compute_monthly_series(&transactions);

        transactions.reverse();

        assert_eq!(compute_monthly_series(&transactions), want);
    }

    #[test]
    fn monthly_series_of_nothing_is_empty() {
        assert!(compute_monthly_series(&[]).is_empty());
    }

    #[test]
    fn month_label_uses_short_month_and_year() {
        assert_eq!(format_month_label(date!(2025 - 09 - 17)), "Sep 2025");
    }
}
