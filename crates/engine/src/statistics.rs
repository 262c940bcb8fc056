//! Aggregations over an expense snapshot: period totals, per-category
//! breakdown and the budget summary.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{
    Budget, BudgetStatus, EngineError, Expense, MoneyCents, budget_progress, budget_remaining,
};

/// Calendar period containing a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Returns `true` if `date` falls in the same calendar day, month or year
    /// as `now`.
    pub fn contains(self, now: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Self::Daily => date == now,
            Self::Monthly => date.year() == now.year() && date.month() == now.month(),
            Self::Yearly => date.year() == now.year(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Sum of the amounts dated within the `period` that contains `now`.
pub fn total_for_period(expenses: &[Expense], now: NaiveDate, period: Period) -> MoneyCents {
    expenses
        .iter()
        .filter(|expense| period.contains(now, expense.date))
        .map(|expense| expense.amount)
        .sum()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: MoneyCents,
}

/// Totals per category name, largest first (ties by name).
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, MoneyCents> = HashMap::new();
    for expense in expenses {
        *totals.entry(expense.category.as_str()).or_default() += expense.amount;
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    out
}

/// Budget figures for the month containing the reference date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub budget: Budget,
    pub spent: MoneyCents,
    pub progress: f64,
    pub remaining: MoneyCents,
    pub status: BudgetStatus,
}

impl BudgetSummary {
    pub fn new(budget: Budget, spent: MoneyCents) -> Self {
        let progress = budget_progress(spent, Some(&budget));
        Self {
            budget,
            spent,
            progress,
            remaining: budget_remaining(spent, Some(&budget)),
            status: BudgetStatus::from_progress(progress),
        }
    }
}

/// Everything the dashboard shows for a reference date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub date: NaiveDate,
    pub daily: MoneyCents,
    pub monthly: MoneyCents,
    pub yearly: MoneyCents,
    pub budget: Option<BudgetSummary>,
}

impl Summary {
    pub fn compute(expenses: &[Expense], budget: Option<&Budget>, now: NaiveDate) -> Self {
        let daily = total_for_period(expenses, now, Period::Daily);
        let monthly = total_for_period(expenses, now, Period::Monthly);
        let yearly = total_for_period(expenses, now, Period::Yearly);

        // Progress is measured against the monthly total whatever the budget period.
        let budget = budget.map(|budget| BudgetSummary::new(*budget, monthly));

        Self {
            date: now,
            daily,
            monthly,
            yearly,
            budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BudgetPeriod;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(cents: i64, category: &str, date: NaiveDate) -> Expense {
        Expense {
            id: format!("{category}-{date}"),
            amount: MoneyCents::new(cents),
            category: category.to_string(),
            description: String::new(),
            date,
        }
    }

    fn january() -> Vec<Expense> {
        vec![
            expense(2_000, "Food", date(2024, 1, 5)),
            expense(5_000, "Bills", date(2024, 1, 20)),
        ]
    }

    #[test]
    fn monthly_scenario_matches_budget_figures() {
        let expenses = january();
        let budget = Budget::new(MoneyCents::new(10_000), BudgetPeriod::Monthly);
        let now = date(2024, 1, 25);

        let monthly = total_for_period(&expenses, now, Period::Monthly);
        assert_eq!(monthly, MoneyCents::new(7_000));
        assert_eq!(budget_progress(monthly, Some(&budget)), 70.0);
        assert_eq!(budget_remaining(monthly, Some(&budget)), MoneyCents::new(3_000));
    }

    #[test]
    fn calendar_boundaries_not_rolling_windows() {
        let expenses = january();
        assert_eq!(
            total_for_period(&expenses, date(2024, 2, 1), Period::Monthly),
            MoneyCents::ZERO
        );
        assert_eq!(
            total_for_period(&expenses, date(2024, 12, 31), Period::Yearly),
            MoneyCents::new(7_000)
        );
        assert_eq!(
            total_for_period(&expenses, date(2025, 1, 1), Period::Yearly),
            MoneyCents::ZERO
        );
        assert_eq!(
            total_for_period(&expenses, date(2024, 1, 20), Period::Daily),
            MoneyCents::new(5_000)
        );
        assert_eq!(
            total_for_period(&expenses, date(2023, 1, 20), Period::Monthly),
            MoneyCents::ZERO
        );
    }

    #[test]
    fn period_names_parse_or_report_invalid_period() {
        assert_eq!("Daily".parse::<Period>(), Ok(Period::Daily));
        assert_eq!(" yearly ".parse::<Period>(), Ok(Period::Yearly));
        assert_eq!(
            "weekly".parse::<Period>(),
            Err(EngineError::InvalidPeriod("weekly".to_string()))
        );
    }

    #[test]
    fn empty_input_totals_zero() {
        assert_eq!(total_for_period(&[], date(2024, 1, 1), Period::Yearly), MoneyCents::ZERO);
        assert!(category_breakdown(&[]).is_empty());
    }

    #[test]
    fn breakdown_sorts_largest_first() {
        let mut expenses = january();
        expenses.push(expense(4_000, "Food", date(2024, 3, 1)));
        expenses.push(expense(1_000, "Travel", date(2024, 3, 2)));
        expenses.push(expense(1_000, "Shopping", date(2024, 3, 3)));

        let breakdown = category_breakdown(&expenses);
        let flat: Vec<(&str, i64)> = breakdown
            .iter()
            .map(|t| (t.category.as_str(), t.total.cents()))
            .collect();
        assert_eq!(
            flat,
            [("Food", 6_000), ("Bills", 5_000), ("Shopping", 1_000), ("Travel", 1_000)]
        );
    }

    #[test]
    fn summary_measures_any_budget_against_the_monthly_total() {
        let expenses = vec![
            expense(2_000, "Food", date(2024, 1, 5)),
            expense(5_000, "Bills", date(2024, 3, 1)),
        ];
        let yearly = Budget::new(MoneyCents::new(10_000), BudgetPeriod::Yearly);

        let summary = Summary::compute(&expenses, Some(&yearly), date(2024, 3, 10));
        assert_eq!(summary.daily, MoneyCents::ZERO);
        assert_eq!(summary.monthly, MoneyCents::new(5_000));
        assert_eq!(summary.yearly, MoneyCents::new(7_000));

        let budget = summary.budget.unwrap();
        assert_eq!(budget.spent, MoneyCents::new(5_000));
        assert_eq!(budget.progress, 50.0);
        assert_eq!(budget.remaining, MoneyCents::new(5_000));
        assert_eq!(budget.status, BudgetStatus::Caution);

        assert!(Summary::compute(&expenses, None, date(2024, 3, 10)).budget.is_none());
    }
}
