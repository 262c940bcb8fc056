//! Filtering of the expense list by search term, category and date range.

use chrono::NaiveDate;

use crate::{EngineError, Expense, ResultEngine, util::search_key};

/// Inclusive date range. A missing bound disables the range entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range, rejecting `start > end`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ResultEngine<Self> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(EngineError::InvalidDate(format!(
                "invalid range: {start} is after {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Returns `true` if the range restricts anything (both bounds set).
    pub fn is_active(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => true,
        }
    }
}

/// The three list predicates, ANDed together. Each one is disabled when unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub search: String,
    pub category: Option<String>,
    pub date_range: Option<DateRange>,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        Matcher::new(self).matches(expense)
    }

    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        let matcher = Matcher::new(self);
        expenses
            .iter()
            .filter(|expense| matcher.matches(expense))
            .cloned()
            .collect()
    }
}

/// Filters `expenses`, keeping their order.
///
/// - `search`: case-insensitive substring of description or category, taken
///   as given (whitespace included); empty disables it.
/// - `category`: exact category name; `None` or empty disables it.
/// - `date_range`: inclusive; `None` or a missing bound disables it.
pub fn filter_expenses(
    expenses: &[Expense],
    search: &str,
    category: Option<&str>,
    date_range: Option<&DateRange>,
) -> Vec<Expense> {
    ExpenseFilter {
        search: search.to_string(),
        category: category.map(ToString::to_string),
        date_range: date_range.copied(),
    }
    .apply(expenses)
}

/// Filter with the search key folded once.
struct Matcher<'a> {
    needle: Option<String>,
    category: Option<&'a str>,
    date_range: Option<&'a DateRange>,
}

impl<'a> Matcher<'a> {
    fn new(filter: &'a ExpenseFilter) -> Self {
        let needle = Some(filter.search.as_str())
            .filter(|term| !term.is_empty())
            .map(search_key);
        let category = filter
            .category
            .as_deref()
            .filter(|category| !category.is_empty());
        Self {
            needle,
            category,
            date_range: filter.date_range.as_ref(),
        }
    }

    fn matches(&self, expense: &Expense) -> bool {
        let matches_search = self.needle.as_deref().is_none_or(|needle| {
            search_key(&expense.description).contains(needle)
                || search_key(&expense.category).contains(needle)
        });
        let matches_category = self
            .category
            .is_none_or(|category| expense.category == category);
        let matches_range = self
            .date_range
            .is_none_or(|range| range.contains(expense.date));

        matches_search && matches_category && matches_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoneyCents;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: &str, category: &str, description: &str, date: NaiveDate) -> Expense {
        Expense {
            id: id.to_string(),
            amount: MoneyCents::new(1_000),
            category: category.to_string(),
            description: description.to_string(),
            date,
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("1", "Food", "Groceries", date(2024, 1, 5)),
            expense("2", "Bills", "Electricity", date(2024, 1, 20)),
            expense("3", "Travel", "Train to the seafood festival", date(2024, 2, 3)),
        ]
    }

    fn ids(expenses: &[Expense]) -> Vec<&str> {
        expenses.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let all = sample();
        assert_eq!(ids(&filter_expenses(&all, "", None, None)), ["1", "2", "3"]);
        assert_eq!(ids(&filter_expenses(&all, "", Some(""), None)), ["1", "2", "3"]);
    }

    #[test]
    fn search_whitespace_is_part_of_the_term() {
        let all = sample();
        assert!(filter_expenses(&all, "food ", None, None).is_empty());
        assert!(filter_expenses(&all, "   ", None, None).is_empty());
        assert_eq!(ids(&filter_expenses(&all, "to the", None, None)), ["3"]);
        assert_eq!(ids(&filter_expenses(&all, " ", None, None)), ["3"]);
    }

    #[test]
    fn search_matches_category_or_description_ignoring_case() {
        let all = sample();
        assert_eq!(ids(&filter_expenses(&all, "FOOD", None, None)), ["1", "3"]);
        assert_eq!(ids(&filter_expenses(&all, "electric", None, None)), ["2"]);
        assert!(filter_expenses(&all, "rent", None, None).is_empty());
    }

    #[test]
    fn category_filter_is_exact() {
        let all = sample();
        assert_eq!(ids(&filter_expenses(&all, "", Some("Bills"), None)), ["2"]);
        assert!(filter_expenses(&all, "", Some("bills"), None).is_empty());
    }

    #[test]
    fn date_range_is_inclusive() {
        let all = sample();
        let range = DateRange::new(Some(date(2024, 1, 5)), Some(date(2024, 1, 20))).unwrap();
        assert_eq!(ids(&filter_expenses(&all, "", None, Some(&range))), ["1", "2"]);
    }

    #[test]
    fn half_open_range_is_ignored() {
        let all = sample();
        let range = DateRange::new(Some(date(2024, 2, 1)), None).unwrap();
        assert!(!range.is_active());
        assert_eq!(filter_expenses(&all, "", None, Some(&range)).len(), 3);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            DateRange::new(Some(date(2024, 2, 1)), Some(date(2024, 1, 1))),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn predicates_are_anded() {
        let all = sample();
        let january = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))).unwrap();
        assert_eq!(ids(&filter_expenses(&all, "food", None, Some(&january))), ["1"]);
        assert!(filter_expenses(&all, "food", Some("Bills"), Some(&january)).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let all = sample();
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 12, 31))).unwrap();
        let cases: [(&str, Option<&str>, Option<&DateRange>); 4] = [
            ("", None, None),
            ("o", None, Some(&range)),
            ("", Some("Travel"), None),
            ("food", Some("Food"), Some(&range)),
        ];
        for (search, category, date_range) in cases {
            let once = filter_expenses(&all, search, category, date_range);
            let twice = filter_expenses(&once, search, category, date_range);
            assert_eq!(once, twice);
        }
    }
}
