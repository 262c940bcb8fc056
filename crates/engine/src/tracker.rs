use chrono::NaiveDate;

use crate::{
    Budget, BudgetStore, Category, CategoryStore, CategoryTotal, DateRange, Expense, ExpenseDraft,
    ExpenseFilter, ExpenseRepository, MoneyCents, Period, ResultEngine, Summary,
    categories::orphaned_categories,
    statistics::{category_breakdown, total_for_period},
    store::{KeyValueStore, Persistence},
};

/// Entry point for callers: owns the stores and the current list filter.
///
/// Mutations go through the repositories; derived views (filtered list,
/// totals, summary) are recomputed from the in-memory snapshot on demand.
pub struct Tracker<S> {
    expenses: ExpenseRepository<S>,
    budget: BudgetStore<S>,
    categories: CategoryStore<S>,
    filter: ExpenseFilter,
}

impl<S: KeyValueStore + Clone> Tracker<S> {
    /// Return a builder for `Tracker`. Help to build the struct.
    pub fn builder(store: S) -> TrackerBuilder<S> {
        TrackerBuilder {
            store,
            persistence: Persistence::default(),
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        self.expenses.list()
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.get(id)
    }

    /// Validates the draft and stores it under a fresh id.
    pub fn add_expense(&mut self, draft: ExpenseDraft) -> ResultEngine<Expense> {
        let expense = draft.into_new_expense()?;
        self.expenses.add(expense.clone())?;
        tracing::info!("expense {} added ({})", expense.id, expense.amount);
        Ok(expense)
    }

    /// Validates the draft and replaces the expense with the given id.
    ///
    /// Returns `false` if no such expense exists.
    pub fn update_expense(&mut self, id: &str, draft: ExpenseDraft) -> ResultEngine<bool> {
        let expense = draft.into_expense(id)?;
        self.expenses.update(expense)
    }

    pub fn delete_expense(&mut self, id: &str) -> ResultEngine<usize> {
        self.expenses.delete(id)
    }

    pub fn budget(&self) -> Option<&Budget> {
        self.budget.get()
    }

    pub fn set_budget(&mut self, budget: Budget) -> ResultEngine<()> {
        self.budget.set(budget)
    }

    pub fn clear_budget(&mut self) -> ResultEngine<()> {
        self.budget.clear()
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.list()
    }

    pub fn add_category(&mut self, name: &str) -> ResultEngine<Category> {
        let category = Category::custom(name)?;
        self.categories.add(category.clone())?;
        Ok(category)
    }

    pub fn delete_category(&mut self, id: &str) -> ResultEngine<usize> {
        self.categories.delete(id)
    }

    pub fn filter(&self) -> &ExpenseFilter {
        &self.filter
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filter.search = term.into();
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.filter.category = category;
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.filter.date_range = range;
    }

    /// The expense list narrowed by the current filter.
    pub fn filtered_expenses(&self) -> Vec<Expense> {
        self.filter.apply(self.expenses())
    }

    /// Period total over all expenses, ignoring the list filter.
    pub fn total_for_period(&self, now: NaiveDate, period: Period) -> MoneyCents {
        total_for_period(self.expenses(), now, period)
    }

    pub fn summary(&self, now: NaiveDate) -> Summary {
        Summary::compute(self.expenses(), self.budget(), now)
    }

    /// Per-category totals of the filtered list.
    pub fn category_breakdown(&self) -> Vec<CategoryTotal> {
        category_breakdown(&self.filtered_expenses())
    }

    pub fn orphaned_categories(&self) -> Vec<String> {
        orphaned_categories(self.expenses(), self.categories())
    }

    /// Writes every pending change to the store.
    pub fn flush(&mut self) -> ResultEngine<()> {
        self.expenses.flush()?;
        self.budget.flush()?;
        self.categories.flush()?;
        Ok(())
    }

    /// Re-reads every record from the store, dropping unflushed changes.
    pub fn reload(&mut self) -> ResultEngine<()> {
        if self.is_dirty() {
            tracing::warn!("reload discards unflushed changes");
        }
        self.expenses.reload()?;
        self.budget.reload()?;
        self.categories.reload()?;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.expenses.is_dirty() || self.budget.is_dirty() || self.categories.is_dirty()
    }
}

/// The builder for `Tracker`
pub struct TrackerBuilder<S> {
    store: S,
    persistence: Persistence,
}

impl<S: KeyValueStore + Clone> TrackerBuilder<S> {
    /// Choose when mutations are written (default: immediately).
    pub fn persistence(mut self, persistence: Persistence) -> TrackerBuilder<S> {
        self.persistence = persistence;
        self
    }

    /// Load every record and construct `Tracker`
    pub fn build(self) -> ResultEngine<Tracker<S>> {
        let tracker = Tracker {
            expenses: ExpenseRepository::open(self.store.clone(), self.persistence)?,
            budget: BudgetStore::open(self.store.clone(), self.persistence)?,
            categories: CategoryStore::open(self.store, self.persistence)?,
            filter: ExpenseFilter::default(),
        };
        tracing::debug!(
            "tracker loaded: {} expenses, {} categories",
            tracker.expenses().len(),
            tracker.categories().len()
        );
        Ok(tracker)
    }
}
