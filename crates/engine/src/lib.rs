//! Expense tracking core.
//!
//! [`Tracker`] owns a [`KeyValueStore`] and exposes the operations a front end
//! needs: expense CRUD, the budget singleton, the category list, list
//! filtering and spending statistics. The aggregation functions are also
//! exported on their own; they are pure and work on any expense slice.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use engine::{Budget, BudgetPeriod, ExpenseDraft, MemoryStore, MoneyCents, Tracker};
//!
//! let mut tracker = Tracker::builder(MemoryStore::new()).build().unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
//! tracker
//!     .add_expense(ExpenseDraft::new(MoneyCents::new(20_00), "Food", "Groceries", day))
//!     .unwrap();
//! tracker
//!     .set_budget(Budget::new(MoneyCents::new(100_00), BudgetPeriod::Monthly))
//!     .unwrap();
//!
//! let summary = tracker.summary(day);
//! assert_eq!(summary.monthly, MoneyCents::new(20_00));
//! assert_eq!(summary.budget.unwrap().progress, 20.0);
//! ```

pub use budget::{
    Budget, BudgetPeriod, BudgetStatus, BudgetStore, budget_progress, budget_remaining,
};
pub use categories::{Category, CategoryStore, default_categories, orphaned_categories};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseDraft, ExpenseRepository};
pub use filter::{DateRange, ExpenseFilter, filter_expenses};
pub use money::MoneyCents;
pub use statistics::{
    BudgetSummary, CategoryTotal, Period, Summary, category_breakdown, total_for_period,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, Persistence};
pub use tracker::{Tracker, TrackerBuilder};

mod budget;
mod categories;
mod document;
mod error;
mod expenses;
mod filter;
mod money;
mod statistics;
pub mod store;
mod tracker;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
