//! Expense records and their repository.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    document::Document,
    store::{EXPENSES_KEY, KeyValueStore, Persistence},
    util::normalize_required_text,
};

/// A single logged expense.
///
/// `category` references a [`Category`](crate::Category) by name, not by id.
/// Renaming or deleting the category leaves the string in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: MoneyCents,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// User input for creating or editing an expense, validated on submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub amount: MoneyCents,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl ExpenseDraft {
    pub fn new(
        amount: MoneyCents,
        category: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            category: category.into(),
            description: description.into(),
            date,
        }
    }

    /// Validates the draft and turns it into an expense with the given id.
    pub fn into_expense(self, id: impl Into<String>) -> ResultEngine<Expense> {
        if !self.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be greater than 0".to_string(),
            ));
        }
        let category = normalize_required_text(&self.category, "category")?;
        let description = normalize_required_text(&self.description, "description")?;
        Ok(Expense {
            id: id.into(),
            amount: self.amount,
            category,
            description,
            date: self.date,
        })
    }

    /// Validates the draft and assigns a fresh id.
    pub fn into_new_expense(self) -> ResultEngine<Expense> {
        self.into_expense(Uuid::new_v4().to_string())
    }
}

impl From<&Expense> for ExpenseDraft {
    fn from(expense: &Expense) -> Self {
        Self {
            amount: expense.amount,
            category: expense.category.clone(),
            description: expense.description.clone(),
            date: expense.date,
        }
    }
}

/// Stored expenses, in insertion order.
///
/// The repository does not validate records and does not enforce unique ids;
/// that is the caller's job (see [`ExpenseDraft`]).
pub struct ExpenseRepository<S> {
    document: Document<S, Vec<Expense>>,
}

impl<S: KeyValueStore> ExpenseRepository<S> {
    /// Loads the collection. A malformed payload yields an empty collection.
    pub fn open(store: S, persistence: Persistence) -> ResultEngine<Self> {
        Ok(Self {
            document: Document::open(store, EXPENSES_KEY, persistence, Vec::new)?,
        })
    }

    pub fn list(&self) -> &[Expense] {
        self.document.get()
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.list().iter().find(|expense| expense.id == id)
    }

    pub fn add(&mut self, expense: Expense) -> ResultEngine<()> {
        tracing::debug!("adding expense {}", expense.id);
        self.document.update(|records| {
            records.push(expense);
            ((), true)
        })
    }

    /// Replaces the first record with the same id.
    ///
    /// Returns `false` (and writes nothing) when no record matches.
    pub fn update(&mut self, expense: Expense) -> ResultEngine<bool> {
        let id = expense.id.clone();
        let replaced = self.document.update(|records| {
            match records.iter_mut().find(|record| record.id == expense.id) {
                Some(record) => {
                    *record = expense;
                    (true, true)
                }
                None => (false, false),
            }
        })?;
        if replaced {
            tracing::debug!("updated expense {id}");
        } else {
            tracing::warn!("update skipped: expense {id} not found");
        }
        Ok(replaced)
    }

    /// Removes every record with the given id and returns how many went.
    pub fn delete(&mut self, id: &str) -> ResultEngine<usize> {
        let removed = self.document.update(|records| {
            let before = records.len();
            records.retain(|record| record.id != id);
            let removed = before - records.len();
            (removed, removed > 0)
        })?;
        if removed == 0 {
            tracing::warn!("delete skipped: expense {id} not found");
        } else {
            tracing::debug!("deleted {removed} record(s) for expense {id}");
        }
        Ok(removed)
    }

    pub fn flush(&mut self) -> ResultEngine<()> {
        self.document.flush()
    }

    pub fn reload(&mut self) -> ResultEngine<()> {
        self.document.reload()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: &str, cents: i64) -> Expense {
        Expense {
            id: id.to_string(),
            amount: MoneyCents::new(cents),
            category: "Food".to_string(),
            description: "Lunch".to_string(),
            date: date(2024, 1, 5),
        }
    }

    #[test]
    fn draft_rejects_non_positive_amounts() {
        for cents in [0, -500] {
            let draft =
                ExpenseDraft::new(MoneyCents::new(cents), "Food", "Lunch", date(2024, 1, 5));
            assert!(matches!(
                draft.into_new_expense(),
                Err(EngineError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn draft_requires_category_and_description() {
        let draft = ExpenseDraft::new(MoneyCents::new(100), " ", "Lunch", date(2024, 1, 5));
        assert!(matches!(draft.into_new_expense(), Err(EngineError::InvalidName(_))));
        let draft = ExpenseDraft::new(MoneyCents::new(100), "Food", "", date(2024, 1, 5));
        assert!(matches!(draft.into_new_expense(), Err(EngineError::InvalidName(_))));
    }

    #[test]
    fn new_expenses_get_distinct_ids() {
        let draft = ExpenseDraft::new(MoneyCents::new(100), "Food", "Lunch", date(2024, 1, 5));
        let a = draft.clone().into_new_expense().unwrap();
        let b = draft.into_new_expense().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serialized_shape_matches_persisted_layout() {
        let json = serde_json::to_value(expense("e1", 2050)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "e1",
                "amount": 20.5,
                "category": "Food",
                "description": "Lunch",
                "date": "2024-01-05",
            })
        );
    }

    #[test]
    fn duplicate_ids_are_accepted_and_deleted_together() {
        let mut repo = ExpenseRepository::open(MemoryStore::new(), Persistence::Immediate).unwrap();
        repo.add(expense("dup", 100)).unwrap();
        repo.add(expense("dup", 200)).unwrap();
        repo.add(expense("other", 300)).unwrap();
        assert_eq!(repo.list().len(), 3);

        assert_eq!(repo.delete("dup").unwrap(), 2);
        assert_eq!(repo.list().len(), 1);
        assert_eq!(repo.list()[0].id, "other");
    }

    #[test]
    fn update_replaces_only_the_first_match() {
        let mut repo = ExpenseRepository::open(MemoryStore::new(), Persistence::Immediate).unwrap();
        repo.add(expense("dup", 100)).unwrap();
        repo.add(expense("dup", 200)).unwrap();

        assert!(repo.update(expense("dup", 999)).unwrap());
        let amounts: Vec<i64> = repo.list().iter().map(|e| e.amount.cents()).collect();
        assert_eq!(amounts, vec![999, 200]);
    }

    #[test]
    fn misses_are_silent_no_ops() {
        let store = MemoryStore::new();
        let mut repo = ExpenseRepository::open(store.clone(), Persistence::Immediate).unwrap();
        assert!(!repo.update(expense("ghost", 100)).unwrap());
        assert_eq!(repo.delete("ghost").unwrap(), 0);
        assert_eq!(store.get(EXPENSES_KEY).unwrap(), None);
    }
}
