//! Category registry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Expense, ResultEngine,
    document::Document,
    store::{CATEGORIES_KEY, KeyValueStore, Persistence},
    util::normalize_required_text,
};

const DEFAULT_CATEGORY_NAMES: [&str; 7] = [
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Healthcare",
    "Travel",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_custom: bool,
}

impl Category {
    /// Builds a user-defined category with a fresh id.
    pub fn custom(name: &str) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: normalize_required_text(name, "category name")?,
            is_custom: true,
        })
    }
}

/// The built-in set used until categories are first modified (ids "1".."7").
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORY_NAMES
        .iter()
        .zip(1..)
        .map(|(name, id)| Category {
            id: id.to_string(),
            name: (*name).to_string(),
            is_custom: false,
        })
        .collect()
}

/// Stored categories. Nothing is persisted until the first change, which
/// writes the full list including the defaults.
pub struct CategoryStore<S> {
    document: Document<S, Vec<Category>>,
}

impl<S: KeyValueStore> CategoryStore<S> {
    /// Loads the categories. A missing or malformed payload yields the defaults.
    pub fn open(store: S, persistence: Persistence) -> ResultEngine<Self> {
        Ok(Self {
            document: Document::open(store, CATEGORIES_KEY, persistence, default_categories)?,
        })
    }

    pub fn list(&self) -> &[Category] {
        self.document.get()
    }

    /// Appends a category. Names are not required to be unique.
    pub fn add(&mut self, category: Category) -> ResultEngine<()> {
        if self.list().iter().any(|existing| existing.name == category.name) {
            tracing::warn!("category name \"{}\" already exists", category.name);
        }
        tracing::debug!("adding category {} ({})", category.id, category.name);
        self.document.update(|records| {
            records.push(category);
            ((), true)
        })
    }

    /// Removes every category with the given id.
    ///
    /// Expenses that reference the removed name are not touched.
    pub fn delete(&mut self, id: &str) -> ResultEngine<usize> {
        let removed = self.document.update(|records| {
            let before = records.len();
            records.retain(|record| record.id != id);
            let removed = before - records.len();
            (removed, removed > 0)
        })?;
        if removed == 0 {
            tracing::warn!("delete skipped: category {id} not found");
        } else {
            tracing::debug!("deleted category {id}");
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

/// Category names used by expenses that match no existing category, in
/// first-seen order.
pub fn orphaned_categories(expenses: &[Expense], categories: &[Category]) -> Vec<String> {
    let mut orphans: Vec<String> = Vec::new();
    for expense in expenses {
        let known = categories.iter().any(|c| c.name == expense.category);
        if !known && !orphans.contains(&expense.category) {
            orphans.push(expense.category.clone());
        }
    }
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn defaults_have_sequential_ids() {
        let defaults = default_categories();
        assert_eq!(defaults.len(), 7);
        assert_eq!(defaults[0].id, "1");
        assert_eq!(defaults[0].name, "Food");
        assert_eq!(defaults[6].id, "7");
        assert_eq!(defaults[6].name, "Travel");
        assert!(defaults.iter().all(|c| !c.is_custom));
    }

    #[test]
    fn is_custom_flag_uses_camel_case_and_is_optional() {
        let custom = Category {
            id: "c1".to_string(),
            name: "Pets".to_string(),
            is_custom: true,
        };
        assert_eq!(
            serde_json::to_string(&custom).unwrap(),
            r#"{"id":"c1","name":"Pets","isCustom":true}"#
        );
        let plain: Category = serde_json::from_str(r#"{"id":"1","name":"Food"}"#).unwrap();
        assert!(!plain.is_custom);
        assert_eq!(serde_json::to_string(&plain).unwrap(), r#"{"id":"1","name":"Food"}"#);
    }

    #[test]
    fn first_change_materializes_defaults() {
        let backing = MemoryStore::new();
        let mut store = CategoryStore::open(backing.clone(), Persistence::Immediate).unwrap();
        assert_eq!(backing.get(CATEGORIES_KEY).unwrap(), None);

        store.add(Category::custom("Pets").unwrap()).unwrap();
        let persisted: Vec<Category> =
            serde_json::from_str(&backing.get(CATEGORIES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 8);
        assert_eq!(persisted[7].name, "Pets");
        assert!(persisted[7].is_custom);
    }

    #[test]
    fn custom_category_name_must_not_be_blank() {
        assert!(Category::custom("   ").is_err());
        assert_eq!(Category::custom("  Home  office ").unwrap().name, "Home office");
    }
}
