//! Categories, the read-only reference data events point into

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type CategoryId = u64;

/// One category, as returned by the lookup endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// The id→name mapping resolved once per session.
///
/// Resolution is best-effort: ids that are not in the map display as their
/// numeric value, so a failed lookup never blocks the rest of the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap {
    names: HashMap<CategoryId, String>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_categories(categories: Vec<Category>) -> Self {
        let names = categories.into_iter().map(|c| (c.id, c.name)).collect();
        Self { names }
    }

    pub fn insert(&mut self, id: CategoryId, name: String) {
        self.names.insert(id, name);
    }

    pub fn get(&self, id: CategoryId) -> Option<&str> {
        self.names.get(&id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The display name for an id, falling back to the raw number for ids the
    /// lookup did not cover
    pub fn display_name(&self, id: CategoryId) -> String {
        match self.names.get(&id) {
            Some(name) => name.clone(),
            None => id.to_string(),
        }
    }

    /// The `", "`-joined display names for a set of ids, in the order given
    pub fn joined_names(&self, ids: &[CategoryId]) -> String {
        ids.iter()
            .map(|id| self.display_name(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_ids_display_as_numbers() {
        let mut map = CategoryMap::new();
        map.insert(5, "Hiking".to_string());

        assert_eq!(map.display_name(5), "Hiking");
        assert_eq!(map.display_name(12), "12");
        assert_eq!(map.joined_names(&[5, 12]), "Hiking, 12");
    }

    #[test]
    fn joined_names_keeps_the_given_order() {
        let map = CategoryMap::from_categories(vec![
            Category { id: 1, name: "B".to_string() },
            Category { id: 2, name: "A".to_string() },
        ]);
        assert_eq!(map.joined_names(&[2, 1]), "A, B");
    }
}
