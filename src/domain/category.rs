//! Category Entity
//!
//! Categories group memories under a name, a short description and an icon.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::Entity;

/// The closed set of icons a category can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IconName {
    MessageHeart,
    #[default]
    Heart,
    Compass,
}

impl IconName {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconName::MessageHeart => "MessageHeart",
            IconName::Heart => "Heart",
            IconName::Compass => "Compass",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "MessageHeart" => IconName::MessageHeart,
            "Compass" => IconName::Compass,
            _ => IconName::Heart,
        }
    }
}

/// A memory category scoped to one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (store-assigned)
    pub id: i64,
    /// Category name
    pub name: String,
    /// Short description
    pub description: String,
    /// Display icon
    pub icon: IconName,
    /// Owner this category belongs to
    pub owner: Uuid,
}

impl Category {
    /// Create a blank category with the default icon
    pub fn new(id: i64, owner: Uuid) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            icon: IconName::Heart,
            owner,
        }
    }
}

impl Entity for Category {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn set_id(&mut self, id: Self::Id) {
        self.id = id;
    }

    fn owner(&self) -> Uuid {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults() {
        let category = Category::new(3, Uuid::new_v4());
        assert_eq!(category.id(), 3);
        assert!(category.name.is_empty());
        assert_eq!(category.icon, IconName::Heart);
    }

    #[test]
    fn test_icon_round_trip() {
        assert_eq!(IconName::from_str("Compass"), IconName::Compass);
        assert_eq!(IconName::from_str("MessageHeart").as_str(), "MessageHeart");
        assert_eq!(IconName::from_str("unknown"), IconName::Heart);
    }
}
