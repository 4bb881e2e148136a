//! Account categories, including class-derived system categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Groups accounts for the chart of accounts.
///
/// System categories mirror a class and follow its lifecycle; they cannot be
/// renamed or removed by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCategory {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_system: bool,
}

impl AccountCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_system: false,
        }
    }

    /// Creates a class-managed category.
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_system: true,
        }
    }
}

impl Identifiable for AccountCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for AccountCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for AccountCategory {
    fn display_label(&self) -> String {
        if self.is_system {
            format!("{} (class)", self.name)
        } else {
            self.name.clone()
        }
    }
}
