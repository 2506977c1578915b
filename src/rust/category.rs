use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of spending categories an expense can be assigned to.
///
/// The declaration order is significant: it is the order of every per-class table in a
/// fitted model and the tie-break order used by prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Restaurants, groceries, snacks and drinks
    Food,
    /// Transport, fuel, lodging and trips
    Travel,
    /// Recurring payments, utilities and subscriptions
    Bills,
    /// Retail purchases of goods
    Shopping,
    /// Events, games, hobbies and nights out
    Entertainment,
}

impl Category {
    /// All categories in their fixed order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Bills,
        Category::Shopping,
        Category::Entertainment,
    ];

    /// Number of categories.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of the category in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Food => 0,
            Self::Travel => 1,
            Self::Bills => 2,
            Self::Shopping => 3,
            Self::Entertainment => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name as shown to users and stored with expense records
    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Bills => "Bills",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Food => "Meals, groceries, coffee, snacks and food delivery",
            Self::Travel => "Rides, tickets, fuel, lodging, rentals and trips",
            Self::Bills => "Utilities, rent, insurance, loans and recurring subscriptions",
            Self::Shopping => "Clothing, electronics, household goods and other retail purchases",
            Self::Entertainment => "Movies, concerts, games, events, nightlife and hobbies",
        }
    }
}

/// Returns every category in order, for offering a manual choice next to the prediction.
pub fn categories() -> &'static [Category] {
    &Category::ALL
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}
