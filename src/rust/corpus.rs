//! Built-in training corpus of short expense descriptions.
//!
//! The corpus is the source of truth for every fitted model. A persisted artifact records
//! the [`corpus_digest`] it was trained on, so editing this table invalidates old artifacts.

use sha2::{Digest, Sha256};

use crate::category::Category;
use crate::category::Category::{Bills, Entertainment, Food, Shopping, Travel};
use crate::classifier::ClassDefinition;

/// One labelled description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingExample {
    pub text: &'static str,
    pub label: Category,
}

const fn example(text: &'static str, label: Category) -> TrainingExample {
    TrainingExample { text, label }
}

static TRAINING_CORPUS: [TrainingExample; 112] = [
    example("lunch at restaurant", Food),
    example("dinner with friends", Food),
    example("groceries from supermarket", Food),
    example("breakfast coffee", Food),
    example("pizza delivery", Food),
    example("fast food burger", Food),
    example("sushi takeout", Food),
    example("grocery shopping", Food),
    example("food delivery", Food),
    example("restaurant bill", Food),
    example("cafe latte", Food),
    example("starbucks coffee", Food),
    example("mcdonalds meal", Food),
    example("subway sandwich", Food),
    example("dominos pizza", Food),
    example("ice cream", Food),
    example("snacks chips", Food),
    example("fruits vegetables", Food),
    example("meat chicken", Food),
    example("bakery bread", Food),
    example("candy chocolate", Food),
    example("food court meal", Food),
    example("buffet dinner", Food),
    example("uber ride", Travel),
    example("taxi fare", Travel),
    example("bus ticket", Travel),
    example("train ticket", Travel),
    example("flight booking", Travel),
    example("hotel accommodation", Travel),
    example("airbnb stay", Travel),
    example("car rental", Travel),
    example("gas fuel", Travel),
    example("parking fee", Travel),
    example("metro card", Travel),
    example("toll fee", Travel),
    example("airport shuttle", Travel),
    example("vacation package", Travel),
    example("travel insurance", Travel),
    example("lyft ride", Travel),
    example("ola cab", Travel),
    example("bike rental", Travel),
    example("road trip", Travel),
    example("cruise booking", Travel),
    example("travel visa", Travel),
    example("electricity bill", Bills),
    example("water bill", Bills),
    example("internet bill", Bills),
    example("phone bill", Bills),
    example("rent payment", Bills),
    example("insurance premium", Bills),
    example("credit card payment", Bills),
    example("loan emi", Bills),
    example("gas bill", Bills),
    example("cable tv", Bills),
    example("netflix subscription", Bills),
    example("spotify premium", Bills),
    example("gym membership", Bills),
    example("utility payment", Bills),
    example("mortgage payment", Bills),
    example("property tax", Bills),
    example("youtube premium", Bills),
    example("amazon prime", Bills),
    example("hulu subscription", Bills),
    example("medical insurance", Bills),
    example("clothing purchase", Shopping),
    example("shoes shopping", Shopping),
    example("electronics store", Shopping),
    example("furniture buy", Shopping),
    example("book purchase", Shopping),
    example("online shopping", Shopping),
    example("amazon order", Shopping),
    example("walmart shopping", Shopping),
    example("target purchase", Shopping),
    example("ebay order", Shopping),
    example("home decor", Shopping),
    example("cosmetics beauty", Shopping),
    example("jewelry purchase", Shopping),
    example("toy store", Shopping),
    example("sports equipment", Shopping),
    example("garden supplies", Shopping),
    example("office supplies", Shopping),
    example("hardware store", Shopping),
    example("pet supplies", Shopping),
    example("gift purchase", Shopping),
    example("laptop computer", Shopping),
    example("mobile phone", Shopping),
    example("headphones", Shopping),
    example("watch", Shopping),
    example("movie tickets", Entertainment),
    example("concert tickets", Entertainment),
    example("theater show", Entertainment),
    example("museum entry", Entertainment),
    example("theme park", Entertainment),
    example("bowling alley", Entertainment),
    example("video games", Entertainment),
    example("streaming service", Entertainment),
    example("sports event", Entertainment),
    example("comedy show", Entertainment),
    example("bar drinks", Entertainment),
    example("nightclub cover", Entertainment),
    example("casino gambling", Entertainment),
    example("arcade games", Entertainment),
    example("mini golf", Entertainment),
    example("escape room", Entertainment),
    example("zoo tickets", Entertainment),
    example("aquarium visit", Entertainment),
    example("festival pass", Entertainment),
    example("hobby class", Entertainment),
    example("books magazine", Entertainment),
    example("music album", Entertainment),
    example("app purchase", Entertainment),
    example("game subscription", Entertainment),
];

/// Returns the built-in training corpus.
pub fn training_corpus() -> &'static [TrainingExample] {
    &TRAINING_CORPUS
}

/// Groups examples into one class definition per category, in category order.
/// Categories without examples are omitted; the builder rejects such a set.
pub fn class_definitions(examples: &[TrainingExample]) -> Vec<ClassDefinition> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let texts: Vec<&str> = examples
                .iter()
                .filter(|e| e.label == category)
                .map(|e| e.text)
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(ClassDefinition::new(category, category.description()).with_examples(texts))
            }
        })
        .collect()
}

/// Hex SHA-256 over the labelled examples, in order.
pub fn corpus_digest(examples: &[TrainingExample]) -> String {
    let mut hasher = Sha256::new();
    for e in examples {
        hasher.update(e.label.label().as_bytes());
        hasher.update([0x1f]);
        hasher.update(e.text.as_bytes());
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}
