use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use types::{Card, CardId, Difficulty};

use crate::DatabaseError;

/// Which cards a deal may draw from. Empty `categories` means any category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CardFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(difficulty: Option<Difficulty>, categories: &[String]) -> Self {
        Self {
            difficulty,
            categories: categories.to_vec(),
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        let difficulty_ok = self.difficulty.map_or(true, |d| d == card.difficulty);
        let category_ok =
            self.categories.is_empty() || self.categories.iter().any(|c| c == &card.category);
        difficulty_ok && category_ok
    }
}

/// Read-only source of cards and their dates.
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Up to `count` matching cards, in the order they should be dealt.
    async fn sample(&self, filter: &CardFilter, count: usize) -> Result<Vec<Card>, DatabaseError>;
    async fn get(&self, id: &CardId) -> Result<Option<Card>, DatabaseError>;
    async fn count(&self, filter: &CardFilter) -> Result<usize, DatabaseError>;
}
