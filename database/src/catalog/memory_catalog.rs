use std::{path::Path, sync::Mutex};

use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use types::{Card, CardId};

use super::{CardCatalog, CardFilter};
use crate::DatabaseError;

/// Catalog backed by a fixed list of cards.
///
/// With an rng, samples are shuffled; without one they come back in catalog
/// order, which keeps deals reproducible in tests.
#[derive(Debug)]
pub struct MemoryCatalog {
    cards: Vec<Card>,
    rng: Option<Mutex<StdRng>>,
}

impl MemoryCatalog {
    pub fn in_order(cards: Vec<Card>) -> Self {
        Self { cards, rng: None }
    }

    pub fn shuffled(cards: Vec<Card>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cards,
            rng: Some(Mutex::new(rng)),
        }
    }

    /// Loads a JSON array of cards.
    pub fn from_json_file(path: &Path, seed: Option<u64>) -> Result<Self, DatabaseError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DatabaseError::Connection(format!("{}: {e}", path.display())))?;
        let cards: Vec<Card> = serde_json::from_str(&contents)?;
        tracing::info!("Loaded {} cards from {}", cards.len(), path.display());
        Ok(Self::shuffled(cards, seed))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[async_trait]
impl CardCatalog for MemoryCatalog {
    async fn sample(&self, filter: &CardFilter, count: usize) -> Result<Vec<Card>, DatabaseError> {
        let mut matching: Vec<Card> = self
            .cards
            .iter()
            .filter(|card| filter.matches(card))
            .cloned()
            .collect();
        if let Some(rng) = &self.rng {
            let mut rng = rng
                .lock()
                .map_err(|e| DatabaseError::Connection(format!("catalog rng poisoned: {e}")))?;
            matching.shuffle(&mut *rng);
        }
        matching.truncate(count);
        Ok(matching)
    }

    async fn get(&self, id: &CardId) -> Result<Option<Card>, DatabaseError> {
        Ok(self.cards.iter().find(|card| &card.id == id).cloned())
    }

    async fn count(&self, filter: &CardFilter) -> Result<usize, DatabaseError> {
        Ok(self.cards.iter().filter(|card| filter.matches(card)).count())
    }
}
