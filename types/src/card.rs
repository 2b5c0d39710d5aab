use std::{cmp::Ordering, fmt::Display};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Hand size dealt to each player when a multiplayer room starts.
    pub fn cards_per_player(&self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 7,
            Difficulty::Expert => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A dated historical event as supplied by the card catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    /// Negative years are BCE.
    pub year: i32,
    #[serde(default)]
    pub month: Option<u8>,
    #[serde(default)]
    pub day: Option<u8>,
    pub category: String,
    pub difficulty: Difficulty,
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.year < 0 {
            write!(f, "{} ({} BCE)", self.title, -self.year)
        } else {
            write!(f, "{} ({})", self.title, self.year)
        }
    }
}

impl Card {
    pub fn chrono_key(&self) -> ChronoKey {
        ChronoKey {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Chronological sort key of a card.
///
/// Month and day only break ties when both sides carry them; otherwise two
/// keys with the same year compare equal and either order is accepted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChronoKey {
    pub year: i32,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl ChronoKey {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn chrono_cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| match (self.month, other.month) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            })
            .then_with(|| match (self.month, other.month, self.day, other.day) {
                (Some(_), Some(_), Some(a), Some(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            })
    }
}

/// How a game document refers to a card: by catalog id, or with the card
/// embedded in the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardRef {
    Ref { id: CardId },
    Embedded { card: Card },
}

impl CardRef {
    pub fn id(&self) -> &CardId {
        match self {
            CardRef::Ref { id } => id,
            CardRef::Embedded { card } => &card.id,
        }
    }
}

impl From<&Card> for CardRef {
    fn from(card: &Card) -> Self {
        CardRef::Ref {
            id: card.id.clone(),
        }
    }
}
