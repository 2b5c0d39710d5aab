use database::CardCatalog;
use types::{Card, CardRef};

use crate::GameError;

/// Turns a stored card reference into the card itself.
pub async fn resolve(catalog: &dyn CardCatalog, card: &CardRef) -> Result<Card, GameError> {
    match card {
        CardRef::Embedded { card } => Ok(card.clone()),
        CardRef::Ref { id } => catalog
            .get(id)
            .await?
            .ok_or_else(|| GameError::CardNotFound(id.clone())),
    }
}

pub async fn resolve_all<'a, I>(catalog: &dyn CardCatalog, cards: I) -> Result<Vec<Card>, GameError>
where
    I: IntoIterator<Item = &'a CardRef>,
{
    let mut resolved = Vec::new();
    for card in cards {
        resolved.push(resolve(catalog, card).await?);
    }
    Ok(resolved)
}
