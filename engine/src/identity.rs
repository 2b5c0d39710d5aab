//! Mapping a caller onto a seat of a multiplayer room.

use types::{CallerIdentity, MultiplayerGame};

use crate::GameError;

/// Index of the seat `identity` occupies, if any.
///
/// Authenticated callers match on user id. Guests match a seat claimed with
/// their guest id, or one whose user id is the guest id. Failing both, a seat
/// that is inactive or has no owner is matched by exact `username`.
pub fn find_player(
    game: &MultiplayerGame,
    identity: &CallerIdentity,
    username: Option<&str>,
) -> Option<usize> {
    if let Some(user_id) = identity.authenticated_user_id.as_deref() {
        if let Some(idx) = game
            .players
            .iter()
            .position(|p| p.user_id.as_deref() == Some(user_id))
        {
            return Some(idx);
        }
    }

    if let Some(guest_id) = identity.guest_id.as_deref() {
        if let Some(idx) = game.players.iter().position(|p| {
            (p.user_id.is_none() && p.guest_id.as_deref() == Some(guest_id))
                || p.user_id.as_deref() == Some(guest_id)
        }) {
            return Some(idx);
        }
    }

    let username = username.map(str::trim).filter(|name| !name.is_empty())?;
    game.players
        .iter()
        .position(|p| p.username == username && (!p.is_active || p.user_id.is_none()))
}

/// Seat of the caller for operations that require one.
pub fn resolve_player(game: &MultiplayerGame, identity: &CallerIdentity) -> Result<usize, GameError> {
    find_player(game, identity, identity.resolve_nickname(None).as_deref())
        .ok_or(GameError::PlayerNotInGame(game.id))
}
