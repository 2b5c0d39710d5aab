//! Keeping a client's copy of a game in step with the stored one.
//!
//! Clients poll; every reply is reconciled against the local copy by
//! revision. A reply older than what the client already holds means the
//! client's optimistic edit was rejected, so the server copy wins.

use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use types::{MultiplayerGame, Versioned};
use uuid::Uuid;

use crate::{error::ErrorKind, GameError, MultiplayerService};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reconciled {
    /// Same revision as the local copy.
    Unchanged,
    /// The server moved ahead.
    Updated,
    /// The local copy was ahead of the server and has been rolled back.
    Reset,
}

/// A client's last known copy of a game.
#[derive(Clone, Debug)]
pub struct LocalView<T> {
    current: Option<T>,
}

impl<T> Default for LocalView<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T: Versioned> LocalView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn revision(&self) -> Option<u64> {
        self.current.as_ref().map(Versioned::revision)
    }

    /// Applies a locally predicted state ahead of the server's answer.
    pub fn apply_local(&mut self, predicted: T) {
        self.current = Some(predicted);
    }

    pub fn reconcile(&mut self, server: T) -> Reconciled {
        let outcome = match self.revision() {
            Some(local) if local == server.revision() => return Reconciled::Unchanged,
            Some(local) if server.revision() < local => Reconciled::Reset,
            _ => Reconciled::Updated,
        };
        self.current = Some(server);
        outcome
    }
}

/// Polls a multiplayer game every `every` and publishes each new revision.
///
/// The task stops once the game reaches a terminal status, when every
/// receiver is dropped, or with an error if the game disappears. Transient
/// store failures are logged and retried on the next tick.
pub fn spawn_poller(
    service: MultiplayerService,
    game_id: Uuid,
    every: Duration,
) -> (
    watch::Receiver<Option<MultiplayerGame>>,
    JoinHandle<Result<(), GameError>>,
) {
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut view = LocalView::new();
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                return Ok(());
            }
            let game = match service.get_game(game_id).await {
                Ok(game) => game,
                Err(err) if err.kind() == ErrorKind::NotFound => return Err(err),
                Err(err) => {
                    log::warn!("Polling game {game_id} failed: {err}");
                    continue;
                }
            };
            let finished = game.status.is_terminal();
            if view.reconcile(game.clone()) != Reconciled::Unchanged {
                log::debug!("Game {game_id} now at revision {}", game.revision);
                if tx.send(Some(game)).is_err() {
                    return Ok(());
                }
            }
            if finished {
                return Ok(());
            }
        }
    });
    (rx, handle)
}
