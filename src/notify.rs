//! Notification fan-out: tracks who is connected to each game and pushes
//! state changes to them.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::color::Color;
use crate::game::Game;
use crate::r#move::Move;

/// How a participant takes part in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Player(Color),
    Observer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Player(Color::White) => write!(f, "white"),
            Role::Player(Color::Black) => write!(f, "black"),
            Role::Observer => write!(f, "an observer"),
        }
    }
}

/// An event pushed to the participants of a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Full game state, sent on connect and after every move.
    LoadGame { game: Game },
    Joined { username: String, role: Role },
    Moved { username: String, mv: Move },
    Left { username: String },
    Resigned { username: String },
    Check { color: Color },
    Checkmate { color: Color },
    Stalemate { color: Color },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::LoadGame { game } => write!(f, "{}", game),
            Notification::Joined { username, role } => {
                write!(f, "{} has joined the game as {}", username, role)
            }
            Notification::Moved { username, mv } => {
                write!(f, "{} moved {} to {}", username, mv.start, mv.end)?;
                if let Some(promotion) = mv.promotion {
                    write!(f, " promoting to {:?}", promotion)?;
                }
                Ok(())
            }
            Notification::Left { username } => write!(f, "{} has left the game", username),
            Notification::Resigned { username } => write!(f, "{} has resigned the game", username),
            Notification::Check { color } => write!(f, "{} is in check", color),
            Notification::Checkmate { color } => write!(f, "{} is in checkmate", color),
            Notification::Stalemate { color } => write!(f, "{} is in stalemate", color),
        }
    }
}

type Subscribers = HashMap<String, HashMap<String, Sender<Notification>>>;

/// Per-game sets of subscribed participants.
#[derive(Debug, Default)]
pub struct Notifier {
    /// game_id → { username → sender }
    subs: Mutex<Subscribers>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn subs(&self) -> MutexGuard<'_, Subscribers> {
        // Senders stay usable even if another thread panicked mid-update.
        self.subs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers `username` for a game, replacing any earlier subscription of
    /// the same user.
    pub fn subscribe(&self, game_id: &str, username: &str) -> Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subs()
            .entry(game_id.to_string())
            .or_default()
            .insert(username.to_string(), tx);

        debug!(game_id, username, "participant subscribed");
        rx
    }

    pub fn unsubscribe(&self, game_id: &str, username: &str) -> bool {
        let mut subs = self.subs();
        let removed = match subs.get_mut(game_id) {
            Some(clients) => {
                let removed = clients.remove(username).is_some();
                if clients.is_empty() {
                    subs.remove(game_id);
                }
                removed
            }
            None => false,
        };
        debug!(game_id, username, removed, "participant unsubscribed");
        removed
    }

    /// Drops every subscription of every game.
    pub fn clear(&self) {
        self.subs().clear();
    }

    pub fn is_subscribed(&self, game_id: &str, username: &str) -> bool {
        self.subs()
            .get(game_id)
            .is_some_and(|clients| clients.contains_key(username))
    }

    pub fn subscriber_count(&self, game_id: &str) -> usize {
        self.subs().get(game_id).map_or(0, |clients| clients.len())
    }

    /// Sends to every subscriber of the game.
    pub fn broadcast(&self, game_id: &str, notification: Notification) {
        self.deliver(game_id, notification, |_| true);
    }

    /// Sends to every subscriber of the game except `excluded`.
    pub fn broadcast_except(&self, game_id: &str, excluded: &str, notification: Notification) {
        self.deliver(game_id, notification, |username| username != excluded);
    }

    /// Sends to a single subscriber of the game.
    pub fn send_to(&self, game_id: &str, username: &str, notification: Notification) {
        self.deliver(game_id, notification, |name| name == username);
    }

    fn deliver(&self, game_id: &str, notification: Notification, include: impl Fn(&str) -> bool) {
        let mut subs = self.subs();
        let Some(clients) = subs.get_mut(game_id) else {
            return;
        };

        let stale: Vec<String> = clients
            .iter()
            .filter(|(username, _)| include(username))
            .filter(|(_, tx)| tx.send(notification.clone()).is_err())
            .map(|(username, _)| username.clone())
            .collect();

        for username in &stale {
            clients.remove(username);
            warn!(game_id, username = %username, "removed stale subscriber");
        }
        if clients.is_empty() {
            subs.remove(game_id);
        }
    }
}
