//! The game service: joins players to stored games, plays their moves and
//! tells every participant what happened.
//!
//! All mutations of one game run under that game's lock, so two moves for the
//! same game id never interleave. Different games proceed independently.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::color::Color;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::notify::{Notification, Notifier, Role};
use crate::r#move::Move;
use crate::store::{GameData, GameId, GameStore, MemoryGameStore};

pub struct GameService<S: GameStore> {
    store: S,
    notifier: Notifier,
    config: ServiceConfig,
    locks: Mutex<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl GameService<MemoryGameStore> {
    /// A service over an in-memory store sized by `config.max_games`.
    pub fn in_memory(config: ServiceConfig) -> Self {
        let store = MemoryGameStore::new(config.max_games);
        Self::new(store, config)
    }
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        GameService {
            store,
            notifier: Notifier::new(),
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The lock of an existing game. Unknown ids fail without taking a slot
    /// in the lock table.
    fn game_lock(&self, game_id: &str) -> Result<Arc<Mutex<()>>, ServiceError> {
        let mut locks = self.locks.lock().map_err(lock_poisoned)?;
        if let Some(lock) = locks.get(game_id) {
            return Ok(Arc::clone(lock));
        }

        self.require_game(game_id)?;
        Ok(Arc::clone(locks.entry(game_id.to_string()).or_default()))
    }

    /// Runs `f` while holding the lock of `game_id`.
    fn with_game_locked<T>(
        &self,
        game_id: &str,
        f: impl FnOnce(GameData) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let lock = self.game_lock(game_id)?;
        let _guard = lock.lock().map_err(lock_poisoned)?;
        let data = self.require_game(game_id)?;
        f(data)
    }

    fn require_game(&self, game_id: &str) -> Result<GameData, ServiceError> {
        self.store
            .get_game(game_id)?
            .ok_or_else(|| ServiceError::GameNotFound(game_id.to_string()))
    }

    pub fn create_game(&self, game_name: &str) -> Result<GameId, ServiceError> {
        let game_name = game_name.trim();
        if game_name.is_empty() {
            return Err(ServiceError::BadRequest("game name must not be empty".to_string()));
        }

        let data = self.store.create_game(game_name)?;
        info!(game_id = %data.game_id, game_name, "game created");
        Ok(data.game_id)
    }

    pub fn get_game(&self, game_id: &str) -> Result<GameData, ServiceError> {
        self.require_game(game_id)
    }

    pub fn list_games(&self) -> Result<Vec<GameData>, ServiceError> {
        self.store.list_games()
    }

    /// Drops every game, its lock and its subscribers.
    pub fn clear(&self) -> Result<(), ServiceError> {
        let mut locks = self.locks.lock().map_err(lock_poisoned)?;
        self.store.clear()?;
        self.notifier.clear();
        locks.clear();
        info!("all games cleared");
        Ok(())
    }

    /// Seats `username` on the `color` side of a game.
    pub fn join_game(&self, game_id: &str, username: &str, color: Color) -> Result<(), ServiceError> {
        self.with_game_locked(game_id, |mut data| {
            if data.game.is_over() {
                return Err(ServiceError::GameOver);
            }
            if data.seat(color).is_some() {
                return Err(ServiceError::AlreadyTaken(color));
            }

            *data.seat_mut(color) = Some(username.to_string());
            self.store.update_game(game_id, data)?;
            info!(game_id, username, %color, "player joined");
            Ok(())
        })
    }

    /// Subscribes `username` to a game's notifications. The user receives the
    /// current game state; everyone else is told who joined and as what.
    pub fn connect(&self, game_id: &str, username: &str) -> Result<Receiver<Notification>, ServiceError> {
        self.with_game_locked(game_id, |data| {
            let role = data.color_of(username).map_or(Role::Observer, Role::Player);

            self.notifier.broadcast_except(
                game_id,
                username,
                Notification::Joined {
                    username: username.to_string(),
                    role,
                },
            );
            let rx = self.notifier.subscribe(game_id, username);
            self.notifier.send_to(game_id, username, Notification::LoadGame { game: data.game });

            debug!(game_id, username, %role, "participant connected");
            Ok(rx)
        })
    }

    /// Frees any seat `username` holds and stops their notifications.
    pub fn leave(&self, game_id: &str, username: &str) -> Result<(), ServiceError> {
        self.with_game_locked(game_id, |mut data| {
            let was_player = data.color_of(username).is_some();
            let was_subscribed = self.notifier.is_subscribed(game_id, username);
            if !was_player && !was_subscribed {
                return Err(ServiceError::BadRequest(format!(
                    "{} is not part of game {}",
                    username, game_id
                )));
            }

            if was_player {
                for color in [Color::White, Color::Black] {
                    if data.holds_seat(username, color) {
                        *data.seat_mut(color) = None;
                    }
                }
                self.store.update_game(game_id, data)?;
            }
            self.notifier.unsubscribe(game_id, username);

            self.notifier.broadcast(
                game_id,
                Notification::Left {
                    username: username.to_string(),
                },
            );
            info!(game_id, username, "participant left");
            Ok(())
        })
    }

    /// Plays `mv` for `username`, who must hold the seat of the side to move.
    ///
    /// After the move the opponent's position is examined: checkmate and
    /// stalemate end the game, a check is announced when configured.
    pub fn make_move(&self, game_id: &str, username: &str, mv: &Move) -> Result<GameData, ServiceError> {
        self.with_game_locked(game_id, |mut data| {
            if data.game.is_over() {
                return Err(ServiceError::GameOver);
            }
            if data.color_of(username).is_none() {
                return Err(ServiceError::NotAPlayer(username.to_string()));
            }

            let mover = data.game.side_to_move();
            if !data.holds_seat(username, mover) {
                return Err(ServiceError::NotYourTurn);
            }

            data.game.make_move(mv)?;

            let opponent = mover.opposite();
            let status = if data.game.is_in_checkmate(opponent) {
                data.game.set_over(true);
                data.game.set_winner(Some(mover));
                info!(game_id, winner = %mover, "checkmate");
                Some(Notification::Checkmate { color: opponent })
            } else if data.game.is_in_stalemate(opponent) {
                data.game.set_over(true);
                data.game.set_winner(None);
                info!(game_id, "stalemate");
                Some(Notification::Stalemate { color: opponent })
            } else if self.config.announce_check && data.game.is_in_check(opponent) {
                Some(Notification::Check { color: opponent })
            } else {
                None
            };

            self.store.update_game(game_id, data.clone())?;
            debug!(game_id, username, %mv, "move stored");

            self.notifier.broadcast(
                game_id,
                Notification::LoadGame {
                    game: data.game.clone(),
                },
            );
            self.notifier.broadcast_except(
                game_id,
                username,
                Notification::Moved {
                    username: username.to_string(),
                    mv: *mv,
                },
            );
            if let Some(status) = status {
                self.notifier.broadcast(game_id, status);
            }

            Ok(data)
        })
    }

    /// Ends the game with `username`'s side losing.
    pub fn resign(&self, game_id: &str, username: &str) -> Result<(), ServiceError> {
        self.with_game_locked(game_id, |mut data| {
            if data.game.is_over() {
                return Err(ServiceError::GameOver);
            }
            let color = data
                .color_of(username)
                .ok_or_else(|| ServiceError::NotAPlayer(username.to_string()))?;

            data.game.resign(color);
            self.store.update_game(game_id, data)?;

            self.notifier.broadcast(
                game_id,
                Notification::Resigned {
                    username: username.to_string(),
                },
            );
            info!(game_id, username, %color, "player resigned");
            Ok(())
        })
    }
}

fn lock_poisoned<T>(_: T) -> ServiceError {
    ServiceError::Storage("game lock poisoned".to_string())
}
