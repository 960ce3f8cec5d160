//! Game persistence: the [`GameStore`] interface and an in-memory store.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::color::Color;
use crate::error::ServiceError;
use crate::game::Game;

/// Opaque identifier of a stored game.
pub type GameId = String;

/// A stored game together with its name and seated players.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameData {
    pub game_id: GameId,
    pub game_name: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub game: Game,
}

impl GameData {
    pub fn new(game_id: GameId, game_name: &str) -> Self {
        GameData {
            game_id,
            game_name: game_name.to_string(),
            white_username: None,
            black_username: None,
            game: Game::new(),
        }
    }

    pub fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    pub fn seat_mut(&mut self, color: Color) -> &mut Option<String> {
        match color {
            Color::White => &mut self.white_username,
            Color::Black => &mut self.black_username,
        }
    }

    /// Whether `username` sits on the `color` side.
    pub fn holds_seat(&self, username: &str, color: Color) -> bool {
        self.seat(color) == Some(username)
    }

    /// The color `username` plays, checking White first.
    pub fn color_of(&self, username: &str) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|&color| self.holds_seat(username, color))
    }
}

pub trait GameStore: Send + Sync {
    /// Stores a fresh game under a new id.
    fn create_game(&self, game_name: &str) -> Result<GameData, ServiceError>;

    fn get_game(&self, game_id: &str) -> Result<Option<GameData>, ServiceError>;

    /// All games in creation order.
    fn list_games(&self) -> Result<Vec<GameData>, ServiceError>;

    /// Replaces the stored record of an existing game.
    fn update_game(&self, game_id: &str, data: GameData) -> Result<(), ServiceError>;

    fn clear(&self) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    order: Vec<GameId>,
    games: HashMap<GameId, GameData>,
}

/// Keeps games in a map; ids are sequential numbers starting at "1".
#[derive(Debug)]
pub struct MemoryGameStore {
    inner: RwLock<MemoryInner>,
    capacity: usize,
}

impl MemoryGameStore {
    pub fn new(capacity: usize) -> Self {
        MemoryGameStore {
            inner: RwLock::new(MemoryInner::default()),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        // A panicked writer leaves the map itself intact.
        let inner = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> ServiceError {
    ServiceError::Storage("game store lock poisoned".to_string())
}

impl GameStore for MemoryGameStore {
    fn create_game(&self, game_name: &str) -> Result<GameData, ServiceError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.games.len() >= self.capacity {
            return Err(ServiceError::StoreFull(self.capacity));
        }

        inner.next_id += 1;
        let game_id = inner.next_id.to_string();
        let data = GameData::new(game_id.clone(), game_name);

        inner.order.push(game_id.clone());
        inner.games.insert(game_id.clone(), data.clone());
        debug!(%game_id, game_name, "game stored");
        Ok(data)
    }

    fn get_game(&self, game_id: &str) -> Result<Option<GameData>, ServiceError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.games.get(game_id).cloned())
    }

    fn list_games(&self) -> Result<Vec<GameData>, ServiceError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.games.get(id).cloned())
            .collect())
    }

    fn update_game(&self, game_id: &str, data: GameData) -> Result<(), ServiceError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        match inner.games.get_mut(game_id) {
            Some(slot) => {
                *slot = data;
                debug!(game_id, "game updated");
                Ok(())
            }
            None => Err(ServiceError::GameNotFound(game_id.to_string())),
        }
    }

    fn clear(&self) -> Result<(), ServiceError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        *inner = MemoryInner::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#move::Move;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_create_and_get() {
        let store = MemoryGameStore::new(4);
        let data = store.create_game("first").expect("store has room");
        assert_eq!(data.game_id, "1");
        assert_eq!(data.game_name, "first");
        assert_eq!(data.game, Game::new());

        let fetched = store.get_game("1").expect("store readable");
        assert_eq!(fetched, Some(data));
        assert_eq!(store.get_game("2").expect("store readable"), None);
    }

    #[test]
    fn test_ids_are_sequential_and_listed_in_order() {
        let store = MemoryGameStore::new(8);
        for name in ["a", "b", "c"] {
            store.create_game(name).expect("store has room");
        }
        let ids: Vec<GameId> = store
            .list_games()
            .expect("store readable")
            .into_iter()
            .map(|g| g.game_id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_capacity() {
        let store = MemoryGameStore::new(1);
        store.create_game("only").expect("store has room");
        assert_eq!(store.create_game("extra"), Err(ServiceError::StoreFull(1)));
    }

    #[test]
    fn test_update_round_trips_game_state() {
        let store = MemoryGameStore::new(2);
        let mut data = store.create_game("g").expect("store has room");
        data.white_username = Some("alice".to_string());
        data.game
            .make_move(&Move::from_lan("e2e4").expect("valid notation"))
            .expect("legal move");

        store.update_game("1", data.clone()).expect("game exists");
        assert_eq!(store.get_game("1").expect("store readable"), Some(data));
    }

    #[test]
    fn test_update_unknown_game() {
        let store = MemoryGameStore::new(2);
        let data = GameData::new("9".to_string(), "ghost");
        assert_eq!(
            store.update_game("9", data),
            Err(ServiceError::GameNotFound("9".to_string()))
        );
    }

    #[test]
    fn test_clear_resets_ids() {
        let store = MemoryGameStore::new(2);
        store.create_game("g").expect("store has room");
        store.clear().expect("store writable");
        assert!(store.is_empty());
        assert_eq!(store.create_game("h").expect("store has room").game_id, "1");
    }

    #[test]
    fn test_len_survives_poisoned_lock() {
        let store = Arc::new(MemoryGameStore::new(2));
        store.create_game("g").expect("store has room");

        let writer = Arc::clone(&store);
        let result = thread::spawn(move || {
            let _guard = writer.inner.write().expect("lock not yet poisoned");
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(store.len(), 1);
        assert!(matches!(store.list_games(), Err(ServiceError::Storage(_))));
    }

    #[test]
    fn test_game_data_seats() {
        let mut data = GameData::new("1".to_string(), "g");
        *data.seat_mut(Color::Black) = Some("bob".to_string());
        assert_eq!(data.seat(Color::Black), Some("bob"));
        assert_eq!(data.color_of("bob"), Some(Color::Black));
        assert_eq!(data.color_of("carol"), None);
        assert!(!data.holds_seat("bob", Color::White));
    }
}
