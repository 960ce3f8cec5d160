mod common;

use std::sync::Arc;
use std::thread;

use common::lan;
use parlor_chess::config::ServiceConfig;
use parlor_chess::error::ServiceError;
use parlor_chess::notify::{Notification, Role};
use parlor_chess::outcome::GameOutcome;
use parlor_chess::service::GameService;
use parlor_chess::store::{GameStore, MemoryGameStore};
use parlor_chess::{ChessError, Color};
use rstest::{fixture, rstest};

#[fixture]
fn service() -> GameService<MemoryGameStore> {
    GameService::in_memory(ServiceConfig::default())
}

fn seat_players(service: &GameService<MemoryGameStore>, name: &str) -> String {
    let id = service.create_game(name).expect("store has room");
    service.join_game(&id, "white", Color::White).expect("white seat free");
    service.join_game(&id, "black", Color::Black).expect("black seat free");
    id
}

#[rstest]
fn games_are_listed_in_creation_order(service: GameService<MemoryGameStore>) {
    for name in ["first", "second", "third"] {
        service.create_game(name).expect("store has room");
    }
    let names: Vec<String> = service
        .list_games()
        .expect("store readable")
        .into_iter()
        .map(|data| data.game_name)
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[rstest]
fn full_game_to_checkmate(service: GameService<MemoryGameStore>) {
    let id = seat_players(&service, "scholar");
    let observer = service.connect(&id, "watcher").expect("game exists");

    let moves = [
        ("white", "e2e4"),
        ("black", "e7e5"),
        ("white", "f1c4"),
        ("black", "b8c6"),
        ("white", "d1h5"),
        ("black", "g8f6"),
        ("white", "h5f7"),
    ];
    for (user, mv) in moves {
        service.make_move(&id, user, &lan(mv)).expect("legal move");
    }

    let data = service.get_game(&id).expect("game exists");
    assert!(data.game.is_over());
    assert_eq!(data.game.outcome(), Some(GameOutcome::WhiteWin));
    assert_eq!(
        service.make_move(&id, "black", &lan("e8e7")),
        Err(ServiceError::GameOver)
    );
    assert_eq!(
        service.join_game(&id, "late", Color::White),
        Err(ServiceError::GameOver)
    );

    let events: Vec<Notification> = observer.try_iter().collect();
    let moved = events
        .iter()
        .filter(|n| matches!(n, Notification::Moved { .. }))
        .count();
    assert_eq!(moved, moves.len());
    assert_eq!(
        events.last(),
        Some(&Notification::Checkmate {
            color: Color::Black
        })
    );
}

#[rstest]
fn stalemate_ends_game_without_winner(service: GameService<MemoryGameStore>) {
    let id = seat_players(&service, "stalemate");
    let mut data = service.get_game(&id).expect("game exists");
    data.game.set_board(common::board_from_diagram([
        "k.......", //
        "........", //
        ".Q......", //
        "........", //
        "........", //
        "........", //
        "........", //
        ".......K", //
    ]));
    service.store().update_game(&id, data).expect("game exists");

    service
        .make_move(&id, "white", &lan("b6c7"))
        .expect("legal move");

    let data = service.get_game(&id).expect("game exists");
    assert!(data.game.is_over());
    assert_eq!(data.game.winner(), None);
    assert_eq!(data.game.outcome(), Some(GameOutcome::Stalemate));
}

#[rstest]
fn rejected_moves_do_not_change_stored_game(service: GameService<MemoryGameStore>) {
    let id = seat_players(&service, "strict");
    let before = service.get_game(&id).expect("game exists");

    let illegal = lan("e2e5");
    assert_eq!(
        service.make_move(&id, "white", &illegal),
        Err(ServiceError::InvalidMove(ChessError::InvalidMove(illegal)))
    );
    assert_eq!(
        service.make_move(&id, "black", &lan("e7e5")),
        Err(ServiceError::NotYourTurn)
    );
    assert_eq!(
        service.make_move(&id, "stranger", &lan("e2e4")),
        Err(ServiceError::NotAPlayer("stranger".to_string()))
    );
    assert_eq!(
        service.make_move("missing", "white", &lan("e2e4")),
        Err(ServiceError::GameNotFound("missing".to_string()))
    );

    assert_eq!(service.get_game(&id).expect("game exists"), before);
}

#[rstest]
fn one_user_may_hold_both_seats(service: GameService<MemoryGameStore>) {
    let id = service.create_game("solo").expect("store has room");
    service.join_game(&id, "solo", Color::White).expect("seat free");
    service.join_game(&id, "solo", Color::Black).expect("seat free");

    service.make_move(&id, "solo", &lan("e2e4")).expect("white to move");
    service.make_move(&id, "solo", &lan("e7e5")).expect("black to move");
}

#[rstest]
fn joining_announces_role(service: GameService<MemoryGameStore>) {
    let id = seat_players(&service, "roles");
    let watcher = service.connect(&id, "watcher").expect("game exists");
    watcher.try_iter().for_each(drop);

    let _black = service.connect(&id, "black").expect("game exists");
    assert_eq!(
        watcher.try_iter().collect::<Vec<_>>(),
        vec![Notification::Joined {
            username: "black".to_string(),
            role: Role::Player(Color::Black),
        }]
    );
}

#[rstest]
fn concurrent_moves_on_one_game_apply_once(service: GameService<MemoryGameStore>) {
    let service = Arc::new(service);
    let id = seat_players(&service, "race");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let id = id.clone();
            thread::spawn(move || service.make_move(&id, "white", &lan("e2e4")))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("mover thread finished"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| *r == Err(ServiceError::NotYourTurn))
    );

    let data = service.get_game(&id).expect("game exists");
    assert_eq!(data.game.side_to_move(), Color::Black);
}

#[rstest]
fn separate_games_progress_in_parallel(service: GameService<MemoryGameStore>) {
    let service = Arc::new(service);
    let ids: Vec<String> = (0..4)
        .map(|i| seat_players(&service, &format!("table {}", i)))
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for (user, mv) in [("white", "f2f3"), ("black", "e7e5"), ("white", "g2g4"), ("black", "d8h4")] {
                    service.make_move(&id, user, &lan(mv)).expect("legal move");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("game thread finished");
    }

    for id in &ids {
        let data = service.get_game(id).expect("game exists");
        assert_eq!(data.game.outcome(), Some(GameOutcome::BlackWin));
    }
}
