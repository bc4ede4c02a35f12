use std::sync::mpsc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use roster_terminal::state::{Delta, Player, StoreCommand, StoreOp, Team};
use roster_terminal::storage::PlayerStore;
use roster_terminal::store_worker::spawn_store_worker;

fn temp_store(tag: &str) -> PlayerStore {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be past the epoch")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "roster_terminal_worker_{tag}_{}_{nanos}.json",
        std::process::id()
    ));
    PlayerStore::at(path)
}

fn recv(rx: &mpsc::Receiver<Delta>) -> Delta {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("worker should answer")
}

#[test]
fn add_then_fetch_round_trips_through_the_worker() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_store_worker(temp_store("add_fetch"), tx, cmd_rx);

    cmd_tx
        .send(StoreCommand::AddPlayer {
            player: Player {
                name: "Ana".to_string(),
                team: Team::A,
            },
            group: "G1".to_string(),
        })
        .expect("send");
    match recv(&rx) {
        Delta::PlayerAdded { group } => assert_eq!(group, "G1"),
        other => panic!("expected PlayerAdded, got {other:?}"),
    }

    cmd_tx
        .send(StoreCommand::FetchPlayers {
            group: "G1".to_string(),
            team: Team::A,
            generation: 7,
        })
        .expect("send");
    match recv(&rx) {
        Delta::SetPlayers {
            group,
            team,
            generation,
            players,
        } => {
            assert_eq!(group, "G1");
            assert_eq!(team, Team::A);
            assert_eq!(generation, 7);
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].name, "Ana");
            assert_eq!(players[0].team, Team::A);
        }
        other => panic!("expected SetPlayers, got {other:?}"),
    }
}

#[test]
fn fetch_failure_carries_its_request_context() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    // A directory is unreadable as a store file, so the fetch must fail.
    spawn_store_worker(PlayerStore::at(std::env::temp_dir()), tx, cmd_rx);

    cmd_tx
        .send(StoreCommand::FetchPlayers {
            group: "G1".to_string(),
            team: Team::B,
            generation: 3,
        })
        .expect("send");
    match recv(&rx) {
        Delta::FetchPlayersFailed {
            group,
            team,
            generation,
            detail,
        } => {
            assert_eq!(group, "G1");
            assert_eq!(team, Team::B);
            assert_eq!(generation, 3);
            assert!(detail.contains("failed to read store file"));
        }
        other => panic!("expected FetchPlayersFailed, got {other:?}"),
    }
}

#[test]
fn duplicate_add_comes_back_as_a_domain_failure() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_store_worker(temp_store("dup"), tx, cmd_rx);

    let add = StoreCommand::AddPlayer {
        player: Player {
            name: "Ana".to_string(),
            team: Team::A,
        },
        group: "G1".to_string(),
    };
    cmd_tx.send(add.clone()).expect("send");
    assert!(matches!(recv(&rx), Delta::PlayerAdded { .. }));

    cmd_tx.send(add).expect("send");
    match recv(&rx) {
        Delta::StoreFailed { op, message, .. } => {
            assert_eq!(op, StoreOp::AddPlayer);
            assert_eq!(
                message.as_deref(),
                Some("This player is already on a team in this group.")
            );
        }
        other => panic!("expected StoreFailed, got {other:?}"),
    }
}

#[test]
fn remove_group_answers_with_group_removed() {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_store_worker(temp_store("remove"), tx, cmd_rx);

    cmd_tx
        .send(StoreCommand::CreateGroup {
            name: "G1".to_string(),
        })
        .expect("send");
    assert!(matches!(recv(&rx), Delta::GroupCreated { .. }));

    cmd_tx
        .send(StoreCommand::RemoveGroup {
            group: "G1".to_string(),
        })
        .expect("send");
    match recv(&rx) {
        Delta::GroupRemoved { group } => assert_eq!(group, "G1"),
        other => panic!("expected GroupRemoved, got {other:?}"),
    }

    cmd_tx.send(StoreCommand::FetchGroups).expect("send");
    match recv(&rx) {
        Delta::SetGroups(groups) => assert!(groups.is_empty()),
        other => panic!("expected SetGroups, got {other:?}"),
    }
}
