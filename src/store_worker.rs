use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::state::{Delta, StoreCommand, StoreOp};
use crate::storage::{PlayerStore, StoreError};

/// Runs the store on its own thread. Commands arrive over `cmd_rx` and every
/// outcome goes back as a `Delta`; the UI thread never blocks on the store.
pub fn spawn_store_worker(
    store: PlayerStore,
    tx: Sender<Delta>,
    cmd_rx: Receiver<StoreCommand>,
) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(&store, &tx, cmd);
        }
    });
}

fn handle_command(store: &PlayerStore, tx: &Sender<Delta>, cmd: StoreCommand) {
    match cmd {
        StoreCommand::FetchGroups => match store.groups_get_all() {
            Ok(groups) => {
                let _ = tx.send(Delta::SetGroups(groups));
            }
            Err(err) => send_failure(tx, StoreOp::FetchGroups, err),
        },
        StoreCommand::CreateGroup { name } => match store.group_create(&name) {
            Ok(()) => {
                let _ = tx.send(Delta::GroupCreated { name });
            }
            Err(err) => send_failure(tx, StoreOp::CreateGroup, err),
        },
        StoreCommand::FetchPlayers {
            group,
            team,
            generation,
        } => match store.players_get_by_group_and_team(&group, team) {
            Ok(players) => {
                let _ = tx.send(Delta::SetPlayers {
                    group,
                    team,
                    generation,
                    players,
                });
            }
            Err(err) => {
                let _ = tx.send(Delta::FetchPlayersFailed {
                    group,
                    team,
                    generation,
                    detail: err.to_string(),
                });
            }
        },
        StoreCommand::AddPlayer { player, group } => {
            match store.player_add_by_group(player, &group) {
                Ok(()) => {
                    let _ = tx.send(Delta::PlayerAdded { group });
                }
                Err(err) => send_failure(tx, StoreOp::AddPlayer, err),
            }
        }
        StoreCommand::RemovePlayer { name, group } => {
            match store.player_remove_by_group(&name, &group) {
                Ok(()) => {
                    let _ = tx.send(Delta::PlayerRemoved { group });
                }
                Err(err) => send_failure(tx, StoreOp::RemovePlayer, err),
            }
        }
        StoreCommand::RemoveGroup { group } => match store.group_remove_by_name(&group) {
            Ok(()) => {
                let _ = tx.send(Delta::GroupRemoved { group });
            }
            Err(err) => send_failure(tx, StoreOp::RemoveGroup, err),
        },
    }
}

fn send_failure(tx: &Sender<Delta>, op: StoreOp, err: StoreError) {
    let _ = tx.send(Delta::StoreFailed {
        op,
        message: err.user_message(),
        detail: err.to_string(),
    });
}
