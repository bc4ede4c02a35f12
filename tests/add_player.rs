use roster_terminal::state::{
    apply_delta, AppState, Delta, Player, StoreCommand, StoreOp, Team,
};

fn state_in_group(group: &str) -> AppState {
    let mut state = AppState::new();
    let mount_fetch = state
        .open_group(group)
        .expect("opening a group should start the mount fetch");
    assert!(matches!(mount_fetch, StoreCommand::FetchPlayers { .. }));
    state
}

#[test]
fn empty_or_whitespace_input_never_reaches_the_store() {
    let mut state = state_in_group("G1");

    for input in ["", "   ", "\t \t"] {
        state.pending_input = input.to_string();
        state.alert = None;

        assert_eq!(state.submit_new_player(), None);
        let alert = state.alert.as_ref().expect("validation alert should be set");
        assert_eq!(alert.message, "Enter a player name to add.");
    }
}

#[test]
fn valid_input_targets_current_group_and_team() {
    let mut state = state_in_group("G1");
    state.pending_input = "Ana".to_string();

    let cmd = state.submit_new_player().expect("command should be produced");
    assert_eq!(
        cmd,
        StoreCommand::AddPlayer {
            player: Player {
                name: "Ana".to_string(),
                team: Team::A,
            },
            group: "G1".to_string(),
        }
    );
}

#[test]
fn successful_add_clears_input_and_refetches_the_roster() {
    let mut state = state_in_group("G1");
    state.pending_input = "Ana".to_string();
    state.input_active = true;

    let followups = apply_delta(&mut state, Delta::PlayerAdded {
        group: "G1".to_string(),
    });

    assert!(state.pending_input.is_empty());
    assert!(!state.input_active);
    assert_eq!(followups.len(), 1);
    match &followups[0] {
        StoreCommand::FetchPlayers {
            group,
            team,
            generation,
        } => {
            assert_eq!(group, "G1");
            assert_eq!(*team, Team::A);
            assert_eq!(*generation, state.fetch_generation);
        }
        other => panic!("expected a roster fetch, got {other:?}"),
    }
}

#[test]
fn domain_error_message_is_shown_verbatim() {
    let mut state = state_in_group("G1");
    state.pending_input = "Ana".to_string();

    let followups = apply_delta(&mut state, Delta::StoreFailed {
        op: StoreOp::AddPlayer,
        message: Some("This player is already on a team in this group.".to_string()),
        detail: "duplicate".to_string(),
    });

    assert!(followups.is_empty());
    let alert = state.alert.as_ref().expect("alert should be set");
    assert_eq!(
        alert.message,
        "This player is already on a team in this group."
    );
    // The typed name survives a failed add.
    assert_eq!(state.pending_input, "Ana");
}

#[test]
fn unknown_add_failure_is_generic_and_logged() {
    let mut state = state_in_group("G1");

    apply_delta(&mut state, Delta::StoreFailed {
        op: StoreOp::AddPlayer,
        message: None,
        detail: "failed to write store file: disk full".to_string(),
    });

    let alert = state.alert.as_ref().expect("alert should be set");
    assert_eq!(alert.message, "Could not add this player.");
    assert!(
        state
            .logs
            .iter()
            .any(|line| line.contains("disk full")),
        "failure detail should land in the console log"
    );
}
