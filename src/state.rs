use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn label(self) -> &'static str {
        match self {
            Team::A => "TEAM A",
            Team::B => "TEAM B",
        }
    }

    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Groups,
    Players { group: String },
}

/// Roster fetch lifecycle for the Players screen. The roster shown is only
/// ever the result of the last `Loaded` fetch; mutations never edit it in
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Requests sent to the storage worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    FetchGroups,
    CreateGroup {
        name: String,
    },
    FetchPlayers {
        group: String,
        team: Team,
        generation: u64,
    },
    AddPlayer {
        player: Player,
        group: String,
    },
    RemovePlayer {
        name: String,
        group: String,
    },
    RemoveGroup {
        group: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    FetchGroups,
    CreateGroup,
    AddPlayer,
    RemovePlayer,
    RemoveGroup,
}

impl StoreOp {
    pub fn label(self) -> &'static str {
        match self {
            StoreOp::FetchGroups => "fetch groups",
            StoreOp::CreateGroup => "create group",
            StoreOp::AddPlayer => "add player",
            StoreOp::RemovePlayer => "remove player",
            StoreOp::RemoveGroup => "remove group",
        }
    }
}

/// Replies from the storage worker, applied via [`apply_delta`].
#[derive(Debug, Clone)]
pub enum Delta {
    SetGroups(Vec<String>),
    GroupCreated {
        name: String,
    },
    SetPlayers {
        group: String,
        team: Team,
        generation: u64,
        players: Vec<Player>,
    },
    // Roster fetch failures carry their request context so replies for an
    // abandoned screen are discarded the same way successes are.
    FetchPlayersFailed {
        group: String,
        team: Team,
        generation: u64,
        detail: String,
    },
    PlayerAdded {
        group: String,
    },
    PlayerRemoved {
        group: String,
    },
    GroupRemoved {
        group: String,
    },
    StoreFailed {
        op: StoreOp,
        // Present only for domain errors; shown to the user verbatim.
        message: Option<String>,
        detail: String,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub groups: Vec<String>,
    pub groups_loading: bool,
    pub selected: usize,
    pub team: Team,
    pub players: Vec<Player>,
    pub phase: FetchPhase,
    pub fetch_generation: u64,
    pub pending_input: String,
    pub input_active: bool,
    pub confirm_remove: bool,
    pub alert: Option<Alert>,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Groups,
            groups: Vec::new(),
            groups_loading: true,
            selected: 0,
            team: Team::A,
            players: Vec::new(),
            phase: FetchPhase::Idle,
            fetch_generation: 0,
            pending_input: String::new(),
            input_active: false,
            confirm_remove: false,
            alert: None,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
        }
    }

    pub fn current_group(&self) -> Option<&str> {
        match &self.screen {
            Screen::Players { group } => Some(group.as_str()),
            Screen::Groups => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    /// Starts a roster fetch for the current group + team filter. Bumps the
    /// fetch generation so replies from older fetches can be discarded.
    pub fn begin_roster_fetch(&mut self) -> Option<StoreCommand> {
        let group = self.current_group()?.to_string();
        self.fetch_generation += 1;
        self.phase = FetchPhase::Loading;
        Some(StoreCommand::FetchPlayers {
            group,
            team: self.team,
            generation: self.fetch_generation,
        })
    }

    /// Enters the Players screen for `group` with fresh roster state and
    /// returns the mount fetch.
    pub fn open_group(&mut self, group: impl Into<String>) -> Option<StoreCommand> {
        self.screen = Screen::Players {
            group: group.into(),
        };
        self.team = Team::A;
        self.players.clear();
        self.phase = FetchPhase::Idle;
        self.pending_input.clear();
        self.input_active = false;
        self.confirm_remove = false;
        self.selected = 0;
        self.begin_roster_fetch()
    }

    pub fn open_selected_group(&mut self) -> Option<StoreCommand> {
        let group = self.groups.get(self.selected)?.clone();
        self.open_group(group)
    }

    /// Leaves the Players screen, discarding its roster state.
    pub fn go_back(&mut self) -> Option<StoreCommand> {
        if !matches!(self.screen, Screen::Players { .. }) {
            return None;
        }
        self.screen = Screen::Groups;
        self.team = Team::A;
        self.players.clear();
        self.phase = FetchPhase::Idle;
        self.pending_input.clear();
        self.input_active = false;
        self.confirm_remove = false;
        self.selected = 0;
        self.groups_loading = true;
        Some(StoreCommand::FetchGroups)
    }

    /// Switches the team filter. A no-op for the already-active team, so a
    /// filter press never issues more than one fetch.
    pub fn set_team(&mut self, team: Team) -> Option<StoreCommand> {
        if !matches!(self.screen, Screen::Players { .. }) {
            return None;
        }
        if self.team == team {
            return None;
        }
        self.team = team;
        self.selected = 0;
        self.begin_roster_fetch()
    }

    pub fn toggle_team(&mut self) -> Option<StoreCommand> {
        self.set_team(self.team.other())
    }

    /// Validates the pending input and, if non-empty, produces the add
    /// command. Empty or whitespace-only input raises the validation alert
    /// and the storage worker is never involved.
    pub fn submit_new_player(&mut self) -> Option<StoreCommand> {
        let group = self.current_group()?.to_string();
        if self.pending_input.trim().is_empty() {
            self.alert = Some(Alert::new("New player", "Enter a player name to add."));
            return None;
        }
        Some(StoreCommand::AddPlayer {
            player: Player {
                name: self.pending_input.clone(),
                team: self.team,
            },
            group,
        })
    }

    pub fn submit_new_group(&mut self) -> Option<StoreCommand> {
        if !matches!(self.screen, Screen::Groups) {
            return None;
        }
        let name = self.pending_input.trim().to_string();
        if name.is_empty() {
            self.alert = Some(Alert::new("New group", "Enter a group name."));
            return None;
        }
        Some(StoreCommand::CreateGroup { name })
    }

    pub fn remove_selected_player(&mut self) -> Option<StoreCommand> {
        let group = self.current_group()?.to_string();
        let name = self.players.get(self.selected)?.name.clone();
        Some(StoreCommand::RemovePlayer { name, group })
    }

    /// Raises the remove-group confirmation. The storage worker is only
    /// involved once [`AppState::confirm_remove_group`] is called.
    pub fn request_remove_group(&mut self) {
        if matches!(self.screen, Screen::Players { .. }) {
            self.confirm_remove = true;
        }
    }

    pub fn confirm_remove_group(&mut self) -> Option<StoreCommand> {
        if !self.confirm_remove {
            return None;
        }
        self.confirm_remove = false;
        let group = self.current_group()?.to_string();
        Some(StoreCommand::RemoveGroup { group })
    }

    pub fn cancel_remove_group(&mut self) {
        self.confirm_remove = false;
    }

    pub fn push_input(&mut self, c: char) {
        self.pending_input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.pending_input.pop();
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn select_next(&mut self) {
        let total = self.list_len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn list_len(&self) -> usize {
        match self.screen {
            Screen::Groups => self.groups.len(),
            Screen::Players { .. } => self.players.len(),
        }
    }

    fn clamp_selected(&mut self) {
        let total = self.list_len();
        if self.selected >= total {
            self.selected = total.saturating_sub(1);
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

/// Applies a storage reply and returns the follow-up commands it demands.
/// Successful mutations never touch the roster directly; they trigger a full
/// re-fetch instead, so the view only ever shows what storage returned.
pub fn apply_delta(state: &mut AppState, delta: Delta) -> Vec<StoreCommand> {
    match delta {
        Delta::SetGroups(groups) => {
            state.groups = groups;
            state.groups_loading = false;
            if matches!(state.screen, Screen::Groups) {
                state.clamp_selected();
            }
            Vec::new()
        }
        Delta::GroupCreated { name } => {
            state.push_log(format!("[INFO] Group created: {name}"));
            let mut followups = vec![StoreCommand::FetchGroups];
            followups.extend(state.open_group(name));
            followups
        }
        Delta::SetPlayers {
            group,
            team,
            generation,
            players,
        } => {
            if state.current_group() != Some(group.as_str()) || team != state.team {
                state.push_log(format!(
                    "[INFO] Discarded roster fetch for {group} / {}",
                    team.label()
                ));
                return Vec::new();
            }
            if generation != state.fetch_generation {
                state.push_log(format!(
                    "[INFO] Discarded stale roster fetch (gen {generation})"
                ));
                return Vec::new();
            }
            state.players = players;
            state.phase = FetchPhase::Loaded;
            state.clamp_selected();
            Vec::new()
        }
        Delta::FetchPlayersFailed {
            group,
            team,
            generation,
            detail,
        } => {
            state.push_log(format!("[WARN] Storage fetch players: {detail}"));
            if state.current_group() != Some(group.as_str())
                || team != state.team
                || generation != state.fetch_generation
            {
                state.push_log(format!(
                    "[INFO] Discarded failed roster fetch for {group} / {}",
                    team.label()
                ));
                return Vec::new();
            }
            state.players.clear();
            state.phase = FetchPhase::Failed;
            state.selected = 0;
            state.alert = Some(Alert::new("Players", "Could not load the players."));
            Vec::new()
        }
        Delta::PlayerAdded { group } => {
            if state.current_group() != Some(group.as_str()) {
                return Vec::new();
            }
            state.pending_input.clear();
            state.input_active = false;
            state.push_log(format!("[INFO] Player added to {group}"));
            state.begin_roster_fetch().into_iter().collect()
        }
        Delta::PlayerRemoved { group } => {
            if state.current_group() != Some(group.as_str()) {
                return Vec::new();
            }
            state.push_log(format!("[INFO] Player removed from {group}"));
            state.begin_roster_fetch().into_iter().collect()
        }
        Delta::GroupRemoved { group } => {
            state.push_log(format!("[INFO] Group removed: {group}"));
            if state.current_group() == Some(group.as_str()) {
                return match state.go_back() {
                    Some(cmd) => vec![cmd],
                    None => Vec::new(),
                };
            }
            // Resolved after the user already navigated away; only the
            // groups listing can be stale.
            if matches!(state.screen, Screen::Groups) {
                state.groups_loading = true;
                return vec![StoreCommand::FetchGroups];
            }
            Vec::new()
        }
        Delta::StoreFailed {
            op,
            message,
            detail,
        } => {
            state.push_log(format!("[WARN] Storage {}: {detail}", op.label()));
            match op {
                StoreOp::FetchGroups => {
                    state.groups_loading = false;
                    state.alert = Some(Alert::new("Groups", "Could not load the groups."));
                }
                StoreOp::CreateGroup => {
                    let message =
                        message.unwrap_or_else(|| "Could not create a new group.".to_string());
                    state.alert = Some(Alert::new("New group", message));
                }
                StoreOp::AddPlayer => {
                    let message =
                        message.unwrap_or_else(|| "Could not add this player.".to_string());
                    state.alert = Some(Alert::new("New player", message));
                }
                StoreOp::RemovePlayer => {
                    state.alert =
                        Some(Alert::new("Remove player", "Could not remove this player."));
                }
                StoreOp::RemoveGroup => {
                    state.alert = Some(Alert::new("Remove group", "Could not remove the group."));
                }
            }
            Vec::new()
        }
        Delta::Log(msg) => {
            state.push_log(msg);
            Vec::new()
        }
    }
}
