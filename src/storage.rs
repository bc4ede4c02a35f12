use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{Player, Team};

const STORE_DIR: &str = "roster_terminal";
const STORE_FILE: &str = "groups.json";
const STORE_VERSION: u32 = 1;

pub const STORE_PATH_ENV: &str = "ROSTER_STORE_PATH";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A group with this name already exists.")]
    GroupExists,
    #[error("This player is already on a team in this group.")]
    DuplicatePlayer,
    #[error("failed to read store file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write store file: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to encode store file: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("no usable store path (set ROSTER_STORE_PATH, XDG_DATA_HOME or HOME)")]
    NoPath,
}

impl StoreError {
    /// Domain errors carry a message safe to show the user verbatim.
    /// Everything else surfaces as a generic failure.
    pub fn user_message(&self) -> Option<String> {
        match self {
            StoreError::GroupExists | StoreError::DuplicatePlayer => Some(self.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    groups: Vec<String>,
    players: HashMap<String, Vec<Player>>,
}

fn empty_store() -> StoreFile {
    StoreFile {
        version: STORE_VERSION,
        groups: Vec::new(),
        players: HashMap::new(),
    }
}

/// Persisted group/player store backed by a versioned JSON file. Every
/// operation reads the whole file and mutations rewrite it atomically, so
/// readers never observe a half-written store.
#[derive(Debug, Clone)]
pub struct PlayerStore {
    path: PathBuf,
}

impl PlayerStore {
    pub fn open_default() -> Result<Self, StoreError> {
        let path = store_path().ok_or(StoreError::NoPath)?;
        Ok(Self { path })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn groups_get_all(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.groups)
    }

    pub fn group_create(&self, name: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        if file.groups.iter().any(|g| g == name) {
            return Err(StoreError::GroupExists);
        }
        file.groups.push(name.to_string());
        self.save(&file)
    }

    /// Removes the group and every player stored under it.
    pub fn group_remove_by_name(&self, name: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        file.groups.retain(|g| g != name);
        file.players.remove(name);
        self.save(&file)
    }

    pub fn players_get_by_group(&self, group: &str) -> Result<Vec<Player>, StoreError> {
        Ok(self.load()?.players.get(group).cloned().unwrap_or_default())
    }

    /// Insertion order is preserved; callers get rows exactly as stored.
    pub fn players_get_by_group_and_team(
        &self,
        group: &str,
        team: Team,
    ) -> Result<Vec<Player>, StoreError> {
        Ok(self
            .players_get_by_group(group)?
            .into_iter()
            .filter(|p| p.team == team)
            .collect())
    }

    /// A player name is unique across the whole group, not per team.
    pub fn player_add_by_group(&self, player: Player, group: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        let roster = file.players.entry(group.to_string()).or_default();
        if roster.iter().any(|p| p.name == player.name) {
            return Err(StoreError::DuplicatePlayer);
        }
        roster.push(player);
        self.save(&file)
    }

    /// Exact, case-sensitive name match. Removing an absent name is a no-op.
    pub fn player_remove_by_group(&self, name: &str, group: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        if let Some(roster) = file.players.get_mut(group) {
            roster.retain(|p| p.name != name);
        }
        self.save(&file)
    }

    fn load(&self) -> Result<StoreFile, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(empty_store()),
            Err(err) => return Err(StoreError::Read(err)),
        };
        let Ok(file) = serde_json::from_str::<StoreFile>(&raw) else {
            return Ok(empty_store());
        };
        if file.version != STORE_VERSION {
            return Ok(empty_store());
        }
        Ok(file)
    }

    fn save(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(StoreError::Write)?;
        }
        let json = serde_json::to_string(file).map_err(StoreError::Encode)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StoreError::Write)?;
        fs::rename(&tmp, &self.path).map_err(StoreError::Write)
    }
}

fn store_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(STORE_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if let Ok(base) = std::env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(STORE_DIR)
            .join(STORE_FILE),
    )
}
