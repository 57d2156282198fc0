use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{error::Result, game::GameState};

/// File the shell keeps its statistics in, relative to the working directory.
pub const DEFAULT_STATS_FILE: &str = "stats.bin";

const RECORD_LEN: usize = 8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub wins: u32,
    pub losses: u32,
}

impl Statistics {
    /// Counts a finished game. Games still in progress are ignored.
    pub fn record(&mut self, state: GameState) {
        match state {
            GameState::Won => self.wins = self.wins.saturating_add(1),
            GameState::Lost => self.losses = self.losses.saturating_add(1),
            GameState::InProgress => {}
        }
    }

    fn to_bytes(self) -> [u8; RECORD_LEN] {
        let mut bytes = [0; RECORD_LEN];
        bytes[..4].copy_from_slice(&self.wins.to_ne_bytes());
        bytes[4..].copy_from_slice(&self.losses.to_ne_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes = <[u8; RECORD_LEN]>::try_from(bytes).ok()?;
        Some(Self {
            wins: u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            losses: u32::from_ne_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

/// Win/loss counters stored as two native-endian `u32`s, wins first. No header.
#[derive(Clone, Debug)]
pub struct StatsStore {
    path: PathBuf,
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATS_FILE)
    }
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files load as zero.
    pub fn load(&self) -> Statistics {
        match fs::read(&self.path) {
            Ok(bytes) => Statistics::from_bytes(&bytes).unwrap_or_else(|| {
                log::warn!(
                    "ignoring corrupt statistics file {} ({} bytes)",
                    self.path.display(),
                    bytes.len()
                );
                Statistics::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Statistics::default(),
            Err(err) => {
                log::warn!("could not read {}: {err}", self.path.display());
                Statistics::default()
            }
        }
    }

    /// Writes a sibling file and renames it over the target.
    pub fn save(&self, stats: Statistics) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, stats.to_bytes())?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("saved {stats:?} to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("stats.bin"));

        assert_eq!(store.load(), Statistics::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("stats.bin"));

        store.save(Statistics { wins: 3, losses: 4 }).unwrap();

        assert_eq!(store.load(), Statistics { wins: 3, losses: 4 });
        assert!(!dir.path().join("stats.tmp").exists());
    }

    #[test]
    fn file_is_wins_then_losses_native_endian() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.bin");
        let store = StatsStore::new(&path);

        store.save(Statistics { wins: 1, losses: 258 }).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[..4], 1u32.to_ne_bytes());
        assert_eq!(bytes[4..], 258u32.to_ne_bytes());
    }

    #[test]
    fn load_corrupt_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.bin");
        fs::write(&path, [1, 2, 3]).unwrap();

        assert_eq!(StatsStore::new(&path).load(), Statistics::default());
    }

    #[test]
    fn record_counts_only_finished_games() {
        let mut stats = Statistics::default();
        stats.record(GameState::InProgress);
        stats.record(GameState::Won);
        stats.record(GameState::Lost);
        stats.record(GameState::Lost);

        assert_eq!(stats, Statistics { wins: 1, losses: 2 });
    }
}
