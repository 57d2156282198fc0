use std::fmt;

use crate::{error::Result, game::Board};

/// Board presets offered by the difficulty selector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// `(rows, cols, mines)`
    pub const fn params(self) -> (usize, usize, usize) {
        match self {
            Self::Easy => (5, 5, 5),
            Self::Medium => (10, 10, 20),
            Self::Hard => (15, 15, 40),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    pub fn generate(self, seed: u64) -> Result<Board> {
        let (rows, cols, mines) = self.params();
        Board::generate(rows, cols, mines, seed)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_generate_boards_of_their_size() {
        for difficulty in Difficulty::ALL {
            let (rows, cols, mines) = difficulty.params();
            let board = difficulty.generate(1).unwrap();
            assert_eq!(board.size(), (rows, cols));
            assert_eq!(board.mines().count(), mines);
        }
    }
}
