use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    difficulty::Difficulty,
    error::Result,
    game::{Board, GameState, RevealOutcome},
    stats::{Statistics, StatsStore},
};

/// What the shell should draw for a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Empty,
    Number(u8),
    /// Shown for every mine once the game is over.
    Mine { won: bool },
    /// The mine that was clicked.
    Exploded,
}

/// One player's game: the current board, its difficulty and the win/loss record.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    difficulty: Difficulty,
    stats: Statistics,
    store: StatsStore,
    rng: SmallRng,
}

impl GameSession {
    pub fn new(difficulty: Difficulty, store: StatsStore) -> Result<Self> {
        Self::with_rng(difficulty, store, SmallRng::from_entropy())
    }

    pub fn with_seed(difficulty: Difficulty, store: StatsStore, seed: u64) -> Result<Self> {
        Self::with_rng(difficulty, store, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, store: StatsStore, mut rng: SmallRng) -> Result<Self> {
        let stats = store.load();
        log::info!(
            "loaded statistics from {}: {} wins, {} losses",
            store.path().display(),
            stats.wins,
            stats.losses
        );
        let board = difficulty.generate(rng.gen())?;
        Ok(Self {
            board,
            difficulty,
            stats,
            store,
            rng,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn state(&self) -> GameState {
        self.board.state()
    }

    /// Throws the current board away and deals a fresh one.
    pub fn new_game(&mut self) -> Result<()> {
        self.board = self.difficulty.generate(self.rng.gen())?;
        log::info!("new {} game", self.difficulty);
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        self.difficulty = difficulty;
        self.new_game()
    }

    /// Reveals a cell and, if that ends the game, records and saves the result.
    pub fn reveal(&mut self, pos: (usize, usize)) -> RevealOutcome {
        let outcome = self.board.reveal(pos);
        log::debug!("reveal {pos:?}: {outcome:?}");

        if matches!(outcome, RevealOutcome::Won | RevealOutcome::Lost) {
            self.stats.record(self.board.state());
            log::info!(
                "game {:?}: {} wins, {} losses",
                self.board.state(),
                self.stats.wins,
                self.stats.losses
            );
            if let Err(err) = self.store.save(self.stats) {
                log::warn!("could not save {}: {err}", self.store.path().display());
            }
        }

        outcome
    }

    /// Reveals the cell at a row-major linear index.
    pub fn click(&mut self, index: usize) -> RevealOutcome {
        match self.board.position_of(index) {
            Some(pos) => self.reveal(pos),
            None => RevealOutcome::NoOp,
        }
    }

    pub fn cell_view(&self, pos: (usize, usize)) -> Option<CellView> {
        let cell = self.board.cell(pos)?;
        let state = self.board.state();

        Some(if cell.is_mine() && state.is_finished() {
            if self.board.exploded() == Some(pos) {
                CellView::Exploded
            } else {
                CellView::Mine {
                    won: state == GameState::Won,
                }
            }
        } else if !cell.is_revealed() {
            CellView::Hidden
        } else if cell.adjacent() == 0 {
            CellView::Empty
        } else {
            CellView::Number(cell.adjacent())
        })
    }
}
