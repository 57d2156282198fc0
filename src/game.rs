use itertools::Itertools;
use ndarray::Array2;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::error::{Error, Result};

/// Largest number of rows or columns a board can have.
pub const MAX_DIM: usize = 15;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GameState {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Nothing changed: out of bounds, already revealed, or the game is over.
    NoOp,
    /// At least one cell was revealed and the game goes on.
    Continue,
    Lost,
    Won,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    mine: bool,
    adjacent: u8,
    revealed: bool,
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.mine
    }

    /// Mines among the Moore neighborhood. Always zero for a mine.
    pub fn adjacent(&self) -> u8 {
        self.adjacent
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    cells: Array2<Cell>,
    mines: usize,
    state: GameState,
    exploded: Option<(usize, usize)>,
}

impl Board {
    /// Places `mines` mines uniformly at random, rejecting collisions, then counts neighbors.
    ///
    /// The same seed always yields the same board.
    pub fn generate(rows: usize, cols: usize, mines: usize, seed: u64) -> Result<Self> {
        if !dims_valid(rows, cols) || mines == 0 || mines >= rows * cols {
            return Err(Error::InvalidConfiguration { rows, cols, mines });
        }

        let mut cells = Array2::<Cell>::default((rows, cols));
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut placed_mines = 0;
        while placed_mines < mines {
            let mine_pos = (rng.gen_range(0..rows), rng.gen_range(0..cols));
            if cells[mine_pos].mine {
                continue;
            }

            cells[mine_pos].mine = true;
            placed_mines += 1;
        }

        Ok(Self::with_cells(cells, mines))
    }

    /// Builds a board from an explicit mine layout. Unlike [`Board::generate`] this accepts
    /// zero mines.
    pub fn from_mines(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Result<Self> {
        let invalid = || Error::InvalidConfiguration {
            rows,
            cols,
            mines: mines.len(),
        };
        if !dims_valid(rows, cols) {
            return Err(invalid());
        }

        let mut cells = Array2::<Cell>::default((rows, cols));
        for &pos in mines {
            cells.get_mut(pos).ok_or_else(invalid)?.mine = true;
        }

        let count = cells.iter().filter(|cell| cell.mine).count();
        if count >= rows * cols {
            return Err(invalid());
        }

        Ok(Self::with_cells(cells, count))
    }

    fn with_cells(mut cells: Array2<Cell>, mines: usize) -> Self {
        let (rows, cols) = cells.dim();
        for pos in (0..rows).cartesian_product(0..cols) {
            if cells[pos].mine {
                continue;
            }
            let count = neighbors(&cells, pos).filter(|&n| cells[n].mine).count();
            cells[pos].adjacent = count as u8;
        }

        Self {
            cells,
            mines,
            state: GameState::InProgress,
            exploded: None,
        }
    }

    /// `(rows, cols)`
    pub fn size(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn cell(&self, pos: (usize, usize)) -> Option<&Cell> {
        self.cells.get(pos)
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.revealed).count()
    }

    pub fn mines(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .indexed_iter()
            .filter_map(|(pos, cell)| cell.mine.then_some(pos))
    }

    /// The mine that ended the game, if it was lost.
    pub fn exploded(&self) -> Option<(usize, usize)> {
        self.exploded
    }

    /// Row-major linear index of a cell.
    pub fn index_of(&self, (row, col): (usize, usize)) -> Option<usize> {
        let (rows, cols) = self.size();
        (row < rows && col < cols).then_some(row * cols + col)
    }

    pub fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        let (rows, cols) = self.size();
        (index < rows * cols).then_some((index / cols, index % cols))
    }

    /// True once every cell that is not a mine has been revealed.
    pub fn complete(&self) -> bool {
        !self.cells.iter().any(|cell| !cell.mine && !cell.revealed)
    }

    /// Reveals a cell, opening connected empty cells and their numbered border.
    pub fn reveal(&mut self, pos: (usize, usize)) -> RevealOutcome {
        if self.state.is_finished() {
            return RevealOutcome::NoOp;
        }
        let Some(cell) = self.cells.get_mut(pos) else {
            return RevealOutcome::NoOp;
        };
        if cell.revealed {
            return RevealOutcome::NoOp;
        }

        cell.revealed = true;
        if cell.mine {
            self.state = GameState::Lost;
            self.exploded = Some(pos);
            return RevealOutcome::Lost;
        }

        if cell.adjacent == 0 {
            let mut check = neighbors(&self.cells, pos).collect::<Vec<_>>();

            // Each cell is revealed at most once, so the worklist drains.
            while let Some(next_pos) = check.pop() {
                let cell = &mut self.cells[next_pos];
                if cell.revealed || cell.mine {
                    continue;
                }
                cell.revealed = true;
                if cell.adjacent == 0 {
                    check.extend(neighbors(&self.cells, next_pos));
                }
            }
        }

        if self.complete() {
            self.state = GameState::Won;
            RevealOutcome::Won
        } else {
            RevealOutcome::Continue
        }
    }
}

fn dims_valid(rows: usize, cols: usize) -> bool {
    (1..=MAX_DIM).contains(&rows) && (1..=MAX_DIM).contains(&cols)
}

/// In-bounds positions of the Moore neighborhood of `(row, col)`.
pub fn neighbors<T>(
    board: &Array2<T>,
    (row, col): (usize, usize),
) -> impl Iterator<Item = (usize, usize)> {
    [
        (row.wrapping_sub(1), col.wrapping_sub(1)),
        (row, col.wrapping_sub(1)),
        (row + 1, col.wrapping_sub(1)),
        (row + 1, col),
        (row + 1, col + 1),
        (row, col + 1),
        (row.wrapping_sub(1), col + 1),
        (row.wrapping_sub(1), col),
    ]
    .map(|pos| board.get(pos).map(|_| pos))
    .into_iter()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Board {
        Board::from_mines(rows, cols, mines).unwrap()
    }

    #[test]
    fn generate_places_exact_mine_count() {
        for (rows, cols, mines) in [(5, 5, 5), (10, 10, 20), (15, 15, 40), (3, 3, 8)] {
            for seed in 0..16 {
                let board = Board::generate(rows, cols, mines, seed).unwrap();
                assert_eq!(board.size(), (rows, cols));
                assert_eq!(board.mines().count(), mines);
                assert_eq!(board.mine_count(), mines);
                assert_eq!(board.revealed_count(), 0);
                assert_eq!(board.state(), GameState::InProgress);
            }
        }
    }

    #[test]
    fn generate_counts_adjacent_mines() {
        let board = Board::generate(15, 15, 40, 7).unwrap();
        for row in 0..15 {
            for col in 0..15 {
                let cell = board.cell((row, col)).unwrap();
                if cell.is_mine() {
                    continue;
                }
                let mut expected = 0;
                for r in row.saturating_sub(1)..=(row + 1).min(14) {
                    for c in col.saturating_sub(1)..=(col + 1).min(14) {
                        if (r, c) != (row, col) && board.cell((r, c)).unwrap().is_mine() {
                            expected += 1;
                        }
                    }
                }
                assert_eq!(cell.adjacent(), expected, "cell ({row}, {col})");
            }
        }
    }

    #[test]
    fn generate_is_reproducible_from_seed() {
        let a = Board::generate(10, 10, 20, 42).unwrap();
        let b = Board::generate(10, 10, 20, 42).unwrap();
        assert_eq!(a.mines().collect::<Vec<_>>(), b.mines().collect::<Vec<_>>());
    }

    #[test]
    fn generate_rejects_invalid_configuration() {
        for (rows, cols, mines) in [(5, 5, 0), (5, 5, 25), (5, 5, 30), (0, 5, 1), (16, 5, 1)] {
            assert!(matches!(
                Board::generate(rows, cols, mines, 0),
                Err(Error::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn from_mines_rejects_out_of_bounds_and_full_boards() {
        assert!(Board::from_mines(2, 2, &[(2, 0)]).is_err());
        assert!(Board::from_mines(1, 2, &[(0, 0), (0, 1)]).is_err());
    }

    #[test]
    fn neighbors_are_clipped_at_edges() {
        let cells = Array2::<Cell>::default((3, 4));
        assert_eq!(neighbors(&cells, (0, 0)).count(), 3);
        assert_eq!(neighbors(&cells, (0, 1)).count(), 5);
        assert_eq!(neighbors(&cells, (1, 1)).count(), 8);
        assert_eq!(neighbors(&cells, (2, 3)).count(), 3);
    }

    #[test]
    fn reveal_mine_loses_without_side_effects() {
        let mut board = board(3, 3, &[(1, 1)]);

        assert_eq!(board.reveal((1, 1)), RevealOutcome::Lost);
        assert_eq!(board.state(), GameState::Lost);
        assert_eq!(board.exploded(), Some((1, 1)));
        assert_eq!(board.revealed_count(), 1);
    }

    #[test]
    fn reveal_twice_is_noop() {
        let mut board = board(3, 3, &[(2, 2)]);

        assert_eq!(board.reveal((1, 1)), RevealOutcome::Continue);
        assert_eq!(board.reveal((1, 1)), RevealOutcome::NoOp);
        assert_eq!(board.state(), GameState::InProgress);
        assert_eq!(board.revealed_count(), 1);
    }

    #[test]
    fn reveal_out_of_bounds_is_noop() {
        let mut board = board(3, 3, &[(2, 2)]);

        assert_eq!(board.reveal((3, 0)), RevealOutcome::NoOp);
        assert_eq!(board.reveal((0, 3)), RevealOutcome::NoOp);
        assert_eq!(board.revealed_count(), 0);
    }

    #[test]
    fn reveal_cascade_stops_at_numbered_border() {
        let wall = (0..5).map(|row| (row, 2)).collect::<Vec<_>>();
        let mut board = board(5, 5, &wall);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Continue);
        for row in 0..5 {
            assert!(board.cell((row, 0)).unwrap().is_revealed());
            assert!(board.cell((row, 1)).unwrap().is_revealed());
            assert!(!board.cell((row, 3)).unwrap().is_revealed());
            assert!(!board.cell((row, 4)).unwrap().is_revealed());
        }
        assert_eq!(board.revealed_count(), 10);
    }

    #[test]
    fn reveal_cascade_opens_whole_region_and_wins() {
        let mut board = board(5, 5, &[(4, 4)]);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Won);
        assert_eq!(board.revealed_count(), 24);
        assert!(!board.cell((4, 4)).unwrap().is_revealed());
    }

    #[test]
    fn reveal_without_mines_wins_immediately() {
        let mut board = board(5, 5, &[]);

        assert_eq!(board.reveal((2, 2)), RevealOutcome::Won);
        assert_eq!(board.revealed_count(), 25);
    }

    #[test]
    fn won_is_reported_once() {
        let mut board = board(1, 3, &[(0, 0)]);

        assert_eq!(board.reveal((0, 1)), RevealOutcome::Continue);
        assert_eq!(board.reveal((0, 2)), RevealOutcome::Won);
        assert_eq!(board.reveal((0, 2)), RevealOutcome::NoOp);
        assert_eq!(board.reveal((0, 0)), RevealOutcome::NoOp);
        assert_eq!(board.state(), GameState::Won);
        assert!(!board.cell((0, 0)).unwrap().is_revealed());
    }

    #[test]
    fn lost_board_accepts_no_further_reveals() {
        let mut board = board(3, 3, &[(0, 0)]);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Lost);
        assert_eq!(board.reveal((2, 2)), RevealOutcome::NoOp);
        assert_eq!(board.revealed_count(), 1);
    }

    #[test]
    fn linear_index_round_trips_row_major() {
        let board = board(5, 7, &[]);

        assert_eq!(board.position_of(0), Some((0, 0)));
        assert_eq!(board.position_of(9), Some((1, 2)));
        assert_eq!(board.index_of((1, 2)), Some(9));
        assert_eq!(board.position_of(35), None);
        assert_eq!(board.index_of((5, 0)), None);
    }
}
