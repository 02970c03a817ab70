use std::fmt;
use std::str::FromStr;

use crate::error::BoardError;

/// Number of cells on the board
pub const NUM_CELLS: usize = 9;

/// Number of distinct actions (one per cell)
pub const NUM_ACTIONS: usize = NUM_CELLS;

/// Size of the canonical key space (3^9)
pub const KEY_SPACE: usize = POWERS_OF_THREE[NUM_CELLS - 1] as usize * 3;

/// Canonical integer identity of a board
pub type StateKey = u32;

const POWERS_OF_THREE: [u32; NUM_CELLS] = {
    let mut powers = [1u32; NUM_CELLS];
    let mut i = 1;
    while i < NUM_CELLS {
        powers[i] = powers[i - 1] * 3;
        i += 1;
    }
    powers
};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Contents of a single cell, relative to the player about to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Mine,
    Theirs,
}

impl Cell {
    /// Base-3 digit used by the canonical key
    pub const fn digit(self) -> u32 {
        match self {
            Cell::Empty => 0,
            Cell::Mine => 1,
            Cell::Theirs => 2,
        }
    }

    pub const fn from_digit(digit: u32) -> Option<Cell> {
        match digit {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Mine),
            2 => Some(Cell::Theirs),
            _ => None,
        }
    }

    /// Numeric value fed to evaluators: 1 for mine, -1 for theirs, 0 for empty
    pub const fn value(self) -> f32 {
        match self {
            Cell::Empty => 0.0,
            Cell::Mine => 1.0,
            Cell::Theirs => -1.0,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Mine => 'X',
            Cell::Theirs => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '-' | '.' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::Mine),
            'O' | 'o' => Some(Cell::Theirs),
            _ => None,
        }
    }

    fn flipped(self) -> Cell {
        match self {
            Cell::Empty => Cell::Empty,
            Cell::Mine => Cell::Theirs,
            Cell::Theirs => Cell::Mine,
        }
    }
}

/// A mark that can be placed on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Mine,
    Theirs,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::Mine => Mark::Theirs,
            Mark::Theirs => Mark::Mine,
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Mine => Cell::Mine,
            Mark::Theirs => Cell::Theirs,
        }
    }
}

/// Terminal outcome relative to the `Mine` mark of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    Win,
    Loss,
    Draw,
}

impl Reward {
    /// 1 for a win, 0 for a loss, 0.5 for a draw
    pub fn value(self) -> f32 {
        match self {
            Reward::Win => 1.0,
            Reward::Loss => 0.0,
            Reward::Draw => 0.5,
        }
    }
}

/// A 3×3 board expressed from the perspective of the player to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [Cell; NUM_CELLS],
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Cell; NUM_CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; NUM_CELLS] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Indices of empty cells in ascending order
    pub fn legal_moves(&self) -> Vec<usize> {
        (0..NUM_CELLS)
            .filter(|&i| self.cells[i] == Cell::Empty)
            .collect()
    }

    /// Legal moves as a bitmask, bit `i` set when cell `i` is empty
    pub fn legal_moves_mask(&self) -> u16 {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == Cell::Empty)
            .fold(0u16, |mask, (i, _)| mask | (1 << i))
    }

    pub fn is_legal(&self, action: usize) -> bool {
        self.cell(action) == Some(Cell::Empty)
    }

    /// Place `mark` on `action`, returning a new board
    pub fn apply_move(&self, action: usize, mark: Mark) -> Result<Board, BoardError> {
        match self.cell(action) {
            None => Err(BoardError::OutOfRange(action)),
            Some(Cell::Empty) => {
                let mut next = *self;
                next.cells[action] = mark.into();
                Ok(next)
            }
            Some(_) => Err(BoardError::Occupied(action)),
        }
    }

    /// True if any row, column or diagonal is entirely `mark`
    pub fn check_win(&self, mark: Mark) -> bool {
        let cell = Cell::from(mark);
        LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == cell))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != Cell::Empty)
    }

    /// Number of occupied cells
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Terminal reward for the `Mine` mark, or `None` while the game continues.
    ///
    /// Right after a move (before flipping) this is the reward of the player
    /// who just moved; on a canonical board it is the reward of the player
    /// about to move, who can only have lost or drawn.
    pub fn reward(&self) -> Option<Reward> {
        if self.check_win(Mark::Mine) {
            Some(Reward::Win)
        } else if self.check_win(Mark::Theirs) {
            Some(Reward::Loss)
        } else if self.is_full() {
            Some(Reward::Draw)
        } else {
            None
        }
    }

    /// Swap mine and theirs; the turn transition
    pub fn flip(&self) -> Board {
        let mut cells = self.cells;
        for cell in cells.iter_mut() {
            *cell = cell.flipped();
        }
        Board { cells }
    }

    /// Canonical base-3 key, one digit per cell
    pub fn encode(&self) -> StateKey {
        self.cells
            .iter()
            .zip(POWERS_OF_THREE.iter())
            .map(|(cell, power)| cell.digit() * power)
            .sum()
    }

    pub fn decode(key: StateKey) -> Result<Board, BoardError> {
        if key as usize >= KEY_SPACE {
            return Err(BoardError::InvalidKey(key));
        }
        let mut cells = [Cell::Empty; NUM_CELLS];
        let mut rest = key;
        for cell in cells.iter_mut() {
            // rest % 3 is always a valid digit
            *cell = Cell::from_digit(rest % 3).unwrap_or_default();
            rest /= 3;
        }
        Ok(Board { cells })
    }

    /// Flat input vector: 1 for mine, -1 for theirs, 0 for empty
    pub fn to_input(&self) -> [f32; NUM_CELLS] {
        self.cells.map(Cell::value)
    }

    /// One-hot planes (mine, theirs, empty), each 3×3, row-major
    pub fn to_planes(&self) -> [f32; 3 * NUM_CELLS] {
        let mut planes = [0f32; 3 * NUM_CELLS];
        for (i, cell) in self.cells.iter().enumerate() {
            let plane = match cell {
                Cell::Mine => 0,
                Cell::Theirs => 1,
                Cell::Empty => 2,
            };
            planes[plane * NUM_CELLS + i] = 1.0;
        }
        planes
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: Vec<Cell> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .map(Cell::from_char)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| BoardError::Parse(s.to_string()))?;

        let cells: [Cell; NUM_CELLS] = parsed
            .try_into()
            .map_err(|_| BoardError::Parse(s.to_string()))?;
        Ok(Board { cells })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            let line: String = self.cells[row * 3..row * 3 + 3]
                .iter()
                .map(|c| c.to_char())
                .collect();
            if row < 2 {
                writeln!(f, "{line}")?;
            } else {
                write!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    /// Every board reachable from the empty position by alternating play
    fn reachable_boards() -> Vec<Board> {
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![Board::new()];
        let mut out = Vec::new();
        while let Some(b) = stack.pop() {
            if !seen.insert(b) {
                continue;
            }
            out.push(b);
            if b.reward().is_some() {
                continue;
            }
            for m in b.legal_moves() {
                stack.push(b.apply_move(m, Mark::Mine).unwrap().flip());
            }
        }
        out
    }

    #[test]
    fn test_key_space() {
        assert_eq!(KEY_SPACE, 19683);
        assert_eq!(Board::new().encode(), 0);
    }

    #[test]
    fn test_encode_digits() {
        // Mine in cell 0 -> 1, Theirs in cell 1 -> 2 * 3
        assert_eq!(board("XO-------").encode(), 7);
        assert_eq!(board("--------O").encode(), 2 * 6561);
    }

    #[test]
    fn test_round_trip_reachable() {
        let boards = reachable_boards();
        assert_eq!(boards.len(), 5478);
        for b in boards {
            assert_eq!(Board::decode(b.encode()).unwrap(), b);
        }
    }

    #[test]
    fn test_round_trip_full_key_space() {
        for key in 0..KEY_SPACE as u32 {
            assert_eq!(Board::decode(key).unwrap().encode(), key);
        }
    }

    #[test]
    fn test_decode_out_of_range() {
        assert_eq!(
            Board::decode(KEY_SPACE as u32),
            Err(BoardError::InvalidKey(KEY_SPACE as u32))
        );
    }

    #[test]
    fn test_flip_involution() {
        for b in reachable_boards() {
            assert_eq!(b.flip().flip(), b);
        }
        assert_eq!(board("XO-X-O---").flip(), board("OX-O-X---"));
    }

    #[test]
    fn test_win_symmetry() {
        for b in reachable_boards() {
            assert!(!(b.check_win(Mark::Mine) && b.check_win(Mark::Theirs)));
        }
    }

    #[test]
    fn test_check_win_lines() {
        assert!(board("XXX------").check_win(Mark::Mine));
        assert!(board("O--O--O--").check_win(Mark::Theirs));
        assert!(board("X---X---X").check_win(Mark::Mine));
        assert!(board("--O-O-O--").check_win(Mark::Theirs));
        assert!(!board("XX-O-----").check_win(Mark::Mine));
    }

    #[test]
    fn test_apply_move_is_pure() {
        let b = board("X---O----");
        let next = b.apply_move(2, Mark::Mine).unwrap();
        assert_eq!(b, board("X---O----"));
        assert_eq!(next, board("X-X-O----"));
    }

    #[test]
    fn test_apply_move_rejects_occupied() {
        let b = board("X---O----");
        assert_eq!(b.apply_move(4, Mark::Mine), Err(BoardError::Occupied(4)));
        assert_eq!(b.apply_move(9, Mark::Mine), Err(BoardError::OutOfRange(9)));
    }

    #[test]
    fn test_completing_move_rewards_mover() {
        let b = board("XX-OO----");
        let next = b.apply_move(2, Mark::Mine).unwrap();
        assert_eq!(next.reward(), Some(Reward::Win));
        assert_eq!(next.reward().map(Reward::value), Some(1.0));
        // After the turn passes the new mover has lost
        assert_eq!(next.flip().reward(), Some(Reward::Loss));
    }

    #[test]
    fn test_full_board_draw() {
        let b = board("XOXXOOOXX");
        assert_eq!(b.reward(), Some(Reward::Draw));
        assert_eq!(b.reward().map(Reward::value), Some(0.5));
        assert!(b.legal_moves().is_empty());
        assert_eq!(b.legal_moves_mask(), 0);
    }

    #[test]
    fn test_legal_moves() {
        let b = board("X---O---X");
        assert_eq!(b.legal_moves(), vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(b.legal_moves_mask(), 0b0_1110_1110);
        assert_eq!(b.reward(), None);
    }

    #[test]
    fn test_parse_and_display() {
        let b: Board = "XO- | -X- | --O".parse().unwrap();
        assert_eq!(b.to_string(), "XO-\n-X-\n--O");
        assert!("XO".parse::<Board>().is_err());
        assert!("XOZ------".parse::<Board>().is_err());
    }

    #[test]
    fn test_to_planes() {
        let planes = board("XO-------").to_planes();
        assert_eq!(planes[0], 1.0);
        assert_eq!(planes[9 + 1], 1.0);
        assert_eq!(planes[18 + 2], 1.0);
        assert_eq!(planes.iter().sum::<f32>(), 9.0);
        assert_eq!(board("XO-------").to_input()[..3], [1.0, -1.0, 0.0]);
    }
}
