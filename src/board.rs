use crate::types::{BOARD_SIZE, DiscColor, NUM_SQUARES, Position};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Handicap corners in placement order: top-left, bottom-right, top-right, bottom-left.
pub const HANDICAP_CORNERS: [Position; 4] = [
    Position::new(0, 0),
    Position::new(7, 7),
    Position::new(0, 7),
    Position::new(7, 0),
];

const CENTER: [Position; 4] = [
    Position::new(3, 3),
    Position::new(3, 4),
    Position::new(4, 3),
    Position::new(4, 4),
];

/// Reversi board state: two bitboards plus the side to move.
///
/// Bit `8 * row + col` is set when that cell holds a disc of the color.
/// `turn` is `DiscColor::None` once the game has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
    turn: DiscColor,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white. Black moves first.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
            turn: DiscColor::Black,
        }
    }

    /// A board with no discs and Black to move.
    pub fn empty() -> Self {
        Self {
            black: 0,
            white: 0,
            turn: DiscColor::Black,
        }
    }

    pub fn from_bitboards(black: u64, white: u64, turn: DiscColor) -> Self {
        debug_assert_eq!(black & white, 0, "a cell cannot hold both colors");
        Self { black, white, turn }
    }

    /// Clears the board, places the center four and then `count` discs of
    /// `handicap` on the corners in [`HANDICAP_CORNERS`] order.
    pub fn reset(&mut self, handicap: DiscColor, count: u8) {
        *self = Self::new();
        if handicap == DiscColor::None {
            return;
        }
        for corner in HANDICAP_CORNERS.iter().take(count as usize) {
            self.set_cell(*corner, handicap);
        }
    }

    pub fn reset_empty(&mut self) {
        *self = Self::empty();
    }

    pub fn cell(&self, pos: Position) -> DiscColor {
        let square = bit(pos.index());
        if (self.black & square) != 0 {
            DiscColor::Black
        } else if (self.white & square) != 0 {
            DiscColor::White
        } else {
            DiscColor::None
        }
    }

    /// Overwrites one cell. Only setup code should call this; play goes through [`Board::play`].
    pub fn set_cell(&mut self, pos: Position, color: DiscColor) {
        let square = bit(pos.index());
        self.black &= !square;
        self.white &= !square;
        match color {
            DiscColor::Black => self.black |= square,
            DiscColor::White => self.white |= square,
            DiscColor::None => {}
        }
    }

    /// All 64 cells in row-major order.
    pub fn cells(&self) -> [DiscColor; NUM_SQUARES] {
        let mut cells = [DiscColor::None; NUM_SQUARES];
        for (index, cell) in cells.iter_mut().enumerate() {
            *cell = self.cell(Position::from_index(index));
        }
        cells
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        self.cells().map(DiscColor::ordinal)
    }

    /// Replaces every cell, keeping the side to move.
    pub fn set_cells(&mut self, cells: &[DiscColor; NUM_SQUARES]) {
        self.black = 0;
        self.white = 0;
        for (index, color) in cells.iter().enumerate() {
            self.set_cell(Position::from_index(index), *color);
        }
    }

    pub fn bitboard(&self, color: DiscColor) -> u64 {
        match color {
            DiscColor::Black => self.black,
            DiscColor::White => self.white,
            DiscColor::None => !(self.black | self.white),
        }
    }

    pub fn turn(&self) -> DiscColor {
        self.turn
    }

    pub fn opposite_turn(&self) -> DiscColor {
        self.turn.opposite()
    }

    pub fn set_turn(&mut self, turn: DiscColor) {
        self.turn = turn;
    }

    pub fn change_turn(&mut self) {
        self.turn = self.turn.opposite();
    }

    /// Marks the game as finished.
    pub fn end_turn(&mut self) {
        self.turn = DiscColor::None;
    }

    /// Returns `(black_count, white_count)`.
    pub fn count_discs(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    pub fn disc_count(&self, color: DiscColor) -> u8 {
        self.bitboard(color).count_ones() as u8
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black_count, white_count) = self.count_discs();
        NUM_SQUARES as u8 - black_count - white_count
    }

    /// Discs `color` would flip by playing at `pos`.
    ///
    /// The target cell itself is not inspected, so this also works right
    /// after [`Board::place`] has put the disc down.
    pub fn flips(&self, color: DiscColor, pos: Position) -> u64 {
        match self.sides(color) {
            Some((me, opp)) => collect_flips(pos, me, opp),
            None => 0,
        }
    }

    /// Turns the discs captured by `color` at `pos` and returns them.
    /// The target cell is left untouched.
    pub fn apply_flips(&mut self, color: DiscColor, pos: Position) -> u64 {
        let flips = self.flips(color, pos);
        match color {
            DiscColor::Black => {
                self.black |= flips;
                self.white &= !flips;
            }
            DiscColor::White => {
                self.white |= flips;
                self.black &= !flips;
            }
            DiscColor::None => {}
        }
        flips
    }

    pub fn is_legal(&self, color: DiscColor, pos: Position) -> bool {
        self.cell(pos) == DiscColor::None && self.flips(color, pos) != 0
    }

    /// Returns legal move mask for the given side. Iterating it with
    /// [`positions`] yields row-major order.
    pub fn legal_moves(&self, color: DiscColor) -> u64 {
        let Some((me, opp)) = self.sides(color) else {
            return 0;
        };

        let occupied = me | opp;
        let mut legal = 0u64;

        for index in 0..NUM_SQUARES {
            let move_bit = bit(index);
            if (occupied & move_bit) != 0 {
                continue;
            }
            if collect_flips(Position::from_index(index), me, opp) != 0 {
                legal |= move_bit;
            }
        }

        legal
    }

    /// Number of legal moves for `color`.
    pub fn mobility(&self, color: DiscColor) -> i32 {
        self.legal_moves(color).count_ones() as i32
    }

    pub fn has_any_move(&self, color: DiscColor) -> bool {
        self.legal_moves(color) != 0
    }

    /// Puts a disc of the side to move at `pos` if that is a legal move.
    /// Flipping is left to the caller.
    pub fn place(&mut self, pos: Position) -> bool {
        if !self.is_legal(self.turn, pos) {
            return false;
        }
        self.set_cell(pos, self.turn);
        true
    }

    /// Places one stone for the side to move and flips captured stones.
    /// Returns flipped bit mask. Returns 0 and leaves the board unchanged when
    /// the move is illegal. The turn is not changed.
    pub fn play(&mut self, pos: Position) -> u64 {
        let color = self.turn;
        if !self.place(pos) {
            return 0;
        }
        self.apply_flips(color, pos)
    }

    fn sides(&self, color: DiscColor) -> Option<(u64, u64)> {
        match color {
            DiscColor::Black => Some((self.black, self.white)),
            DiscColor::White => Some((self.white, self.black)),
            DiscColor::None => None,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the set squares of a mask, lowest index (row-major) first.
#[derive(Debug, Clone, Copy)]
pub struct Positions(u64);

impl Iterator for Positions {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Position::from_index(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Positions {}

pub fn positions(mask: u64) -> Positions {
    Positions(mask)
}

pub fn bit(index: usize) -> u64 {
    if index < NUM_SQUARES { 1u64 << index } else { 0 }
}

/// Mask of the four center cells, which random setups never touch.
pub fn center_mask() -> u64 {
    CENTER.iter().fold(0, |acc, pos| acc | bit(pos.index()))
}

fn collect_flips(pos: Position, me: u64, opp: u64) -> u64 {
    let row = pos.row as i32;
    let col = pos.col as i32;
    let mut flips = 0u64;

    for (dr, dc) in DIRECTIONS {
        let mut r = row + dr;
        let mut c = col + dc;
        let mut line = 0u64;

        while in_bounds(r, c) {
            let square = bit((r as usize) * BOARD_SIZE + c as usize);
            if (opp & square) != 0 {
                line |= square;
            } else if (me & square) != 0 {
                flips |= line;
                break;
            } else {
                break;
            }

            r += dr;
            c += dc;
        }
    }

    flips
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
