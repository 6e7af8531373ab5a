//! Cell contents and the weighted spawn distribution.
//!
//! A cell holds a single digit 1-9 or one of the four arithmetic operators.
//! Spawns draw from a discrete distribution: two thirds digits, one sixth
//! "big" operators (+ *), one sixth "small" operators (- /).

use rand::Rng;

/// One of the four arithmetic operators a cell can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn as_char(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }
}

/// Operators that tend to grow the running value.
pub const BIG_OPERATORS: [Op; 2] = [Op::Add, Op::Mul];
/// Operators that tend to shrink it.
pub const SMALL_OPERATORS: [Op; 2] = [Op::Sub, Op::Div];

/// Contents of one grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Digit(u8), // 1..=9
    Op(Op),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_digit(self) -> bool {
        matches!(self, Cell::Digit(_))
    }

    pub fn is_op(self) -> bool {
        matches!(self, Cell::Op(_))
    }

    /// The display character for a non-empty cell.
    pub fn symbol(self) -> Option<char> {
        match self {
            Cell::Empty => None,
            Cell::Digit(d) => char::from_digit(d as u32, 10),
            Cell::Op(op) => Some(op.as_char()),
        }
    }
}

#[derive(Clone, Copy)]
enum SymbolClass {
    Digit,
    BigOp,
    SmallOp,
}

impl SymbolClass {
    fn sample(self, rng: &mut impl Rng) -> Cell {
        match self {
            SymbolClass::Digit => Cell::Digit(rng.gen_range(1..=9)),
            SymbolClass::BigOp => Cell::Op(BIG_OPERATORS[rng.gen_range(0..BIG_OPERATORS.len())]),
            SymbolClass::SmallOp => {
                Cell::Op(SMALL_OPERATORS[rng.gen_range(0..SMALL_OPERATORS.len())])
            }
        }
    }
}

// Class weights; the symbol within a class is chosen uniformly.
const SPAWN_DISTRIBUTION: [(SymbolClass, f32); 3] = [
    (SymbolClass::Digit, 2.0 / 3.0),
    (SymbolClass::BigOp, 1.0 / 6.0),
    (SymbolClass::SmallOp, 1.0 / 6.0),
];

/// Draw a random non-empty cell from the spawn distribution.
pub fn random_symbol(rng: &mut impl Rng) -> Cell {
    let total: f32 = SPAWN_DISTRIBUTION.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0.0..total);
    for (class, weight) in SPAWN_DISTRIBUTION {
        if roll < weight {
            return class.sample(rng);
        }
        roll -= weight;
    }
    // Unreachable barring float rounding at the top of the range.
    SymbolClass::SmallOp.sample(rng)
}
