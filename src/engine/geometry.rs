//! Board geometry: coordinate validation and edge-of-board tables.
//!
//! Offset-based generation walks a linear 0..63 index, so a step of -1 from
//! a4 lands on h3 unless it is stopped. The column tables below mark squares
//! from which certain offsets would wrap horizontally; every generator
//! consults [`wraps_from`] before stepping.

use crate::engine::types::Square;

pub const NUM_SQUARES: i8 = 64;

const fn column(file: usize) -> [bool; 64] {
    let mut table = [false; 64];
    let mut sq = file;
    while sq < 64 {
        table[sq] = true;
        sq += 8;
    }
    table
}

const fn row(rank: usize) -> [bool; 64] {
    let mut table = [false; 64];
    let mut sq = rank * 8;
    while sq < rank * 8 + 8 {
        table[sq] = true;
        sq += 1;
    }
    table
}

/// a-file.
pub const FIRST_COLUMN: [bool; 64] = column(0);
/// b-file.
pub const SECOND_COLUMN: [bool; 64] = column(1);
/// g-file.
pub const SEVENTH_COLUMN: [bool; 64] = column(6);
/// h-file.
pub const EIGHTH_COLUMN: [bool; 64] = column(7);

/// Rank 2: white pawn start row.
pub const SECOND_ROW: [bool; 64] = row(1);
/// Rank 7: black pawn start row.
pub const SEVENTH_ROW: [bool; 64] = row(6);

// Offsets with a leftward (toward the a-file) component, by file distance.
const LEFT_ONE: [i8; 5] = [-17, -9, -1, 7, 15];
const LEFT_TWO: [i8; 2] = [-10, 6];
// Offsets with a rightward (toward the h-file) component, by file distance.
const RIGHT_ONE: [i8; 5] = [-15, -7, 1, 9, 17];
const RIGHT_TWO: [i8; 2] = [-6, 10];

/// Is `index` a real square?
#[inline]
pub fn is_valid_coordinate(index: i8) -> bool {
    (0..NUM_SQUARES).contains(&index)
}

/// A leftward step from the a-file wraps to the h-file.
#[inline]
pub fn is_first_column_exclusion(current: Square, offset: i8) -> bool {
    FIRST_COLUMN[current.index()] && (LEFT_ONE.contains(&offset) || LEFT_TWO.contains(&offset))
}

/// A two-file leftward jump from the b-file wraps.
#[inline]
pub fn is_second_column_exclusion(current: Square, offset: i8) -> bool {
    SECOND_COLUMN[current.index()] && LEFT_TWO.contains(&offset)
}

/// A two-file rightward jump from the g-file wraps.
#[inline]
pub fn is_seventh_column_exclusion(current: Square, offset: i8) -> bool {
    SEVENTH_COLUMN[current.index()] && RIGHT_TWO.contains(&offset)
}

/// A rightward step from the h-file wraps to the a-file.
#[inline]
pub fn is_eighth_column_exclusion(current: Square, offset: i8) -> bool {
    EIGHTH_COLUMN[current.index()] && (RIGHT_ONE.contains(&offset) || RIGHT_TWO.contains(&offset))
}

/// Would stepping `offset` from `current` wrap around a board edge?
#[inline]
pub fn wraps_from(current: Square, offset: i8) -> bool {
    is_first_column_exclusion(current, offset)
        || is_second_column_exclusion(current, offset)
        || is_seventh_column_exclusion(current, offset)
        || is_eighth_column_exclusion(current, offset)
}

/// One step of `offset` from `current`, or `None` when it leaves the board
/// through any edge.
#[inline]
pub fn step(current: Square, offset: i8) -> Option<Square> {
    if wraps_from(current, offset) {
        return None;
    }
    let candidate = current.index() as i8 + offset;
    if is_valid_coordinate(candidate) {
        Some(Square::from_index(candidate as u8))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn column_tables() {
        assert!(FIRST_COLUMN[sq("a1").index()]);
        assert!(FIRST_COLUMN[sq("a8").index()]);
        assert!(!FIRST_COLUMN[sq("b1").index()]);
        assert!(EIGHTH_COLUMN[sq("h5").index()]);
        assert!(SECOND_COLUMN[sq("b3").index()]);
        assert!(SEVENTH_COLUMN[sq("g6").index()]);
        assert_eq!(FIRST_COLUMN.iter().filter(|&&b| b).count(), 8);
        assert_eq!(EIGHTH_COLUMN.iter().filter(|&&b| b).count(), 8);
    }

    #[test]
    fn row_tables() {
        assert!(SECOND_ROW[sq("e2").index()]);
        assert!(!SECOND_ROW[sq("e3").index()]);
        assert!(SEVENTH_ROW[sq("a7").index()]);
        assert_eq!(SEVENTH_ROW.iter().filter(|&&b| b).count(), 8);
    }

    #[test]
    fn coordinate_bounds() {
        assert!(is_valid_coordinate(0));
        assert!(is_valid_coordinate(63));
        assert!(!is_valid_coordinate(-1));
        assert!(!is_valid_coordinate(64));
    }

    #[test]
    fn step_stops_at_left_edge() {
        assert_eq!(step(sq("a4"), -1), None);
        assert_eq!(step(sq("a4"), 7), None);
        assert_eq!(step(sq("a4"), -9), None);
        assert_eq!(step(sq("a4"), 9), Some(sq("b5")));
        assert_eq!(step(sq("a4"), -7), Some(sq("b3")));
    }

    #[test]
    fn step_stops_at_right_edge() {
        assert_eq!(step(sq("h4"), 1), None);
        assert_eq!(step(sq("h4"), 9), None);
        assert_eq!(step(sq("h4"), -7), None);
        assert_eq!(step(sq("h4"), 7), Some(sq("g5")));
        assert_eq!(step(sq("h4"), -9), Some(sq("g3")));
    }

    #[test]
    fn step_stops_off_top_and_bottom() {
        assert_eq!(step(sq("e8"), 8), None);
        assert_eq!(step(sq("e1"), -8), None);
        assert_eq!(step(sq("d1"), -9), None);
    }

    #[test]
    fn knight_jumps_near_edges() {
        assert_eq!(step(sq("b1"), 6), None);
        assert_eq!(step(sq("b1"), 15), Some(sq("a3")));
        assert_eq!(step(sq("g1"), 10), None);
        assert_eq!(step(sq("g1"), 17), Some(sq("h3")));
        assert_eq!(step(sq("a1"), 15), None);
        assert_eq!(step(sq("h8"), -15), None);
    }

    #[test]
    fn no_offset_ever_changes_file_by_more_than_two() {
        let offsets = [-17, -15, -10, -9, -8, -7, -6, -1, 1, 6, 7, 8, 9, 10, 15, 17];
        for from in Square::all() {
            for offset in offsets {
                if let Some(to) = step(from, offset) {
                    let df = (from.file() as i8 - to.file() as i8).abs();
                    assert!(df <= 2, "{from} + {offset} wrapped to {to}");
                    let r = offset.rem_euclid(8);
                    let expected = r.min(8 - r);
                    assert_eq!(df, expected, "{from} + {offset} -> {to}");
                }
            }
        }
    }
}
