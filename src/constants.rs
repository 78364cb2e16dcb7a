//! Constants for board geometry, game defaults, and handicap placement.
//!
//! Board size is a runtime value carried by every [`crate::board::Board`];
//! the standard teaching sizes are 9, 13 and 19 but any positive side length
//! is accepted. Handicap placement is only defined for the standard sizes.

// =============================================================================
// Board Defaults
// =============================================================================

/// Default board side length when none is specified (and the SGF fallback
/// when `SZ` is missing or invalid).
pub const DEFAULT_SIZE: usize = 19;

/// Default komi for an even game.
pub const DEFAULT_KOMI: f32 = 6.5;

// =============================================================================
// Special Move Values
// =============================================================================

/// Pass sentinel: a move with `x == PASS_X && y == PASS_Y` is a pass.
/// Real coordinates are 1-indexed, so 0 never collides with a point.
pub const PASS_X: usize = 0;
pub const PASS_Y: usize = 0;

// =============================================================================
// Handicap Star Points
// =============================================================================

/// Board sizes with a defined handicap placement table.
pub const SUPPORTED_HANDICAP_SIZES: [usize; 3] = [9, 13, 19];

/// Maximum number of handicap stones placed from a table.
pub const MAX_HANDICAP: usize = 9;

/// Star points for a 9x9 board, 1-indexed `(x, y)`.
///
/// Each table is ordered so that the prefix `[..handicap]` is the stone set
/// for that handicap: opposing corners first, then the remaining corners,
/// then the side points, with the center point last.
const STAR_POINTS_9: [(usize, usize); 9] = [
    (3, 7),
    (7, 3),
    (3, 3),
    (7, 7),
    (3, 5),
    (7, 5),
    (5, 3),
    (5, 7),
    (5, 5),
];

/// Star points for a 13x13 board, 1-indexed `(x, y)`.
const STAR_POINTS_13: [(usize, usize); 9] = [
    (4, 10),
    (10, 4),
    (4, 4),
    (10, 10),
    (4, 7),
    (10, 7),
    (7, 4),
    (7, 10),
    (7, 7),
];

/// Star points for a 19x19 board, 1-indexed `(x, y)`.
const STAR_POINTS_19: [(usize, usize); 9] = [
    (4, 16),
    (16, 4),
    (4, 4),
    (16, 16),
    (4, 10),
    (16, 10),
    (10, 4),
    (10, 16),
    (10, 10),
];

/// Look up the ordered star-point table for a board size.
///
/// Returns `None` for sizes without a defined table; callers treat that as
/// "place nothing".
pub fn star_points(size: usize) -> Option<&'static [(usize, usize)]> {
    match size {
        9 => Some(&STAR_POINTS_9),
        13 => Some(&STAR_POINTS_13),
        19 => Some(&STAR_POINTS_19),
        _ => None,
    }
}

/// The handicap stone set for a given size and handicap count.
///
/// Empty for handicap < 2 and for unsupported sizes; the count is clamped
/// to the table length (9 stones).
pub fn handicap_points(size: usize, handicap: u32) -> &'static [(usize, usize)] {
    if handicap < 2 {
        return &[];
    }
    match star_points(size) {
        Some(points) => {
            let n = (handicap as usize).min(points.len());
            &points[..n]
        }
        None => &[],
    }
}
