//! Visit-count based line-set selection.

use rand::Rng;

/// Index of the line set to play on visit number `visit` (1-based).
///
/// Visits `1..=N` play their own set. Past the end, NPCs with four or more
/// sets loop between sets 3 and 4 at random; shorter dialogs repeat the last.
/// `visit == 0` (never opened) maps to the first set.
pub fn select_line_set(visit: u32, set_count: usize, rng: &mut impl Rng) -> usize {
    if set_count == 0 || visit == 0 {
        return 0;
    }
    let v = visit as usize;
    if v <= set_count {
        v - 1
    } else if set_count >= 4 {
        rng.gen_range(2..=3)
    } else {
        set_count - 1
    }
}
