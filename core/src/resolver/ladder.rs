//! Main-ROM priority ladder.
//!
//! Picks the file to boot from a multi-file set using the naming conventions
//! of retro disk images. Rungs are tried in order; within a rung the earliest
//! candidate wins, so the choice is stable for a fixed input order.

use std::path::Path;

type Rung = fn(&str) -> bool;

const LADDER: [Rung; 4] = [
    |p| p.contains("disk 1") || p.contains("disk1"),
    |p| p.contains("disc 1") || p.contains("disc1"),
    |p| p.contains("side a") || p.contains("sidea"),
    // Single-disk titles
    |p| !p.contains("disk") && !p.contains("disc"),
];

/// Select the main ROM from `candidates`.
///
/// Returns `None` only for an empty slice. If no rung matches, the first
/// candidate is returned.
pub fn select_main_rom<P: AsRef<Path>>(candidates: &[P]) -> Option<&P> {
    let lowered: Vec<String> = candidates
        .iter()
        .map(|c| c.as_ref().to_string_lossy().to_lowercase())
        .collect();

    LADDER
        .iter()
        .find_map(|rung| lowered.iter().position(|path| rung(path)))
        .and_then(|index| candidates.get(index))
        .or_else(|| candidates.first())
}
