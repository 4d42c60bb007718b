use std::collections::HashSet;

use crate::record::ParsedPlayer;

/// Keeps the first record seen for each `playerid`, preserving order.
/// Returns the survivors and how many duplicates were dropped.
pub fn dedup_players(players: Vec<ParsedPlayer>) -> (Vec<ParsedPlayer>, usize) {
    let before = players.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<ParsedPlayer> = players
        .into_iter()
        .filter(|player| seen.insert(player.playerid))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
