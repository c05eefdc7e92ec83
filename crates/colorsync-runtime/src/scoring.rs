//! End-of-game statistics and winner determination.
//!
//! Pure functions over the round results, so re-running them is always
//! idempotent and they are trivially testable without a game.

use std::collections::HashMap;

use colorsync_protocol::{GameWinner, PlayerId, PlayerStats, RoundResult, RoundWinner};

/// Aggregates wins and latencies per player.
///
/// Every listed player gets an entry, zero-filled if they never won a round.
/// Timeout rounds count for nobody. `avg_latency` is integer milliseconds
/// over won rounds, zero when there are none.
pub fn compute_stats(
    players: &[PlayerId],
    results: &[RoundResult],
) -> HashMap<PlayerId, PlayerStats> {
    let mut stats: HashMap<PlayerId, PlayerStats> = players
        .iter()
        .map(|p| {
            (
                p.clone(),
                PlayerStats {
                    wins: 0,
                    total_latency: 0,
                    avg_latency: 0,
                },
            )
        })
        .collect();

    for result in results {
        if let RoundWinner::Player(winner) = &result.winner {
            if let Some(entry) = stats.get_mut(winner) {
                entry.wins += 1;
                entry.total_latency += result.latency_ms;
            }
        }
    }

    for entry in stats.values_mut() {
        entry.avg_latency = if entry.wins > 0 {
            entry.total_latency / u64::from(entry.wins)
        } else {
            0
        };
    }

    stats
}

/// Picks the game winner from the two players' stats.
///
/// More wins takes it. On equal non-zero wins the *faster* player (lower
/// total latency) wins. Equal on both counts, or nobody won anything at
/// all: a draw.
pub fn determine_winner(
    players: &[PlayerId],
    stats: &HashMap<PlayerId, PlayerStats>,
) -> GameWinner {
    let [a, b] = players else {
        return GameWinner::Draw;
    };

    let zero = PlayerStats {
        wins: 0,
        total_latency: 0,
        avg_latency: 0,
    };
    let sa = stats.get(a).copied().unwrap_or(zero);
    let sb = stats.get(b).copied().unwrap_or(zero);

    if sa.wins != sb.wins {
        let winner = if sa.wins > sb.wins { a } else { b };
        return GameWinner::Player(winner.clone());
    }
    if sa.wins == 0 {
        return GameWinner::Draw;
    }
    if sa.total_latency != sb.total_latency {
        let winner = if sa.total_latency < sb.total_latency {
            a
        } else {
            b
        };
        return GameWinner::Player(winner.clone());
    }
    GameWinner::Draw
}

// =========================================================================
// Tests
// =========================================================================
