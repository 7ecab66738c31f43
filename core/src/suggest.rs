use thiserror::Error;

use crate::directory::UserId;
use crate::graph::FriendGraph;

/// Upper bound on the number of suggestions returned per query.
pub const MAX_SUGGESTIONS: usize = 8;

// Ranking weights. Tuned as a set — changing any one shifts the relative
// order users see, so they stay fixed.
const MUTUAL_WEIGHT: f32 = 5.0;
const TWO_HOP_BONUS: f32 = 3.0;
const THREE_HOP_BONUS: f32 = 1.0;
const BALANCE_WEIGHT: f32 = 2.0;
const ACTIVE_BONUS: f32 = 2.0;
const HUB_BONUS: f32 = 0.5;
const ACTIVE_MIN: usize = 2;
const ACTIVE_MAX: usize = 20;

/// A ranked connection candidate. Produced fresh on every query and
/// discarded after rendering — never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suggestion {
    pub user_id: UserId,
    pub mutual_count: u32,
    pub score: f32,
    /// Shortest hop count at which the traversal discovered the
    /// candidate, capped at 3.
    pub hop_distance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SuggestError {
    #[error("user id {0} is outside graph capacity")]
    InvalidUser(UserId),
}

/// Rank connection candidates for `source` from its two- and three-hop
/// neighborhood.
///
/// The source and its direct friends are never candidates. Traversal is
/// deterministic: the full hop-2 pass runs before the hop-3 pass and a
/// candidate is recorded at the first distance that reaches it, so a node
/// reachable at both distances always counts as 2-hop. Candidates with no
/// mutual friends are kept only at hop 2 — pure 3-hop strangers are
/// filtered out.
///
/// An out-of-range `source` is an error, distinguishable from a valid
/// empty result.
pub fn suggest(graph: &FriendGraph, source: UserId) -> Result<Vec<Suggestion>, SuggestError> {
    if source >= graph.capacity() {
        return Err(SuggestError::InvalidUser(source));
    }

    // Source and hop-1 neighbors are ineligible from the start.
    let mut visited = vec![false; graph.capacity()];
    visited[source] = true;
    for &f in graph.neighbors(source) {
        visited[f] = true;
    }

    // Discovery order is part of the contract: equal-score candidates
    // keep this order in the final ranking.
    let mut discovered: Vec<(UserId, u32)> = Vec::new();

    // Hop-2 pass: friends of friends.
    for &f in graph.neighbors(source) {
        for &c in graph.neighbors(f) {
            if !visited[c] {
                visited[c] = true;
                discovered.push((c, 2));
            }
        }
    }

    // Hop-3 pass: one step further out. Runs only after the hop-2 pass
    // completes, so hop-2 discovery wins any tie.
    for &f in graph.neighbors(source) {
        for &fof in graph.neighbors(f) {
            for &c in graph.neighbors(fof) {
                if c != source && !visited[c] {
                    visited[c] = true;
                    discovered.push((c, 3));
                }
            }
        }
    }

    let source_degree = graph.degree(source);
    let mut ranked: Vec<Suggestion> = Vec::new();

    for (candidate, hop_distance) in discovered {
        let mutual_count = graph
            .neighbors(source)
            .iter()
            .filter(|&&f| graph.are_friends(candidate, f))
            .count() as u32;

        if mutual_count == 0 && hop_distance != 2 {
            continue;
        }

        let score = score_candidate(mutual_count, hop_distance, graph.degree(candidate), source_degree);
        insert_ranked(
            &mut ranked,
            Suggestion {
                user_id: candidate,
                mutual_count,
                score,
                hop_distance,
            },
        );
    }

    ranked.truncate(MAX_SUGGESTIONS);
    Ok(ranked)
}

fn score_candidate(
    mutual_count: u32,
    hop_distance: u32,
    candidate_degree: usize,
    source_degree: usize,
) -> f32 {
    let mut score = MUTUAL_WEIGHT * mutual_count as f32;

    score += if hop_distance == 2 {
        TWO_HOP_BONUS
    } else {
        THREE_HOP_BONUS
    };

    // Popularity balance: favors candidates whose friend count is close
    // to the source's, approached from either side.
    if source_degree > 0 {
        let ratio = (candidate_degree as f32 / source_degree as f32)
            .min(source_degree as f32 / candidate_degree as f32);
        score += BALANCE_WEIGHT * ratio;
    }

    // Activity bonus: moderately connected candidates over loners and hubs.
    score += if (ACTIVE_MIN..=ACTIVE_MAX).contains(&candidate_degree) {
        ACTIVE_BONUS
    } else if candidate_degree > ACTIVE_MAX {
        HUB_BONUS
    } else {
        0.0
    };

    score
}

/// Stable descending insert: the new entry goes immediately before the
/// first existing entry with a strictly lower score, so equal scores keep
/// discovery order.
fn insert_ranked(ranked: &mut Vec<Suggestion>, suggestion: Suggestion) {
    let pos = ranked
        .iter()
        .position(|r| r.score < suggestion.score)
        .unwrap_or(ranked.len());
    ranked.insert(pos, suggestion);
}
