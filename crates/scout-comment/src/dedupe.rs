//! Near-duplicate detection against recent comment history (spec §4.3
//! step 6 "record" gate, §8 testable property 2: "the same comment body
//! is never posted twice on the same issue"). Uses word-level Jaccard
//! similarity rather than exact-match so paraphrased repeats are caught
//! too.

use scout_core::types::CommentHistoryEntry;
use std::collections::HashSet;

const DUPLICATE_THRESHOLD: f64 = 0.8;

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(String::from)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Returns `true` when `candidate` is near-duplicate of any entry in
/// `history` (spec default: looks back `max_history_per_issue` entries).
pub fn is_near_duplicate(candidate: &str, history: &[CommentHistoryEntry]) -> bool {
    let candidate_words = word_set(candidate);
    history.iter().any(|entry| jaccard(&candidate_words, &word_set(&entry.body)) >= DUPLICATE_THRESHOLD)
}
