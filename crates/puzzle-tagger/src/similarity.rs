//! Tag similarity engine
//!
//! Distances between tags, tag lists and whole tag sequences, and the corpus
//! searches built on them. A tag that agrees on its top-level label but
//! differs deeper costs less the deeper the difference sits.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::puzzle::tag::{Tag, TagSequence};

/// A previously tagged puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: String,
    pub tags: TagSequence,
}

impl CorpusEntry {
    pub fn new(id: impl Into<String>, tags: TagSequence) -> Self {
        Self { id: id.into(), tags }
    }
}

/// 0 for equal tags, 1 for different top-level labels, otherwise half the
/// distance one level down.
pub fn tag_distance(a: &Tag, b: &Tag) -> f64 {
    if a == b {
        return 0.0;
    }
    if a.label() != b.label() {
        return 1.0;
    }
    match (a.child(), b.child()) {
        (Some(x), Some(y)) => tag_distance(x, y) / 2.0,
        // one tag stops where the other goes on
        _ => 0.5,
    }
}

/// Weighted edit distance between two tag lists
pub fn taglist_distance(a: &[Tag], b: &[Tag]) -> f64 {
    edit_distance(a, b, tag_distance)
}

/// Distance between the deduplicated tag sets, ignoring move order
pub fn unordered_distance(a: &TagSequence, b: &TagSequence) -> f64 {
    let a: Vec<Tag> = a.flatten().into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let b: Vec<Tag> = b.flatten().into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    taglist_distance(&a, &b)
}

/// Edit distance over the per-move groups; the puzzle group is left out
pub fn ordered_distance(a: &TagSequence, b: &TagSequence) -> f64 {
    edit_distance(&a.moves, &b.moves, |x, y| taglist_distance(x, y))
}

pub fn distance(a: &TagSequence, b: &TagSequence) -> f64 {
    unordered_distance(a, b) + ordered_distance(a, b)
}

/// Greedy matching score: lower is more similar, 0 for identical tag sets.
pub fn similarity_score(query: &TagSequence, candidate: &TagSequence) -> f64 {
    let mut remaining = candidate.flatten();
    let mut unmatched = 0usize;
    let mut score = 0.0;

    for tag in query.groups().flatten() {
        let best = remaining
            .iter()
            .enumerate()
            .map(|(i, other)| (i, tag_distance(tag, other)))
            .min_by(|x, y| x.1.total_cmp(&y.1));
        match best {
            Some((i, d)) if d < 1.0 => {
                score += d;
                remaining.swap_remove(i);
            }
            _ => unmatched += 1,
        }
    }

    score + unmatched.max(remaining.len()) as f64
}

/// The corpus entry with the lowest score; the first one wins ties.
pub fn search_similar_puzzle<'a>(query: &TagSequence, corpus: &'a [CorpusEntry]) -> Option<&'a CorpusEntry> {
    let mut best: Option<(&CorpusEntry, f64)> = None;
    for entry in corpus {
        let score = similarity_score(query, &entry.tags);
        if best.map_or(true, |(_, s)| score < s) {
            best = Some((entry, score));
        }
    }
    best.map(|(entry, _)| entry)
}

/// The `k` nearest entries by `distance`, ties kept in corpus order
pub fn rank_by_distance<'a>(query: &TagSequence, corpus: &'a [CorpusEntry], k: usize) -> Vec<(&'a CorpusEntry, f64)> {
    let mut ranked: Vec<(&CorpusEntry, f64)> = corpus
        .iter()
        .map(|entry| (entry, distance(query, &entry.tags)))
        .collect();
    ranked.sort_by(|x, y| x.1.total_cmp(&y.1));
    ranked.truncate(k);
    ranked
}

fn edit_distance<T>(a: &[T], b: &[T], cost: impl Fn(&T, &T) -> f64) -> f64 {
    let mut prev: Vec<f64> = (0..=b.len()).map(|j| j as f64).collect();
    let mut row = vec![0.0; b.len() + 1];

    for (i, x) in a.iter().enumerate() {
        row[0] = (i + 1) as f64;
        for (j, y) in b.iter().enumerate() {
            let substitute = prev[j] + cost(x, y);
            let delete = prev[j + 1] + 1.0;
            let insert = row[j] + 1.0;
            row[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> Tag {
        s.parse().unwrap()
    }

    fn tags(s: &str) -> Vec<Tag> {
        s.split_whitespace().map(tag).collect()
    }

    fn seq(s: &str) -> TagSequence {
        s.parse().unwrap()
    }

    #[test]
    fn test_tag_distance() {
        assert_eq!(tag_distance(&tag("fork:n"), &tag("fork:n")), 0.0);
        assert_eq!(tag_distance(&tag("fork:n"), &tag("skewer:b")), 1.0);
        assert_eq!(tag_distance(&tag("fork:n"), &tag("fork:q")), 0.5);
        assert_eq!(tag_distance(&tag("fork"), &tag("fork:q")), 0.5);
        assert_eq!(
            tag_distance(&tag("pin:preventsEscape:q"), &tag("pin:preventsEscape:r")),
            0.25
        );
        assert_eq!(
            tag_distance(&tag("pin:preventsEscape:q"), &tag("pin:preventsAttack:q")),
            0.5
        );
    }

    #[test]
    fn test_tag_distance_symmetric() {
        let all = tags("fork fork:n fork:q pin:preventsEscape:q pin:preventsAttack:b mate");
        for a in &all {
            for b in &all {
                assert_eq!(tag_distance(a, b), tag_distance(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_taglist_distance() {
        let a = tags("fork:n sacrifice:q");
        assert_eq!(taglist_distance(&a, &a), 0.0);
        assert_eq!(taglist_distance(&a, &[]), 2.0);
        assert_eq!(taglist_distance(&[], &a), 2.0);
        assert_eq!(taglist_distance(&a, &tags("fork:b sacrifice:q")), 0.5);
        assert_eq!(taglist_distance(&a, &tags("sacrifice:q")), 1.0);
    }

    #[test]
    fn test_sequence_distance() {
        let a = seq("fork:n/sacrifice:q/crushing short");
        assert_eq!(distance(&a, &a), 0.0);

        // same tags, different move order
        let b = seq("sacrifice:q/fork:n/crushing short");
        assert_eq!(unordered_distance(&a, &b), 0.0);
        assert_eq!(ordered_distance(&a, &b), 2.0);
    }

    #[test]
    fn test_similarity_score() {
        let a = seq("fork:n/crushing short");
        assert_eq!(similarity_score(&a, &a), 0.0);
        assert_eq!(similarity_score(&a, &seq("fork:b/crushing short")), 0.5);
        // one candidate tag left over
        assert_eq!(similarity_score(&a, &seq("fork:n pin:preventsEscape:q/crushing short")), 1.0);
    }

    #[test]
    fn test_search_returns_identical_entry() {
        let corpus = vec![
            CorpusEntry::new("a", seq("skewer:r/advantage oneMove")),
            CorpusEntry::new("b", seq("fork:n/crushing short")),
            CorpusEntry::new("c", seq("fork:n/crushing short")),
        ];
        let found = search_similar_puzzle(&seq("fork:n/crushing short"), &corpus).unwrap();
        assert_eq!(found.id, "b");
        assert!(search_similar_puzzle(&seq("fork:n/crushing short"), &[]).is_none());
    }

    #[test]
    fn test_rank_by_distance() {
        let corpus = vec![
            CorpusEntry::new("far", seq("skewer:r/equality oneMove")),
            CorpusEntry::new("near", seq("fork:b/crushing short")),
            CorpusEntry::new("same", seq("fork:n/crushing short")),
        ];
        let ranked = rank_by_distance(&seq("fork:n/crushing short"), &corpus, 2);
        let ids: Vec<&str> = ranked.iter().map(|(e, _)| e.id.as_str()).collect();
        assert_eq!(ids, vec!["same", "near"]);
        assert_eq!(ranked[0].1, 0.0);
    }
}
