//! Title similarity scoring.
//!
//! A query and a candidate are compared at three granularities (raw,
//! season-normalized, base title) and the best ratio wins, plus bonuses when
//! the base titles agree. Season-suffix noise is the dominant cause of missed
//! matches, so `"Show 第三季"` and `"Show 3rd Season"` must land at 1.0.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::normalize::{extract_base_title, normalize};

/// Added when both base titles are equal and non-empty.
const BASE_EQUAL_BONUS: f64 = 0.3;

/// Added when one base title contains the other.
const BASE_CONTAINS_BONUS: f64 = 0.2;

/// The shorter base title must be longer than this (in chars) to earn the containment bonus.
const CONTAINS_MIN_CHARS: usize = 2;

/// Sequences at least this long get their most frequent elements ignored.
const POPULAR_MIN_LEN: usize = 200;

/// Per-component view of a similarity computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityBreakdown {
    /// Ratio of the lowercased raw titles.
    pub basic: f64,
    /// Ratio after season normalization.
    pub normalized: f64,
    /// Ratio of the base titles.
    pub base: f64,
    pub bonus: f64,
    /// Normalized titles are equal, ignoring case.
    pub exact: bool,
    /// Final score, within 0.0..=1.0.
    pub score: f64,
}

/// Similarity of `candidate` to `query`, within 0.0..=1.0.
///
/// Not guaranteed symmetric: the sequence ratio treats its second argument
/// specially on long inputs and breaks longest-match ties by position.
pub fn similarity(query: &str, candidate: &str) -> f64 {
    similarity_breakdown(query, candidate).score
}

/// Compute every component of [`similarity`].
pub fn similarity_breakdown(query: &str, candidate: &str) -> SimilarityBreakdown {
    let basic = sequence_ratio(&query.to_lowercase(), &candidate.to_lowercase());

    let norm_query = normalize(query).to_lowercase();
    let norm_candidate = normalize(candidate).to_lowercase();
    let normalized = sequence_ratio(&norm_query, &norm_candidate);

    let base_query = extract_base_title(query).to_lowercase();
    let base_candidate = extract_base_title(candidate).to_lowercase();
    let base = sequence_ratio(&base_query, &base_candidate);

    let mut bonus = 0.0;
    if !base_query.is_empty() && base_query == base_candidate {
        bonus += BASE_EQUAL_BONUS;
    }
    let shorter = base_query.chars().count().min(base_candidate.chars().count());
    if shorter > CONTAINS_MIN_CHARS
        && (base_candidate.contains(&base_query) || base_query.contains(&base_candidate))
    {
        bonus += BASE_CONTAINS_BONUS;
    }

    let exact = norm_query == norm_candidate;
    let score = if exact {
        1.0
    } else {
        (basic.max(normalized).max(base) + bonus).min(1.0)
    };

    SimilarityBreakdown {
        basic,
        normalized,
        base,
        bonus,
        exact,
        score,
    }
}

/// Character-level Ratcliff/Obershelp ratio: `2 * matched / (len(a) + len(b))`.
///
/// Matched characters are found by repeatedly taking the longest common run
/// and recursing on both sides of it. Two empty strings are identical (1.0).
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = SequenceMatcher::new(&a, &b).matched_chars();
    2.0 * matched as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each non-popular char of `b`, ascending.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, positions)| positions.len() > limit)
                .map(|(&c, _)| c)
                .collect();
            for c in popular {
                b2j.remove(&c);
            }
        }

        Self { a, b, b2j }
    }

    /// Total size of all matching blocks.
    fn matched_chars(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }

    /// Longest common run within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the run starting earliest in `a`, then earliest in `b`.
    /// Returns `(start_in_a, start_in_b, len)`.
    fn longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
        let mut run_at: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_run_at = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_at.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_run_at.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            run_at = next_run_at;
        }

        // Popular chars never seed a run but may still extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }

        (best_i, best_j, best_len)
    }
}
