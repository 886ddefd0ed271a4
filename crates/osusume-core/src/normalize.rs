//! Season-suffix canonicalization for catalog titles.
//!
//! Catalog titles spell the same season many ways: "第三季", "3rd Season",
//! "S3", "續篇". [`normalize`] rewrites every known variant into the single
//! canonical token `第N季` so two spellings of one season compare equal, and
//! [`extract_base_title`] strips the season (and a trailing `-subtitle-`)
//! entirely so different seasons of one series compare equal.

use std::sync::LazyLock;

use phf::phf_map;
use regex::Regex;

/// Known season-suffix spellings and their canonical form.
///
/// Latin keys are case-sensitive and only match as whole tokens; CJK keys
/// match anywhere.
static SEASON_VARIANTS: phf::Map<&'static str, &'static str> = phf_map! {
    // ── Chinese ordinal seasons ─────────────────────────────────
    "第一季" => "第1季",
    "第二季" => "第2季",
    "第三季" => "第3季",
    "第四季" => "第4季",
    "第五季" => "第5季",
    "第六季" => "第6季",
    "第七季" => "第7季",
    "第八季" => "第8季",
    "第九季" => "第9季",
    "第十季" => "第10季",

    // ── Alternate phrasings ─────────────────────────────────────
    "第二幕" => "第2季",
    "第三幕" => "第3季",
    "第二季度" => "第2季",
    "第三季度" => "第3季",
    "第二部份" => "第2季",
    "第三部份" => "第3季",
    "續篇" => "第2季",

    // ── Western ordinals ────────────────────────────────────────
    "1st Season" => "第1季",
    "2nd Season" => "第2季",
    "3rd Season" => "第3季",
    "4th Season" => "第4季",
    "5th Season" => "第5季",
    "Season 1" => "第1季",
    "Season 2" => "第2季",
    "Season 3" => "第3季",

    // ── Abbreviations ───────────────────────────────────────────
    "S1" => "第1季",
    "S2" => "第2季",
    "S3" => "第3季",
};

/// Length in chars of the longest key in [`SEASON_VARIANTS`].
const MAX_VARIANT_CHARS: usize = 10;

/// Trailing season/subtitle markers removed by [`extract_base_title`], applied in order.
static BASE_TITLE_SUFFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\s*第\d+季\s*$",
        r"(?i)\s*\d+(st|nd|rd|th)\s+Season\s*$",
        r"(?i)\s*Season\s+\d+\s*$",
        r"\s*第[一二三四五六七八九十]+季\s*$",
        r"\s*第\d+季度\s*$",
        r"\s*第\d+部份?\s*$",
        r"\s*續篇\s*$",
        r"(?i)\s*S\d+\s*$",
        // "-subtitle-"
        r"\s*-.*-\s*$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Collapse whitespace and rewrite season variants to `第N季`.
///
/// A single leftmost-longest pass; the output never contains a rewritable
/// variant, so `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(title: &str) -> String {
    let collapsed = collapse_whitespace(title);
    if collapsed.is_empty() {
        return collapsed;
    }

    let chars: Vec<(usize, char)> = collapsed.char_indices().collect();
    let mut result = String::with_capacity(collapsed.len());
    let mut i = 0;

    while i < chars.len() {
        match longest_variant_at(&collapsed, &chars, i) {
            Some((canonical, consumed)) => {
                result.push_str(canonical);
                i += consumed;
            }
            None => {
                result.push(chars[i].1);
                i += 1;
            }
        }
    }

    result
}

/// Strip season and subtitle suffixes, leaving the series' base title.
pub fn extract_base_title(title: &str) -> String {
    let mut base = normalize(title);
    for suffix in BASE_TITLE_SUFFIXES.iter() {
        base = suffix.replace(&base, "").into_owned();
    }
    base.trim().to_string()
}

/// Find the longest season variant starting at char index `start`.
///
/// Returns the canonical replacement and the number of chars consumed.
fn longest_variant_at(
    s: &str,
    chars: &[(usize, char)],
    start: usize,
) -> Option<(&'static str, usize)> {
    let max_len = MAX_VARIANT_CHARS.min(chars.len() - start);
    let begin = chars[start].0;

    for len in (2..=max_len).rev() {
        let end = chars.get(start + len).map(|&(b, _)| b).unwrap_or(s.len());
        let Some(&canonical) = SEASON_VARIANTS.get(&s[begin..end]) else {
            continue;
        };
        if chars[start].1.is_ascii_alphanumeric() && !is_token_boundary(chars, start, len) {
            continue;
        }
        return Some((canonical, len));
    }

    None
}

/// Latin variants must not be glued to other ASCII letters or digits ("S10", "DS1").
fn is_token_boundary(chars: &[(usize, char)], start: usize, len: usize) -> bool {
    let before_ok = start == 0 || !chars[start - 1].1.is_ascii_alphanumeric();
    let after_ok = chars
        .get(start + len)
        .is_none_or(|&(_, c)| !c.is_ascii_alphanumeric());
    before_ok && after_ok
}

/// Trim and collapse whitespace runs to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
