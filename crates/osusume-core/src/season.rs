use std::sync::LazyLock;

use regex::Regex;

/// `2024-Fall`, `2024-fall`, `2024-FALL`.
static RE_SEASON_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{4})-(winter|spring|summer|fall)$").unwrap()
});

/// Broadcast quarter of a season code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonName {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl SeasonName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }

    /// Case-insensitive parse of the season word.
    pub fn from_word(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Some(Self::Winter),
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "fall" => Some(Self::Fall),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeasonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalize a season code to `<year>-<SeasonName>`.
///
/// Only the `YYYY-Season` shape is accepted. Anything else, including
/// legacy quarter codes like `2024_1` or `2024Q1`, yields `None`.
pub fn normalize_season(code: &str) -> Option<String> {
    let caps = RE_SEASON_CODE.captures(code.trim())?;
    let season = SeasonName::from_word(&caps[2])?;
    Some(format!("{}-{season}", &caps[1]))
}

/// Resolve an optional caller-supplied season into a store filter.
///
/// Unrecognized codes disable the filter instead of failing the query.
pub fn season_filter(code: Option<&str>) -> Option<String> {
    let code = code?;
    if code.trim().is_empty() {
        return None;
    }
    let normalized = normalize_season(code);
    if normalized.is_none() {
        tracing::warn!(season = %code, "Unrecognized season code, searching all seasons");
    }
    normalized
}
