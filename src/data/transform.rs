//! Post-fetch transforms applied before a collection is cached
//!
//! Every collection is sorted by `name`. Characters additionally get positional
//! ids and a numeric `year`; films are re-sorted by `episode_id` and get a Roman
//! numeral `episode` label.

use serde_json::Value;

use super::{Record, FILMS, PEOPLE};

/// Roman numeral symbols, largest first
const ROMAN_NUMERALS: [(&str, i64); 5] = [("X", 10), ("IX", 9), ("V", 5), ("IV", 4), ("I", 1)];

/// The transform applied to a collection, selected by endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Stable sort by `name`
    Default,
    /// Name sort, then positional `id` and derived `year`
    People,
    /// Name sort, then stable sort by `episode_id` and derived `episode`
    Films,
}

impl Transform {
    /// Selects the transform for an endpoint path (exact match)
    pub fn for_endpoint(endpoint: &str) -> Self {
        match endpoint {
            PEOPLE => Transform::People,
            FILMS => Transform::Films,
            _ => Transform::Default,
        }
    }

    /// Runs the transform over a freshly fetched collection
    pub fn apply(self, records: Vec<Record>) -> Vec<Record> {
        let sorted = sort_by_name(records);
        match self {
            Transform::Default => sorted,
            Transform::People => number_people(sorted),
            Transform::Films => label_episodes(sort_by_episode(sorted)),
        }
    }
}

/// Stable, case-sensitive sort by the `name` field
///
/// Records without a string `name` sort before all named records.
pub fn sort_by_name(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| a.name().cmp(&b.name()));
    records
}

/// Stable sort by the numeric `episode_id` field, ascending
///
/// Records without a numeric `episode_id` sort after all others.
pub fn sort_by_episode(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|record| {
        let episode = episode_id(record);
        (episode.is_none(), episode)
    });
    records
}

/// Overwrites `id` with the 1-based position and derives `year` from `birth_year`
pub fn number_people(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let year = record
                .str_field("birth_year")
                .and_then(birth_year_to_number)
                .map_or(Value::Null, Value::from);
            record.with("id", (index + 1).to_string()).with("year", year)
        })
        .collect()
}

/// Adds an `episode` field holding `episode_id` as a Roman numeral
pub fn label_episodes(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let episode = to_roman(episode_id(&record).unwrap_or(0));
            record.with("episode", episode)
        })
        .collect()
}

fn episode_id(record: &Record) -> Option<i64> {
    record.get("episode_id").and_then(Value::as_i64)
}

/// Converts an encoded birth year such as `"19BBY"` to a signed number
///
/// The leading integer is parsed (optional sign, then digits; anything after the
/// digits is ignored). If the third character from the end is `B` the year lies
/// before the epoch and is negated.
///
/// # Returns
/// * `Some(year)` - e.g. `-19` for `"19BBY"`, `19` for `"19ABY"`, `-41` for `"41.9BBY"`
/// * `None` - If the string has no numeric prefix (e.g. `"unknown"`)
pub fn birth_year_to_number(birth_year: &str) -> Option<i64> {
    let trimmed = birth_year.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };

    let before_epoch = birth_year.chars().rev().nth(2) == Some('B');
    Some(if before_epoch { -value } else { value })
}

/// Converts a number to an uppercase Roman numeral by greedy subtraction
///
/// Only symbols up to `X` are known, so the result is correct for 1 through 10.
/// Larger values repeat `X` (e.g. 40 gives `"XXXX"`); zero and negative values
/// give an empty string.
pub fn to_roman(number: i64) -> String {
    let mut remaining = number;
    let mut numeral = String::new();

    for (symbol, value) in ROMAN_NUMERALS {
        while remaining >= value {
            numeral.push_str(symbol);
            remaining -= value;
        }
    }

    numeral
}
