use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::states;

/// Trailing 5/6-digit postal code with an optional ZIP+4 suffix. Not
/// word-anchored: OCR often glues the code to the state ("IL62704").
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{5,6}(?:-[0-9]{4})?)$").expect("valid zip regex"));

/// Longest state name in the table, in words ("District of Columbia").
const MAX_STATE_WORDS: usize = 3;

/// City / state / ZIP split out of one "City, State ZIP" fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "ZipCode")]
    pub zip_code: Option<String>,
}

/// Something that can split an address fragment. Never fails: a fragment it
/// cannot handle comes back as all-`None`.
pub trait AddressResolver {
    fn resolve(&self, fragment: &str) -> ParsedAddress;
}

/// Local decomposition against the static state table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateTable;

impl AddressResolver for StateTable {
    fn resolve(&self, fragment: &str) -> ParsedAddress {
        decompose(fragment)
    }
}

/// An answer obtained ahead of time (e.g. from the LLM collaborator), so the
/// synchronous formatter can consume it.
#[derive(Debug, Clone, Default)]
pub struct Prefetched(pub ParsedAddress);

impl AddressResolver for Prefetched {
    fn resolve(&self, _fragment: &str) -> ParsedAddress {
        self.0.clone()
    }
}

/// Split `input` into city, state and ZIP.
///
/// The ZIP must close the string. The state is searched right to left; at
/// each boundary the three-word candidate is tried before two and one words,
/// so "West Virginia" is never read as "Virginia". Whatever precedes the
/// state is the city, possibly empty.
pub fn decompose(input: &str) -> ParsedAddress {
    let mut result = ParsedAddress::default();

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return result;
    }

    let Some(zip) = ZIP_RE.captures(trimmed).and_then(|c| c.get(1)) else {
        warn!(input = %trimmed, "No valid ZIP code found");
        return result;
    };
    result.zip_code = Some(zip.as_str().to_string());

    let remainder = trimmed[..zip.start()]
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    let tokens: Vec<&str> = remainder
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    for end in (1..=tokens.len()).rev() {
        for width in (1..=MAX_STATE_WORDS.min(end)).rev() {
            let start = end - width;
            let candidate = tokens[start..end].join(" ");
            if !states::is_known(&candidate) {
                continue;
            }

            let city = tokens[..start].join(" ");
            debug!(state = %candidate, city = %city, "State matched");
            result.city = Some(city);
            result.state = Some(states::normalize_state(&candidate));
            return result;
        }
    }

    warn!(remainder = %remainder, "No valid state found");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(a: &ParsedAddress) -> (Option<&str>, Option<&str>, Option<&str>) {
        (a.city.as_deref(), a.state.as_deref(), a.zip_code.as_deref())
    }

    #[test]
    fn test_clean_input() {
        let a = decompose("Springfield, IL 62704");
        assert_eq!(parts(&a), (Some("Springfield"), Some("IL"), Some("62704")));
    }

    #[test]
    fn test_multi_word_state_not_split() {
        let a = decompose("Raleigh, North Carolina 27601");
        assert_eq!(parts(&a), (Some("Raleigh"), Some("NC"), Some("27601")));

        let a = decompose("Charleston West Virginia 25301");
        assert_eq!(parts(&a), (Some("Charleston"), Some("WV"), Some("25301")));
    }

    #[test]
    fn test_three_word_state() {
        let a = decompose("Washington, District of Columbia 20001");
        assert_eq!(parts(&a), (Some("Washington"), Some("DC"), Some("20001")));
    }

    #[test]
    fn test_missing_zip_is_all_none() {
        assert_eq!(decompose("Unknown Place"), ParsedAddress::default());
        assert_eq!(decompose(""), ParsedAddress::default());
        assert_eq!(decompose("   "), ParsedAddress::default());
    }

    #[test]
    fn test_zip_plus_four_and_pin_code() {
        let a = decompose("Austin, TX 78701-1234");
        assert_eq!(parts(&a), (Some("Austin"), Some("TX"), Some("78701-1234")));

        let a = decompose("Jaipur, Rajasthan 302001");
        assert_eq!(parts(&a), (Some("Jaipur"), Some("RJ"), Some("302001")));

        let a = decompose("Chennai Tamil Nadu 600001");
        assert_eq!(parts(&a), (Some("Chennai"), Some("TN"), Some("600001")));
    }

    #[test]
    fn test_unknown_state_keeps_zip() {
        let a = decompose("Toronto, Ontario 12345");
        assert_eq!(parts(&a), (None, None, Some("12345")));
    }

    #[test]
    fn test_city_sharing_a_state_name() {
        // Rightmost boundary wins: the trailing "Kansas" is the state.
        let a = decompose("Kansas City, Kansas 66101");
        assert_eq!(parts(&a), (Some("Kansas City"), Some("KS"), Some("66101")));

        let a = decompose("New York, New York 10001");
        assert_eq!(parts(&a), (Some("New York"), Some("NY"), Some("10001")));

        let a = decompose("Virginia Beach VA 23451");
        assert_eq!(parts(&a), (Some("Virginia Beach"), Some("VA"), Some("23451")));
    }

    #[test]
    fn test_state_found_before_trailing_noise() {
        // "Indiana" is rightmost-known once "Suite" fails every width.
        let a = decompose("Bloomington Indiana Suite 47401");
        assert_eq!(parts(&a), (Some("Bloomington"), Some("IN"), Some("47401")));
    }

    #[test]
    fn test_state_only_has_empty_city() {
        let a = decompose("NY 10001");
        assert_eq!(parts(&a), (Some(""), Some("NY"), Some("10001")));
    }

    #[test]
    fn test_zip_glued_to_state() {
        let a = decompose("Springfield IL62704");
        assert_eq!(parts(&a), (Some("Springfield"), Some("IL"), Some("62704")));
    }

    #[test]
    fn test_overlong_digit_run_keeps_last_six() {
        let a = decompose("Springfield, IL 1234567");
        assert_eq!(parts(&a), (Some("Springfield"), Some("IL"), Some("234567")));
    }

    #[test]
    fn test_trailing_punctuation_before_zip() {
        let a = decompose("Springfield, IL, 62704");
        assert_eq!(parts(&a), (Some("Springfield"), Some("IL"), Some("62704")));
    }

    #[test]
    fn test_zip_must_end_the_string() {
        assert_eq!(decompose("62704 Springfield IL"), ParsedAddress::default());
    }

    #[test]
    fn test_prefetched_ignores_fragment() {
        let answer = ParsedAddress {
            city: Some("Reno".into()),
            state: Some("NV".into()),
            zip_code: Some("89501".into()),
        };
        let resolver = Prefetched(answer.clone());
        assert_eq!(resolver.resolve("anything"), answer);
    }
}
