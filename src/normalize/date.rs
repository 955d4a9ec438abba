//! Free-text date -> `YYYY-MM-DD`.
//!
//! Strategies run in order; the first one that decides wins:
//! month-name regex → structured layouts → bare digit runs → passthrough.

use chrono::{Datelike, NaiveDate};
use phf::{Map, phf_map};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// "Jan 5th, 2023", "Sept. 14 2021", "DECEMBER 1, 2020".
static MONTH_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+([0-9]{1,2})(?:st|nd|rd|th)?,?\s+([0-9]{4})",
    )
    .expect("valid month-name regex")
});

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit regex"));

static MONTHS: Map<&'static str, &'static str> = phf_map! {
    "jan" => "01", "feb" => "02", "mar" => "03", "apr" => "04",
    "may" => "05", "jun" => "06", "jul" => "07", "aug" => "08",
    "sep" => "09", "oct" => "10", "nov" => "11", "dec" => "12",
};

/// A chrono layout, and whether it reads a four-digit year.
struct Layout {
    fmt: &'static str,
    full_year: bool,
}

const fn full(fmt: &'static str) -> Layout {
    Layout { fmt, full_year: true }
}

const fn short(fmt: &'static str) -> Layout {
    Layout { fmt, full_year: false }
}

// Two-digit years only with slashes; "05-04-23" is left to the digit runs
// so the 50-year pivot applies.
const LAYOUTS: &[Layout] = &[
    full("%m/%d/%Y"),
    full("%d/%m/%Y"),
    full("%m-%d-%Y"),
    full("%d-%m-%Y"),
    full("%B %d, %Y"),
    full("%d %B %Y"),
    full("%Y/%m/%d"),
    full("%Y-%m-%d"),
    full("%d.%m.%Y"),
    full("%m.%d.%Y"),
    full("%Y.%m.%d"),
    full("%b %d, %Y"),
    full("%d %b %Y"),
    full("%b %d %Y"),
    full("%Y %b %d"),
    short("%m/%d/%y"),
    short("%d/%m/%y"),
];

/// Two-digit years below this land in the 2000s, the rest in the 1900s.
const CENTURY_PIVOT: u32 = 50;

/// What a single strategy concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Normalized to ISO form; stop.
    Parsed(String),
    /// The strategy recognized the input but cannot convert it; stop and
    /// keep the original text.
    Passthrough,
    /// Not this strategy's shape; try the next one.
    NoMatch,
}

type Strategy = fn(&str) -> Attempt;

const CASCADE: &[(&str, Strategy)] = &[
    ("month_name", month_name),
    ("layout", structured_layout),
    ("digit_runs", digit_runs),
];

/// Normalize `raw` to `YYYY-MM-DD`, or return it (trimmed) unchanged.
pub fn normalize_date(raw: &str) -> String {
    let original = raw.trim();
    info!(date = %original, "Attempting to parse date");

    for (name, strategy) in CASCADE {
        match strategy(original) {
            Attempt::Parsed(iso) => {
                info!(strategy = name, parsed = %iso, "Parsed date");
                return iso;
            }
            Attempt::Passthrough => {
                warn!(strategy = name, date = %original, "Keeping date as written");
                return original.to_string();
            }
            Attempt::NoMatch => continue,
        }
    }

    warn!(date = %original, "Could not parse date");
    original.to_string()
}

/// Month name or abbreviation, day (optionally ordinal), four-digit year.
/// Searched anywhere in the text.
pub fn month_name(text: &str) -> Attempt {
    let Some(caps) = MONTH_NAME_RE.captures(text) else {
        return Attempt::NoMatch;
    };
    debug!(groups = ?caps, "Found month pattern match");

    let abbr = caps[1].to_lowercase();
    let Some(month) = MONTHS.get(abbr.as_str()) else {
        warn!(month = %abbr, "Could not map month abbreviation");
        return Attempt::Passthrough;
    };
    let Ok(day) = caps[2].parse::<u32>() else {
        return Attempt::Passthrough;
    };

    Attempt::Parsed(format!("{}-{month}-{day:02}", &caps[3]))
}

/// The whole text against each known layout.
pub fn structured_layout(text: &str) -> Attempt {
    for layout in LAYOUTS {
        debug!(format = layout.fmt, "Trying format");
        let Ok(date) = NaiveDate::parse_from_str(text, layout.fmt) else {
            continue;
        };
        if layout.full_year && !(1000..=9999).contains(&date.year()) {
            continue;
        }
        debug!(format = layout.fmt, "Success with format");
        return Attempt::Parsed(date.format("%Y-%m-%d").to_string());
    }
    Attempt::NoMatch
}

/// Exactly three numeric runs read as day, month, year.
pub fn digit_runs(text: &str) -> Attempt {
    let runs: Vec<&str> = DIGIT_RUN_RE.find_iter(text).map(|m| m.as_str()).collect();
    let [day, month, year] = runs.as_slice() else {
        debug!(runs = runs.len(), "Digit fallback needs exactly three numbers");
        return Attempt::NoMatch;
    };

    let (Some(day), Some(month)) = (small_number(day, 31), small_number(month, 12)) else {
        warn!(day = %day, month = %month, "Digit pattern didn't match expected ranges");
        return Attempt::NoMatch;
    };

    let year = match year.parse::<u32>() {
        Ok(yy) if year.len() == 2 && yy < CENTURY_PIVOT => format!("20{year}"),
        Ok(_) if year.len() == 2 => format!("19{year}"),
        _ => year.to_string(),
    };

    Attempt::Parsed(format!("{year}-{month:02}-{day:02}"))
}

/// A one- or two-digit run no greater than `max`.
fn small_number(run: &str, max: u32) -> Option<u32> {
    if run.len() > 2 {
        return None;
    }
    run.parse::<u32>().ok().filter(|n| *n <= max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_with_ordinal() {
        assert_eq!(normalize_date("Jan 5th, 2023"), "2023-01-05");
        assert_eq!(month_name("Jan 5th, 2023"), Attempt::Parsed("2023-01-05".into()));
    }

    #[test]
    fn test_month_name_variants() {
        assert_eq!(normalize_date("September 14, 2021"), "2021-09-14");
        assert_eq!(normalize_date("Sept. 14 2021"), "2021-09-14");
        assert_eq!(normalize_date("DECEMBER 1, 2020"), "2020-12-01");
        assert_eq!(normalize_date("Signed on March 22nd, 2019 by hand"), "2019-03-22");
    }

    #[test]
    fn test_month_first_layout() {
        assert_eq!(normalize_date("05/01/2023"), "2023-05-01");
        assert_eq!(structured_layout("05/01/2023"), Attempt::Parsed("2023-05-01".into()));
    }

    #[test]
    fn test_day_first_when_month_first_impossible() {
        assert_eq!(normalize_date("25/12/2022"), "2022-12-25");
        assert_eq!(normalize_date("25.12.2022"), "2022-12-25");
    }

    #[test]
    fn test_iso_and_named_layouts() {
        assert_eq!(normalize_date("2022-12-25"), "2022-12-25");
        assert_eq!(normalize_date("2022/12/25"), "2022-12-25");
        assert_eq!(normalize_date("5 January 2023"), "2023-01-05");
        assert_eq!(normalize_date("2023 Mar 07"), "2023-03-07");
    }

    #[test]
    fn test_slash_two_digit_year() {
        assert_eq!(normalize_date("05/01/23"), "2023-05-01");
    }

    #[test]
    fn test_digit_fallback_pivot() {
        assert_eq!(structured_layout("05-04-23"), Attempt::NoMatch);
        assert_eq!(normalize_date("05-04-23"), "2023-04-05");
        assert_eq!(normalize_date("05-04-67"), "1967-04-05");
        assert_eq!(normalize_date("5-4-49"), "2049-04-05");
        assert_eq!(normalize_date("5-4-50"), "1950-04-05");
    }

    #[test]
    fn test_digit_fallback_keeps_long_year() {
        assert_eq!(digit_runs("on 3 of 7, 2021"), Attempt::Parsed("2021-07-03".into()));
    }

    #[test]
    fn test_digit_fallback_rejects_ranges() {
        assert_eq!(digit_runs("45-04-23"), Attempt::NoMatch);
        assert_eq!(digit_runs("05-13-23"), Attempt::NoMatch);
        assert_eq!(digit_runs("2023 05 04 1"), Attempt::NoMatch);
        assert_eq!(normalize_date("05-13-23"), "05-13-23");
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(normalize_date("see attached"), "see attached");
        assert_eq!(normalize_date("  see attached  "), "see attached");
        assert_eq!(normalize_date(""), "");
    }
}
