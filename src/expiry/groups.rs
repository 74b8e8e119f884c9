//! Expiry-group resolution.
//!
//! Exchanges list each contract with a terse token ("Feb 25") and group the
//! chain under full labels ("February 25, 2025 (Monthly)"). The token alone
//! has no year and can collide across listed series, so rows are matched
//! against the labels seen in the same chain.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Month number (1-12) and full English name for a three-letter abbreviation.
pub fn month_from_abbrev(abbrev: &str) -> Option<(u32, &'static str)> {
    let key = abbrev.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|(short, _)| *short == key)
        .map(|idx| (idx as u32 + 1, MONTHS[idx].1))
}

/// Split an "MMM D" token into (month, day).
pub fn parse_token(token: &str) -> Option<(u32, u32)> {
    let mut parts = token.split_whitespace();
    let (month, _) = month_from_abbrev(parts.next()?)?;
    let day: u32 = parts.next()?.trim_end_matches(',').parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    Some((month, day))
}

/// Year a token refers to, given today's date.
///
/// Tokens for the current month or later fall in the current year; earlier
/// months belong to next year (chains that span a year boundary).
pub fn infer_year(token: &str, today: NaiveDate) -> Option<i32> {
    let (month, _) = parse_token(token)?;
    Some(year_for_month(month, today))
}

fn year_for_month(month: u32, today: NaiveDate) -> i32 {
    if month >= today.month() {
        today.year()
    } else {
        today.year() + 1
    }
}

/// Calendar date of a label such as "February 25, 2025 (Monthly)".
pub fn label_date(label: &str) -> Option<NaiveDate> {
    let head: Vec<&str> = label.split_whitespace().take(3).collect();
    if head.len() < 3 {
        return None;
    }
    NaiveDate::parse_from_str(&head.join(" "), "%B %d, %Y").ok()
}

/// An expiry token resolved against the chain's groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpiry {
    pub date: NaiveDate,
    pub label: String,
}

/// Distinct expiry-group labels of one chain, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryGroups {
    labels: Vec<String>,
}

impl ExpiryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect labels, skipping blanks and duplicates.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups = Self::new();
        for label in labels {
            groups.insert(label.as_ref());
        }
        groups
    }

    /// Add a label. Returns false if it was blank or already present.
    pub fn insert(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.labels.iter().any(|l| l == label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// First label starting with "{FullMonth} {Day}".
    ///
    /// The character after the prefix must not be a digit, so "Feb 2" does
    /// not pick up "February 25, ...".
    pub fn resolve(&self, token: &str) -> Option<&str> {
        let mut parts = token.split_whitespace();
        let (_, full_month) = month_from_abbrev(parts.next()?)?;
        let (_, day) = parse_token(token)?;
        let prefix = format!("{} {}", full_month, day);

        self.labels
            .iter()
            .find(|label| {
                label.starts_with(&prefix)
                    && !label[prefix.len()..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_digit())
            })
            .map(String::as_str)
    }

    /// Resolve a token to a concrete date and its group label.
    ///
    /// The year comes from the label; labels without a parseable date fall
    /// back to [`infer_year`].
    pub fn resolve_expiry(&self, token: &str, today: NaiveDate) -> Option<ResolvedExpiry> {
        let label = self.resolve(token)?;
        let date = match label_date(label) {
            Some(date) => date,
            None => {
                let (month, day) = parse_token(token)?;
                NaiveDate::from_ymd_opt(year_for_month(month, today), month, day)?
            }
        };
        Some(ResolvedExpiry {
            date,
            label: label.to_string(),
        })
    }
}
