use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar day rendered as "<month name> <day>", e.g. "March 4".
///
/// The rendered string doubles as the marker value in storage and is
/// compared by plain string equality, so the format must stay stable
/// across runs: full English month name, single space, no zero padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthDay(String);

impl MonthDay {
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthDay(date.format("%B %-d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MonthDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The most recent entry of the front page's post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub span_texts: Vec<String>,
}

impl Post {
    /// True if `day` occurs anywhere in the title, e.g. a title of
    /// "Happy March 4th!" counts for "March 4".
    pub fn is_for_day(&self, day: &MonthDay) -> bool {
        self.title.contains(day.as_str())
    }

    /// True if any span in the post mentions `phrase`. Span texts are
    /// whitespace-normalized at parse time; the match is case-sensitive.
    pub fn has_keyword(&self, phrase: &str) -> bool {
        self.span_texts.iter().any(|text| text.contains(phrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> MonthDay {
        MonthDay::from_date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    #[test]
    fn test_month_day_is_not_zero_padded() {
        assert_eq!(day(2026, 3, 4).as_str(), "March 4");
    }

    #[test]
    fn test_month_day_with_two_digit_day() {
        assert_eq!(day(2026, 12, 25).as_str(), "December 25");
    }

    #[test]
    fn test_title_match_is_substring_based() {
        let post = Post {
            title: "Happy March 4th!".to_string(),
            span_texts: Vec::new(),
        };

        assert!(post.is_for_day(&day(2026, 3, 4)));
        assert!(!post.is_for_day(&day(2026, 3, 14)));
    }

    #[test]
    fn test_keyword_match_is_case_sensitive() {
        let post = Post {
            title: "March 4 specials".to_string(),
            span_texts: vec!["MOCHA CHIP scones".to_string()],
        };

        assert!(!post.has_keyword("mocha chip"));
        assert!(post.has_keyword("MOCHA CHIP"));
    }

    #[test]
    fn test_keyword_checks_every_span() {
        let post = Post {
            title: "March 4 specials".to_string(),
            span_texts: vec![
                "blueberry muffins".to_string(),
                "we have mocha chip scones".to_string(),
            ],
        };

        assert!(post.has_keyword("mocha chip"));
    }
}
