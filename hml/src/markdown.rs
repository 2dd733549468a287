// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// HTML blocks embedded in the statistics README.
///
/// Each user is rendered as a centered card with avatar, level badge and a
/// spaced-out counter. Cards are stacked inside a `<samp>` block so GitHub
/// draws them with a monospace font.
use crate::pool::{PoolRecord, StoredRecord};

const BORDER: &str = "<hr />";
const BADGE_BASE_URL: &str = "https://user-images.githubusercontent.com/51419598";

/// Magnitude bucket of a line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatsLevel {
    Negative,
    Below1e2,
    Below1e3,
    Below1e4,
    Below1e5,
    Below1e6,
    Below1e7,
    Below1e8,
    AtLeast1e8
}

impl StatsLevel {
    /// Buckets `line_count` by its number of decimal digits.
    ///
    /// # Example
    ///
    /// ```
    /// use hml::StatsLevel;
    ///
    /// assert_eq!(StatsLevel::from_line_count(-1), StatsLevel::Negative);
    /// assert_eq!(StatsLevel::from_line_count(99), StatsLevel::Below1e2);
    /// assert_eq!(StatsLevel::from_line_count(100), StatsLevel::Below1e3);
    /// ```
    pub fn from_line_count(line_count: i64) -> Self {
        match line_count {
            i64::MIN..=-1 => Self::Negative,
            0..=99 => Self::Below1e2,
            100..=999 => Self::Below1e3,
            1_000..=9_999 => Self::Below1e4,
            10_000..=99_999 => Self::Below1e5,
            100_000..=999_999 => Self::Below1e6,
            1_000_000..=9_999_999 => Self::Below1e7,
            10_000_000..=99_999_999 => Self::Below1e8,
            _ => Self::AtLeast1e8
        }
    }

    pub fn joke(self) -> &'static str {
        match self {
            Self::Negative => "wtf?",
            Self::Below1e2 => "joined the game",
            Self::Below1e3 => "java class",
            Self::Below1e4 => "why so dark?",
            Self::Below1e5 => "what's grass?",
            Self::Below1e6 => "are u ok?",
            Self::Below1e7 => "u aren't ok",
            Self::Below1e8 => "REAL SHIT?",
            Self::AtLeast1e8 => "? ? ?"
        }
    }

    pub fn badge_url(self) -> String {
        let image = match self {
            Self::Negative => "147377645-7c00264f-3676-41a5-9182-ba6e440a50cd",
            Self::Below1e2 => "147377631-ca8ece53-00c8-401b-9771-ab5d9a8436dc",
            Self::Below1e3 => "147377647-d0948b01-83a9-417f-9dde-27f1f27fa86d",
            Self::Below1e4 => "147377651-d10bba7e-6e08-47fc-82e8-4ad186203510",
            Self::Below1e5 => "147377652-285419d4-973b-4436-a31b-e8edd255ed83",
            Self::Below1e6 => "147377655-9e8a5d3a-4af2-4409-b479-28dedbabe4c2",
            Self::Below1e7 => "147377660-76209d64-8cd1-4de7-a36c-24edf5b3da98",
            Self::Below1e8 => "147377679-5c022c71-b6a2-46fe-b4cc-efbf025e361f",
            Self::AtLeast1e8 => "147159302-737314ae-fa0d-4feb-bc3e-a9d6050afe89"
        };
        format!("{BADGE_BASE_URL}/{image}.png")
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Negative => "for some reason, this one has negative line count...",
            Self::Below1e2 => "wrote less than 100 lines of code across all Github repos",
            Self::Below1e3 => "wrote more than 100 lines of code across all Github repos",
            Self::Below1e4 => "wrote more than 1K lines of code across all Github repos",
            Self::Below1e5 => "wrote more than 10K lines of code across all Github repos",
            Self::Below1e6 => "wrote more than 100K lines of code across all Github repos",
            Self::Below1e7 => "wrote more than 1M lines of code across all Github repos",
            Self::Below1e8 => "wrote more than 10M lines of code across all Github repos",
            Self::AtLeast1e8 => "wrote more than 100M lines of code across all Github repos"
        }
    }
}

/// Values shown on one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownStats {
    pub login:      String,
    pub avatar_url: String,
    pub html_url:   String,
    pub line_count: i64
}

impl MarkdownStats {
    fn profile_url(&self) -> String {
        if self.html_url.is_empty() {
            format!("https://github.com/{}", self.login)
        } else {
            self.html_url.clone()
        }
    }
}

impl From<&PoolRecord> for MarkdownStats {
    fn from(record: &PoolRecord) -> Self {
        Self {
            login:      record.user.login.clone(),
            avatar_url: record.user.avatar_url.clone(),
            html_url:   record.user.html_url.clone(),
            line_count: record.stats.line_count
        }
    }
}

impl From<&StoredRecord> for MarkdownStats {
    fn from(stored: &StoredRecord) -> Self {
        Self::from(&stored.record)
    }
}

/// Formats a line count as spaced digit groups.
///
/// # Example
///
/// ```
/// use hml::format_counter;
///
/// assert_eq!(format_counter(12345), "1 2 . 3 4 5");
/// assert_eq!(format_counter(1_000_007), "1 . 0 0 0 . 0 0 7");
/// assert_eq!(format_counter(0), "0");
/// ```
pub fn format_counter(line_count: i64) -> String {
    let digits = line_count.unsigned_abs().to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n
    };

    let mut groups = vec![&digits[..lead]];
    groups.extend(
        digits.as_bytes()[lead..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
    );

    let mut grouped = groups.join(".");
    if line_count < 0 {
        grouped.insert(0, '-');
    }

    grouped
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the card of a single user.
pub fn render_item(stats: &MarkdownStats) -> String {
    let level = StatsLevel::from_line_count(stats.line_count);
    let login = escape_html(&stats.login);
    let profile = escape_html(&stats.profile_url());
    let avatar = escape_html(&stats.avatar_url);

    let lines = [
        "<p align=\"center\">".to_string(),
        format!("<a href=\"{profile}\">"),
        "<kbd>".to_string(),
        format!("<img src=\"{avatar}\" width=\"100\" height=\"100\" alt=\"Profile Picture\"/>"),
        "</kbd>".to_string(),
        "</a>".to_string(),
        format!("<a href=\"{profile}\"><h6 align=\"center\">@{login}</h6></a>"),
        "<a href=\"/GUIDE.md\">".to_string(),
        "<p align=\"center\">".to_string(),
        format!("<img src=\"{}\" height=\"60\" />", level.badge_url()),
        "</p>".to_string(),
        "</a>".to_string(),
        format!("<h3 align=\"center\">{}</h3>", format_counter(stats.line_count)),
        format!(
            "<p align=\"center\"><sub><a href=\"{profile}\">@{login}</a> {}</sub></p>",
            level.joke()
        ),
        format!("<sub><h6 align=\"center\">{}</h6></sub>", level.description()),
        "</p>".to_string()
    ];

    lines.join("\n")
}

/// Renders every card into one `<samp>` block.
///
/// Cards are collapsed to a single line each so Markdown does not treat
/// indentation as code.
pub fn render_collection(items: &[MarkdownStats]) -> String {
    let cards: Vec<String> = items
        .iter()
        .map(|item| render_item(item).lines().map(str::trim).collect())
        .collect();

    let body = if cards.is_empty() {
        String::new()
    } else {
        format!("{BORDER}{}{BORDER}", cards.join(BORDER))
    };

    format!("<samp>\n\n{body}\n\n</samp>")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::pool::{PoolStats, PoolUser};

    fn alice(line_count: i64) -> MarkdownStats {
        MarkdownStats {
            login: "alice".to_owned(),
            avatar_url: "https://avatars.example/alice.png".to_owned(),
            html_url: "https://github.com/alice".to_owned(),
            line_count
        }
    }

    #[test]
    fn levels_follow_digit_count() {
        let cases = [
            (i64::MIN, StatsLevel::Negative),
            (-1, StatsLevel::Negative),
            (0, StatsLevel::Below1e2),
            (999, StatsLevel::Below1e3),
            (1_000, StatsLevel::Below1e4),
            (99_999, StatsLevel::Below1e5),
            (100_000, StatsLevel::Below1e6),
            (9_999_999, StatsLevel::Below1e7),
            (10_000_000, StatsLevel::Below1e8),
            (100_000_000, StatsLevel::AtLeast1e8),
            (i64::MAX, StatsLevel::AtLeast1e8)
        ];
        for (count, level) in cases {
            assert_eq!(StatsLevel::from_line_count(count), level, "count {count}");
        }
    }

    #[test]
    fn counter_groups_digits() {
        assert_eq!(format_counter(7), "7");
        assert_eq!(format_counter(999), "9 9 9");
        assert_eq!(format_counter(1_000), "1 . 0 0 0");
        assert_eq!(format_counter(12_345), "1 2 . 3 4 5");
        assert_eq!(format_counter(-12_345), "- 1 2 . 3 4 5");
    }

    #[test]
    fn item_contains_profile_and_level() {
        let html = render_item(&alice(12_345));

        assert!(html.contains("<img src=\"https://avatars.example/alice.png\""));
        assert!(html.contains("<a href=\"https://github.com/alice\"><h6 align=\"center\">@alice</h6></a>"));
        assert!(html.contains("<h3 align=\"center\">1 2 . 3 4 5</h3>"));
        assert!(html.contains(StatsLevel::Below1e5.joke()));
        assert!(html.contains(&StatsLevel::Below1e5.badge_url()));
        assert!(html.contains(StatsLevel::Below1e5.description()));
    }

    #[test]
    fn item_escapes_user_values() {
        let mut stats = alice(1);
        stats.login = "<script>".to_owned();
        stats.avatar_url = "x\" onerror=\"y".to_owned();

        let html = render_item(&stats);
        assert!(!html.contains("<script>"));
        assert!(html.contains("@&lt;script&gt;"));
        assert!(html.contains("x&quot; onerror=&quot;y"));
    }

    #[test]
    fn item_falls_back_to_github_profile() {
        let mut stats = alice(1);
        stats.html_url.clear();
        assert!(render_item(&stats).contains("href=\"https://github.com/alice\""));
    }

    #[test]
    fn empty_collection_has_no_borders() {
        assert_eq!(render_collection(&[]), "<samp>\n\n\n\n</samp>");
    }

    #[test]
    fn collection_separates_cards_with_borders() {
        let html = render_collection(&[alice(1), alice(2)]);

        assert!(html.starts_with("<samp>\n\n<hr />"));
        assert!(html.ends_with("<hr />\n\n</samp>"));
        assert_eq!(html.matches(BORDER).count(), 3);
        assert_eq!(html.lines().count(), 5);
    }

    #[test]
    fn stats_from_pool_record() {
        let record = PoolRecord {
            user:  PoolUser {
                login:      "bob".to_owned(),
                avatar_url: "a".to_owned(),
                html_url:   "h".to_owned()
            },
            stats: PoolStats {
                line_count: 5
            }
        };
        let stats = MarkdownStats::from(&record);
        assert_eq!(stats.login, "bob");
        assert_eq!(stats.html_url, "h");
        assert_eq!(stats.line_count, 5);
    }

    proptest! {
        #[test]
        fn counter_preserves_digits(count in any::<i64>()) {
            let rendered = format_counter(count);
            let digits: String = rendered.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
            prop_assert_eq!(digits, count.to_string());
        }

        #[test]
        fn counter_groups_after_the_first_have_three_digits(count in any::<i64>()) {
            let compact: String = format_counter(count).split(' ').collect();
            let groups: Vec<&str> = compact.trim_start_matches('-').split('.').collect();
            prop_assert!((1..=3).contains(&groups[0].len()));
            for group in &groups[1..] {
                prop_assert_eq!(group.len(), 3);
            }
        }
    }
}
