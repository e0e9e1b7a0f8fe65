//! Post-processing applied to every extraction stage's output.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Pages are separated by form feeds in stage output.
pub const PAGE_BREAK: char = '\x0c';

/// Lines inspected at the top and bottom of each page when looking for
/// running headers and footers.
const MARGIN_LINES: usize = 3;

static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-[ \t]*\n[ \t]*(\w)").expect("valid hyphen regex"));

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid whitespace regex"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

static PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:page\s+\d{1,3}(?:\s+of\s+\d{1,3})?|\d{1,3}|-\s*\d{1,3}\s*-|\d{1,3}\s*/\s*\d{1,3})$")
        .expect("valid page number regex")
});

/// A page label inside a longer running line, e.g. "Confidential - Page 2".
static PAGE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpage\s*\d{1,3}\b|\b\d{1,3}\s*(?:/|of)\s*\d{1,3}\b")
        .expect("valid page label regex")
});

/// Cleans raw extracted text:
/// 1. normalise line endings
/// 2. rejoin words split by end-of-line hyphenation
/// 3. drop running headers/footers and bare page numbers
/// 4. collapse horizontal whitespace, trim lines, cap blank runs at one empty line
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = HYPHEN_BREAK.replace_all(&text, "$1$2");
    let text = strip_page_furniture(&text);
    let text = HORIZONTAL_WS.replace_all(&text, " ");

    let trimmed_lines: Vec<&str> = text.lines().map(str::trim).collect();
    let text = trimmed_lines.join("\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");

    text.trim().to_string()
}

fn strip_page_furniture(text: &str) -> String {
    let pages: Vec<&str> = text
        .split(PAGE_BREAK)
        .filter(|page| !page.trim().is_empty())
        .collect();

    let repeated = repeated_margin_lines(&pages);

    pages
        .iter()
        .map(|page| strip_page(page, &repeated))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Drops bare page numbers anywhere, and repeated lines only where they sit
/// in the page's margins.
fn strip_page(page: &str, repeated: &HashSet<String>) -> String {
    let total = page.lines().filter(|l| !l.trim().is_empty()).count();
    let mut rank = 0usize;

    page.lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return true;
            }
            let in_margin = rank < MARGIN_LINES || rank + MARGIN_LINES >= total;
            rank += 1;
            if PAGE_NUMBER.is_match(trimmed) {
                return false;
            }
            !(in_margin && repeated.contains(&margin_key(trimmed)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lines that show up in the margins of at least half the pages (and at
/// least two of them). Only page labels have their digits folded, so
/// "Page 1" and "Page 2" collide but "2019 - 2021" and "2017 - 2019" do not.
fn repeated_margin_lines(pages: &[&str]) -> HashSet<String> {
    if pages.len() < 2 {
        return HashSet::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for page in pages {
        let lines: Vec<&str> = page
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let head = lines.iter().take(MARGIN_LINES);
        let tail = lines.iter().rev().take(MARGIN_LINES);
        let margin: HashSet<String> = head.chain(tail).map(|l| margin_key(l)).collect();
        for key in margin {
            *counts.entry(key).or_default() += 1;
        }
    }

    let threshold = pages.len().div_ceil(2).max(2);
    counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|(key, _)| key)
        .collect()
}

fn margin_key(line: &str) -> String {
    let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if !PAGE_LABEL.is_match(&normalized) {
        return normalized;
    }
    normalized
        .chars()
        .map(|c| if c.is_ascii_digit() { '#' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_reference_example() {
        let dirty = "This is a test-\nwith broken lines\n\n\nand   multiple    spaces";
        assert_eq!(
            clean_text(dirty),
            "This is a testwith broken lines\n\nand multiple spaces"
        );
    }

    #[test]
    fn test_clean_text_poor_formatting() {
        let poorly_formatted = "Name: John-\nDoe\nSkills:    Python,     JavaScript,\nReact\n\n\n\nEducation: BS";
        let cleaned = clean_text(poorly_formatted);
        assert!(!cleaned.contains("John-\nDoe"));
        assert!(cleaned.contains("JohnDoe"));
        assert!(!cleaned.contains("  "));
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn test_clean_text_keeps_date_ranges() {
        // A hyphen followed by a digit on the same line is not a line break.
        assert_eq!(clean_text("2020-2023"), "2020-2023");
    }

    #[test]
    fn test_clean_text_normalises_crlf() {
        assert_eq!(clean_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_running_header_and_footer_removed() {
        let page = |body: &str, n: u32| {
            format!("Jane Roe - Resume\n{body}\nmore text for the page\nConfidential - page {n}")
        };
        let raw = [
            page("Experience at Acme", 1),
            page("Education at State", 2),
            page("Projects and talks", 3),
        ]
        .join("\x0c");

        let cleaned = clean_text(&raw);
        assert!(!cleaned.contains("Jane Roe - Resume"), "{cleaned}");
        assert!(!cleaned.contains("Confidential"), "{cleaned}");
        assert!(cleaned.contains("Experience at Acme"));
        assert!(cleaned.contains("Projects and talks"));
    }

    #[test]
    fn test_date_ranges_near_page_edges_survive() {
        let raw = "Jane Roe\nAcme\n2021 - 2023\nBuilt the billing platform\n\
                   Initech\n2019 - 2021\nShipped the reporting stack\n\
                   Globex\n2017 - 2019\x0cHooli\n2015 - 2017\nInterned on search";

        let cleaned = clean_text(raw);
        for range in ["2021 - 2023", "2019 - 2021", "2017 - 2019", "2015 - 2017"] {
            assert!(cleaned.contains(range), "{range} missing from {cleaned}");
        }
    }

    #[test]
    fn test_repeated_line_kept_mid_page() {
        let raw = [
            "ACME CORP\nSummary\nRust engineer\nBackend work\nJoined in 2019\nLed migrations\nMentored staff\nSpoke at meetups",
            "ACME CORP\nProjects\nSearch indexer\nQueue service\nACME CORP\nOpen source\nTalks\nReferences",
        ]
        .join("\x0c");

        let cleaned = clean_text(&raw);
        // Header copies go; the mid-page occurrence on page two stays.
        assert!(!cleaned.starts_with("ACME CORP"), "{cleaned}");
        assert_eq!(cleaned.lines().filter(|l| *l == "ACME CORP").count(), 1, "{cleaned}");
        assert!(cleaned.contains("Queue service\nACME CORP\nOpen source"));
    }

    #[test]
    fn test_single_page_lines_not_treated_as_header() {
        let cleaned = clean_text("Jane Roe\nRust engineer\nJane Roe");
        assert_eq!(cleaned, "Jane Roe\nRust engineer\nJane Roe");
    }

    #[test]
    fn test_bare_page_numbers_removed() {
        let cleaned = clean_text("Summary line\n2\nPage 3 of 4\n- 5 -\nlast line");
        assert_eq!(cleaned, "Summary line\nlast line");
    }
}
