use std::ops::Range;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use serde::Serialize;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());
static US_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static NAMED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .unwrap()
});
static MERIDIEM_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?(?:\s|$)").unwrap()
});
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:at\s+)?([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());
static LIST_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d{1,3}[.)])\s+").unwrap());

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
/// Words left dangling at either end once the date and time are cut out.
const DANGLING_WORDS: &[&str] = &["on", "at", "by"];
const SEPARATORS: &[char] = &['-', '–', '—', ':', ',', '|', '@'];

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
}

/// One event per line that carries a recognizable date.
pub fn extract_events(text: &str) -> Vec<CalendarEvent> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(parse_event_line)
        .collect()
}

pub fn parse_event_line(line: &str) -> Option<CalendarEvent> {
    let line = LIST_PREFIX_RE.replace(line, "");
    let (date, date_span) = find_date(&line)?;

    let mut rest = String::with_capacity(line.len());
    rest.push_str(&line[..date_span.start]);
    rest.push(' ');
    rest.push_str(&line[date_span.end..]);

    let (time, rest) = match find_time(&rest) {
        Some((time, span)) => {
            let cut = format!("{} {}", &rest[..span.start], &rest[span.end..]);
            (Some(time), cut)
        }
        None => (None, rest),
    };

    Some(CalendarEvent {
        date,
        time,
        title: clean_title(&rest),
    })
}

fn find_date(line: &str) -> Option<(NaiveDate, Range<usize>)> {
    let ymd = |caps: &Captures<'_>, y: usize, m: usize, d: usize| -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(caps[y].parse().ok()?, caps[m].parse().ok()?, caps[d].parse().ok()?)
    };

    if let Some(caps) = ISO_DATE_RE.captures(line) {
        if let Some(date) = ymd(&caps, 1, 2, 3) {
            return Some((date, caps.get(0)?.range()));
        }
    }
    if let Some(caps) = US_DATE_RE.captures(line) {
        if let Some(date) = ymd(&caps, 3, 1, 2) {
            return Some((date, caps.get(0)?.range()));
        }
    }
    let caps = NAMED_DATE_RE.captures(line)?;
    let month = MONTHS
        .iter()
        .position(|m| caps[1].eq_ignore_ascii_case(m))?
        + 1;
    let date = NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month as u32, caps[2].parse().ok()?)?;
    Some((date, caps.get(0)?.range()))
}

fn find_time(text: &str) -> Option<(NaiveTime, Range<usize>)> {
    if let Some(caps) = MERIDIEM_TIME_RE.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if (1..=12).contains(&hour) {
            let pm = caps[3].eq_ignore_ascii_case("p");
            let hour24 = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            };
            if let Some(time) = NaiveTime::from_hms_opt(hour24, minute, 0) {
                return Some((time, caps.get(0)?.range()));
            }
        }
    }
    let caps = CLOCK_TIME_RE.captures(text)?;
    let time = NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 0)?;
    Some((time, caps.get(0)?.range()))
}

fn clean_title(rest: &str) -> String {
    let mut words: Vec<&str> = rest.split_whitespace().collect();
    loop {
        let before = words.len();
        while words
            .first()
            .is_some_and(|w| w.chars().all(|c| SEPARATORS.contains(&c)) || is_dangling(w))
        {
            words.remove(0);
        }
        while words
            .last()
            .is_some_and(|w| w.chars().all(|c| SEPARATORS.contains(&c)) || is_dangling(w))
        {
            words.pop();
        }
        if words.len() == before {
            break;
        }
    }
    let title = words.join(" ");
    let title = title.trim_matches(|c: char| SEPARATORS.contains(&c) || c.is_whitespace());
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

fn is_dangling(word: &str) -> bool {
    DANGLING_WORDS.iter().any(|d| word.eq_ignore_ascii_case(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn iso_with_clock_time() {
        let e = parse_event_line("2025-03-14 14:30 - Chemistry midterm").unwrap();
        assert_eq!(e.date, date(2025, 3, 14));
        assert_eq!(e.time, time(14, 30));
        assert_eq!(e.title, "Chemistry midterm");
    }

    #[test]
    fn named_month_with_meridiem() {
        let e = parse_event_line("Essay due on March 3rd, 2025 at 5pm").unwrap();
        assert_eq!(e.date, date(2025, 3, 3));
        assert_eq!(e.time, time(17, 0));
        assert_eq!(e.title, "Essay due");
    }

    #[test]
    fn us_date_without_time() {
        let e = parse_event_line("- 12/01/2024: Lab report").unwrap();
        assert_eq!(e.date, date(2024, 12, 1));
        assert_eq!(e.time, None);
        assert_eq!(e.title, "Lab report");
    }

    #[test]
    fn midnight_and_noon() {
        assert_eq!(parse_event_line("Jan 5 2026 12am start").unwrap().time, time(0, 0));
        assert_eq!(parse_event_line("Jan 5 2026 12:15 p.m. lunch").unwrap().time, time(12, 15));
    }

    #[test]
    fn date_only_line_is_untitled() {
        assert_eq!(parse_event_line("2025-01-01").unwrap().title, UNTITLED);
    }

    #[test]
    fn invalid_dates_are_skipped() {
        assert!(parse_event_line("2025-02-30 Impossible day").is_none());
        assert!(parse_event_line("No date on this line").is_none());
    }

    #[test]
    fn schedule_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/schedule.txt").unwrap();
        let events = extract_events(&text);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Biology quiz");
        assert_eq!(events[1].time, time(9, 0));
        assert_eq!(events[2].date, date(2025, 5, 20));
    }
}
