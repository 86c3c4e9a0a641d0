use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::mcq::{
    normalize_options, McqResult, OPTION_COUNT, SENTINEL, UNRESOLVED_CORRECT_INDEX,
};

static QUESTION_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:question|q)\s*:\s*").unwrap());
static LETTER_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?([A-Da-d])\s*(?:[).:]|-\s)\s*(.+)$").unwrap());
static BARE_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-D])\s+(\S.*)$").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*•]\s+(.+)$").unwrap());
static INLINE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\(?[A-D][).:]\s").unwrap());
static ANSWER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:correct\s+answer|answer|correct)\s*:\s*\(?([a-d]|[1-9])\)?(?:[).:\s]|$)")
        .unwrap()
});
/// `(correct)` and `✓` anywhere, `*` only at either edge of the option.
static CORRECT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*[*✓]*\s*correct\s*[*✓]*\s*\)|✓|^\s*\*+|\*+\s*$").unwrap()
});

/// Lines after the question line examined for options.
const LOOKAHEAD_LINES: usize = 7;
/// Raw options collected before the scan stops.
const MAX_RAW_OPTIONS: usize = 6;
const MIN_OPTIONS: usize = 3;
/// Lines after the last option searched for an `Answer:` line.
const ANSWER_WINDOW: usize = 4;
/// Lines longer than this are treated as statements worth asking about.
const STATEMENT_MIN_CHARS: usize = 20;

/// Prompt used when the question line holds nothing but packed options.
pub const UNTITLED_PROMPT: &str = "Which option is correct?";

/// Find an already formatted multiple-choice block in free text.
///
/// Only the first question-like line is tried. If fewer than three options
/// follow it the scan fails without looking further down the text. An
/// `Answer:` line ends the option block.
pub fn scan(raw_text: &str) -> Option<McqResult> {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let start = lines.iter().position(|l| is_question_candidate(l))?;
    let (lead, packed) = split_packed(lines[start]);

    let mut raw: Vec<String> = Vec::new();
    for seg in packed {
        if raw.len() >= MAX_RAW_OPTIONS {
            break;
        }
        push_option(seg, &mut raw);
    }

    let mut last_option_line = start;
    let window_end = (start + 1 + LOOKAHEAD_LINES).min(lines.len());
    for (idx, line) in lines.iter().enumerate().take(window_end).skip(start + 1) {
        // An answer line closes the block.
        if raw.len() >= MAX_RAW_OPTIONS || ANSWER_LINE_RE.is_match(line) {
            break;
        }
        let (_, segs) = split_packed(line);
        let found = if segs.is_empty() {
            push_option(line, &mut raw)
        } else {
            let mut any = false;
            for seg in segs {
                if raw.len() >= MAX_RAW_OPTIONS {
                    break;
                }
                any |= push_option(seg, &mut raw);
            }
            any
        };
        if found {
            last_option_line = idx;
        }
    }

    if raw.len() < MIN_OPTIONS {
        debug!(line = start, options = raw.len(), "question line without enough options");
        return None;
    }

    let (cleaned, marked) = strip_markers(raw);
    let answer = answer_line_index(&lines, last_option_line);
    let correct_index = answer
        .or(marked.filter(|i| *i < OPTION_COUNT))
        .unwrap_or(UNRESOLVED_CORRECT_INDEX);

    let question = QUESTION_PREFIX_RE.replace(lead, "").trim().to_string();
    let question = if question.is_empty() {
        UNTITLED_PROMPT.to_string()
    } else {
        question
    };

    debug!(options = cleaned.len(), correct_index, "scanned option block");
    Some(McqResult {
        question,
        options: normalize_options(cleaned),
        correct_index,
    })
}

fn is_question_candidate(line: &str) -> bool {
    line.ends_with('?')
        || QUESTION_PREFIX_RE.is_match(line)
        || line.chars().count() > STATEMENT_MIN_CHARS
}

/// Split `A) … B) …` packed on one line. Returns the text before the first
/// marker and the option segments; a line with fewer than two markers comes
/// back whole with no segments.
fn split_packed(line: &str) -> (&str, Vec<&str>) {
    let starts: Vec<usize> = INLINE_MARKER_RE.find_iter(line).map(|m| m.start()).collect();
    if starts.len() < 2 {
        return (line, Vec::new());
    }
    let mut segs = Vec::with_capacity(starts.len());
    for (i, &s) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(line.len());
        let seg = line[s..end].trim();
        if !seg.is_empty() {
            segs.push(seg);
        }
    }
    (line[..starts[0]].trim(), segs)
}

/// Try the option forms in priority order. Bullets only continue a list
/// that already has an option.
fn push_option(seg: &str, raw: &mut Vec<String>) -> bool {
    let text = if let Some(caps) = LETTER_OPTION_RE.captures(seg) {
        caps[2].to_string()
    } else if let Some(caps) = BARE_OPTION_RE.captures(seg) {
        caps[2].to_string()
    } else if !raw.is_empty() {
        match BULLET_RE.captures(seg) {
            Some(caps) => caps[1].to_string(),
            None => return false,
        }
    } else {
        return false;
    };
    raw.push(text.trim().to_string());
    true
}

/// Remove correctness markers from every option. Returns the cleaned
/// options and the index of the first one that carried a marker.
fn strip_markers(raw: Vec<String>) -> (Vec<String>, Option<usize>) {
    let mut marked = None;
    let cleaned = raw
        .into_iter()
        .enumerate()
        .map(|(i, opt)| {
            if !CORRECT_MARKER_RE.is_match(&opt) {
                return opt;
            }
            marked.get_or_insert(i);
            // Removing one marker can join the pieces of another.
            let mut stripped = opt;
            while CORRECT_MARKER_RE.is_match(&stripped) {
                stripped = CORRECT_MARKER_RE.replace_all(&stripped, "").into_owned();
            }
            let stripped = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
            if stripped.is_empty() {
                SENTINEL.to_string()
            } else {
                stripped
            }
        })
        .collect();
    (cleaned, marked)
}

fn answer_line_index(lines: &[&str], last_option_line: usize) -> Option<usize> {
    lines
        .iter()
        .skip(last_option_line + 1)
        .take(ANSWER_WINDOW)
        .find_map(|l| ANSWER_LINE_RE.captures(l))
        .and_then(|caps| answer_token_index(&caps[1]))
}

/// `A`–`D` map to 0–3; digits are 1-based.
pub(crate) fn answer_token_index(token: &str) -> Option<usize> {
    let c = token.chars().next()?.to_ascii_uppercase();
    let idx = match c {
        'A'..='D' => c as usize - 'A' as usize,
        '1'..='9' => c as usize - '1' as usize,
        _ => return None,
    };
    (idx < OPTION_COUNT).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn opts(values: [&str; 4]) -> [String; 4] {
        values.map(String::from)
    }

    #[test]
    fn capital_of_france() {
        let text = "What is the capital of France?\nA) Paris\nB) London\nC) Berlin\nAnswer: A";
        let q = scan(text).unwrap();
        assert_eq!(q.question, "What is the capital of France?");
        assert_eq!(q.options, opts(["Paris", "London", "Berlin", "N/A"]));
        assert_eq!(q.correct_index, 0);
    }

    #[test]
    fn packed_line_with_marker() {
        let q = scan("A) Paris (correct)  B) London  C) Rome").unwrap();
        assert_eq!(q.options[0], "Paris");
        assert_eq!(q.correct_index, 0);
        assert_eq!(q.question, UNTITLED_PROMPT);
    }

    #[test]
    fn packed_options_after_question_text() {
        let q = scan("Q: Which is a noble gas? A) Neon B) Iron C) Salt D) Zinc").unwrap();
        assert_eq!(q.question, "Which is a noble gas?");
        assert_eq!(q.options, opts(["Neon", "Iron", "Salt", "Zinc"]));
    }

    #[test]
    fn empty_text() {
        assert!(scan("").is_none());
        assert!(scan("  \n\n ").is_none());
    }

    #[test]
    fn statement_without_options() {
        assert!(scan("no question-like content here").is_none());
    }

    #[test]
    fn two_options_is_not_enough() {
        assert!(scan("Is the sky blue?\nA) Yes\nB) No").is_none());
    }

    #[test]
    fn only_first_candidate_is_tried() {
        let text = "This opening sentence is long enough to qualify.\n\
                    Unrelated line\nMore filler\nEven more\nStill filler\nFiller six\nFiller seven\nFiller eight\n\
                    Which planet is red?\nA) Mars\nB) Venus\nC) Jupiter";
        assert!(scan(text).is_none());
    }

    #[test]
    fn caps_raw_options_and_truncates() {
        let text = "Pick a letter?\nA) one\nB) two\nC) three\nD) four\n- five ✓\n- six\n- seven";
        let q = scan(text).unwrap();
        assert_eq!(q.options, opts(["one", "two", "three", "four"]));
        // The marked option was cut by truncation, so the fallback applies.
        assert_eq!(q.correct_index, UNRESOLVED_CORRECT_INDEX);
    }

    #[test]
    fn digit_answer_line() {
        let text = "Question: Largest ocean?\na. Atlantic\nb. Pacific\nc. Indian\nd. Arctic\nCorrect: 2";
        let q = scan(text).unwrap();
        assert_eq!(q.question, "Largest ocean?");
        assert_eq!(q.correct_index, 1);
        assert_eq!(q.options[1], "Pacific");
    }

    #[test]
    fn answer_line_beats_marker() {
        let text = "Which is prime?\nA: 4\nB: 9 *\nC: 7\nAnswer: C";
        let q = scan(text).unwrap();
        assert_eq!(q.correct_index, 2);
        assert_eq!(q.options, opts(["4", "9", "7", "N/A"]));
    }

    #[test]
    fn markers_are_stripped_and_resolve() {
        let text = "Choose the mammal?\nA- Shark\nB- Dolphin ✓\nC- Trout";
        let q = scan(text).unwrap();
        assert_eq!(q.correct_index, 1);
        assert!(q
            .options
            .iter()
            .all(|o| !o.contains('✓') && !o.contains('*') && !o.contains("(correct)")));
    }

    #[test]
    fn nested_markers_are_fully_removed() {
        let q = scan("Which city?\nA) Paris (*correct)\nB) London\nC) Rome").unwrap();
        assert_eq!(q.options, opts(["Paris", "London", "Rome", "N/A"]));
        assert_eq!(q.correct_index, 0);

        let q = scan("Which city?\nA) Paris\nB) London (cor(correct)rect)\nC) Rome").unwrap();
        assert_eq!(q.options[1], "London");
        assert_eq!(q.correct_index, 1);
    }

    #[test]
    fn inner_asterisk_is_not_a_marker() {
        let q = scan("What is six?\nA) 7\nB) 2*3\nC) 5\nD) 6 *").unwrap();
        assert_eq!(q.options, opts(["7", "2*3", "5", "6"]));
        assert_eq!(q.correct_index, 3);
    }

    #[test]
    fn bare_letters_and_bullets() {
        let text = "Which are fruits?\nA Apple\n- Banana\n* Carrot";
        let q = scan(text).unwrap();
        assert_eq!(q.options, opts(["Apple", "Banana", "Carrot", "N/A"]));
    }

    #[test]
    fn bullets_alone_do_not_start_a_list() {
        assert!(scan("Which are fruits?\n- Apple\n- Banana\n- Cherry").is_none());
    }

    #[test]
    fn answer_line_ends_the_block() {
        let text = "Which gas do plants absorb?\nA) Oxygen\nB) Carbon dioxide\nC) Helium\nAnswer: B\nA) stray\nB) lines";
        let q = scan(text).unwrap();
        assert_eq!(q.options, opts(["Oxygen", "Carbon dioxide", "Helium", "N/A"]));
        assert_eq!(q.correct_index, 1);
    }

    #[test]
    fn answer_token_mapping() {
        assert_eq!(answer_token_index("b"), Some(1));
        assert_eq!(answer_token_index("4"), Some(3));
        assert_eq!(answer_token_index("5"), None);
    }

    const MARKED_FORMS: &[&str] = &["(correct)", "(*correct)", "*", "✓", "(correct) *"];

    fn has_marker(option: &str) -> bool {
        option.contains("(correct)")
            || option.contains('✓')
            || option.starts_with('*')
            || option.ends_with('*')
    }

    proptest! {
        #[test]
        fn marked_blocks_come_back_clean(
            texts in proptest::collection::vec("[a-z]{2,8}( [a-z]{2,8})?", 3..=4),
            pick in any::<prop::sample::Index>(),
            marker in prop::sample::select(MARKED_FORMS.to_vec()),
            before in any::<bool>(),
            spaced in any::<bool>(),
        ) {
            let marked = pick.index(texts.len());
            let sep = if spaced { " " } else { "" };
            let mut text = String::from("Which one fits?");
            for (i, t) in texts.iter().enumerate() {
                let body = match (i == marked, before) {
                    (false, _) => t.clone(),
                    (true, true) => format!("{marker}{sep}{t}"),
                    (true, false) => format!("{t}{sep}{marker}"),
                };
                text.push_str(&format!("\n{}) {}", (b'A' + i as u8) as char, body));
            }

            let q = scan(&text).unwrap();
            prop_assert_eq!(q.options.len(), OPTION_COUNT);
            prop_assert_eq!(q.correct_index, marked);
            prop_assert_eq!(&q.options[marked], &texts[marked]);
            for o in &q.options {
                prop_assert!(!has_marker(o), "marker left in {:?}", o);
            }
        }
    }

    #[test]
    fn ocr_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/ocr_quiz.txt").unwrap();
        let q = scan(&text).unwrap();
        assert_eq!(q.question, "Which organelle produces most of the cell's ATP?");
        assert_eq!(q.options, opts(["Nucleus", "Mitochondria", "Ribosome", "Golgi apparatus"]));
        assert_eq!(q.correct_index, 1);
    }
}
