//! Card text handling: blank normalization on the way in, round rendering on
//! the way out.
use crate::model::{FillCard, PromptCard};
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical blank marker stored in prompt text.
pub const BLANK: &str = ":blank:";

/// Bold delimiter wrapped around fill text in a rendered round.
pub const EMPHASIS: char = '*';

static BLANK_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{3,}\s*([,.!?])").expect("valid blank regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{3,}").expect("valid blank regex"));

/// Turns free-form underscore runs (three or more) into [`BLANK`]. A run
/// followed by whitespace and a punctuation mark keeps the punctuation glued
/// to the marker.
pub fn normalize_blanks(text: &str) -> String {
    let text = BLANK_BEFORE_PUNCT.replace_all(text, format!("{BLANK}${{1}}").as_str());
    BLANK_RUN.replace_all(&text, BLANK).into_owned()
}

pub fn emphasize(text: &str) -> String {
    format!("{EMPHASIS}{text}{EMPHASIS}")
}

/// Joins items as an English list: `a`, `a and b`, `a, b, and c`.
pub fn conjoin<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Upper-cases the first alphabetic character, looking past emphasis marks,
/// quotes and other leading punctuation.
pub fn capitalize_first(text: &str) -> String {
    let Some((pos, first)) = text.char_indices().find(|(_, c)| c.is_alphabetic()) else {
        return text.to_string();
    };
    let rest = &text[pos + first.len_utf8()..];
    format!("{}{}{}", &text[..pos], first.to_uppercase(), rest)
}

/// Renders a round: each blank in the prompt takes the next fill, emphasized.
///
/// Fills left over once the blanks run out are appended as a trailing clause.
/// Blanks left over once the fills run out stay in the text as literal markers.
pub fn render(prompt: &PromptCard, fills: &[FillCard]) -> String {
    let mut text = prompt.text.clone();
    let mut cursor = 0;
    let mut used = 0;

    // Only search past the last substitution so fill text is never re-filled.
    while used < fills.len() {
        let Some(offset) = text[cursor..].find(BLANK) else {
            break;
        };
        let pos = cursor + offset;
        let answer = emphasize(&fills[used].text);
        text.replace_range(pos..pos + BLANK.len(), &answer);
        cursor = pos + answer.len();
        used += 1;
    }

    if used < fills.len() {
        let rest: Vec<&str> = fills[used..].iter().map(|f| f.text.as_str()).collect();
        text = format!("{} {}.", text.trim_end(), conjoin(&rest));
    }

    capitalize_first(&text)
}
