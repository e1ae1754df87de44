//! Description text cleanup.
//!
//! Origin descriptions arrive as HTML fragments padded with site attribution,
//! label cells and footer blurbs. [`normalize_text`] runs them through a fixed
//! sequence of pure stages; each stage consumes the previous stage's output,
//! so the order in [`STAGES`] matters.

use std::sync::LazyLock;

use regex::Regex;

/// Marks that lose the whitespace before them and gain one space after.
const PUNCTUATION: &[char] = &['?', '.', '!', ',', ';', ':'];

/// Marks whose consecutive repeats collapse to one.
const COLLAPSIBLE: &[char] = &['?', '.', '!', ',', ';'];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+([?.!,;:])").unwrap());

/// The attribution notice, minus the leading title. The captured group is the
/// trailing title, which must match the leading one.
static ATTRIBUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i) summary is updating\. Come visit MangaNato\. com sometime ",
        r"to read the latest chapter of (.*?)\. ",
        r"If you have any question about this manga, Please don't hesitate ",
        r"to contact us or translate team\. ",
        r"Hope you enjoy it\."
    ))
    .unwrap()
});

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Description\s*:\s*|not found...|N/A").unwrap());

static SUMMARY_PREAMBLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^.+?Summary:\s*").unwrap());

static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:What is mangabuddy\?|Alternative:|Other attractive Manga:).*").unwrap()
});

/// Upper bound on pipeline passes while waiting for the text to settle.
const MAX_PASSES: usize = 16;

/// A single cleanup step.
pub type Stage = fn(&str) -> String;

/// The cleanup pipeline, in application order.
pub const STAGES: &[Stage] = &[
    strip_markup,
    collapse_whitespace,
    fix_punctuation,
    strip_attribution,
    straighten_quotes,
    strip_boilerplate,
];

/// Normalizes a raw description into canonical text.
///
/// Returns `None` when nothing but markup, whitespace or boilerplate remains.
///
/// # Example
///
/// ```rust
/// use mangarelay_core::normalize_text;
///
/// assert_eq!(
///     normalize_text("<p>Two  heroes ,one sword!!</p>"),
///     Some("Two heroes, one sword!".to_string())
/// );
/// assert_eq!(normalize_text("  <b>Description :</b>  N/A  "), None);
/// ```
pub fn normalize_text(raw: &str) -> Option<String> {
    let mut text = run_stages(raw);
    // Decoded entities can form new tags or placeholders for an earlier stage.
    for _ in 1..MAX_PASSES {
        let next = run_stages(&text);
        if next == text {
            break;
        }
        text = next;
    }
    let text = text.trim();

    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn run_stages(text: &str) -> String {
    STAGES.iter().fold(text.to_string(), |text, stage| stage(&text))
}

/// Removes tag-like substrings, then decodes HTML entities.
pub fn strip_markup(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Collapses whitespace runs, newlines included, into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Tightens spacing around punctuation.
///
/// Whitespace before a mark is removed, repeats of the same mark collapse
/// (`!!` becomes `!`, `?!` is kept), and every mark not at the end of the text
/// is followed by exactly one space.
pub fn fix_punctuation(text: &str) -> String {
    let tightened = SPACE_BEFORE_PUNCT_RE.replace_all(text, "$1");

    let mut deduped = String::with_capacity(tightened.len());
    let mut previous = None;
    for c in tightened.chars() {
        if COLLAPSIBLE.contains(&c) && previous == Some(c) {
            continue;
        }
        deduped.push(c);
        previous = Some(c);
    }

    let mut out = String::with_capacity(deduped.len() + 16);
    let mut chars = deduped.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if PUNCTUATION.contains(&c) && chars.peek().is_some_and(|next| !next.is_whitespace()) {
            out.push(' ');
        }
    }

    out.trim().to_string()
}

/// Removes the "<title> summary is updating..." attribution notice.
///
/// The notice names the manga twice; it is only removed when both names
/// agree, compared case-insensitively.
pub fn strip_attribution(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for caps in ATTRIBUTION_RE.captures_iter(text) {
        let Some(notice) = caps.get(0) else { continue };
        let title = caps.get(1).map_or("", |m| m.as_str());
        let head = &text[cursor..notice.start()];

        match leading_title_start(head, title) {
            Some(start) => out.push_str(&head[..start]),
            None => out.push_str(&text[cursor..notice.end()]),
        }
        cursor = notice.end();
    }

    out.push_str(&text[cursor..]);
    out
}

/// Byte offset in `head` where a trailing copy of `title` begins.
fn leading_title_start(head: &str, title: &str) -> Option<usize> {
    let start = head.len().checked_sub(title.len())?;
    let candidate = head.get(start..)?;
    (candidate.to_lowercase() == title.to_lowercase()).then_some(start)
}

/// Replaces curly quotes with straight ones.
pub fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect()
}

/// Drops label prefixes, placeholders, the summary preamble and footer blurbs.
///
/// A placeholder cut from mid-text leaves its surrounding spaces behind, so
/// spacing is tightened again afterwards.
pub fn strip_boilerplate(text: &str) -> String {
    let text = PLACEHOLDER_RE.replace_all(text, "");
    let text = SUMMARY_PREAMBLE_RE.replace(&text, "");
    let text = FOOTER_RE.replace(&text, "");
    fix_punctuation(&collapse_whitespace(&text))
}
