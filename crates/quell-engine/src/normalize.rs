//! Subject normalization.
//!
//! Turns a raw ticket subject into a canonical comparable string: stacked
//! reply/forward prefixes (23 variants across languages), thread markers,
//! ticket references, URLs, and email addresses are stripped; symbol runs
//! collapse to whitespace; the result is lower-cased and trimmed.

use std::sync::LazyLock;

use regex::Regex;

/// Leading reply/forward prefixes, matched repeatedly so a subject carrying
/// several stacked prefixes from a long thread is fully unwrapped.
static RE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(re|fw|fwd|forwarded|aw|antw|sv|svar|vs|vedr|tr|res|resp|enc|odg|ynt|att|回复|转发|답장|전달|返信|転送)(\s*\[\d+\])?\s*:\s*",
    )
    .unwrap()
});

/// Trailing `(re)` / `(fwd)` markers some clients append instead of prefixing.
static RE_TRAILING_REPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((re|fwd?)\)\s*$").unwrap());

/// Bracketed thread/annotation markers inserted by mail gateways.
static RE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(external|spam|important|urgent)\]").unwrap());

/// Numeric reply counters: `(2)`, `[3]`, `#123`.
static RE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+\)|\[\d+\]|#\d+").unwrap());

/// Ticket references and generic case numbers, e.g. `nvstrs-371`, `inc_20431`.
static RE_TICKET_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{2,6}[-_]?\d{3,8}\b").unwrap());

static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+\.\w+").unwrap());

/// Separator/symbol runs collapsed to a single space.
static RE_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-–—•·│┃┆┇┈┉┊┋]+").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Dates in numeric formats, removed for the core-subject variant.
static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}[/.]\d{1,2}[/.]\d{2,4}|\d{4}[/.]\d{1,2}[/.]\d{1,2}").unwrap()
});

/// Times like `14:30`, `2:15:00 pm`, removed for the core-subject variant.
static RE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}(:\d{2})?(\s*[ap]m)?").unwrap());

/// A subject reduced to its two comparison keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubject {
    /// Canonical comparable form of the subject.
    pub normalized: String,
    /// Looser secondary key with dates, times, and counters also removed.
    pub core: String,
}

impl NormalizedSubject {
    pub fn of(subject: &str) -> Self {
        let normalized = normalize(subject);
        let core = core_subject(&normalized);
        Self { normalized, core }
    }
}

/// Normalize a raw subject into its canonical comparable form.
///
/// Deterministic and total. Idempotent: removals can splice adjacent tokens
/// together (e.g. text on either side of a stripped email address), so the
/// pipeline runs to a fixpoint rather than assuming one pass suffices.
pub fn normalize(subject: &str) -> String {
    let mut out = normalize_once(subject);
    loop {
        let next = normalize_once(&out);
        if next == out {
            return out;
        }
        out = next;
    }
}

fn normalize_once(subject: &str) -> String {
    let mut s = subject.to_lowercase();

    // Unwrap stacked reply/forward prefixes. RE_PREFIX is anchored, so each
    // iteration peels exactly one leading prefix.
    while let Some(m) = RE_PREFIX.find(&s) {
        s = s[m.end()..].to_string();
    }
    s = RE_TRAILING_REPLY.replace_all(&s, "").into_owned();

    s = RE_MARKER.replace_all(&s, " ").into_owned();
    s = RE_COUNTER.replace_all(&s, " ").into_owned();
    s = RE_TICKET_REF.replace_all(&s, " ").into_owned();
    s = RE_URL.replace_all(&s, " ").into_owned();
    s = RE_EMAIL.replace_all(&s, " ").into_owned();
    s = RE_SYMBOLS.replace_all(&s, " ").into_owned();

    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Extract the core subject from an already-normalized subject by removing
/// variable low-information tokens: dates, times, counters, stray addresses.
pub fn core_subject(normalized: &str) -> String {
    let mut s = RE_DATE.replace_all(normalized, " ").into_owned();
    s = RE_TIME.replace_all(&s, " ").into_owned();
    s = RE_COUNTER.replace_all(&s, " ").into_owned();
    s = RE_EMAIL.replace_all(&s, " ").into_owned();
    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Normalize the comparison prefix of a ticket description.
///
/// Only the first `limit` characters take part in description similarity;
/// the prefix goes through the same normalization as subjects.
pub fn normalize_description(description: &str, limit: usize) -> String {
    let prefix: String = description.chars().take(limit).collect();
    normalize(&prefix)
}
