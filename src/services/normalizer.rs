//! Name normalization shared by every matching strategy.
//!
//! `normalize` is the single text transform the identity generator, candidate
//! retriever, and weighted scorer all agree on. It is deterministic, total,
//! and idempotent: `normalize(normalize(s)) == normalize(s)`.

/// Words stripped when they appear at the start or end of a name.
const ROLE_MARKERS: &[&str] = &["test", "it", "should", "describe"];

/// Words removed anywhere in the name, as whole words, case-insensitively.
const STOP_WORDS: &[&str] = &[
    "test", "spec", "should", "can", "will", "does", "is", "has", "with", "when", "then", "given",
];

/// Normalize a test or suite name for comparison.
///
/// One pass applies, in order: boundary role-marker stripping, separator
/// (`_`, `-`, `.`) replacement, camel-case splitting, stop-word removal,
/// whitespace collapsing, trimming, and lower-casing. Removing a stop word
/// can expose a role marker at a boundary, so the pass is applied to
/// fixpoint; this is what makes the function idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_pass(text: &str) -> String {
    let stripped = strip_role_markers(text);
    let separated = replace_separators(&stripped);
    let split = split_camel_case(&separated);
    let without_stop_words = remove_stop_words(&split);
    collapse_whitespace(&without_stop_words).trim().to_lowercase()
}

fn strip_role_markers(text: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    while let Some(first) = words.first() {
        if ROLE_MARKERS.contains(&first.to_lowercase().as_str()) {
            words.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = words.last() {
        if ROLE_MARKERS.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

fn replace_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c == '_' || c == '-' || c == '.' {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn split_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev_lower = false;
    for c in text.chars() {
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase();
        out.push(c);
    }
    out
}

fn remove_stop_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a file path for identity generation and path comparison:
/// forward-slash separators, no leading `./` or `/`, no duplicate slashes.
pub fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut segments: Vec<&str> = forward
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    // Resolve `..` against preceding segments where possible.
    let mut resolved: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments.drain(..) {
        if segment == ".." {
            if resolved.last().is_some_and(|s| *s != "..") {
                resolved.pop();
            } else {
                resolved.push(segment);
            }
        } else {
            resolved.push(segment);
        }
    }
    resolved.join("/")
}

/// Lower-cased word tokens of a normalized name, used by the retriever's
/// token-overlap prefilter.
pub fn name_tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}
