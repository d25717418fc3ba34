//! Source declaration extraction.
//!
//! Scans one test-source file's text and produces the ordered list of
//! declared-test facts plus file-level metadata. Dispatches to a per-family
//! extraction profile chosen by indicator-substring detection (or an explicit
//! hint), then locates group and test declarations, assigns each test its
//! nearest preceding group label, and scans a bounded window around each
//! declaration for family-specific attributes.
//!
//! Extraction is deliberately structural: no language parsing, and one
//! malformed declaration never aborts the rest of the file.

pub mod profiles;

use regex::Captures;
use tracing::{debug, warn};

use crate::domain::models::{
    AuthoringFamily, FamilyAttributes, FileExtraction, FileMetadata, Modifier, SourceDeclaration,
};

use profiles::{build_profiles, generic_profile, FamilyProfile};

/// Characters of text scanned after a declaration for attributes.
const ATTRIBUTE_WINDOW: usize = 600;
/// Characters of text scanned before a declaration for annotations.
const ANNOTATION_WINDOW: usize = 200;
/// Characters scanned after a title for the async keyword.
const ASYNC_WINDOW: usize = 80;
/// Cap on attribute list lengths.
const MAX_ATTRIBUTE_ENTRIES: usize = 8;

/// A located grouping-label declaration.
struct GroupSite {
    offset: usize,
    label: String,
}

/// Extracts source declarations from test files.
pub struct DeclarationExtractor {
    profiles: Vec<FamilyProfile>,
    generic: Option<FamilyProfile>,
}

impl Default for DeclarationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationExtractor {
    /// Build an extractor with the full profile table.
    pub fn new() -> Self {
        Self {
            profiles: build_profiles(),
            generic: generic_profile(),
        }
    }

    /// Detect the authoring family of a file from indicator substrings,
    /// evaluated in fixed priority order. Heuristic; may be wrong for
    /// hand-written or templated files.
    pub fn detect_family(&self, text: &str) -> AuthoringFamily {
        for profile in &self.profiles {
            if profile.indicators.iter().any(|needle| text.contains(needle)) {
                return profile.family;
            }
        }
        AuthoringFamily::Generic
    }

    /// Extract all declarations from one file.
    ///
    /// `hint` short-circuits family detection when the caller already knows
    /// the authoring convention. A file matching no family is extracted with
    /// the permissive generic profile; a file with no recognizable
    /// declarations yields an empty list, not an error.
    pub fn extract(
        &self,
        text: &str,
        file_path: &str,
        hint: Option<AuthoringFamily>,
    ) -> FileExtraction {
        let family = hint.unwrap_or_else(|| self.detect_family(text));
        let Some(profile) = self.profile_for(family) else {
            // Regex table failed to build; nothing can be extracted.
            return FileExtraction {
                declarations: Vec::new(),
                metadata: FileMetadata {
                    family,
                    file_path: file_path.to_string(),
                    declaration_count: 0,
                    group_count: 0,
                    skipped_count: 0,
                },
            };
        };

        let groups = Self::locate_groups(profile, text);
        let mut declarations = Vec::new();
        let mut skipped = 0usize;

        for caps in profile.test_pattern.captures_iter(text) {
            match Self::declaration_from_captures(profile, &caps, text, file_path, &groups) {
                Ok(declaration) => declarations.push(declaration),
                Err(reason) => {
                    skipped += 1;
                    warn!(
                        file = file_path,
                        reason = reason.as_str(),
                        "skipping malformed test declaration"
                    );
                }
            }
        }

        debug!(
            file = file_path,
            family = %profile.family,
            declarations = declarations.len(),
            groups = groups.len(),
            "extracted source declarations"
        );

        FileExtraction {
            metadata: FileMetadata {
                family: profile.family,
                file_path: file_path.to_string(),
                declaration_count: declarations.len(),
                group_count: groups.len(),
                skipped_count: skipped,
            },
            declarations,
        }
    }

    fn profile_for(&self, family: AuthoringFamily) -> Option<&FamilyProfile> {
        self.profiles
            .iter()
            .find(|p| p.family == family)
            .or(self.generic.as_ref())
    }

    fn locate_groups(profile: &FamilyProfile, text: &str) -> Vec<GroupSite> {
        profile
            .group_pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let label = captured_title(&caps)?;
                if label.trim().is_empty() {
                    return None;
                }
                Some(GroupSite {
                    offset: m.start(),
                    label,
                })
            })
            .collect()
    }

    fn declaration_from_captures(
        profile: &FamilyProfile,
        caps: &Captures<'_>,
        text: &str,
        file_path: &str,
        groups: &[GroupSite],
    ) -> Result<SourceDeclaration, String> {
        let whole = caps
            .get(0)
            .ok_or_else(|| "declaration match vanished".to_string())?;
        let title = captured_title(caps).ok_or_else(|| "declaration has no title".to_string())?;

        let offset = whole.start();
        let line = line_number(text, offset);

        let mut declaration =
            SourceDeclaration::new(profile.family, title, file_path, line);
        declaration.validate()?;

        // Nearest preceding group wins; sibling and nested groups tie-break
        // on smallest positive offset difference.
        declaration.group = groups
            .iter()
            .filter(|g| g.offset < offset)
            .min_by_key(|g| offset - g.offset)
            .map(|g| g.label.clone());

        if let Some(modifier) = caps.get(1).and_then(|m| Modifier::from_str(m.as_str())) {
            declaration.modifiers.insert(modifier);
        }

        declaration.is_async = window_after(text, whole.end(), ASYNC_WINDOW).contains("async");
        declaration.attributes = Self::scan_attributes(profile, text, offset, whole.end());

        Ok(declaration)
    }

    fn scan_attributes(
        profile: &FamilyProfile,
        text: &str,
        decl_start: usize,
        decl_end: usize,
    ) -> FamilyAttributes {
        let body = window_after(text, decl_end, ATTRIBUTE_WINDOW);
        let preamble = window_before(text, decl_start, ANNOTATION_WINDOW);
        let mut attributes = FamilyAttributes::default();

        if let Some(pattern) = &profile.attributes.browsers {
            attributes.browsers = collect_captures(pattern, body);
        }
        if let Some(pattern) = &profile.attributes.assertions {
            attributes.assertions = collect_captures(pattern, body);
        }
        if let Some(pattern) = &profile.attributes.commands {
            attributes.commands = collect_captures(pattern, body)
                .into_iter()
                .filter(|name| !is_builtin_command(name))
                .collect();
        }
        if let Some(pattern) = &profile.attributes.timeout {
            // Timeouts may be declared as an option after the title or as an
            // annotation before the declaration.
            attributes.timeout_ms = first_number(pattern, body)
                .or_else(|| first_number(pattern, preamble));
        }

        attributes
    }
}

/// Title from whichever quote-kind alternative matched. Titles always live in
/// the last three capture groups (single, double, backtick), for both test
/// and group patterns.
fn captured_title(caps: &Captures<'_>) -> Option<String> {
    let len = caps.len();
    (len.saturating_sub(3)..len)
        .filter_map(|i| caps.get(i))
        .map(|m| m.as_str().to_string())
        .next()
}

/// 1-based line number of a byte offset.
fn line_number(text: &str, offset: usize) -> u32 {
    let clamped = offset.min(text.len());
    u32::try_from(text[..clamped].bytes().filter(|b| *b == b'\n').count() + 1).unwrap_or(u32::MAX)
}

fn window_after(text: &str, start: usize, len: usize) -> &str {
    if start >= text.len() {
        return "";
    }
    let mut end = (start + len).min(text.len());
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

fn window_before(text: &str, end: usize, len: usize) -> &str {
    let end = end.min(text.len());
    let mut start = end.saturating_sub(len);
    while start < end && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..end]
}

fn collect_captures(pattern: &regex::Regex, text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in pattern.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            let value = m.as_str().to_string();
            if !seen.contains(&value) {
                seen.push(value);
                if seen.len() >= MAX_ATTRIBUTE_ENTRIES {
                    break;
                }
            }
        }
    }
    seen
}

fn first_number(pattern: &regex::Regex, text: &str) -> Option<u64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Cypress commands shipped with the runner; everything else is treated as a
/// custom command.
fn is_builtin_command(name: &str) -> bool {
    matches!(
        name,
        "visit"
            | "get"
            | "click"
            | "type"
            | "contains"
            | "should"
            | "wait"
            | "request"
            | "intercept"
            | "url"
            | "log"
            | "wrap"
            | "find"
            | "first"
            | "last"
            | "eq"
            | "submit"
            | "check"
            | "select"
            | "clear"
            | "reload"
            | "screenshot"
            | "viewport"
            | "then"
            | "its"
            | "within"
    )
}
