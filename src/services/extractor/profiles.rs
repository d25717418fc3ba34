//! Per-family extraction profiles.
//!
//! Each authoring family contributes a strategy-table entry: indicator
//! substrings for detection, regex patterns locating group and test
//! declarations, and the attribute patterns worth scanning near a
//! declaration. This is structural text-pattern recognition, not parsing;
//! patterns are anchored to line starts and quote-delimited titles, and
//! anything they miss is skipped rather than failed.

use regex::Regex;

use crate::domain::models::AuthoringFamily;

/// Declaration patterns and detection indicators for one authoring family.
#[derive(Debug)]
pub struct FamilyProfile {
    /// The family this profile extracts.
    pub family: AuthoringFamily,
    /// Substrings whose presence selects this family during detection.
    pub indicators: &'static [&'static str],
    /// Locates grouping-label declarations; label in capture groups 1-3
    /// (single-, double-, and backtick-quoted).
    pub group_pattern: Regex,
    /// Locates individual-test declarations; optional modifier suffix in
    /// capture group 1, title in groups 2-4.
    pub test_pattern: Regex,
    /// Attribute sub-patterns scanned in a bounded window around each test
    /// declaration.
    pub attributes: AttributePatterns,
}

/// Optional attribute patterns; a family only scans what it declares.
#[derive(Debug, Default)]
pub struct AttributePatterns {
    /// Target-environment (browser/engine) name list.
    pub browsers: Option<Regex>,
    /// Assertion-call names (`expect(..).toBe`, `assert.equal`).
    pub assertions: Option<Regex>,
    /// Custom command identifiers (`cy.login`).
    pub commands: Option<Regex>,
    /// Numeric timeout literals (`{ timeout: 30000 }`, `this.timeout(5000)`).
    pub timeout: Option<Regex>,
}

/// Modifier suffixes recognized on declaration calls across families.
const MODIFIER_ALTERNATION: &str = "only|skip|todo|concurrent|fixme";

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn quoted_title() -> &'static str {
    // The regex crate has no backreferences; spell out the three quote kinds.
    r#"\(\s*(?:'([^'\n]*)'|"([^"\n]*)"|`([^`]*)`)"#
}

fn test_pattern(callees: &str) -> Option<Regex> {
    compile(&format!(
        r"(?m)^[ \t]*(?:{callees})(?:\.({MODIFIER_ALTERNATION}))?\s*{title}",
        callees = callees,
        MODIFIER_ALTERNATION = MODIFIER_ALTERNATION,
        title = quoted_title(),
    ))
}

fn group_pattern(callees: &str) -> Option<Regex> {
    compile(&format!(
        r"(?m)^[ \t]*(?:{callees})(?:\.(?:{MODIFIER_ALTERNATION}|serial|parallel|shuffle))?\s*{title}",
        callees = callees,
        MODIFIER_ALTERNATION = MODIFIER_ALTERNATION,
        title = quoted_title(),
    ))
}

fn timeout_pattern() -> Option<Regex> {
    compile(r"(?:timeout\s*:\s*|this\.timeout\(\s*)(\d+)")
}

fn expect_assertion_pattern() -> Option<Regex> {
    compile(r"expect\s*\((?:[^()]|\([^()]*\))*\)\s*(?:\.(?:not|resolves|rejects))?\.(\w+)\s*\(")
}

/// Build the profile table in detection priority order: browser end-to-end
/// first, then command end-to-end, unit, concurrent unit, suite. The generic
/// fallback profile is built separately and is not part of detection.
pub fn build_profiles() -> Vec<FamilyProfile> {
    let mut profiles = Vec::with_capacity(5);

    if let (Some(group), Some(test)) = (
        group_pattern(r"test\s*\.\s*describe|describe"),
        test_pattern("test"),
    ) {
        profiles.push(FamilyProfile {
            family: AuthoringFamily::Playwright,
            indicators: &["@playwright/test", "test.describe", "playwright", "page."],
            group_pattern: group,
            test_pattern: test,
            attributes: AttributePatterns {
                browsers: compile(r"\b(chromium|firefox|webkit|chrome|msedge)\b"),
                assertions: expect_assertion_pattern(),
                commands: None,
                timeout: timeout_pattern(),
            },
        });
    }

    if let (Some(group), Some(test)) = (
        group_pattern("describe|context"),
        test_pattern("it|specify"),
    ) {
        profiles.push(FamilyProfile {
            family: AuthoringFamily::Cypress,
            indicators: &["cy.", "Cypress.", "cypress"],
            group_pattern: group,
            test_pattern: test,
            attributes: AttributePatterns {
                browsers: None,
                assertions: compile(r"\.should\s*\(\s*['\x22]([^'\x22\n]+)['\x22]"),
                commands: compile(r"cy\.(\w+)\s*\("),
                timeout: timeout_pattern(),
            },
        });
    }

    if let (Some(group), Some(test)) = (group_pattern("describe"), test_pattern("it|test")) {
        profiles.push(FamilyProfile {
            family: AuthoringFamily::Jest,
            indicators: &["@jest/globals", "jest.", "from 'jest", "from \"jest"],
            group_pattern: group,
            test_pattern: test,
            attributes: AttributePatterns {
                browsers: None,
                assertions: expect_assertion_pattern(),
                commands: None,
                timeout: timeout_pattern(),
            },
        });
    }

    if let (Some(group), Some(test)) = (
        group_pattern("describe|suite"),
        test_pattern(r"it|test|bench"),
    ) {
        profiles.push(FamilyProfile {
            family: AuthoringFamily::Vitest,
            indicators: &["vitest", "test.concurrent", "vi.mock", "vi.fn"],
            group_pattern: group,
            test_pattern: test,
            attributes: AttributePatterns {
                browsers: None,
                assertions: expect_assertion_pattern(),
                commands: None,
                timeout: timeout_pattern(),
            },
        });
    }

    if let (Some(group), Some(test)) = (
        group_pattern("describe|context|suite"),
        test_pattern("it|specify|test"),
    ) {
        profiles.push(FamilyProfile {
            family: AuthoringFamily::Mocha,
            indicators: &["mocha", "this.timeout", "chai", "suite("],
            group_pattern: group,
            test_pattern: test,
            attributes: AttributePatterns {
                browsers: None,
                assertions: compile(r"assert\.(\w+)\s*\("),
                commands: None,
                timeout: timeout_pattern(),
            },
        });
    }

    profiles
}

/// Permissive fallback profile used when no family's indicators are present.
pub fn generic_profile() -> Option<FamilyProfile> {
    let group = group_pattern("describe|context|suite")?;
    let test = test_pattern("it|test|specify")?;
    Some(FamilyProfile {
        family: AuthoringFamily::Generic,
        indicators: &[],
        group_pattern: group,
        test_pattern: test,
        attributes: AttributePatterns {
            browsers: None,
            assertions: expect_assertion_pattern(),
            commands: None,
            timeout: timeout_pattern(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_compile() {
        let profiles = build_profiles();
        assert_eq!(profiles.len(), 5);
        assert!(generic_profile().is_some());
    }

    #[test]
    fn test_profile_priority_order() {
        let families: Vec<AuthoringFamily> =
            build_profiles().into_iter().map(|p| p.family).collect();
        assert_eq!(
            families,
            vec![
                AuthoringFamily::Playwright,
                AuthoringFamily::Cypress,
                AuthoringFamily::Jest,
                AuthoringFamily::Vitest,
                AuthoringFamily::Mocha,
            ]
        );
    }

    #[test]
    fn test_test_pattern_captures_modifier_and_title() {
        let profiles = build_profiles();
        let jest = &profiles[2];
        let caps = jest.test_pattern.captures("  it.skip('logs in', () => {})").unwrap();
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some("skip"));
        assert_eq!(caps.get(2).map(|m| m.as_str()), Some("logs in"));
    }

    #[test]
    fn test_test_pattern_handles_three_quote_kinds() {
        let profiles = build_profiles();
        let jest = &profiles[2];
        for line in [
            "it('single quoted', () => {})",
            "it(\"double quoted\", () => {})",
            "it(`backtick quoted`, () => {})",
        ] {
            assert!(jest.test_pattern.is_match(line), "no match for {line}");
        }
    }

    #[test]
    fn test_group_pattern_matches_playwright_describe() {
        let profiles = build_profiles();
        let playwright = &profiles[0];
        assert!(playwright.group_pattern.is_match("test.describe('Login', () => {"));
        assert!(playwright.group_pattern.is_match("test.describe.parallel('Login', () => {"));
    }
}
