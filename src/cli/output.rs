//! Table rendering for human-readable command output.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};

use crate::domain::models::{Correlation, FailurePattern, SourceDeclaration};

/// Declarations found by `scan`.
pub fn format_declarations_table(declarations: &[SourceDeclaration]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Title", "Group", "File", "Line", "Family", "Modifiers"]);
    for declaration in declarations {
        let mut modifiers: Vec<&str> = declaration.modifiers.iter().map(|m| m.as_str()).collect();
        modifiers.sort_unstable();
        table.add_row(vec![
            Cell::new(&declaration.title),
            Cell::new(declaration.group.as_deref().unwrap_or("-")),
            Cell::new(&declaration.file_path),
            Cell::new(declaration.line),
            Cell::new(declaration.family),
            Cell::new(modifiers.join(",")),
        ]);
    }
    table
}

/// Correlation outcomes from `correlate`.
pub fn format_correlations_table(correlations: &[Correlation]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Title", "Status", "Strategy", "Confidence", "Identity"]);
    for correlation in correlations {
        table.add_row(vec![
            Cell::new(&correlation.result.title),
            Cell::new(correlation.result.status.as_str()),
            Cell::new(correlation.strategy),
            Cell::new(format!("{:.2}", correlation.confidence)),
            Cell::new(
                correlation
                    .identity
                    .as_ref()
                    .map(|i| short_id(&i.id))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table
}

/// One classified failure pattern.
pub fn format_pattern_table(pattern: &FailurePattern) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Identity", "Pattern", "Failures", "Consistency", "Span", "Significance"]);
    table.add_row(vec![
        Cell::new(short_id(&pattern.identity_id)),
        Cell::new(pattern.kind),
        Cell::new(pattern.frequency),
        Cell::new(format!("{:.2}", pattern.consistency)),
        Cell::new(format!("{}h", pattern.span().num_hours())),
        Cell::new(format!("{:.1}", pattern.significance)),
    ]);
    table
}

/// Identifiers are 64-hex-char hashes; the first 12 characters are plenty for
/// display.
pub fn short_id(id: &str) -> String {
    id.chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AuthoringFamily;

    #[test]
    fn test_short_id_truncates() {
        assert_eq!(short_id("abcdef0123456789deadbeef"), "abcdef012345");
        assert_eq!(short_id("short"), "short");
    }

    #[test]
    fn test_declarations_table_renders() {
        let declarations = vec![SourceDeclaration::new(
            AuthoringFamily::Jest,
            "adds",
            "math.test.ts",
            3,
        )];
        let rendered = format_declarations_table(&declarations).to_string();
        assert!(rendered.contains("adds"));
        assert!(rendered.contains("math.test.ts"));
    }
}
