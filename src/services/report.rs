//! Operator-facing rendering of a [`RunSummary`].

use crate::models::RunSummary;

/// Report lines in the order they are printed.
///
/// The two `[DONE]` lines are always present; the `[INFO]` lines only when
/// there is something to report.
#[must_use]
pub fn report_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        format!("[DONE] Styled {} representation items.", summary.assigned_items),
        format!("[DONE] Styled {} representation objects.", summary.assigned_objects),
    ];
    if summary.no_body > 0 {
        lines.push(format!(
            "[INFO] {} products had no Body representation or items.",
            summary.no_body
        ));
    }
    if !summary.no_color.is_empty() {
        let names: Vec<String> = summary.no_color.iter().map(|name| quote(name)).collect();
        lines.push(format!(
            "[INFO] Missing Excel colors for System Types: [{}]",
            names.join(", ")
        ));
    }
    lines
}

/// Full text report, one line per entry.
#[must_use]
pub fn render_text(summary: &RunSummary) -> String {
    let mut text = report_lines(summary).join("\n");
    text.push('\n');
    text
}

/// Single-quoted literal; embedded quotes and backslashes are escaped.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
