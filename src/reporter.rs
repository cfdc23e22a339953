//! Diagnostics rendering and escalation
//!
//! A non-empty diagnostics batch is the one condition that surfaces to
//! callers. `escalate` renders the batch into a line-per-diagnostic
//! report, logs it, and hands back a typed error for the caller to
//! propagate.

use crate::backend::Diagnostic;
use crate::error::ScriptcError;

/// Name prefixed to every reported diagnostic line
pub const SERVICE_NAME: &str = "ScriptCompileService";

/// Render one line per diagnostic, in input order, joined with newlines.
///
/// Positions are converted from the backend's zero-based coordinates to
/// the one-based form people read. A diagnostic without both a file and a
/// position renders in the bare form.
pub fn render(diagnostics: &[Diagnostic]) -> String {
    let lines: Vec<String> = diagnostics
        .iter()
        .map(|diagnostic| {
            let message = flatten(&diagnostic.message);
            match (&diagnostic.file, diagnostic.position) {
                (Some(file), Some(position)) => format!(
                    "{SERVICE_NAME}: Error {} ({},{}): {message}",
                    file.display(),
                    position.line + 1,
                    position.character + 1,
                ),
                _ => format!("{SERVICE_NAME} Error: {message}"),
            }
        })
        .collect();
    lines.join("\n")
}

/// Log the rendered report and convert it into the terminal error that
/// aborts the invoking call.
pub fn escalate(diagnostics: &[Diagnostic]) -> ScriptcError {
    let report = render(diagnostics);
    log::error!("script errors:\n{report}");
    ScriptcError::Diagnostics { report }
}

fn flatten(message: &str) -> String {
    let mut parts = message.lines().map(str::trim).filter(|line| !line.is_empty());
    let mut flat = parts.next().unwrap_or_default().to_string();
    for part in parts {
        flat.push(' ');
        flat.push_str(part);
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positioned_diagnostic_renders_one_based() {
        let report = render(&[Diagnostic::at("a.ts", 2, 5, "unexpected token")]);
        assert_eq!(
            report,
            "ScriptCompileService: Error a.ts (3,6): unexpected token"
        );
    }

    #[test]
    fn global_diagnostic_renders_bare_form() {
        let report = render(&[Diagnostic::global("bad compiler option")]);
        assert_eq!(report, "ScriptCompileService Error: bad compiler option");
    }

    #[test]
    fn lines_join_in_input_order() {
        let report = render(&[
            Diagnostic::at("a.ts", 0, 0, "first"),
            Diagnostic::global("second"),
        ]);
        assert_eq!(
            report,
            "ScriptCompileService: Error a.ts (1,1): first\nScriptCompileService Error: second"
        );
    }

    #[test]
    fn multiline_messages_flatten_to_one_line() {
        let report = render(&[Diagnostic::global("outer problem\n  nested cause\n")]);
        assert_eq!(
            report,
            "ScriptCompileService Error: outer problem nested cause"
        );
    }

    #[test]
    fn escalate_wraps_the_report() {
        let err = escalate(&[Diagnostic::at("a.ts", 1, 2, "broken")]);
        match err {
            ScriptcError::Diagnostics { report } => {
                assert!(report.contains("Error a.ts (2,3): broken"));
            }
            other => panic!("expected diagnostics error, got {other:?}"),
        }
    }
}
