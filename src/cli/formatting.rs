//! Console display helpers shared by the CLI commands.

/// Width of the rule drawn around report previews.
const RULE_WIDTH: usize = 40;

/// Horizontal rule used around previews.
pub(crate) fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

/// Formats an error and its sources, one `Caused by:` line per source.
pub(crate) fn format_error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(&format!("\n  Caused by: {cause}"));
        source = cause.source();
    }
    out
}

/// Splits an editor command string into the executable and its arguments.
///
/// Handles editors specified with arguments, e.g. `"code --wait"` becomes
/// `("code", vec!["--wait"])`.
pub(crate) fn parse_editor_command(editor: &str) -> (&str, Vec<&str>) {
    let mut parts = editor.split_whitespace();
    let cmd = parts.next().unwrap_or(editor);
    let args: Vec<&str> = parts.collect();
    (cmd, args)
}
