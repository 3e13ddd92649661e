//! Dry-Run Printer (§4.9): shell-safe rendering of the assembled command.

const SAFE_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_./:=-";

/// Quote `arg` for safe inclusion in a POSIX shell command line if it
/// contains any character outside the safe set; otherwise return it as-is.
pub fn quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(|c| SAFE_CHARS.contains(c)) {
        return arg.to_string();
    }
    let escaped = arg.replace('\'', r#"'"'"'"#);
    format!("'{}'", escaped)
}

/// Render the full command (bwrap args plus `--` plus user argv) as a
/// multi-line, shell-valid invocation with a trailing continuation
/// backslash on every line but the last.
pub fn render(bwrap_path: &str, bwrap_args: &[String], user_argv: &[String]) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(bwrap_args.len() + user_argv.len() + 2);
    tokens.push(quote(bwrap_path));
    tokens.extend(bwrap_args.iter().map(|a| quote(a)));
    tokens.push("--".to_string());
    tokens.extend(user_argv.iter().map(|a| quote(a)));

    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if i + 1 < tokens.len() {
                format!("{} \\", t)
            } else {
                t.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
