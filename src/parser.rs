//! Parser for walk configuration files.
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`]. Each
//! non-comment line is one directive overriding a field of
//! [`WalkConfig::default`].

use crate::config::WalkConfig;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;
use std::time::Duration;

/// Parse a walk configuration from a string slice.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # …`)
/// are stripped while preserving `#` characters inside quoted strings, so
/// `marker "#"` works as expected.
///
/// # Errors
///
/// Returns an error if any line contains an unknown directive, a malformed
/// argument, or an unclosed quoted string.
///
/// # Example
///
/// ```
/// use paintkeys::parse_str;
///
/// let config = parse_str("marker \"@\"\ndelay 100ms\n").unwrap();
/// assert_eq!(config.marker, "@");
/// ```
pub fn parse_str(content: &str) -> Result<WalkConfig> {
    let mut config = WalkConfig::default();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        apply_line(&mut config, line)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
    }
    Ok(config)
}

/// Parse a walk configuration from a file.
///
/// Reads the entire file into memory and delegates to [`parse_str`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the configuration is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<WalkConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_str(&content)
}

type ApplyFn = fn(&mut WalkConfig, &str) -> Result<()>;

static REGISTRY: &[(&str, ApplyFn)] = &[
    ("app", apply_app),
    ("rename", apply_rename),
    ("copy", apply_copy),
    ("cancel", apply_cancel),
    ("merge", apply_merge),
    ("down", apply_down),
    ("marker", apply_marker),
    ("bottom", apply_bottom),
    ("delay", apply_delay),
    ("focus", apply_focus),
    ("limit", apply_limit),
];

fn apply_app(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.app_name = parse_quoted_string(args)?;
    Ok(())
}

fn apply_rename(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.rename = args.parse()?;
    Ok(())
}

fn apply_copy(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.copy = args.parse()?;
    Ok(())
}

fn apply_cancel(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.cancel = args.parse()?;
    Ok(())
}

fn apply_merge(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.merge = args.parse()?;
    Ok(())
}

fn apply_down(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.down = args.parse()?;
    Ok(())
}

fn apply_marker(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.marker = parse_quoted_string(args)?;
    Ok(())
}

fn apply_bottom(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.bottom = parse_quoted_string(args)?;
    Ok(())
}

fn apply_delay(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.settle_delay = parse_duration(args)?;
    Ok(())
}

fn apply_focus(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.focus_delay = parse_duration(args)?;
    Ok(())
}

fn apply_limit(config: &mut WalkConfig, args: &str) -> Result<()> {
    config.limit = Some(parse_limit(args)?);
    Ok(())
}

/// Dispatch a single non-empty, non-comment line to the matching directive.
fn apply_line(config: &mut WalkConfig, line: &str) -> Result<()> {
    let (name, args) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    REGISTRY
        .iter()
        .find(|(directive, _)| *directive == name)
        .map(|(_, apply)| apply(config, args))
        .unwrap_or_else(|| Err(anyhow!("Unknown directive: {}", line)))
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a layer limit: a positive integer.
pub fn parse_limit(s: &str) -> Result<usize> {
    let limit: usize = s.trim().parse().context("Invalid layer limit")?;
    if limit == 0 {
        return Err(anyhow!("Layer limit must be at least 1"));
    }
    Ok(limit)
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Seconds value out of range")
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}

/// Parse a double-quoted string, processing `\n`, `\t`, `\"`, and `\\`.
pub(crate) fn parse_quoted_string(s: &str) -> Result<String> {
    let s = s.trim();
    if !s.starts_with('"') {
        return Err(anyhow!("Expected string to start with '\"'"));
    }
    if s.len() < 2 || !s.ends_with('"') {
        return Err(anyhow!("Expected string to end with '\"'"));
    }
    let mut out = String::with_capacity(s.len() - 2);
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}
