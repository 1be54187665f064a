//! Configuration file support
//!
//! Loads decoration rules from ~/.linetint.toml (or %USERPROFILE%\.linetint.toml
//! on Windows), or from an explicit path.
//!
//! Example:
//! ```text
//! [styles.error]
//! color = "red"
//! bold = true
//! description = "Error message"
//!
//! [[configurations]]
//! paths = ["*.log"]
//!
//! [[configurations.rules]]
//! patterns = "ERROR: (.+)"
//! decorations = [{ groups = [1], color = "red" }]
//! match-case = false
//! exhaustive = false
//! lines = [1, [3, 5], { pattern = "^#" }]
//! ```
//!
//! Parsing is lenient: anything of the wrong shape is logged and skipped so the
//! rest of the file keeps working. Only unreadable files and TOML syntax errors
//! are reported as errors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::{Table, Value};
use tracing::{debug, warn};

use crate::decor::{Color, GroupId, Style, StyleRecord};
use crate::error::{Result, TintError};

/// Reference from a rule to a style record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleRef {
    /// Name looked up in the shared style table
    Named(String),
    /// Style declared in place
    Inline(StyleRecord),
}

/// Restricts which lines a rule scans (1-based, as written in configuration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSelector {
    /// A single line
    Line(usize),
    /// A closed range of lines
    Range(usize, usize),
    /// Every line whose text matches this pattern
    Pattern(String),
}

/// A single decoration rule
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rule {
    /// Patterns to match
    pub patterns: Vec<String>,
    /// Styles applied to the patterns' capture groups
    pub decorations: Vec<StyleRef>,
    /// Match case-sensitively
    pub match_case: bool,
    /// Re-scan each line repeatedly to find matches a single pass misses
    pub exhaustive: bool,
    /// Lines to scan; empty means the whole document
    pub lines: Vec<LineSelector>,
}

/// A set of rules and the document paths they apply to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    /// Glob patterns; a bare filename matches at any depth
    pub paths: Vec<String>,
    /// Rules, in evaluation order
    pub rules: Vec<Rule>,
}

/// Everything loaded from the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Configurations in file order
    pub configurations: Vec<Configuration>,
    /// Shared styles, referenced by name from rules
    pub styles: HashMap<String, StyleRecord>,
}

impl Settings {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".linetint.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".linetint.toml"))
        }
    }

    /// Load settings from an explicit file, or from the default location
    ///
    /// A missing default file yields empty settings; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(TintError::FileNotFound(path.display().to_string()));
                }
                Self::load_file(path)
            }
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings = Self::parse(&contents)?;
        debug!(
            path = %path.display(),
            configurations = settings.configurations.len(),
            styles = settings.styles.len(),
            "loaded configuration"
        );
        Ok(settings)
    }

    /// Parse configuration file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let root: Table = contents.parse()?;
        let mut settings = Settings::default();

        match root.get("styles") {
            Some(Value::Table(styles)) => {
                for (name, value) in styles {
                    match parse_style_record(value) {
                        Some(record) => {
                            settings.styles.insert(name.clone(), record);
                        }
                        None => warn!(style = %name, "skipping malformed shared style"),
                    }
                }
            }
            Some(_) => warn!("`styles` must be a table; ignoring it"),
            None => {}
        }

        match root.get("configurations") {
            Some(Value::Array(configurations)) => {
                settings.configurations = configurations
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, value)| {
                        let parsed = parse_configuration(value);
                        if parsed.is_none() {
                            warn!(configuration = idx, "skipping malformed configuration");
                        }
                        parsed
                    })
                    .collect();
            }
            Some(_) => warn!("`configurations` must be an array; ignoring it"),
            None => {}
        }

        Ok(settings)
    }
}

/// Accept either a single value or an array of values
fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn parse_configuration(value: &Value) -> Option<Configuration> {
    let table = value.as_table()?;

    let paths = match table.get("paths") {
        Some(Value::Array(paths)) => paths
            .iter()
            .filter_map(|path| {
                let path = path.as_str();
                if path.is_none() {
                    warn!("skipping non-string path entry");
                }
                path.map(str::to_string)
            })
            .collect(),
        Some(_) => {
            warn!("`paths` must be an array of strings");
            Vec::new()
        }
        None => Vec::new(),
    };

    let rules = match table.get("rules") {
        Some(Value::Array(rules)) => rules
            .iter()
            .enumerate()
            .filter_map(|(idx, rule)| {
                let parsed = parse_rule(rule);
                if parsed.is_none() {
                    warn!(rule = idx, "skipping malformed rule");
                }
                parsed
            })
            .collect(),
        _ => Vec::new(),
    };

    Some(Configuration { paths, rules })
}

fn parse_rule(value: &Value) -> Option<Rule> {
    let table = value.as_table()?;

    let patterns: Vec<String> = one_or_many(table.get("patterns")?)
        .into_iter()
        .filter_map(|pattern| {
            let pattern = pattern.as_str();
            if pattern.is_none() {
                warn!("skipping non-string pattern");
            }
            pattern.map(str::to_string)
        })
        .collect();

    let decorations: Vec<StyleRef> = one_or_many(table.get("decorations")?)
        .into_iter()
        .filter_map(|decoration| match decoration {
            Value::String(name) => Some(StyleRef::Named(name.clone())),
            Value::Table(_) => {
                let record = parse_style_record(decoration);
                if record.is_none() {
                    warn!("skipping malformed inline decoration");
                }
                record.map(StyleRef::Inline)
            }
            _ => {
                warn!("decorations must be style names or tables");
                None
            }
        })
        .collect();

    let lines: Vec<LineSelector> = table
        .get("lines")
        .map(|lines| {
            one_or_many(lines)
                .into_iter()
                .filter_map(|selector| {
                    let parsed = parse_line_selector(selector);
                    if parsed.is_none() {
                        warn!(selector = %selector, "skipping malformed line selector");
                    }
                    parsed
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Rule {
        patterns,
        decorations,
        match_case: flag(table, "match-case"),
        exhaustive: flag(table, "exhaustive"),
        lines,
    })
}

fn flag(table: &Table, key: &str) -> bool {
    match table.get(key) {
        Some(Value::Boolean(value)) => *value,
        Some(_) => {
            warn!(key, "expected a boolean; using false");
            false
        }
        None => false,
    }
}

fn parse_line_number(value: &Value) -> Option<usize> {
    value
        .as_integer()
        .filter(|n| *n >= 1)
        .and_then(|n| usize::try_from(n).ok())
}

fn parse_line_selector(value: &Value) -> Option<LineSelector> {
    match value {
        Value::Integer(_) => parse_line_number(value).map(LineSelector::Line),
        Value::Array(bounds) => match bounds.as_slice() {
            [start, end] => Some(LineSelector::Range(
                parse_line_number(start)?,
                parse_line_number(end)?,
            )),
            _ => None,
        },
        Value::Table(table) => table
            .get("pattern")
            .and_then(Value::as_str)
            .map(|pattern| LineSelector::Pattern(pattern.to_string())),
        _ => None,
    }
}

/// Style record as written in configuration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawStyle {
    #[serde(default)]
    groups: Vec<Value>,
    description: Option<String>,
    color: Option<String>,
    background_color: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underline: bool,
    #[serde(default)]
    reverse: bool,
}

fn parse_color(name: Option<&str>) -> Color {
    match name {
        Some(name) => Color::from_name(name).unwrap_or_else(|| {
            warn!(color = name, "unknown color; using default");
            Color::Default
        }),
        None => Color::Default,
    }
}

fn parse_style_record(value: &Value) -> Option<StyleRecord> {
    let raw: RawStyle = match value.clone().try_into() {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "invalid style record");
            return None;
        }
    };

    let groups = raw
        .groups
        .into_iter()
        .filter_map(|group| {
            let parsed: Option<GroupId> = group.clone().try_into().ok();
            if parsed.is_none() {
                warn!(group = %group, "skipping invalid capture group");
            }
            parsed
        })
        .collect();

    let mut style = Style::fg(parse_color(raw.color.as_deref())).with_bg(parse_color(raw.background_color.as_deref()));
    if raw.bold {
        style = style.with_bold();
    }
    if raw.italic {
        style = style.with_italic();
    }
    if raw.underline {
        style = style.with_underline();
    }
    if raw.reverse {
        style = style.with_reverse();
    }

    Some(StyleRecord {
        groups,
        description: raw.description,
        style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_config() {
        let contents = r##"
[styles.error]
color = "red"
bold = true
description = "An error"

[[configurations]]
paths = ["*.log", "src/app.txt"]

[[configurations.rules]]
patterns = "ERROR: (.+)"
decorations = [{ groups = [1, "level"], color = "#ff0000" }, "error"]
match-case = true
exhaustive = true
lines = [1, [3, 5], { pattern = "^#" }]
        "##;

        let settings = Settings::parse(contents).unwrap();

        let error = &settings.styles["error"];
        assert_eq!(error.style, Style::fg(Color::Red).with_bold());
        assert_eq!(error.description.as_deref(), Some("An error"));

        assert_eq!(settings.configurations.len(), 1);
        let configuration = &settings.configurations[0];
        assert_eq!(configuration.paths, vec!["*.log", "src/app.txt"]);

        let rule = &configuration.rules[0];
        assert_eq!(rule.patterns, vec!["ERROR: (.+)"]);
        assert!(rule.match_case);
        assert!(rule.exhaustive);
        assert_eq!(
            rule.lines,
            vec![
                LineSelector::Line(1),
                LineSelector::Range(3, 5),
                LineSelector::Pattern("^#".to_string()),
            ]
        );
        assert_eq!(
            rule.decorations,
            vec![
                StyleRef::Inline(StyleRecord {
                    groups: vec![GroupId::Index(1), GroupId::from("level")],
                    description: None,
                    style: Style::fg(Color::Rgb(255, 0, 0)),
                }),
                StyleRef::Named("error".to_string()),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let contents = r#"
[[configurations]]
paths = ["notes.txt"]
rules = [{ patterns = ["a", "b"], decorations = "plain" }]
        "#;

        let settings = Settings::parse(contents).unwrap();
        let rule = &settings.configurations[0].rules[0];
        assert_eq!(rule.patterns, vec!["a", "b"]);
        assert!(!rule.match_case);
        assert!(!rule.exhaustive);
        assert!(rule.lines.is_empty());
        assert!(settings.styles.is_empty());
    }

    #[test]
    fn test_text_attributes() {
        let contents = r##"
[styles.loud]
background-color = "#102030"
italic = true
underline = true
reverse = true
        "##;

        let settings = Settings::parse(contents).unwrap();
        let expected = Style::fg(Color::Default)
            .with_bg(Color::Rgb(0x10, 0x20, 0x30))
            .with_italic()
            .with_underline()
            .with_reverse();
        assert_eq!(settings.styles["loud"].style, expected);
        assert!(!settings.styles["loud"].style.bold);
    }

    #[test_log::test]
    fn test_malformed_entries_are_skipped() {
        let contents = r#"
styles = { broken = 3, ok = { color = "blue" } }

[[configurations]]
paths = ["*.txt", 7]
rules = [
    { patterns = 5, decorations = "ok" },
    { decorations = "ok" },
    { patterns = "x" },
    { patterns = ["good", 1], decorations = ["ok", 2, { bold = "yes" }], exhaustive = "no", lines = [0, [2], "x", 4] },
    "not a rule",
]

[[configurations]]
paths = "not-an-array"
        "#;

        let settings = Settings::parse(contents).unwrap();
        assert_eq!(settings.styles.len(), 1);
        assert!(settings.styles.contains_key("ok"));

        assert_eq!(settings.configurations.len(), 2);
        let configuration = &settings.configurations[0];
        assert_eq!(configuration.paths, vec!["*.txt"]);

        // The non-string pattern leaves an empty but well-formed rule behind.
        assert_eq!(configuration.rules.len(), 2);
        assert!(configuration.rules[0].patterns.is_empty());

        let rule = &configuration.rules[1];
        assert_eq!(rule.patterns, vec!["good"]);
        assert_eq!(rule.decorations, vec![StyleRef::Named("ok".to_string())]);
        assert!(!rule.exhaustive);
        assert_eq!(rule.lines, vec![LineSelector::Line(4)]);

        assert!(settings.configurations[1].paths.is_empty());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = Settings::parse("[[configurations]\npaths = ").unwrap_err();
        assert!(matches!(err, TintError::Toml(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tint.toml");
        fs::write(
            &path,
            "[[configurations]]\npaths = [\"*.md\"]\nrules = [{ patterns = \"TODO\", decorations = [{ color = \"yellow\" }] }]\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.configurations[0].paths, vec!["*.md"]);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(TintError::FileNotFound(_))
        ));
    }
}
