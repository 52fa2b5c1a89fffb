//! INI-style keyfile parser
//!
//! Reads the `[section]` / `key=value` format shared by the bglock
//! configuration file and dconf's `local.d` keyfiles.

use std::collections::HashMap;
use std::path::Path;

/// Keys of one section mapped to their raw values. Later duplicates win.
pub type ParsedSection = HashMap<String, String>;

/// A parsed keyfile is a map of section names (without brackets) to their contents
pub type ParsedFile = HashMap<String, ParsedSection>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Section '{0}' appears more than once")]
    DuplicateSection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {0} is not a section header or key=value pair: {1}")]
    Malformed(usize, String),
}

/// Parse a keyfile from a string
pub fn parse_file(content: &str) -> Result<ParsedFile, ParseError> {
    let mut sections = ParsedFile::new();
    let mut current: Option<(String, ParsedSection)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some((done_name, done)) = current.take() {
                insert_section(&mut sections, done_name, done)?;
            }
            current = Some((name.trim().to_string(), ParsedSection::new()));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ParseError::Malformed(index + 1, line.to_string()));
        };

        // Lines before the first section are ignored, as in dconf
        let Some((_, entries)) = current.as_mut() else {
            continue;
        };
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }

    if let Some((name, entries)) = current {
        insert_section(&mut sections, name, entries)?;
    }

    Ok(sections)
}

fn insert_section(
    sections: &mut ParsedFile,
    name: String,
    entries: ParsedSection,
) -> Result<(), ParseError> {
    if sections.contains_key(&name) {
        return Err(ParseError::DuplicateSection(name));
    }
    sections.insert(name, entries);
    Ok(())
}

/// Parse a keyfile from disk
pub fn parse_keyfile(path: &Path) -> Result<ParsedFile, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_file(&content)
}

/// Strip one level of GVariant string quoting (`'value'` or `"value"`)
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Undo backslash escapes inside a GVariant string body
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0c}'),
            Some('v') => out.push('\u{0b}'),
            Some('b') => out.push('\u{08}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(next) => out.push(next),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dconf_keyfile() {
        let content = r#"
[org/cinnamon/desktop/background]
picture-uri='file:///usr/share/backgrounds/pic.png'
picture-options='zoom'
"#;
        let parsed = parse_file(content).unwrap();
        let section = &parsed["org/cinnamon/desktop/background"];
        assert_eq!(
            section["picture-uri"],
            "'file:///usr/share/backgrounds/pic.png'"
        );
        assert_eq!(unquote(&section["picture-options"]), "zoom");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let content = "# header\n\n[paths]\n; note\nprofile = /etc/dconf/profile/user\n";
        let parsed = parse_file(content).unwrap();
        assert_eq!(parsed["paths"]["profile"], "/etc/dconf/profile/user");
    }

    #[test]
    fn test_keys_before_first_section_ignored() {
        let parsed = parse_file("stray=1\n[reload]\ncommand=true\n").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["reload"]["command"], "true");
    }

    #[test]
    fn test_duplicate_section() {
        let err = parse_file("[paths]\n[paths]\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSection(name) if name == "paths"));
    }

    #[test]
    fn test_malformed_line() {
        let err = parse_file("[paths]\nnot a pair\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(2, _)));
    }

    #[test]
    fn test_later_duplicate_key_wins() {
        let parsed = parse_file("[dconf]\nschema=a\nschema=b\n").unwrap();
        assert_eq!(parsed["dconf"]["schema"], "b");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let parsed = parse_file("[reload]\ncommand=env FOO=bar dconf update\n").unwrap();
        assert_eq!(parsed["reload"]["command"], "env FOO=bar dconf update");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'zoom'"), "zoom");
        assert_eq!(unquote("\"zoom\""), "zoom");
        assert_eq!(unquote("zoom"), "zoom");
        assert_eq!(unquote("'unterminated"), "'unterminated");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"a\\b"), r"a\b");
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape(r"a\n[x]\tb"), "a\n[x]\tb");
        assert_eq!(unescape(r"esc\u001b."), "esc\u{1b}.");
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_file("").unwrap().is_empty());
    }
}
