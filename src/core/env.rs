//! Plain dotenv documents.
//!
//! Used to export an unlocked environment for tools that expect `KEY=value`
//! files, and to import such files into an environment.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, StateError};

/// An ordered list of `KEY=value` pairs tied to a path.
#[derive(Clone)]
pub struct Env {
    entries: Vec<(String, String)>,
    path: PathBuf,
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.keys().collect();
        f.debug_struct("Env")
            .field("path", &self.path)
            .field("keys", &keys)
            .finish()
    }
}

impl Env {
    /// Parse a dotenv file.
    ///
    /// Blank lines and `#` comments are skipped, as is a leading `export`.
    /// Lines without `=` are logged and ignored. A later duplicate key
    /// replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let entries = parse(&contents, path);

        debug!(path = %path.display(), entries = entries.len(), "dotenv loaded");
        Ok(Self {
            entries,
            path: path.to_path_buf(),
        })
    }

    pub fn from_pairs(entries: Vec<(String, String)>, path: PathBuf) -> Self {
        Self { entries, path }
    }

    /// Write the document, readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns `StateError::FileWrite` on any I/O failure.
    pub fn save(&self) -> Result<()> {
        let failed = |source: std::io::Error| StateError::FileWrite {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        // NamedTempFile is created 0600 on unix; persist keeps the mode.
        let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
        tmp.write_all(self.to_string().as_bytes()).map_err(failed)?;
        tmp.as_file().sync_all().map_err(failed)?;
        tmp.persist(&self.path).map_err(|e| failed(e.error))?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "dotenv written");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            if is_bare(value) {
                writeln!(f, "{}={}", key, value)?;
            } else {
                writeln!(f, "{}=\"{}\"", key, quote(value))?;
            }
        }
        Ok(())
    }
}

fn parse(contents: &str, path: &Path) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, raw)) = line.split_once('=') else {
            warn!(path = %path.display(), line = number + 1, "ignoring line without '='");
            continue;
        };

        let key = key.trim().to_string();
        let value = unquote(raw.trim());
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => entries.push((key, value)),
        }
    }

    entries
}

fn unquote(raw: &str) -> String {
    if let Some(body) = quoted(raw, '"') {
        return unescape(body);
    }
    if let Some(body) = quoted(raw, '\'') {
        return body.to_string();
    }

    // Unquoted values may carry a trailing comment.
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

fn quoted(raw: &str, quote: char) -> Option<&str> {
    raw.strip_prefix(quote)?.strip_suffix(quote)
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('"' | '\\' | '$')) => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }

    out
}

fn is_bare(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:@,+%".contains(c))
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
