//! On-disk representation of an environment file.
//!
//! A flat JSON object with sorted keys and 4-space indentation. The
//! reserved keys are mapped to fields; anything else is a variable.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::constants;
use crate::core::types::{EncryptedValue, EnvName, VarName};
use crate::error::{Result, StateError};

/// Raw contents of one environment file. Values are still encrypted.
#[derive(Debug, Deserialize)]
pub(super) struct Document {
    pub name: EnvName,
    pub signed_name: EncryptedValue,
    #[serde(rename = "SECRET_KEY")]
    pub secret: EncryptedValue,
    #[serde(rename = "cryto_family", default)]
    pub family: Option<String>,
    #[serde(rename = "crypto_algorithm", default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub variables: BTreeMap<VarName, EncryptedValue>,
}

impl Document {
    /// Read and validate an environment file.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidFormat` if the file cannot be read, is
    /// not a JSON object of strings, or lacks `name`, `signed_name` or
    /// `SECRET_KEY`.
    pub fn read(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading environment file");

        let invalid = |reason: String| StateError::InvalidFormat {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let document: Self =
            serde_json::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

        debug!(
            name = %document.name,
            variables = document.variables.len(),
            "environment file read"
        );

        Ok(document)
    }

    /// Whether any optional metadata field is absent.
    pub fn is_outdated(&self) -> bool {
        self.family.is_none() || self.algorithm.is_none() || self.version.is_none()
    }
}

/// Serializable view with every key at the top level.
#[derive(Serialize)]
#[serde(transparent)]
pub(super) struct Entries<'a>(pub BTreeMap<&'a str, &'a str>);

impl<'a> Entries<'a> {
    /// Render as pretty JSON (4-space indent, sorted keys).
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');

        String::from_utf8(buf).map_err(|e| crate::error::Error::Other(e.to_string()))
    }

    /// Write to `path` through a temporary file in the same directory.
    ///
    /// With `create`, an existing file at `path` is never replaced.
    ///
    /// # Errors
    ///
    /// Returns `StateError::AlreadyExists` if `create` is set and the file
    /// exists, and `StateError::FileWrite` on any other I/O failure.
    pub fn write(&self, path: &Path, create: bool) -> Result<()> {
        let contents = self.render()?;
        debug!(path = %path.display(), bytes = contents.len(), "writing environment file");

        let failed = |source: std::io::Error| StateError::FileWrite {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
        tmp.write_all(contents.as_bytes()).map_err(failed)?;
        tmp.as_file().sync_all().map_err(failed)?;
        if create {
            tmp.persist_noclobber(path).map_err(|e| match e.error.kind() {
                std::io::ErrorKind::AlreadyExists => StateError::AlreadyExists(path.to_path_buf()),
                _ => failed(e.error),
            })?;
        } else {
            tmp.persist(path).map_err(|e| failed(e.error))?;
        }

        Ok(())
    }
}

/// Whether `key` belongs to the reserved vocabulary.
pub(super) fn is_reserved(key: &str) -> bool {
    constants::RESERVED.contains(&key)
}
