//! Active environment resolution.
//!
//! Scans a directory for environment files, tries the caller's key on
//! each, keeps every file (unlocked or locked) for inventory, and picks
//! the one the key opens as the active environment.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::constants;
use crate::core::encrypter::Encrypter;
use crate::core::state::State;
use crate::error::{ConfigError, ResolveError, Result};

/// Where to look and how strict to be.
#[derive(Debug, Clone)]
pub struct StateListOptions {
    /// Directory holding the environment files.
    pub directory: PathBuf,
    /// Glob for the file stem; the `.env` extension is appended.
    pub pattern: String,
    /// Environment variable consulted when no key is passed.
    pub key_var: String,
    /// Fail with `EnvKeyNotFound` instead of resolving to nothing.
    pub require_key: bool,
    /// Fail when no environment can be made active.
    pub require_active: bool,
    /// Fail when the key opens more than one environment.
    pub reject_ambiguous: bool,
}

impl Default for StateListOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            pattern: constants::DEFAULT_PATTERN.to_string(),
            key_var: constants::KEY_VAR.to_string(),
            require_key: false,
            require_active: false,
            reject_ambiguous: false,
        }
    }
}

/// A variable that some unlocked environments lack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariable {
    /// Variable name.
    pub name: String,
    /// Environments that do not define it.
    pub states: Vec<String>,
}

impl std::fmt::Display for MissingVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "variable {} missing in {}",
            self.name,
            self.states.join(", ")
        )
    }
}

/// Every candidate environment plus the active one.
#[derive(Default)]
pub struct StateList {
    key: Option<Zeroizing<String>>,
    states: Vec<State>,
    active: Option<usize>,
    matched: Vec<usize>,
}

impl std::fmt::Debug for StateList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateList")
            .field("has_key", &self.key.is_some())
            .field("states", &self.states)
            .field("active", &self.active)
            .finish()
    }
}

impl StateList {
    /// Resolve with an explicit key, falling back to the key variable.
    ///
    /// # Errors
    ///
    /// - `ResolveError::EnvKeyNotFound` if no key is available and
    ///   `require_key` is set
    /// - `CipherError::InvalidKey` if the key is malformed
    /// - `ResolveError::NoEnvironments` / `DeploymentLevelNotFound` if
    ///   nothing can be made active and `require_active` is set
    /// - `ResolveError::Ambiguous` if `reject_ambiguous` is set and the
    ///   key opens several files
    /// - `StateError::InvalidFormat` for a malformed candidate file
    pub fn new(key: Option<&str>, options: &StateListOptions) -> Result<Self> {
        let key = match key {
            Some(k) => Some(Zeroizing::new(k.to_string())),
            None => read_key(&options.key_var),
        };

        let Some(key) = key else {
            if options.require_key {
                return Err(ResolveError::EnvKeyNotFound(options.key_var.clone()).into());
            }
            warn!(
                var = %options.key_var,
                "no key supplied; continuing without an active environment"
            );
            return Ok(Self::default());
        };

        // Reject malformed keys before touching any file.
        Encrypter::new(&key)?;

        let mut list = Self {
            key: Some(key),
            ..Self::default()
        };
        list.read_list(options)?;

        if list.matched.len() > 1 {
            let names = list.matched_names();
            if options.reject_ambiguous {
                return Err(ResolveError::Ambiguous(names).into());
            }
            warn!(
                environments = %names.join(", "),
                chosen = list.get().map(State::name).unwrap_or_default(),
                "key opens several environments; the last one wins"
            );
        }

        if list.active.is_none() && options.require_active {
            if list.states.is_empty() {
                return Err(ResolveError::NoEnvironments(glob_pattern(options)).into());
            }
            return Err(ResolveError::DeploymentLevelNotFound.into());
        }

        Ok(list)
    }

    /// Scan the directory and (re)build the list.
    ///
    /// Files are visited in sorted path order; the last file the key opens
    /// becomes active.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidFormat` if any candidate is malformed.
    pub fn read_list(&mut self, options: &StateListOptions) -> Result<()> {
        self.states.clear();
        self.matched.clear();
        self.active = None;

        let Some(key) = self.key.as_ref() else {
            return Ok(());
        };

        for (index, path) in candidates(options)?.into_iter().enumerate() {
            let state = match State::load(&path, Encrypter::new(key)?) {
                Ok(state) => {
                    debug!(path = %path.display(), "key opens environment");
                    self.matched.push(index);
                    self.active = Some(index);
                    state
                }
                Err(e) if e.is_invalid_key() => State::load_locked(&path)?,
                Err(e) => return Err(e),
            };
            self.states.push(state);
        }

        debug!(
            candidates = self.states.len(),
            active = self.get().map(State::name).unwrap_or("none"),
            "environments resolved"
        );
        Ok(())
    }

    /// The active environment, if any.
    pub fn get(&self) -> Option<&State> {
        self.active.map(|i| &self.states[i])
    }

    /// The active environment, mutably.
    pub fn get_mut(&mut self) -> Option<&mut State> {
        match self.active {
            Some(i) => self.states.get_mut(i),
            None => None,
        }
    }

    /// Take the active environment out of the list.
    pub fn into_active(mut self) -> Option<State> {
        self.active.map(|i| self.states.swap_remove(i))
    }

    /// Name of the active environment.
    pub fn name(&self) -> Option<&str> {
        self.get().map(State::name)
    }

    /// Index of the active environment in [`StateList::states`].
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Every candidate, unlocked or locked, in scan order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Names of every environment the key opened.
    pub fn matched_names(&self) -> Vec<String> {
        self.matched
            .iter()
            .map(|&i| self.states[i].name().to_string())
            .collect()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no candidate was found.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Report variables that are not defined in every unlocked environment.
    ///
    /// Locked environments are left out entirely: their contents cannot be
    /// checked. One warning is logged per report.
    ///
    /// # Errors
    ///
    /// With `raise_on_warning`, returns `ResolveError::VariableMissing`
    /// naming every drifting variable once all warnings are logged.
    pub fn check_variables(&self, raise_on_warning: bool) -> Result<Vec<MissingVariable>> {
        let unlocked: Vec<&State> = self.states.iter().filter(|s| s.is_decrypted()).collect();

        let union: BTreeSet<&str> = unlocked.iter().flat_map(|s| s.names()).collect();

        let report: Vec<MissingVariable> = union
            .into_iter()
            .filter_map(|name| {
                let states: Vec<String> = unlocked
                    .iter()
                    .filter(|s| !s.has_variable(name))
                    .map(|s| s.name().to_string())
                    .collect();
                (!states.is_empty()).then(|| MissingVariable {
                    name: name.to_string(),
                    states,
                })
            })
            .collect();

        for missing in &report {
            warn!(variable = %missing.name, states = ?missing.states, "variable missing");
        }

        if raise_on_warning && !report.is_empty() {
            let names = report.iter().map(|m| m.name.clone()).collect();
            return Err(ResolveError::VariableMissing(names).into());
        }

        Ok(report)
    }
}

fn read_key(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(Zeroizing::new)
}

/// The directory is matched literally; only `pattern` is a glob.
fn glob_pattern(options: &StateListOptions) -> String {
    let dir = glob::Pattern::escape(&options.directory.to_string_lossy());
    Path::new(&dir)
        .join(format!("{}.{}", options.pattern, constants::FILE_EXTENSION))
        .to_string_lossy()
        .into_owned()
}

/// Candidate files, sorted. Dot-files never match.
fn candidates(options: &StateListOptions) -> Result<Vec<PathBuf>> {
    let pattern = glob_pattern(options);
    let match_options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };

    let mut paths: Vec<PathBuf> = glob::glob_with(&pattern, match_options)
        .map_err(|e| ConfigError::InvalidValue {
            field: "pattern",
            reason: format!("{}: {}", pattern, e),
        })?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() && is_environment_file(&path) => Some(path),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "skipping unreadable path");
                None
            }
        })
        .collect();
    paths.sort();

    debug!(pattern = %pattern, found = paths.len(), "scanned for environments");
    Ok(paths)
}

/// True if `path` looks like an environment file.
pub fn is_environment_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(constants::FILE_EXTENSION)
        && !path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn options(dir: &TempDir) -> StateListOptions {
        StateListOptions {
            directory: dir.path().to_path_buf(),
            ..StateListOptions::default()
        }
    }

    #[test]
    fn test_is_environment_file() {
        assert!(is_environment_file(Path::new("dev.env")));
        assert!(!is_environment_file(Path::new(".env")));
        assert!(!is_environment_file(Path::new("dev.json")));
    }

    #[test]
    fn test_dotenv_is_not_a_candidate() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".env"), "FOO=bar\n").unwrap();
        let (_, key) = State::create(tmp.path(), "dev").unwrap();

        let list = StateList::new(Some(key.as_str()), &options(&tmp)).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.name(), Some("dev"));
    }

    #[test]
    fn test_missing_key_lenient_and_strict() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.key_var = "ENVCRYPT_TEST_UNSET_KEY_VAR".to_string();

        let list = StateList::new(None, &opts).unwrap();
        assert!(list.get().is_none());
        assert!(list.is_empty());

        opts.require_key = true;
        let err = StateList::new(None, &opts).unwrap_err();
        assert!(matches!(err, Error::Resolve(ResolveError::EnvKeyNotFound(_))));
    }

    #[test]
    fn test_no_environments_strict() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.require_active = true;

        let key = Encrypter::generate_key();
        let err = StateList::new(Some(key.as_str()), &opts).unwrap_err();
        assert!(matches!(err, Error::Resolve(ResolveError::NoEnvironments(_))));
    }

    #[test]
    fn test_directory_with_glob_characters() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("proj[1]");
        std::fs::create_dir(&dir).unwrap();
        let (_, key) = State::create(&dir, "staging").unwrap();

        let opts = StateListOptions {
            directory: dir,
            ..StateListOptions::default()
        };
        let list = StateList::new(Some(key.as_str()), &opts).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.name(), Some("staging"));
    }

    #[test]
    fn test_check_matches_stored_names_exactly() {
        let tmp = TempDir::new().unwrap();
        let key = Encrypter::generate_key();
        let encrypter = Encrypter::new(key.as_str()).unwrap();

        // Both files unlock under one key and hold a hand-edited lower-case name.
        for name in ["a", "b"] {
            let (state, _) = State::create(tmp.path(), name).unwrap();
            let path = state.path().to_path_buf();

            let raw = std::fs::read_to_string(&path).unwrap();
            let mut json: serde_json::Value = serde_json::from_str(&raw).unwrap();
            let object = json.as_object_mut().unwrap();
            object.insert("signed_name".into(), encrypter.encrypt(name).unwrap().into());
            object.insert("SECRET_KEY".into(), encrypter.encrypt("s").unwrap().into());
            object.insert("foo".into(), encrypter.encrypt("1").unwrap().into());
            std::fs::write(&path, json.to_string()).unwrap();
        }

        let list = StateList::new(Some(key.as_str()), &options(&tmp)).unwrap();
        assert!(list.states().iter().all(State::is_decrypted));
        assert!(list.check_variables(true).unwrap().is_empty());
    }

    #[test]
    fn test_pattern_filters_candidates() {
        let tmp = TempDir::new().unwrap();
        let (_, key) = State::create(tmp.path(), "prod-eu").unwrap();
        State::create(tmp.path(), "dev").unwrap();

        let mut opts = options(&tmp);
        opts.pattern = "prod-*".to_string();

        let list = StateList::new(Some(key.as_str()), &opts).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.name(), Some("prod-eu"));
    }
}
