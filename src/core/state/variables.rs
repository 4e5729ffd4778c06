//! Variable operations.
//!
//! Reading and mutating the user variables of a [`State`]. Mutations only
//! touch memory; call [`State::save`] to persist them.

use tracing::debug;

use super::{file, Access, State};
use crate::core::constants;
use crate::core::types::VarName;
use crate::core::validation;
use crate::error::{Result, StateError};

impl State {
    /// Add a variable.
    ///
    /// The name is upper-cased first.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an invalid name,
    /// `StateError::Reserved` for a reserved one,
    /// `StateError::VariableExists` if present and `force` is false, and
    /// `StateError::InvalidKey` if the state is locked.
    pub fn add(&mut self, name: &str, value: &str, force: bool) -> Result<()> {
        let key = validation::normalize_name(name)?;
        if file::is_reserved(&key) {
            return Err(StateError::Reserved(key).into());
        }

        let variables = &mut self.unlocked_mut()?.variables;
        if !force && variables.contains_key(&key) {
            return Err(StateError::VariableExists(key).into());
        }

        debug!(variable = %key, force, "setting variable");
        variables.insert(key, value.to_string().into());
        Ok(())
    }

    /// Remove a variable.
    ///
    /// # Errors
    ///
    /// Returns `StateError::VariableNotFound` if absent and
    /// `StateError::InvalidKey` if the state is locked.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let key = name.trim().to_ascii_uppercase();

        if self.unlocked_mut()?.variables.remove(&key).is_none() {
            return Err(StateError::VariableNotFound(key).into());
        }

        debug!(variable = %key, "removed variable");
        Ok(())
    }

    /// Whether the secret or a variable with this name exists.
    ///
    /// Works on locked states too.
    pub fn contains(&self, name: &str) -> bool {
        let key = name.trim().to_ascii_uppercase();
        if key == constants::SECRET_KEY {
            return true;
        }

        match &self.access {
            Access::Unlocked(u) => u.variables.contains_key(&key),
            Access::Locked(names) => names.contains(&key),
        }
    }

    /// Whether a variable is stored under exactly this name.
    pub(crate) fn has_variable(&self, name: &str) -> bool {
        match &self.access {
            Access::Unlocked(u) => u.variables.contains_key(name),
            Access::Locked(names) => names.iter().any(|n| n == name),
        }
    }

    /// Plaintext of a variable. Never returns the secret.
    ///
    /// `None` if absent or if the state is locked.
    pub fn value(&self, name: &str) -> Option<&str> {
        let key = name.trim().to_ascii_uppercase();
        match &self.access {
            Access::Unlocked(u) => u.variables.get(&key).map(|v| v.as_str()),
            Access::Locked(_) => None,
        }
    }

    /// Variable names in stored order. Excludes the secret.
    pub fn names(&self) -> Vec<&str> {
        match &self.access {
            Access::Unlocked(u) => u.variables.keys().map(String::as_str).collect(),
            Access::Locked(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Number of variables, excluding the secret.
    pub fn len(&self) -> usize {
        match &self.access {
            Access::Unlocked(u) => u.variables.len(),
            Access::Locked(names) => names.len(),
        }
    }

    /// Whether there are no variables besides the secret.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All `(name, value)` pairs: the secret first, then every variable.
    ///
    /// Values are `None` for a locked state.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        let (secret, unlocked, locked) = match &self.access {
            Access::Unlocked(u) => (Some(u.secret.as_str()), Some(&u.variables), None),
            Access::Locked(names) => (None, None, Some(names)),
        };

        std::iter::once((constants::SECRET_KEY, secret))
            .chain(
                unlocked
                    .into_iter()
                    .flatten()
                    .map(|(k, v)| (k.as_str(), Some(v.as_str()))),
            )
            .chain(
                locked
                    .into_iter()
                    .flatten()
                    .map(|k| (k.as_str(), None)),
            )
    }

    /// Copy every variable of `source` into this state.
    ///
    /// The secret is never copied; each environment keeps its own.
    /// Without `force`, nothing is changed if any name already exists.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidKey` if either state is locked and
    /// `StateError::VariableExists` on the first conflicting name.
    pub fn transcode_from(&mut self, source: &State, force: bool) -> Result<Vec<VarName>> {
        let incoming = &source.unlocked()?.variables;
        let variables = &mut self.unlocked_mut()?.variables;

        if !force {
            if let Some(existing) = incoming.keys().find(|k| variables.contains_key(*k)) {
                return Err(StateError::VariableExists(existing.clone()).into());
            }
        }

        for (key, value) in incoming {
            variables.insert(key.clone(), value.clone());
        }

        debug!(
            from = %source.name,
            to = %self.name,
            count = incoming.len(),
            "transcoded variables"
        );
        Ok(incoming.keys().cloned().collect())
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = (&'a str, Option<&'a str>);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, Option<&'a str>)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::LoadMode;
    use crate::error::{Error, ValidationError};
    use tempfile::TempDir;

    fn fresh(dir: &TempDir, name: &str) -> (State, String) {
        let (state, key) = State::create(dir.path(), name).unwrap();
        (state, key.to_string())
    }

    #[test]
    fn test_add_normalizes_case() {
        let tmp = TempDir::new().unwrap();
        let (mut state, _) = fresh(&tmp, "dev");

        state.add("foo", "bar", false).unwrap();
        assert!(state.contains("FOO"));
        assert!(state.contains("foo"));
        assert_eq!(state.value("FOO"), Some("bar"));
        assert_eq!(state.names(), vec!["FOO"]);
    }

    #[test]
    fn test_add_existing_requires_force() {
        let tmp = TempDir::new().unwrap();
        let (mut state, key) = fresh(&tmp, "dev");

        state.add("FOO", "bar", false).unwrap();
        let err = state.add("FOO", "baz", false).unwrap_err();
        assert!(matches!(err, Error::State(StateError::VariableExists(ref k)) if k == "FOO"));

        state.add("FOO", "baz", true).unwrap();
        state.save().unwrap();

        let reloaded = State::open(state.path(), &key, LoadMode::Unlocked).unwrap();
        assert_eq!(reloaded.value("FOO"), Some("baz"));
    }

    #[test]
    fn test_add_reserved_and_invalid() {
        let tmp = TempDir::new().unwrap();
        let (mut state, _) = fresh(&tmp, "dev");

        let err = state.add("secret_key", "x", true).unwrap_err();
        assert!(matches!(err, Error::State(StateError::Reserved(_))));

        let err = state.add("BAD-NAME", "x", false).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let tmp = TempDir::new().unwrap();
        let (mut state, _) = fresh(&tmp, "dev");

        let err = state.remove("NOPE").unwrap_err();
        assert!(matches!(err, Error::State(StateError::VariableNotFound(ref k)) if k == "NOPE"));

        state.add("FOO", "bar", false).unwrap();
        state.remove("foo").unwrap();
        assert!(!state.contains("FOO"));
    }

    #[test]
    fn test_contains_secret() {
        let tmp = TempDir::new().unwrap();
        let (state, _) = fresh(&tmp, "dev");

        assert!(state.contains(constants::SECRET_KEY));
        assert!(!state.contains("FOO"));
        assert_eq!(state.value(constants::SECRET_KEY), None);
    }

    #[test]
    fn test_iter_secret_first_then_sorted() {
        let tmp = TempDir::new().unwrap();
        let (mut state, _) = fresh(&tmp, "dev");
        state.add("ZED", "1", false).unwrap();
        state.add("ALPHA", "2", false).unwrap();

        let names: Vec<&str> = state.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec![constants::SECRET_KEY, "ALPHA", "ZED"]);
        assert!(state.iter().all(|(_, v)| v.is_some()));

        let via_ref: Vec<&str> = (&state).into_iter().map(|(k, _)| k).collect();
        assert_eq!(via_ref, names);
    }

    #[test]
    fn test_locked_iter_has_no_values() {
        let tmp = TempDir::new().unwrap();
        let (mut state, _) = fresh(&tmp, "dev");
        state.add("FOO", "bar", false).unwrap();
        state.save().unwrap();

        let locked = State::load_locked(state.path()).unwrap();
        let pairs: Vec<_> = locked.iter().collect();
        assert_eq!(pairs, vec![(constants::SECRET_KEY, None), ("FOO", None)]);
    }

    #[test]
    fn test_locked_state_rejects_mutation() {
        let tmp = TempDir::new().unwrap();
        let (state, _) = fresh(&tmp, "dev");
        let mut locked = State::load_locked(state.path()).unwrap();

        assert!(locked.add("FOO", "bar", false).unwrap_err().is_invalid_key());
        assert!(locked.remove("FOO").unwrap_err().is_invalid_key());
    }

    #[test]
    fn test_transcode_keeps_own_secret() {
        let tmp = TempDir::new().unwrap();
        let (mut source, _) = fresh(&tmp, "a");
        let (mut target, target_key) = fresh(&tmp, "b");
        source.add("FOO", "1", false).unwrap();
        source.add("BAR", "2", false).unwrap();

        let target_secret = target.iter().next().unwrap().1.unwrap().to_string();
        let copied = target.transcode_from(&source, false).unwrap();
        assert_eq!(copied, vec!["BAR".to_string(), "FOO".to_string()]);
        target.save().unwrap();

        let reloaded = State::open(target.path(), &target_key, LoadMode::Unlocked).unwrap();
        assert_eq!(reloaded.value("FOO"), Some("1"));
        assert_eq!(reloaded.value("BAR"), Some("2"));
        let (_, secret) = reloaded.iter().next().unwrap();
        assert_eq!(secret, Some(target_secret.as_str()));
        assert_ne!(secret, source.iter().next().unwrap().1);
    }

    #[test]
    fn test_transcode_conflict_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let (mut source, _) = fresh(&tmp, "a");
        let (mut target, _) = fresh(&tmp, "b");
        source.add("AAA", "new", false).unwrap();
        source.add("FOO", "new", false).unwrap();
        target.add("FOO", "old", false).unwrap();

        let err = target.transcode_from(&source, false).unwrap_err();
        assert!(matches!(err, Error::State(StateError::VariableExists(ref k)) if k == "FOO"));
        assert!(!target.contains("AAA"));

        target.transcode_from(&source, true).unwrap();
        target.transcode_from(&source, true).unwrap();
        assert_eq!(target.value("FOO"), Some("new"));
    }
}
