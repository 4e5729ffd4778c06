//! Active environment resolution across several files.

use std::fs;

use envcrypt::error::{Error, ResolveError, StateError};
use envcrypt::{Encrypter, State, StateList, StateListOptions};
use tempfile::TempDir;
use zeroize::Zeroizing;

struct Fixture {
    dir: TempDir,
    keys: Vec<Zeroizing<String>>,
}

impl Fixture {
    /// `development`, `staging` and `production`, each under its own key.
    fn three() -> Self {
        let dir = TempDir::new().unwrap();
        let keys = ["development", "staging", "production"]
            .iter()
            .map(|name| State::create(dir.path(), name).unwrap().1)
            .collect();
        Self { dir, keys }
    }

    fn options(&self) -> StateListOptions {
        StateListOptions {
            directory: self.dir.path().to_path_buf(),
            ..StateListOptions::default()
        }
    }

    fn list(&self, key: &str) -> StateList {
        StateList::new(Some(key), &self.options()).unwrap()
    }

    fn open(&self, index: usize) -> State {
        let list = self.list(&self.keys[index]);
        list.into_active().unwrap()
    }
}

#[test]
fn test_only_one_environment_unlocks() {
    let f = Fixture::three();

    let list = f.list(&f.keys[1]);
    assert_eq!(list.name(), Some("staging"));
    assert_eq!(list.len(), 3);

    let locked: Vec<&str> = list
        .states()
        .iter()
        .filter(|s| !s.is_decrypted())
        .map(|s| s.name())
        .collect();
    assert_eq!(locked, vec!["development", "production"]);
    for state in list.states().iter().filter(|s| !s.is_decrypted()) {
        assert!(state.iter().all(|(_, v)| v.is_none()));
    }
}

#[test]
fn test_unrelated_key_resolves_to_nothing() {
    let f = Fixture::three();
    let stranger = Encrypter::generate_key();

    let list = f.list(&stranger);
    assert!(list.get().is_none());
    assert_eq!(list.len(), 3);

    let strict = StateListOptions {
        require_active: true,
        ..f.options()
    };
    let err = StateList::new(Some(stranger.as_str()), &strict).unwrap_err();
    assert!(matches!(
        err,
        Error::Resolve(ResolveError::DeploymentLevelNotFound)
    ));
}

#[test]
fn test_malformed_key_fails_construction() {
    let f = Fixture::three();
    let err = StateList::new(Some("not-a-key"), &f.options()).unwrap_err();
    assert!(matches!(err, Error::Cipher(_)));
}

#[test]
fn test_malformed_candidate_is_reported() {
    let f = Fixture::three();
    fs::write(f.dir.path().join("junk.env"), "{ not json").unwrap();

    let err = StateList::new(Some(f.keys[0].as_str()), &f.options()).unwrap_err();
    assert!(matches!(err, Error::State(StateError::InvalidFormat { .. })));
}

#[test]
fn test_mutating_active_environment() {
    let f = Fixture::three();
    let mut list = f.list(&f.keys[2]);

    let active = list.get_mut().unwrap();
    active.add("DATABASE_URL", "postgres://prod", false).unwrap();
    active.save().unwrap();

    let reread = f.open(2);
    assert_eq!(reread.value("DATABASE_URL"), Some("postgres://prod"));
}

#[test]
fn test_check_variables_reports_and_raises() {
    let dir = TempDir::new().unwrap();
    let (mut a, key) = State::create(dir.path(), "a").unwrap();
    a.add("FOO", "1", false).unwrap();
    a.save().unwrap();

    // Same key for b, so both are unlocked.
    let b_path = dir.path().join("b.env");
    let doc = fs::read_to_string(a.path()).unwrap();
    let enc = Encrypter::new(&key).unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&doc).unwrap();
    let obj = json.as_object_mut().unwrap();
    obj.remove("FOO");
    obj.insert("name".into(), "b".into());
    obj.insert("signed_name".into(), enc.encrypt("b").unwrap().into());
    fs::write(&b_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let options = StateListOptions {
        directory: dir.path().to_path_buf(),
        ..StateListOptions::default()
    };
    let list = StateList::new(Some(key.as_str()), &options).unwrap();
    assert_eq!(list.matched_names(), vec!["a", "b"]);
    assert_eq!(list.name(), Some("b"));

    let report = list.check_variables(false).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].name, "FOO");
    assert_eq!(report[0].states, vec!["b".to_string()]);
    assert_eq!(report[0].to_string(), "variable FOO missing in b");

    let err = list.check_variables(true).unwrap_err();
    assert!(matches!(
        err,
        Error::Resolve(ResolveError::VariableMissing(ref names)) if names == &["FOO".to_string()]
    ));

    let strict = StateListOptions {
        reject_ambiguous: true,
        ..options
    };
    let err = StateList::new(Some(key.as_str()), &strict).unwrap_err();
    assert!(matches!(err, Error::Resolve(ResolveError::Ambiguous(_))));
}

#[test]
fn test_check_variables_ignores_locked() {
    let f = Fixture::three();
    let mut prod = f.open(2);
    prod.add("ONLY_IN_PROD", "x", false).unwrap();
    prod.save().unwrap();

    let list = f.list(&f.keys[0]);
    assert!(list.check_variables(true).unwrap().is_empty());
}
