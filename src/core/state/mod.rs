//! One environment's encrypted key-value store.
//!
//! A `State` is either unlocked (the bound key decrypted the signed name,
//! the secret and every variable) or locked (only variable names are
//! known). Only unlocked states can be mutated or saved.

mod file;
mod variables;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::Rng;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use self::file::{Document, Entries};
use crate::core::constants;
use crate::core::encrypter::Encrypter;
use crate::core::types::{EnvName, VarName};
use crate::core::validation;
use crate::error::{Error, Result, StateError};

/// How to open an environment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Prove the key and decrypt everything.
    Unlocked,
    /// Skip decryption; only record variable names.
    Locked,
}

/// Encoding metadata stored alongside the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub family: String,
    pub algorithm: String,
    pub version: String,
}

impl Metadata {
    /// Metadata written by this release.
    pub fn current(encrypter: &Encrypter) -> Self {
        Self {
            family: encrypter.family().to_string(),
            algorithm: encrypter.algorithm().to_string(),
            version: constants::CURRENT_VERSION.to_string(),
        }
    }

    fn from_document(doc: &Document) -> Self {
        Self {
            family: doc
                .family
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_FAMILY.to_string()),
            algorithm: doc
                .algorithm
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_ALGORITHM.to_string()),
            version: doc
                .version
                .clone()
                .unwrap_or_else(|| constants::CURRENT_VERSION.to_string()),
        }
    }
}

struct Unlocked {
    encrypter: Encrypter,
    secret: Zeroizing<String>,
    variables: BTreeMap<VarName, Zeroizing<String>>,
}

enum Access {
    Unlocked(Unlocked),
    Locked(BTreeSet<VarName>),
}

/// One environment file.
pub struct State {
    path: PathBuf,
    name: EnvName,
    metadata: Metadata,
    access: Access,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("decrypted", &self.is_decrypted())
            .field("variables", &self.names())
            .finish()
    }
}

impl State {
    /// Create a new environment file `<dir>/<name>.env` under a fresh key.
    ///
    /// The returned key is the only copy; the caller has to store it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an unusable name,
    /// `StateError::AlreadyExists` if the file is already there, or
    /// `StateError::FileWrite` if it cannot be written.
    pub fn create(dir: impl AsRef<Path>, name: &str) -> Result<(Self, Zeroizing<String>)> {
        validation::validate_environment(name)?;

        let path = dir
            .as_ref()
            .join(format!("{}.{}", name, constants::FILE_EXTENSION));
        if path.exists() {
            return Err(StateError::AlreadyExists(path).into());
        }

        let encrypter = Encrypter::generate()?;
        let key = Zeroizing::new(encrypter.key().to_string());

        let fresh = Self {
            path,
            name: name.to_string(),
            metadata: Metadata::current(&encrypter),
            access: Access::Unlocked(Unlocked {
                encrypter,
                secret: generate_secret(),
                variables: BTreeMap::new(),
            }),
        };
        fresh.persist(true)?;
        debug!(environment = name, path = %fresh.path.display(), "environment created");

        let state = Self::load(&fresh.path, Encrypter::new(&key)?)?;
        Ok((state, key))
    }

    /// Open an environment file with a text key.
    ///
    /// The key is validated even in locked mode.
    ///
    /// # Errors
    ///
    /// See [`State::load`] and [`State::load_locked`].
    pub fn open(path: impl AsRef<Path>, key: &str, mode: LoadMode) -> Result<Self> {
        let encrypter = Encrypter::new(key)?;
        match mode {
            LoadMode::Unlocked => Self::load(path, encrypter),
            LoadMode::Locked => Self::load_locked(path),
        }
    }

    /// Load and decrypt an environment file.
    ///
    /// Files missing optional metadata are rewritten once in the current
    /// format.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidFormat` if the file is malformed and
    /// `StateError::InvalidKey` if the key does not open it or any value
    /// fails to decrypt.
    pub fn load(path: impl AsRef<Path>, encrypter: Encrypter) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::read(path)?;
        let name = doc.name.clone();

        let denied = |what: &str| -> Error {
            debug!(environment = %name, value = what, "key rejected");
            StateError::InvalidKey(name.clone()).into()
        };

        let signed = encrypter
            .decrypt(&doc.signed_name)
            .map_err(|_| denied(constants::SIGNED_NAME))?;
        if signed != doc.name {
            return Err(denied(constants::SIGNED_NAME));
        }

        let metadata = Metadata::from_document(&doc);
        if metadata.family != encrypter.family() || metadata.algorithm != encrypter.algorithm() {
            return Err(StateError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported crypto {}/{}",
                    metadata.family, metadata.algorithm
                ),
            }
            .into());
        }

        let secret = Zeroizing::new(
            encrypter
                .decrypt(&doc.secret)
                .map_err(|_| denied(constants::SECRET_KEY))?,
        );

        let mut variables = BTreeMap::new();
        for (key, encrypted) in &doc.variables {
            let value = encrypter.decrypt(encrypted).map_err(|_| denied(key.as_str()))?;
            variables.insert(key.clone(), Zeroizing::new(value));
        }

        let state = Self {
            path: path.to_path_buf(),
            name: doc.name.clone(),
            metadata,
            access: Access::Unlocked(Unlocked {
                encrypter,
                secret,
                variables,
            }),
        };

        if doc.is_outdated() {
            warn!(
                environment = %state.name,
                version = constants::CURRENT_VERSION,
                "updating environment file to the current format"
            );
            state.save()?;
        }

        debug!(environment = %state.name, variables = state.len(), "environment unlocked");
        Ok(state)
    }

    /// Load an environment file without decrypting anything.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidFormat` if the file is malformed.
    pub fn load_locked(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::read(path)?;
        let metadata = Metadata::from_document(&doc);

        debug!(environment = %doc.name, "environment loaded locked");

        Ok(Self {
            path: path.to_path_buf(),
            metadata,
            access: Access::Locked(doc.variables.into_keys().collect()),
            name: doc.name,
        })
    }

    /// Persist the state.
    ///
    /// Every value is re-encrypted, so the file changes on each save even
    /// when nothing was modified.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidKey` for a locked state and
    /// `StateError::FileWrite` if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.persist(false)
    }

    fn persist(&self, create: bool) -> Result<()> {
        let unlocked = self.unlocked()?;
        let enc = &unlocked.encrypter;

        let signed_name = enc.encrypt(&self.name)?;
        let secret = enc.encrypt(&unlocked.secret)?;
        let mut encrypted = Vec::with_capacity(unlocked.variables.len());
        for (key, value) in &unlocked.variables {
            encrypted.push((key.as_str(), enc.encrypt(value)?));
        }

        let mut entries = BTreeMap::new();
        entries.insert(constants::NAME, self.name.as_str());
        entries.insert(constants::SIGNED_NAME, signed_name.as_str());
        entries.insert(constants::CRYPTO_FAMILY, self.metadata.family.as_str());
        entries.insert(constants::CRYPTO_ALGORITHM, self.metadata.algorithm.as_str());
        entries.insert(constants::VERSION, self.metadata.version.as_str());
        entries.insert(constants::SECRET_KEY, secret.as_str());
        for (key, value) in &encrypted {
            entries.insert(*key, value.as_str());
        }

        Entries(entries).write(&self.path, create)?;
        debug!(environment = %self.name, path = %self.path.display(), "environment saved");
        Ok(())
    }

    /// Replace the key with a freshly generated one and save.
    ///
    /// Returns the new key. The old key stops working once this returns.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidKey` for a locked state.
    pub fn rekey(&mut self) -> Result<Zeroizing<String>> {
        let fresh = Encrypter::generate()?;
        let key = Zeroizing::new(fresh.key().to_string());

        let previous = std::mem::replace(&mut self.unlocked_mut()?.encrypter, fresh);
        if let Err(e) = self.save() {
            self.unlocked_mut()?.encrypter = previous;
            return Err(e);
        }

        debug!(environment = %self.name, "environment key rotated");
        Ok(key)
    }

    /// Environment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether the bound key proved it can read this file.
    pub fn is_decrypted(&self) -> bool {
        matches!(self.access, Access::Unlocked(_))
    }

    /// Fingerprint of the bound key, if unlocked.
    pub fn fingerprint(&self) -> Option<String> {
        match &self.access {
            Access::Unlocked(u) => Some(u.encrypter.fingerprint()),
            Access::Locked(_) => None,
        }
    }

    fn unlocked(&self) -> Result<&Unlocked> {
        match &self.access {
            Access::Unlocked(u) => Ok(u),
            Access::Locked(_) => Err(StateError::InvalidKey(self.name.clone()).into()),
        }
    }

    fn unlocked_mut(&mut self) -> Result<&mut Unlocked> {
        match &mut self.access {
            Access::Unlocked(u) => Ok(u),
            Access::Locked(_) => Err(StateError::InvalidKey(self.name.clone()).into()),
        }
    }
}

/// Generate a per-environment secret from the fixed alphabet.
fn generate_secret() -> Zeroizing<String> {
    let mut rng = OsRng;
    let charset = constants::SECRET_CHARSET;
    Zeroizing::new(
        (0..constants::SECRET_SIZE)
            .map(|_| charset[rng.gen_range(0..charset.len())] as char)
            .collect(),
    )
}
