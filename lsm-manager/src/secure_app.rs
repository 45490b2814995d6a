//! The aggregate identity of a confined application: spec §3/§4.1.
//!
//! The sticky error flag (spec §9: "in languages without affine types, a
//! runtime flag suffices so long as every mutation consults it") models the
//! two states a secure application can be in: *building* (mutations
//! accepted) and *failed* (only [`SecureApplication::clear`] accepted). The
//! flag itself is raised by the caller, not by a failing mutation: spec §7
//! is explicit that "the Secure Application's error flag is set by the
//! enclosing server (not the core) when a mutation fails" (see scenario 4 in
//! spec §8). This lets one invalid mutation be retried without poisoning the
//! whole aggregate, while still giving the enclosing server a way to make
//! retries impossible once it decides a sequence of operations has failed.

use lsm_manager_utils::{is_valid_absolute_path, is_valid_identifier_charset, is_valid_label_string, underscore_normalize};

use crate::error::{Error, Result};
use crate::label::{Label, LabelTable};
use crate::limits::{MAX_ID, MAX_LABEL, MAX_PATH};
use crate::path_type::PathType;

/// A single declared filesystem path, tagged with its [`PathType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub path: String,
    pub path_type: PathType,
}

#[derive(Debug, Clone)]
struct Identity {
    id: String,
    id_underscore: String,
    label: Label,
}

/// The aggregate identity of an application under confinement.
#[derive(Debug, Clone, Default)]
pub struct SecureApplication {
    identity: Option<Identity>,
    paths: Vec<Path>,
    permissions: Vec<String>,
    error: bool,
}

impl SecureApplication {
    /// Yields a zeroed secure application: error flag clear, sets empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once any mutation has failed and the caller raised the flag;
    /// no further mutation succeeds until [`Self::clear`].
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// The application identifier, if set.
    pub fn id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.id.as_str())
    }

    /// The underscore-normalised identifier variant, if set.
    pub fn id_underscore(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.id_underscore.as_str())
    }

    /// The top-level security label derived from the identifier, if set.
    pub fn label(&self) -> Option<&Label> {
        self.identity.as_ref().map(|i| &i.label)
    }

    /// The declared path set, in insertion order.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// The declared permission set, in insertion order.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Validates and sets the identifier exactly once.
    ///
    /// Fails with [`Error::InvalidArgument`] if `id` is empty, too long, or
    /// uses characters illegal as both an SELinux type prefix and a module
    /// name; with [`Error::Conflict`] if already set.
    pub fn set_id(&mut self, id: &str) -> Result<()> {
        if self.identity.is_some() {
            return Err(Error::Conflict("identifier".to_string()));
        }
        if id.is_empty() || id.len() > MAX_ID - 1 || !is_valid_identifier_charset(id) {
            return Err(Error::InvalidArgument(format!(
                "identifier {id:?} is empty, too long, or contains illegal characters"
            )));
        }
        let table = LabelTable::for_id(id)?;
        self.identity = Some(Identity {
            id: id.to_string(),
            id_underscore: underscore_normalize(id),
            label: table.get(PathType::Id).clone(),
        });
        Ok(())
    }

    /// Appends a path to the path set unless it is already present.
    ///
    /// Fails with [`Error::Forbidden`] if the error flag is set, with
    /// [`Error::InvalidArgument`] on a malformed path, and with
    /// [`Error::AlreadyExists`] on a duplicate `(path, path_type)` pair.
    pub fn add_path(&mut self, path: &str, path_type: PathType) -> Result<()> {
        if self.error {
            return Err(Error::Forbidden);
        }
        if path.is_empty() || path.len() > MAX_PATH - 1 || !is_valid_absolute_path(path) {
            return Err(Error::InvalidArgument(format!(
                "path {path:?} is empty, too long, or not absolute"
            )));
        }
        if self
            .paths
            .iter()
            .any(|p| p.path == path && p.path_type == path_type)
        {
            return Err(Error::AlreadyExists(format!("path {path:?}")));
        }
        self.paths.push(Path {
            path: path.to_string(),
            path_type,
        });
        Ok(())
    }

    /// Appends a permission to the permission set unless it is already
    /// present. Same error semantics as [`Self::add_path`].
    pub fn add_permission(&mut self, perm: &str) -> Result<()> {
        if self.error {
            return Err(Error::Forbidden);
        }
        if perm.is_empty() || perm.len() > MAX_LABEL - 1 || !is_valid_label_string(perm) {
            return Err(Error::InvalidArgument(format!(
                "permission {perm:?} is empty, too long, or contains illegal characters"
            )));
        }
        if self.permissions.iter().any(|p| p == perm) {
            return Err(Error::AlreadyExists(format!("permission {perm:?}")));
        }
        self.permissions.push(perm.to_string());
        Ok(())
    }

    /// Releases owned path and permission storage, clears the error flag,
    /// and clears the identifier: the application returns to a pre-`set_id`
    /// state.
    pub fn clear(&mut self) {
        self.identity = None;
        self.paths.clear();
        self.permissions.clear();
        self.error = false;
    }

    /// Sets the error flag unconditionally. Called by the enclosing server
    /// after observing a failed mutation; see the module docs.
    pub fn raise_error(&mut self) {
        self.error = true;
    }
}
