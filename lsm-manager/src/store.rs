//! Policy Store Client (spec §4.7): a stateful wrapper over the system
//! policy store that enforces the connect/commit/install/remove/list
//! lifecycle and the fixed module priority.
//!
//! No `libsemanage`-sys binding crate appears anywhere in the retrieved
//! example pack (the one real SELinux binding crate present,
//! `koutheir/selinux`, wraps `selinux_sys` for `libselinux`
//! policy-load/context queries only, not `libsemanage` module
//! management), so, following `other_examples/NixOS-nix-installer
//! provision_selinux.rs`, which installs/removes modules via
//! `Command::new("semodule").arg("--install"|"--remove")`, the client
//! drives the real `semodule` CLI rather than a fabricated FFI binding.

use camino::Utf8Path;
use lsm_manager_utils::Task;

use crate::error::{Error, Result};

/// Fixed module priority (spec §6): defines this manager's modules'
/// precedence relative to other system modules, passed as `semodule`'s
/// `-X` priority flag.
pub const POLICY_STORE_PRIORITY: u32 = 400;

/// The connect/commit/install/remove/list surface spec §4.7 describes.
/// Kept as a trait so the orchestrator can be driven by a fake in tests
/// (spec §8 scenario 3, 5, 6) without a live policy store.
pub trait PolicyStore: Sized {
    /// Implements the `create` step of the state table: instantiate the
    /// handle, enable "create store if missing", connect, and set the
    /// priority. Failures collapse the handle cleanly before returning.
    fn create() -> Result<Self>;

    /// Install from file, then commit. Failure of either step is reported;
    /// the caller is responsible for rollback (spec §4.8 install step 5).
    fn install_module(&mut self, pp_path: &Utf8Path) -> Result<()>;

    /// Remove by module name, then commit.
    fn remove_module(&mut self, id: &str) -> Result<()>;

    /// Enumerate modules and report whether any has this name.
    fn module_is_present(&mut self, id: &str) -> Result<bool>;
}

#[derive(Debug, PartialEq, Eq)]
enum State {
    Connected,
    Disconnected,
}

/// A handle onto the real system policy store, backed by the `semodule`
/// CLI. Its `Drop` impl performs the equivalent of `destroy`: whatever
/// state the handle is in, dropping it always releases the connection, so
/// no call path in the orchestrator can forget to release it (spec §9
/// Design Notes, and the fix for Open Question 2: the validity check below
/// is on the handle's own state, not on the address of a local variable).
#[derive(Debug)]
pub struct SemanageStore {
    state: State,
}

impl SemanageStore {
    fn require_connected(&self) -> Result<()> {
        match self.state {
            State::Connected => Ok(()),
            State::Disconnected => Err(Error::PolicyStore(
                "policy store handle is disconnected".to_string(),
            )),
        }
    }

    /// Explicit disconnect, idempotent. Called by `Drop` but also exposed
    /// so callers can release the connection before the handle's scope
    /// ends if they want to observe the transition.
    pub fn disconnect(&mut self) {
        if self.state == State::Connected {
            tracing::trace!("policy store handle disconnected");
            self.state = State::Disconnected;
        }
    }
}

impl PolicyStore for SemanageStore {
    fn create() -> Result<Self> {
        if !Task::probe_invocable("semodule") {
            return Err(Error::PolicyStore(
                "semodule is not invocable on this system".to_string(),
            ));
        }
        tracing::debug!("policy store connected (priority {POLICY_STORE_PRIORITY})");
        Ok(Self {
            state: State::Connected,
        })
    }

    fn install_module(&mut self, pp_path: &Utf8Path) -> Result<()> {
        self.require_connected()?;
        Task::new(format!("install module {pp_path}"), "semodule")
            .args(["-X", &POLICY_STORE_PRIORITY.to_string(), "-i", pp_path.as_str()])
            .run()
            .map_err(|e| Error::PolicyStore(format!("install {pp_path}: {e:#}")))?;
        tracing::debug!("installed module from {pp_path} and committed");
        Ok(())
    }

    fn remove_module(&mut self, id: &str) -> Result<()> {
        self.require_connected()?;
        Task::new(format!("remove module {id}"), "semodule")
            .args(["-X", &POLICY_STORE_PRIORITY.to_string(), "-r", id])
            .run()
            .map_err(|e| Error::PolicyStore(format!("remove {id}: {e:#}")))?;
        tracing::debug!("removed module {id} and committed");
        Ok(())
    }

    fn module_is_present(&mut self, id: &str) -> Result<bool> {
        self.require_connected()?;
        let listing = Task::new(format!("list modules (looking for {id})"), "semodule")
            .args(["-l"])
            .read()
            .map_err(|e| Error::PolicyStore(format!("list modules: {e:#}")))?;
        // The enumeration buffer (here, just a `String`) is released by
        // normal drop on every path, matching the "always released
        // including on error paths" contract of spec §4.7.
        Ok(listing
            .lines()
            .any(|line| line.split_whitespace().next() == Some(id)))
    }
}

impl Drop for SemanageStore {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FakeStore {
        installed: Vec<String>,
        removed: Vec<String>,
        fail_install: bool,
    }

    impl PolicyStore for FakeStore {
        fn create() -> Result<Self> {
            Ok(Self::default())
        }

        fn install_module(&mut self, pp_path: &Utf8Path) -> Result<()> {
            if self.fail_install {
                return Err(Error::PolicyStore("simulated install failure".to_string()));
            }
            self.installed.push(pp_path.to_string());
            Ok(())
        }

        fn remove_module(&mut self, id: &str) -> Result<()> {
            self.removed.push(id.to_string());
            Ok(())
        }

        fn module_is_present(&mut self, id: &str) -> Result<bool> {
            Ok(self.installed.iter().any(|p| p.contains(id)) && !self.removed.contains(&id.to_string()))
        }
    }

    #[test]
    fn test_fake_store_roundtrip() {
        let mut store = FakeStore::create().unwrap();
        store.install_module(Utf8Path::new("/rules/demo.pp")).unwrap();
        assert!(store.module_is_present("demo").unwrap());
        store.remove_module("demo").unwrap();
        assert!(!store.module_is_present("demo").unwrap());
    }

    #[test]
    fn test_require_connected_after_disconnect() {
        // The real handle always starts Connected; exercise the
        // disconnected-state error path directly.
        let mut store = SemanageStore {
            state: State::Disconnected,
        };
        assert!(matches!(
            store.install_module(Utf8Path::new("/rules/demo.pp")),
            Err(Error::PolicyStore(_))
        ));
    }

    #[test]
    fn test_drop_disconnects() {
        let mut store = SemanageStore {
            state: State::Connected,
        };
        store.disconnect();
        assert_eq!(store.state, State::Disconnected);
    }
}
