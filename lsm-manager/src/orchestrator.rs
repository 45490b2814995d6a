//! Lifecycle Orchestrator (spec §4.8): the three public entry points that
//! sequence Label Derivation, Module Artefact Layout, the Module Generator,
//! the Compiler Driver and the Policy Store Client, with rollback on
//! failure.
//!
//! Kept behind an [`LsmBackend`] trait (grounded in bootupd's `Component`
//! trait, `bootupd/src/component.rs`) so the design stays backend-agnostic
//! the way spec §1 describes Smack as "an alternate backend abstracted
//! identically." Only [`SelinuxBackend`] is implemented; [`Backend::Smack`]
//! is a documented, intentionally-unimplemented placeholder.

use crate::compiler::{CompilerDriver, SelinuxCompiler};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::generator::{generate, remove_best_effort, remove_file_reporting, remove_sources};
use crate::label::LabelTable;
use crate::layout::ModuleLayout;
use crate::secure_app::SecureApplication;
use crate::store::{PolicyStore, SemanageStore};

/// The two orthogonal booleans `probe` reports (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub files_exist: bool,
    pub module_present: bool,
}

/// The three lifecycle entry points, backend-agnostic.
pub trait LsmBackend {
    fn install(&self, sa: &SecureApplication) -> Result<()>;
    fn uninstall(&self, sa: &SecureApplication) -> Result<()>;
    fn probe(&self, sa: &SecureApplication) -> Result<ProbeResult>;
}

fn require_id(sa: &SecureApplication) -> Result<&str> {
    sa.id()
        .ok_or_else(|| Error::InvalidArgument("secure application has no identifier set".to_string()))
}

/// The SELinux lifecycle orchestrator. Generic over the [`CompilerDriver`]
/// and [`PolicyStore`] collaborators so integration tests can substitute
/// fakes for scenarios that need to simulate compiler or policy-store
/// failure (spec §8 scenarios 2 and 3) without a real SELinux-enabled host.
#[derive(Debug, Clone)]
pub struct SelinuxBackend<C = SelinuxCompiler> {
    config: Config,
    compiler: C,
}

impl SelinuxBackend<SelinuxCompiler> {
    /// The production backend: the real `checkmodule`/`semodule_package`
    /// compiler and the real `semodule`-backed policy store.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            compiler: SelinuxCompiler,
        }
    }
}

impl<C: CompilerDriver> SelinuxBackend<C> {
    /// Construct with an explicit compiler driver (used by tests to inject
    /// a fake). The policy store collaborator is chosen per-call via the
    /// type parameter on the lifecycle methods themselves, since it is
    /// short-lived (opened and closed within a single call, never stored).
    pub fn with_compiler(config: Config, compiler: C) -> Self {
        Self { config, compiler }
    }

    fn layout_and_labels(&self, sa: &SecureApplication) -> Result<(ModuleLayout, LabelTable)> {
        let id = require_id(sa)?;
        let layout = ModuleLayout::compute(&self.config, id)?;
        let labels = LabelTable::for_id(id)?;
        Ok((layout, labels))
    }

    /// Generic lifecycle methods parameterized over the store type, so
    /// production code uses [`SemanageStore`] while tests substitute a
    /// fake. See [`LsmBackend`] for the backend-agnostic, store-defaulted
    /// entry points used by callers outside this crate's tests.
    pub fn install_with_store<S: PolicyStore>(&self, sa: &SecureApplication) -> Result<()> {
        if sa.has_error() {
            return Err(Error::Forbidden);
        }
        let (layout, labels) = self.layout_and_labels(sa)?;
        let id = require_id(sa)?;
        let mut store = S::create()?;

        generate(&layout, sa, &labels)?;

        if let Err(e) = self.compiler.compile(&layout, id) {
            remove_sources(&layout);
            return Err(e);
        }

        if let Err(e) = store.install_module(&layout.pp_file) {
            remove_best_effort(&layout.pp_file);
            remove_sources(&layout);
            return Err(e);
        }

        tracing::debug!("installed selinux policy for {id}");
        Ok(())
    }

    /// Removes the source artefacts, then the compiled module, then the
    /// loaded module from the policy store (spec §4.8 ordering: sources
    /// before `pp` so a partial uninstall can't leave stale sources that
    /// would recompile into a stale module).
    ///
    /// A missing artefact is not fatal in the sense that it doesn't abort
    /// the remaining steps, but it is not silently swallowed either: every
    /// step is attempted regardless of earlier failures, and the *first*
    /// error encountered (spec §8: "reports the first `remove_file`
    /// failure") is returned once all steps have run.
    pub fn uninstall_with_store<S: PolicyStore>(&self, sa: &SecureApplication) -> Result<()> {
        let (layout, _labels) = self.layout_and_labels(sa)?;
        let id = require_id(sa)?;

        let mut first_err: Option<Error> = None;
        let mut record = |result: Result<()>| {
            if let Err(e) = result {
                tracing::warn!("uninstall: {e}");
                first_err.get_or_insert(e);
            }
        };

        record(remove_file_reporting(&layout.te_file));
        record(remove_file_reporting(&layout.if_file));
        record(remove_file_reporting(&layout.fc_file));
        record(remove_file_reporting(&layout.pp_file));

        match S::create() {
            Ok(mut store) => record(store.remove_module(id)),
            Err(e) => record(Err(e)),
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                tracing::debug!("uninstalled selinux policy for {id}");
                Ok(())
            }
        }
    }

    pub fn probe_with_store<S: PolicyStore>(&self, sa: &SecureApplication) -> Result<ProbeResult> {
        let (layout, _labels) = self.layout_and_labels(sa)?;
        let id = require_id(sa)?;

        let module_present = match S::create() {
            Ok(mut store) => store.module_is_present(id).unwrap_or_else(|e| {
                tracing::warn!("probe: listing policy store modules failed: {e}");
                false
            }),
            Err(e) => {
                tracing::warn!("probe: connecting to policy store failed: {e}");
                false
            }
        };

        Ok(ProbeResult {
            files_exist: layout.files_exist(),
            module_present,
        })
    }
}

impl<C: CompilerDriver> LsmBackend for SelinuxBackend<C> {
    fn install(&self, sa: &SecureApplication) -> Result<()> {
        self.install_with_store::<SemanageStore>(sa)
    }

    fn uninstall(&self, sa: &SecureApplication) -> Result<()> {
        self.uninstall_with_store::<SemanageStore>(sa)
    }

    fn probe(&self, sa: &SecureApplication) -> Result<ProbeResult> {
        self.probe_with_store::<SemanageStore>(sa)
    }
}

/// Backend selection (spec §1: "Smack ... is an alternate backend
/// abstracted identically"). `Selinux` is fully implemented; `Smack` is a
/// documented placeholder that reports a clear error rather than silently
/// doing nothing: implementing the real Smack backend is an explicit
/// spec.md non-goal, but the selection boundary it requires is ambient
/// architecture, not a feature.
#[derive(Debug)]
pub enum LsmManager {
    Selinux(SelinuxBackend),
    Smack,
}

impl LsmBackend for LsmManager {
    fn install(&self, sa: &SecureApplication) -> Result<()> {
        match self {
            Self::Selinux(backend) => backend.install(sa),
            Self::Smack => Err(smack_unimplemented()),
        }
    }

    fn uninstall(&self, sa: &SecureApplication) -> Result<()> {
        match self {
            Self::Selinux(backend) => backend.uninstall(sa),
            Self::Smack => Err(smack_unimplemented()),
        }
    }

    fn probe(&self, sa: &SecureApplication) -> Result<ProbeResult> {
        match self {
            Self::Selinux(backend) => backend.probe(sa),
            Self::Smack => Err(smack_unimplemented()),
        }
    }
}

fn smack_unimplemented() -> Error {
    Error::PolicyStore("the Smack backend is not implemented".to_string())
}
