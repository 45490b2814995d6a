//! Compiler Driver (spec §4.6): invokes the external SELinux policy
//! compiler on the generated `te`/`if`/`fc` sources to produce the loadable
//! `pp`. Treated as opaque by the rest of the crate: either it succeeds or
//! it fails with [`Error::Compile`].
//!
//! No `libsemanage`/`libselinux`-sys binding crate appears anywhere in the
//! retrieved example pack capable of driving this two-stage compile (the
//! one real SELinux binding crate present, `koutheir/selinux`, wraps
//! `selinux_sys` for policy-load and context queries, not module
//! compilation), so this follows the same external-process pattern the
//! teacher uses for its own privileged, rare invocations
//! (`lsm_manager_utils::Task`, modeled on `lib/src/task.rs`): shell out to
//! the real `checkmodule`/`semodule_package` toolchain rather than invent a
//! binding.

use camino::Utf8Path;
use lsm_manager_utils::Task;

use crate::error::{Error, Result};
use crate::layout::ModuleLayout;

/// Drives the external policy compiler. Kept as a trait so the lifecycle
/// orchestrator can be exercised against a fake in tests without a real
/// SELinux userspace toolchain installed (spec §8 scenario 2).
pub trait CompilerDriver {
    fn compile(&self, layout: &ModuleLayout, id: &str) -> Result<()>;
}

/// The real driver: `checkmodule -M -m -o <id>.mod <id>.te`, then
/// `semodule_package -o <id>.pp -m <id>.mod -f <id>.fc`. The intermediate
/// `.mod` is removed regardless of outcome (original_source/selinux-
/// template.c's `launch_compile` does the equivalent cleanup).
#[derive(Debug, Clone, Copy, Default)]
pub struct SelinuxCompiler;

fn mod_file(layout: &ModuleLayout) -> camino::Utf8PathBuf {
    layout.te_file.with_extension("mod")
}

impl CompilerDriver for SelinuxCompiler {
    fn compile(&self, layout: &ModuleLayout, id: &str) -> Result<()> {
        let mod_file = mod_file(layout);
        let result = run_compile(layout, id, &mod_file);
        match std::fs::remove_file(&mod_file) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove intermediate {mod_file}: {e}"),
        }
        result
    }
}

fn run_compile(layout: &ModuleLayout, id: &str, mod_file: &Utf8Path) -> Result<()> {
    Task::new(format!("checkmodule {id}"), "checkmodule")
        .args([
            "-M",
            "-m",
            "-o",
            mod_file.as_str(),
            layout.te_file.as_str(),
        ])
        .run()
        .map_err(|e| Error::Compile(format!("checkmodule: {e:#}")))?;

    Task::new(format!("semodule_package {id}"), "semodule_package")
        .args([
            "-o",
            layout.pp_file.as_str(),
            "-m",
            mod_file.as_str(),
            "-f",
            layout.fc_file.as_str(),
        ])
        .run()
        .map_err(|e| Error::Compile(format!("semodule_package: {e:#}")))?;

    tracing::debug!("compiled selinux module {id} -> {}", layout.pp_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// A fake driver used by integration tests to simulate scenario 2
    /// (compile failure) without a real SELinux toolchain installed.
    #[derive(Debug, Clone, Copy)]
    struct FailingCompiler;

    impl CompilerDriver for FailingCompiler {
        fn compile(&self, _layout: &ModuleLayout, id: &str) -> Result<()> {
            Err(Error::Compile(format!("simulated compile failure for {id}")))
        }
    }

    fn cfg(dir: &camino::Utf8Path) -> Config {
        Config {
            te_template_file: dir.join("app-template.te"),
            if_template_file: dir.join("app-template.if"),
            rules_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_mod_file_removed_even_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let layout = ModuleLayout::compute(&cfg(root), "demo").unwrap();
        std::fs::write(&layout.te_file, "not a real policy module\n").unwrap();
        std::fs::write(layout.te_file.with_extension("mod"), b"stale").unwrap();

        let err = SelinuxCompiler.compile(&layout, "demo").unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
        assert!(!layout.te_file.with_extension("mod").exists());
    }

    #[test]
    fn test_failing_compiler_fake() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let layout = ModuleLayout::compute(&cfg(root), "demo").unwrap();
        assert!(matches!(
            FailingCompiler.compile(&layout, "demo"),
            Err(Error::Compile(_))
        ));
    }
}
