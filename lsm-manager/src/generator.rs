//! Module Generator (spec §4.5): produces the `te`/`if`/`fc` source
//! artefacts, rolling back partially-written files on failure.

use std::io::Write;

use crate::error::{Error, Result};
use crate::label::LabelTable;
use crate::layout::ModuleLayout;
use crate::limits::MAX_LINE_MODULE;
use crate::secure_app::SecureApplication;
use crate::template::process_template;

pub(crate) fn remove_best_effort(path: &camino::Utf8Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("rollback: failed to remove {path}: {e}"),
    }
}

/// Removes a single artefact, reporting every failure including "already
/// absent" (spec §4.8: uninstall's missing-artefact case "is surfaced by
/// the return code of `remove_file`", matching `remove_app_module_files`'s
/// `-ENOENT` return in the original C). Unlike [`remove_best_effort`] (used
/// for rollback, where a failure is a logged secondary diagnostic, never
/// the primary error), this is for the uninstall path, where the first
/// failure here *is* the primary error.
pub(crate) fn remove_file_reporting(path: &camino::Utf8Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|e| Error::io(path, e))
}

/// Rejects a composed `.fc` line that exceeds `MAX_LINE_MODULE - 1`,
/// mirroring the fixed-size `SEC_LSM_MANAGER_MAX_SIZE_LINE_MODULE` buffer
/// the original C writes each line into.
fn check_line_length(line: &str, what: impl FnOnce() -> String) -> Result<()> {
    if line.len() > MAX_LINE_MODULE - 1 {
        return Err(Error::NameTooLong {
            what: what(),
            max: MAX_LINE_MODULE - 1,
        });
    }
    Ok(())
}

/// Writes the `.fc` file directly: one line per declared path, of the form
/// `<path>(/.*)? gen_context(<label>,s0)\n`.
fn write_fc_file(
    fc_file: &camino::Utf8Path,
    sa: &SecureApplication,
    labels: &LabelTable,
) -> Result<()> {
    let mut f = std::fs::File::create(fc_file).map_err(|e| Error::io(fc_file, e))?;
    for path in sa.paths() {
        let label = labels.get(path.path_type);
        let line = format!("{}(/.*)? gen_context({label},s0)", path.path);
        check_line_length(&line, || format!("fc line for {:?}", path.path))?;
        writeln!(f, "{line}").map_err(|e| Error::io(fc_file, e))?;
    }
    // A failing fclose-equivalent (flush) after a successful write is a
    // logged, non-fatal secondary diagnostic (spec §9 Open Question 1).
    if let Err(e) = f.flush() {
        tracing::warn!("flush of {fc_file} failed after successful write: {e}");
    }
    Ok(())
}

/// Expands the `te` and `if` templates and writes the `fc` file, in that
/// order, rolling back earlier artefacts if a later step fails (spec §4.5
/// rollback table).
pub fn generate(layout: &ModuleLayout, sa: &SecureApplication, labels: &LabelTable) -> Result<()> {
    process_template(&layout.te_template_file, &layout.te_file, sa)?;

    if let Err(e) = process_template(&layout.if_template_file, &layout.if_file, sa) {
        remove_best_effort(&layout.te_file);
        return Err(e);
    }

    if let Err(e) = write_fc_file(&layout.fc_file, sa, labels) {
        remove_best_effort(&layout.if_file);
        remove_best_effort(&layout.te_file);
        return Err(e);
    }

    tracing::debug!("generated selinux module sources for {:?}", sa.id());
    Ok(())
}

/// Removes all three source artefacts, logging (not failing on) a missing
/// file. Used by the uninstall path, where a missing artefact is not fatal.
pub fn remove_sources(layout: &ModuleLayout) {
    remove_best_effort(&layout.te_file);
    remove_best_effort(&layout.if_file);
    remove_best_effort(&layout.fc_file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::path_type::PathType;

    fn setup() -> (tempfile::TempDir, ModuleLayout, SecureApplication, LabelTable) {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        std::fs::write(root.join("app-template.te"), "policy_module(@ID@, 1.0.0)\n").unwrap();
        std::fs::write(root.join("app-template.if"), "## interface for @ID@\n").unwrap();
        let config = Config {
            te_template_file: root.join("app-template.te"),
            if_template_file: root.join("app-template.if"),
            rules_dir: root.to_path_buf(),
        };
        let mut sa = SecureApplication::new();
        sa.set_id("demo").unwrap();
        sa.add_path("/usr/bin/demo", PathType::Exec).unwrap();
        sa.add_path("/etc/demo", PathType::Conf).unwrap();
        let labels = LabelTable::for_id("demo").unwrap();
        let layout = ModuleLayout::compute(&config, "demo").unwrap();
        (dir, layout, sa, labels)
    }

    #[test]
    fn test_generate_happy_path() {
        let (_dir, layout, sa, labels) = setup();
        generate(&layout, &sa, &labels).unwrap();
        assert!(layout.files_exist());
        let fc = std::fs::read_to_string(&layout.fc_file).unwrap();
        similar_asserts::assert_eq!(
            fc,
            indoc::indoc! {"
                /usr/bin/demo(/.*)? gen_context(system_u:object_r:demo_exec_t,s0)
                /etc/demo(/.*)? gen_context(system_u:object_r:demo_conf_t,s0)
            "}
        );
    }

    #[test]
    fn test_generate_empty_sets_produces_empty_fc() {
        let (_dir, layout, _sa, labels) = setup();
        let mut sa = SecureApplication::new();
        sa.set_id("demo").unwrap();
        generate(&layout, &sa, &labels).unwrap();
        assert!(layout.files_exist());
        assert_eq!(std::fs::read_to_string(&layout.fc_file).unwrap(), "");
    }

    #[test]
    fn test_check_line_length_accepts_boundary() {
        let line = "a".repeat(MAX_LINE_MODULE - 1);
        check_line_length(&line, || "test".to_string()).unwrap();
    }

    #[test]
    fn test_check_line_length_rejects_over_boundary() {
        let line = "a".repeat(MAX_LINE_MODULE);
        assert!(matches!(
            check_line_length(&line, || "test".to_string()),
            Err(Error::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_rollback_on_if_template_missing() {
        let (_dir, layout, sa, labels) = setup();
        std::fs::remove_file(&layout.if_template_file).unwrap();
        let err = generate(&layout, &sa, &labels).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!layout.te_file.exists());
        assert!(!layout.if_file.exists());
        assert!(!layout.fc_file.exists());
    }

    #[test]
    fn test_remove_sources_ignores_missing() {
        let (_dir, layout, sa, labels) = setup();
        generate(&layout, &sa, &labels).unwrap();
        remove_sources(&layout);
        assert!(!layout.files_exist());
        // Calling again on already-removed files must not panic.
        remove_sources(&layout);
    }
}
