//! Resolved configuration (spec §9: "Global defaults via env lookup ->
//! explicit configuration record"). A single [`Config`] is built once at the
//! edge and handed to the orchestrator, instead of components calling
//! `getenv` deep in the call stack.

use camino::Utf8PathBuf;
use lsm_manager_utils::resolve;

use crate::error::{Error, Result};
use crate::limits::MAX_DIR;

const DATADIR: &str = "/usr/share/sec-lsm-manager";

const ENV_TE_TEMPLATE: &str = "SELINUX_TE_TEMPLATE_FILE";
const ENV_IF_TEMPLATE: &str = "SELINUX_IF_TEMPLATE_FILE";
const ENV_RULES_DIR: &str = "SELINUX_RULES_DIR";

/// Builder-style, not-yet-validated configuration inputs (spec §6 table).
/// `None` fields fall through to the privilege-safe environment lookup and
/// then to the compiled-in default.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    pub te_template_file: Option<String>,
    pub if_template_file: Option<String>,
    pub rules_dir: Option<String>,
}

/// Fully resolved configuration for the lifecycle orchestrator.
#[derive(Debug, Clone)]
pub struct Config {
    pub te_template_file: Utf8PathBuf,
    pub if_template_file: Utf8PathBuf,
    pub rules_dir: Utf8PathBuf,
}

impl ConfigBuilder {
    /// Resolves explicit values, then the environment, then the compiled-in
    /// defaults under `/usr/share/sec-lsm-manager`.
    ///
    /// Fails with [`Error::NameTooLong`] if the resolved `rules_dir` exceeds
    /// `MAX_DIR - 1` (spec §4.3).
    pub fn resolve(self) -> Result<Config> {
        let rules_dir = resolve(
            self.rules_dir.as_deref(),
            ENV_RULES_DIR,
            &format!("{DATADIR}/selinux-rules"),
        );
        if rules_dir.len() > MAX_DIR - 1 {
            return Err(Error::NameTooLong {
                what: "rules_dir".to_string(),
                max: MAX_DIR - 1,
            });
        }
        let te_template_file = resolve(
            self.te_template_file.as_deref(),
            ENV_TE_TEMPLATE,
            &format!("{DATADIR}/app-template.te"),
        );
        let if_template_file = resolve(
            self.if_template_file.as_deref(),
            ENV_IF_TEMPLATE,
            &format!("{DATADIR}/app-template.if"),
        );
        Ok(Config {
            te_template_file: te_template_file.into(),
            if_template_file: if_template_file.into(),
            rules_dir: rules_dir.into(),
        })
    }
}
