//! Module Artefact Layout (spec §4.3): the canonical on-disk paths of the
//! four artefacts, derived from an application identifier and the resolved
//! [`Config`].

use camino::Utf8PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::limits::MAX_PATH;

/// The absolute paths of an application's on-disk SELinux module artefacts
/// and the two templates they were expanded from. Purely derived from
/// `(Config, id)`; it has no storage of its own.
#[derive(Debug, Clone)]
pub struct ModuleLayout {
    pub te_file: Utf8PathBuf,
    pub if_file: Utf8PathBuf,
    pub fc_file: Utf8PathBuf,
    pub pp_file: Utf8PathBuf,
    pub te_template_file: Utf8PathBuf,
    pub if_template_file: Utf8PathBuf,
}

fn composed(rules_dir: &camino::Utf8Path, id: &str, ext: &str) -> Result<Utf8PathBuf> {
    let p = rules_dir.join(format!("{id}.{ext}"));
    if p.as_str().len() > MAX_PATH - 1 {
        return Err(Error::NameTooLong {
            what: format!("{ext} artefact path"),
            max: MAX_PATH - 1,
        });
    }
    Ok(p)
}

impl ModuleLayout {
    /// Pure function `(Config, id) -> ModuleLayout` (spec §4.3).
    pub fn compute(config: &Config, id: &str) -> Result<Self> {
        Ok(Self {
            te_file: composed(&config.rules_dir, id, "te")?,
            if_file: composed(&config.rules_dir, id, "if")?,
            fc_file: composed(&config.rules_dir, id, "fc")?,
            pp_file: composed(&config.rules_dir, id, "pp")?,
            te_template_file: config.te_template_file.clone(),
            if_template_file: config.if_template_file.clone(),
        })
    }

    /// `true` iff all three source artefacts (`te`, `if`, `fc`) are present
    /// on disk. The compiled `pp` is deliberately excluded: `probe` reports
    /// it via the policy store, not the filesystem (spec §4.8).
    pub fn files_exist(&self) -> bool {
        self.te_file.exists() && self.if_file.exists() && self.fc_file.exists()
    }
}
