//! Policy synthesis and lifecycle engine for per-application Linux
//! Security Module confinement (SELinux, with Smack abstracted
//! identically behind [`orchestrator::LsmBackend`]).
//!
//! This crate is the privileged *core*: given a [`secure_app::SecureApplication`]
//! describing an identifier, declared paths and permissions, it derives
//! SELinux labels, synthesizes and compiles a policy module, and installs
//! or removes it from the system policy store via [`orchestrator::LsmManager`].
//! The request/reply wire protocol, socket server, CLI, Cynagora
//! permission-database client, and the unimplemented Smack backend are
//! external collaborators, not part of this crate.

mod compiler;
mod config;
mod error;
mod generator;
mod label;
mod layout;
mod limits;
mod path_type;
mod secure_app;
mod store;
mod template;

mod orchestrator;

pub use compiler::{CompilerDriver, SelinuxCompiler};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use label::{Label, LabelTable, REDPESK_PUBLIC_LABEL};
pub use layout::ModuleLayout;
pub use limits::{MAX_DIR, MAX_ID, MAX_LABEL, MAX_LINE_MODULE, MAX_PATH};
pub use orchestrator::{LsmBackend, LsmManager, ProbeResult, SelinuxBackend};
pub use path_type::PathType;
pub use secure_app::{Path, SecureApplication};
pub use store::{PolicyStore, SemanageStore, POLICY_STORE_PRIORITY};
