//! The inevitable catchall "utils" crate. Generally only add
//! things here that only depend on the standard library and
//! "core" crates.
mod command;
mod env;
mod validate;

pub use command::*;
pub use env::*;
pub use validate::*;
