//! Compile-time bounds carried over from the original fixed-buffer C
//! implementation. Rust's `String`/`Vec` are heap-backed so nothing here
//! actually needs a static buffer, but the bounds are still enforced
//! explicitly: they are part of the `NAME_TOO_LONG`/`INVALID_ARGUMENT`
//! contract this crate makes with its callers (see spec §8 boundary tests).

/// Maximum length of an application identifier, including the trailing nul
/// in the original C buffer sizing (so the usable length is `MAX_ID - 1`).
pub const MAX_ID: usize = 127;

/// Maximum length of a rendered SELinux label string.
pub const MAX_LABEL: usize = 255;

/// Maximum length of a filesystem path, or a composed artefact path.
pub const MAX_PATH: usize = 4095;

/// Maximum length of a configured directory path.
pub const MAX_DIR: usize = 2047;

/// Maximum length of a single generated `.fc` line (enforced in
/// `generator::write_fc_file`: a composed line exceeding `MAX_LINE_MODULE
/// - 1` fails with [`crate::Error::NameTooLong`]).
pub const MAX_LINE_MODULE: usize = MAX_PATH + MAX_LABEL + 32;
