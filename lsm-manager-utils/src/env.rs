//! Privilege-safe environment lookups, modeled on glibc's `secure_getenv(3)`.

use rustix::process::{geteuid, getegid, getgid, getuid};

/// Returns true if the real and effective ids differ, i.e. the process is
/// running across a privilege boundary (typically set-uid/set-gid).
///
/// In that situation environment variables are attacker-controlled and must
/// not influence privileged behavior, exactly as glibc's `secure_getenv`
/// refuses to return a value.
pub fn running_setuid() -> bool {
    getuid() != geteuid() || getgid() != getegid()
}

/// Look up an environment variable, but only when it is safe to trust: never
/// across a privilege boundary.
pub fn secure_getenv(name: &str) -> Option<String> {
    if running_setuid() {
        tracing::trace!("ignoring {name} across privilege boundary");
        return None;
    }
    std::env::var(name).ok()
}

/// Resolve a configuration value using the standard precedence: an explicit
/// value always wins, then a privilege-safe environment lookup, then the
/// caller-supplied default.
pub fn resolve(explicit: Option<&str>, env_var: &str, default: &str) -> String {
    if let Some(v) = explicit {
        return v.to_string();
    }
    secure_getenv(env_var).unwrap_or_else(|| default.to_string())
}
