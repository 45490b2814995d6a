//! Character-set validation shared by the identifier, path and permission
//! value types. Kept here because it only depends on the standard library.

/// `true` iff every character of `s` is legal in an identifier: it must work
/// both as an SELinux type prefix and as a loadable module name.
pub fn is_valid_identifier_charset(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Replace every character that is not legal in an identifier with `_`.
pub fn underscore_normalize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `true` iff `s` is a non-empty absolute filesystem path.
pub fn is_valid_absolute_path(s: &str) -> bool {
    !s.is_empty() && s.starts_with('/')
}

/// `true` iff `s` is a valid permission/label string: the restricted
/// character set accepted by the policy store (alphanumerics plus the
/// punctuation used by redpesk-style URN permissions such as
/// `urn:AGL:permission:demo:public:p1`).
pub fn is_valid_label_string(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
}
