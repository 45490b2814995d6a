//! The closed classification of filesystem resources an application can
//! declare, and the label-suffix table that drives §4.2 Label Derivation.

/// A declared filesystem path's role, used to select its SELinux object
/// label suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    Conf,
    Data,
    Exec,
    Http,
    Icon,
    Id,
    Lib,
    Public,
}

impl PathType {
    /// All path types, in a fixed order matching the C `path_type`
    /// enumeration (`number_path_type` is simply the length of this slice).
    pub const ALL: [PathType; 8] = [
        PathType::Conf,
        PathType::Data,
        PathType::Exec,
        PathType::Http,
        PathType::Icon,
        PathType::Id,
        PathType::Lib,
        PathType::Public,
    ];

    /// The cardinality of the path type enumeration (`number_path_type`).
    pub const COUNT: usize = Self::ALL.len();

    /// The label suffix appended to the identifier for this path type, or
    /// `None` for `Public`: its label is the fixed `redpesk_public_t`
    /// constant, not derived from the identifier at all.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            PathType::Id => Some("_t"),
            PathType::Lib => Some("_lib_t"),
            PathType::Conf => Some("_conf_t"),
            PathType::Exec => Some("_exec_t"),
            PathType::Icon => Some("_icon_t"),
            PathType::Data => Some("_data_t"),
            PathType::Http => Some("_http_t"),
            PathType::Public => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_distinct() {
        let mut seen = std::collections::HashSet::new();
        for t in PathType::ALL {
            assert!(seen.insert(t));
        }
        assert_eq!(PathType::COUNT, 8);
    }

    #[test]
    fn test_suffix_public_has_none() {
        assert_eq!(PathType::Public.suffix(), None);
        for t in PathType::ALL {
            if t != PathType::Public {
                assert!(t.suffix().is_some());
            }
        }
    }
}
