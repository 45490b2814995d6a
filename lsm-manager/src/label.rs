//! Structured SELinux labels (spec §9 Design Notes: "Stringly-typed labels
//! -> structured label values"). A `Label` is assembled once per path type
//! and rendered to its wire string only at the boundary where it is written
//! into a `.fc` file, which is what makes the §8 invariant "`LabelTable` has
//! exactly `number_path_type` non-empty entries, all <= `MAX_LABEL-1` in
//! length" mechanically checkable on construction.

use std::fmt;

use crate::error::{Error, Result};
use crate::limits::MAX_LABEL;
use crate::path_type::PathType;

/// The literal public label shared by every application (spec §3/§6).
pub const REDPESK_PUBLIC_LABEL: &str = "system_u:object_r:redpesk_public_t";

/// A structured SELinux security context: `user:role:type:level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub user: String,
    pub role: String,
    pub type_: String,
    pub level: String,
}

impl Label {
    fn for_path_type(id: &str, path_type: PathType) -> Self {
        let type_ = match path_type.suffix() {
            Some(suffix) => format!("{id}{suffix}"),
            None => "redpesk_public_t".to_string(),
        };
        Self {
            user: "system_u".to_string(),
            role: "object_r".to_string(),
            type_,
            level: String::new(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.user, self.role, self.type_)
    }
}

/// The eight derived labels for an application, one per [`PathType`].
#[derive(Debug, Clone)]
pub struct LabelTable {
    entries: [Label; PathType::COUNT],
}

impl LabelTable {
    /// Pure function `id -> LabelTable` (spec §4.2).
    pub fn for_id(id: &str) -> Result<Self> {
        let entries: Vec<Label> = PathType::ALL
            .iter()
            .map(|&t| Label::for_path_type(id, t))
            .collect();
        for label in &entries {
            let rendered = label.to_string();
            if rendered.len() > MAX_LABEL - 1 {
                return Err(Error::NameTooLong {
                    what: format!("label {rendered:?}"),
                    max: MAX_LABEL - 1,
                });
            }
        }
        let entries: [Label; PathType::COUNT] = entries
            .try_into()
            .expect("PathType::ALL has exactly PathType::COUNT entries");
        Ok(Self { entries })
    }

    /// The label associated with a given path type.
    pub fn get(&self, path_type: PathType) -> &Label {
        &self.entries[PathType::ALL.iter().position(|&t| t == path_type).unwrap()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_labels() {
        let table = LabelTable::for_id("demo").unwrap();
        assert_eq!(
            table.get(PathType::Exec).to_string(),
            "system_u:object_r:demo_exec_t"
        );
        assert_eq!(
            table.get(PathType::Conf).to_string(),
            "system_u:object_r:demo_conf_t"
        );
        assert_eq!(
            table.get(PathType::Id).to_string(),
            "system_u:object_r:demo_t"
        );
        assert_eq!(
            table.get(PathType::Public).to_string(),
            REDPESK_PUBLIC_LABEL
        );
    }

    #[test]
    fn test_all_entries_nonempty_and_bounded() {
        let table = LabelTable::for_id("demo").unwrap();
        for t in PathType::ALL {
            let rendered = table.get(t).to_string();
            assert!(!rendered.is_empty());
            assert!(rendered.len() <= MAX_LABEL - 1);
        }
    }
}
