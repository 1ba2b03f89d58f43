//! Data models shared across OneDrive API operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DriveError;

/// Server-side policy for naming collisions on create/upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    /// Auto-dedupe by renaming the new item.
    Rename,
    /// Reject the operation on collision.
    Fail,
    /// Overwrite the existing item.
    Replace,
}

impl ConflictBehavior {
    /// Wire value sent in `@name.conflictBehavior`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictBehavior::Rename => "rename",
            ConflictBehavior::Fail => "fail",
            ConflictBehavior::Replace => "replace",
        }
    }
}

impl Default for ConflictBehavior {
    fn default() -> Self {
        ConflictBehavior::Rename
    }
}

impl fmt::Display for ConflictBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictBehavior {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rename" => Ok(ConflictBehavior::Rename),
            "fail" => Ok(ConflictBehavior::Fail),
            "replace" => Ok(ConflictBehavior::Replace),
            other => Err(DriveError::InvalidArgument(format!(
                "conflict behavior must be one of rename, fail, replace (got '{}')",
                other
            ))),
        }
    }
}

/// Identifies a drive item either by id or by the drive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemReference {
    /// The root folder of a drive.
    Root,
    /// A specific item by id.
    Item(String),
}

impl ItemReference {
    /// Path segment for this reference, e.g. `/root` or `/items/ABC123`.
    pub fn path_segment(&self) -> String {
        match self {
            ItemReference::Root => "/root".to_string(),
            ItemReference::Item(id) => format!("/items/{}", id),
        }
    }

    /// Build a reference from an optional item id; `None` means the root.
    ///
    /// An empty id is rejected so that operations fail before any request
    /// is constructed.
    pub fn from_optional_id(id: Option<&str>) -> crate::error::Result<Self> {
        match id {
            None => Ok(ItemReference::Root),
            Some("") => Err(DriveError::InvalidArgument(
                "item id must not be empty".to_string(),
            )),
            Some(id) => Ok(ItemReference::Item(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_behavior_parse() {
        assert_eq!(
            "rename".parse::<ConflictBehavior>().unwrap(),
            ConflictBehavior::Rename
        );
        assert_eq!(
            "fail".parse::<ConflictBehavior>().unwrap(),
            ConflictBehavior::Fail
        );
        assert_eq!(
            "replace".parse::<ConflictBehavior>().unwrap(),
            ConflictBehavior::Replace
        );
    }

    #[test]
    fn test_conflict_behavior_rejects_unknown() {
        for bad in ["overwrite", "RENAME", "", "keep-both"] {
            let err = bad.parse::<ConflictBehavior>().unwrap_err();
            assert!(matches!(err, DriveError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_conflict_behavior_wire_value() {
        assert_eq!(ConflictBehavior::Replace.as_str(), "replace");
        assert_eq!(
            serde_json::to_value(ConflictBehavior::Fail).unwrap(),
            serde_json::json!("fail")
        );
    }

    #[test]
    fn test_item_reference_segments() {
        assert_eq!(ItemReference::Root.path_segment(), "/root");
        assert_eq!(
            ItemReference::Item("ABC123".to_string()).path_segment(),
            "/items/ABC123"
        );
    }

    #[test]
    fn test_item_reference_from_optional_id() {
        assert_eq!(
            ItemReference::from_optional_id(None).unwrap(),
            ItemReference::Root
        );
        assert_eq!(
            ItemReference::from_optional_id(Some("x1")).unwrap(),
            ItemReference::Item("x1".to_string())
        );
        assert!(matches!(
            ItemReference::from_optional_id(Some("")),
            Err(DriveError::InvalidArgument(_))
        ));
    }
}
