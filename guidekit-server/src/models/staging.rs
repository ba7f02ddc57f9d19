//! Staging queue domain types
//!
//! A staging item is content waiting for a moderator. Its disposition
//! starts at `pending` and is moved to `approved` or `rejected` by a
//! review batch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Staging item identifier
pub type ItemId = i64;

/// Approval state of a staging item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Pending,
    Approved,
    Rejected,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disposition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }
}

/// Moderator decision carried by a review request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Terminal disposition this action moves items to
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Approve => Disposition::Approved,
            Self::Reject => Disposition::Rejected,
        }
    }
}

impl FromStr for ReviewAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(ValidationError::InvalidVariant {
                field: "action",
                value: other.to_owned(),
            }),
        }
    }
}

/// Validated review batch: a known action and at least one id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewBatch {
    action: ReviewAction,
    items: Vec<ItemId>,
}

impl ReviewBatch {
    /// Validate raw request fields.
    ///
    /// Order of checks: action present, action known, items present,
    /// items non-empty. Duplicate ids are kept; the store collapses them.
    pub fn new(action: Option<&str>, items: Option<Vec<ItemId>>) -> Result<Self, ValidationError> {
        let action: ReviewAction = action
            .ok_or(ValidationError::Missing { field: "action" })?
            .parse()?;

        let items = items.ok_or(ValidationError::Missing { field: "items" })?;
        if items.is_empty() {
            return Err(ValidationError::Empty { field: "items" });
        }

        Ok(Self { action, items })
    }

    pub fn action(&self) -> ReviewAction {
        self.action
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }
}

/// Full staging record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagingItem {
    pub id: ItemId,
    pub title: String,
    pub status: Disposition,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub raw_content: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Record as returned from a review update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewedItem {
    pub id: ItemId,
    pub title: String,
    pub status: Disposition,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_maps_to_disposition() {
        assert_eq!(ReviewAction::Approve.disposition(), Disposition::Approved);
        assert_eq!(ReviewAction::Reject.disposition(), Disposition::Rejected);
    }

    #[test]
    fn valid_batch() {
        let batch = ReviewBatch::new(Some("approve"), Some(vec![1, 2, 3])).unwrap();
        assert_eq!(batch.action(), ReviewAction::Approve);
        assert_eq!(batch.items(), &[1, 2, 3]);
    }

    #[test]
    fn rejects_missing_action() {
        let err = ReviewBatch::new(None, Some(vec![1])).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "action" });
    }

    #[test]
    fn rejects_unknown_action() {
        let err = ReviewBatch::new(Some("delete"), Some(vec![1])).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidVariant { field: "action", .. }
        ));

        // actions are case-sensitive
        assert!(ReviewBatch::new(Some("Approve"), Some(vec![1])).is_err());
    }

    #[test]
    fn rejects_missing_or_empty_items() {
        let err = ReviewBatch::new(Some("reject"), None).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "items" });

        let err = ReviewBatch::new(Some("reject"), Some(vec![])).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "items" });
    }

    #[test]
    fn action_checked_before_items() {
        let err = ReviewBatch::new(Some("delete"), Some(vec![])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { .. }));
    }

    #[test]
    fn disposition_roundtrip() {
        for d in [Disposition::Pending, Disposition::Approved, Disposition::Rejected] {
            assert_eq!(d.as_str().parse::<Disposition>().unwrap(), d);
        }
        assert!("archived".parse::<Disposition>().is_err());
    }

    #[test]
    fn disposition_serializes_lowercase() {
        let json = serde_json::to_string(&Disposition::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }
}
