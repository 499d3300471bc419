use crate::{diff::EventDiff, shared::entity::ID};
use serde::{Deserialize, Serialize};

/// Why a refresh of a `Unit` was started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RefreshReason {
    Manual {
        #[serde(rename = "actorId")]
        actor_id: String,
        note: Option<String>,
    },
    Scheduled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCounts {
    pub added: usize,
    pub updated: usize,
    pub cancelled: usize,
}

impl ChangeCounts {
    pub fn total(&self) -> usize {
        self.added + self.updated + self.cancelled
    }
}

impl From<&EventDiff> for ChangeCounts {
    fn from(diff: &EventDiff) -> Self {
        Self {
            added: diff.created.len(),
            updated: diff.updated.len(),
            cancelled: diff.cancelled.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "message")]
pub enum FeedFailure {
    /// Network failure, timeout or non-success status
    Fetch(String),
    /// The change set could not be committed and was rolled back
    Storage,
    /// Another reconciliation pass of this feed source is running
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum FeedOutcome {
    Succeeded(ChangeCounts),
    Failed { reason: FeedFailure },
}

impl FeedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRefreshOutcome {
    pub feed_source_id: ID,
    /// `None` for feed sources that are no longer configured for the unit
    pub url: Option<String>,
    pub outcome: FeedOutcome,
}

/// Per feed source result of one refresh of a `Unit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub unit_id: ID,
    pub feeds: Vec<FeedRefreshOutcome>,
}

impl RefreshSummary {
    pub fn new(unit_id: &ID) -> Self {
        Self {
            unit_id: *unit_id,
            feeds: Vec::new(),
        }
    }

    pub fn feed(&self, feed_source_id: &ID) -> Option<&FeedOutcome> {
        self.feeds
            .iter()
            .find(|f| f.feed_source_id == *feed_source_id)
            .map(|f| &f.outcome)
    }

    /// Sum of the changes committed across every successful feed source
    pub fn committed_changes(&self) -> ChangeCounts {
        self.feeds
            .iter()
            .filter_map(|f| match &f.outcome {
                FeedOutcome::Succeeded(counts) => Some(*counts),
                FeedOutcome::Failed { .. } => None,
            })
            .fold(ChangeCounts::default(), |acc, c| ChangeCounts {
                added: acc.added + c.added,
                updated: acc.updated + c.updated,
                cancelled: acc.cancelled + c.cancelled,
            })
    }
}
