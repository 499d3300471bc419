use crate::dtos::{FeedSourceDTO, OutboxRecordDTO, UnitDTO};
use serde::{Deserialize, Serialize};
use ward_calendar_domain::{
    FeedSource, OrphanedEventsPolicy, OutboxRecord, RefreshSummary, Unit, ID,
};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResponse {
    pub unit: UnitDTO,
}

impl UnitResponse {
    pub fn new(unit: Unit) -> Self {
        Self {
            unit: UnitDTO::new(unit),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSourceResponse {
    pub feed_source: FeedSourceDTO,
}

impl FeedSourceResponse {
    pub fn new(feed_source: FeedSource) -> Self {
        Self {
            feed_source: FeedSourceDTO::new(feed_source),
        }
    }
}

pub mod create_unit {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub timezone: Option<String>,
        pub orphaned_events: Option<OrphanedEventsPolicy>,
    }

    pub type APIResponse = UnitResponse;
}

pub mod get_unit {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
    }

    pub type APIResponse = UnitResponse;
}

pub mod update_unit {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
    }

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: Option<String>,
        pub timezone: Option<String>,
        pub orphaned_events: Option<OrphanedEventsPolicy>,
    }

    pub type APIResponse = UnitResponse;
}

pub mod add_feed_source {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// `http`, `https` or `webcal` url of the published feed
        pub url: String,
    }

    pub type APIResponse = FeedSourceResponse;
}

pub mod remove_feed_source {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
        pub feed_source_id: ID,
    }

    pub type APIResponse = FeedSourceResponse;
}

pub mod refresh_unit {
    use super::*;

    /// Header identifying the operator triggering a manual refresh
    pub const ACTOR_HEADER: &str = "ward-actor";

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
    }

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub reason: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub summary: RefreshSummary,
    }

    impl APIResponse {
        pub fn new(summary: RefreshSummary) -> Self {
            Self { summary }
        }
    }
}

pub mod get_outbox {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct QueryParams {
        /// Only records with a greater id are returned
        pub after: Option<i64>,
        pub limit: Option<usize>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub records: Vec<OutboxRecordDTO>,
    }

    impl APIResponse {
        pub fn new(records: Vec<OutboxRecord>) -> Self {
            Self {
                records: records.into_iter().map(OutboxRecordDTO::new).collect(),
            }
        }
    }
}

pub mod dispatch_outbox {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub unit_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// Records handed over to the job queue in this pass
        pub submitted: usize,
        /// Part of `submitted` the queue already knew about
        pub deduplicated: usize,
        /// Id of the record the pass gave up on, if any
        pub stalled_at: Option<i64>,
    }
}
