mod base;
mod status;
mod unit;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use status::StatusClient;
use std::sync::Arc;
use unit::UnitClient;
pub use unit::{CreateUnitInput, GetOutboxInput, RefreshUnitInput, UpdateUnitInput};
pub use ward_calendar_api_structs::dtos::*;
pub use ward_calendar_domain::{
    ChangeCounts, FeedFailure, FeedOutcome, FeedRefreshOutcome, OrphanedEventsPolicy, OutboxKind,
    RefreshSummary, Tz, ID,
};

// Domain
pub use ward_calendar_api_structs::dtos::FeedSourceDTO as FeedSource;
pub use ward_calendar_api_structs::dtos::OutboxRecordDTO as OutboxRecord;
pub use ward_calendar_api_structs::dtos::UnitDTO as Unit;

/// Ward Calendar Server SDK
///
/// The SDK contains methods for interacting with the Ward Calendar server
/// API.
#[derive(Clone)]
pub struct WardSDK {
    pub status: StatusClient,
    pub unit: UnitClient,
}

impl WardSDK {
    pub fn new(address: String) -> Self {
        let base = Arc::new(BaseClient::new(address));
        let status = StatusClient::new(base.clone());
        let unit = UnitClient::new(base);

        Self { status, unit }
    }
}
