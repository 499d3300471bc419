mod delivery;
mod diff;
mod event;
pub mod ics;
mod outbox;
mod shared;
mod summary;
mod unit;

pub use chrono_tz::Tz;
pub use delivery::{DeliveryJob, DeliveryPayload, RetryPolicy};
pub use diff::EventDiff;
pub use event::{Event, EventTime, Tags, UnitEvent};
pub use outbox::{NewOutboxRecord, OutboxKind, OutboxRecord};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use summary::{
    ChangeCounts, FeedFailure, FeedOutcome, FeedRefreshOutcome, RefreshReason, RefreshSummary,
};
pub use unit::{FeedSource, OrphanedEventsPolicy, Unit, UnitSettings};
pub use url::Url;
