use super::subscribers::DispatchOutboxOnUnitRefreshed;
use crate::{
    error::WardError,
    shared::usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use std::collections::HashSet;
use tracing::{error, info, warn};
use ward_calendar_api_structs::refresh_unit::{APIResponse, PathParams, RequestBody, ACTOR_HEADER};
use ward_calendar_domain::{
    ics, ChangeCounts, EventDiff, FeedFailure, FeedOutcome, FeedRefreshOutcome, FeedSource,
    NewOutboxRecord, OrphanedEventsPolicy, OutboxKind, RefreshReason, RefreshSummary, Unit,
    UnitEvent, ID,
};
use ward_calendar_infra::{FeedChangeSet, FetchError, WardContext};

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::UnitNotFound(unit_id) => {
            WardError::NotFound(format!("The unit with id: {}, was not found.", unit_id))
        }
        UseCaseError::RateLimited => WardError::TooManyRequests(
            "Too many manual refreshes of this unit, try again later.".into(),
        ),
        UseCaseError::StorageError => WardError::InternalError,
    }
}

fn get_actor_id(http_req: &HttpRequest) -> Result<String, WardError> {
    http_req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            WardError::BadClientData(format!("Missing the `{}` header", ACTOR_HEADER))
        })
}

pub async fn refresh_unit_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: Option<web::Json<RequestBody>>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let actor_id = get_actor_id(&http_req)?;

    let usecase = RefreshUnitUseCase {
        unit_id: path_params.unit_id,
        reason: RefreshReason::Manual {
            actor_id,
            note: body.and_then(|body| body.0.reason),
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|summary| HttpResponse::Ok().json(APIResponse::new(summary)))
        .map_err(error_handler)
}

/// Reconciles every feed source of a unit against the stored events and
/// appends one outbox record per detected change
#[derive(Debug)]
pub struct RefreshUnitUseCase {
    pub unit_id: ID,
    pub reason: RefreshReason,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    UnitNotFound(ID),
    RateLimited,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RefreshUnitUseCase {
    type Response = RefreshSummary;

    type Errors = UseCaseError;

    const NAME: &'static str = "RefreshUnit";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        if let RefreshReason::Manual { actor_id, .. } = &self.reason {
            let key = format!("refresh:{}:{}", actor_id, self.unit_id);
            if !ctx
                .rate_limiter
                .allow(&key, ctx.config.manual_refresh_max_attempts)
            {
                info!(
                    actor_id = %actor_id,
                    unit_id = %self.unit_id,
                    "Manual refresh rejected by the rate limiter"
                );
                return Err(UseCaseError::RateLimited);
            }
        }

        let unit = match ctx.repos.units.find(&self.unit_id).await {
            Ok(Some(unit)) => unit,
            Ok(None) => return Err(UseCaseError::UnitNotFound(self.unit_id)),
            Err(e) => {
                error!("Unable to load unit {}: {:?}", self.unit_id, e);
                return Err(UseCaseError::StorageError);
            }
        };

        let feed_sources = ctx
            .repos
            .feed_sources
            .find_by_unit(&unit.id)
            .await
            .map_err(|e| {
                error!("Unable to load feed sources of unit {}: {:?}", unit.id, e);
                UseCaseError::StorageError
            })?;

        let mut summary = RefreshSummary::new(&unit.id);
        for feed_source in &feed_sources {
            let outcome = reconcile_feed_source(&unit, feed_source, ctx).await;
            summary.feeds.push(FeedRefreshOutcome {
                feed_source_id: feed_source.id,
                url: Some(feed_source.url.to_string()),
                outcome,
            });
        }

        if unit.settings.orphaned_events == OrphanedEventsPolicy::Purge {
            let configured: HashSet<ID> = feed_sources.iter().map(|f| f.id).collect();
            match ctx.repos.events.find_feed_source_ids(&unit.id).await {
                Ok(stored) => {
                    for feed_source_id in stored.into_iter().filter(|id| !configured.contains(id))
                    {
                        let outcome = purge_orphaned_events(&unit, &feed_source_id, ctx).await;
                        summary.feeds.push(FeedRefreshOutcome {
                            feed_source_id,
                            url: None,
                            outcome,
                        });
                    }
                }
                Err(e) => error!(
                    "Unable to look up orphaned events of unit {}: {:?}",
                    unit.id, e
                ),
            }
        }

        let changes = summary.committed_changes();
        info!(
            unit_id = %unit.id,
            reason = ?self.reason,
            added = changes.added,
            updated = changes.updated,
            cancelled = changes.cancelled,
            "Unit refreshed"
        );

        Ok(summary)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(DispatchOutboxOnUnitRefreshed)]
    }
}

/// One reconciliation pass of a single feed source
async fn reconcile_feed_source(
    unit: &Unit,
    feed_source: &FeedSource,
    ctx: &WardContext,
) -> FeedOutcome {
    let _guard = match ctx.refresh_locks.try_acquire(&feed_source.id) {
        Some(guard) => guard,
        None => {
            warn!(
                feed_source_id = %feed_source.id,
                "Feed source is already being reconciled, skipping it"
            );
            return FeedOutcome::Failed {
                reason: FeedFailure::InProgress,
            };
        }
    };

    let raw = match fetch_feed(feed_source, ctx).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                feed_source_id = %feed_source.id,
                url = %feed_source.url,
                "Unable to fetch feed: {}",
                e
            );
            return FeedOutcome::Failed {
                reason: FeedFailure::Fetch(e.to_string()),
            };
        }
    };

    let observed = ics::parse_with_timezone(&raw, unit.settings.timezone);

    let stored = match ctx
        .repos
        .events
        .find_by_feed_source(&unit.id, &feed_source.id)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            error!(
                "Unable to load stored events of feed source {}: {:?}",
                feed_source.id, e
            );
            return FeedOutcome::Failed {
                reason: FeedFailure::Storage,
            };
        }
    };

    let diff = EventDiff::compute(&stored, observed);
    apply_diff(&unit.id, &feed_source.id, diff, ctx).await
}

/// Cancels every stored event of a feed source that is no longer
/// configured for the unit
async fn purge_orphaned_events(unit: &Unit, feed_source_id: &ID, ctx: &WardContext) -> FeedOutcome {
    let _guard = match ctx.refresh_locks.try_acquire(feed_source_id) {
        Some(guard) => guard,
        None => {
            return FeedOutcome::Failed {
                reason: FeedFailure::InProgress,
            }
        }
    };

    match ctx
        .repos
        .events
        .find_by_feed_source(&unit.id, feed_source_id)
        .await
    {
        Ok(stored) => {
            info!(
                feed_source_id = %feed_source_id,
                events = stored.len(),
                "Purging events of removed feed source"
            );
            let diff = EventDiff::compute(&stored, Vec::new());
            apply_diff(&unit.id, feed_source_id, diff, ctx).await
        }
        Err(e) => {
            error!(
                "Unable to load orphaned events of feed source {}: {:?}",
                feed_source_id, e
            );
            FeedOutcome::Failed {
                reason: FeedFailure::Storage,
            }
        }
    }
}

async fn fetch_feed(feed_source: &FeedSource, ctx: &WardContext) -> Result<String, FetchError> {
    let timeout = ctx.config.feed_fetch_timeout();
    match tokio::time::timeout(timeout, ctx.feed_fetcher.fetch(&feed_source.url, timeout)).await {
        Ok(res) => res,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

async fn apply_diff(
    unit_id: &ID,
    feed_source_id: &ID,
    diff: EventDiff,
    ctx: &WardContext,
) -> FeedOutcome {
    let counts = ChangeCounts::from(&diff);
    if diff.is_empty() {
        return FeedOutcome::Succeeded(counts);
    }

    let change_set = change_set_for_diff(
        unit_id,
        feed_source_id,
        diff,
        ctx.sys.get_timestamp_millis(),
    );
    match ctx.repos.events.apply_diff(change_set).await {
        Ok(records) => {
            info!(
                feed_source_id = %feed_source_id,
                outbox_records = records.len(),
                "Feed source changes committed"
            );
            FeedOutcome::Succeeded(counts)
        }
        Err(e) => {
            error!(
                "Unable to commit changes of feed source {}, nothing was applied: {:?}",
                feed_source_id, e
            );
            FeedOutcome::Failed {
                reason: FeedFailure::Storage,
            }
        }
    }
}

fn outbox_record(unit_id: &ID, event_id: &ID, kind: OutboxKind, now: i64) -> NewOutboxRecord {
    NewOutboxRecord {
        unit_id: *unit_id,
        event_id: *event_id,
        kind,
        created_at: now,
    }
}

fn change_set_for_diff(
    unit_id: &ID,
    feed_source_id: &ID,
    diff: EventDiff,
    now: i64,
) -> FeedChangeSet {
    let mut change_set = FeedChangeSet::default();

    for event in diff.created {
        let unit_event = UnitEvent::new(unit_id, feed_source_id, event, now);
        change_set.outbox.push(outbox_record(
            unit_id,
            &unit_event.id,
            OutboxKind::Created,
            now,
        ));
        change_set.upserts.push(unit_event);
    }

    for (mut unit_event, event) in diff.updated {
        unit_event.event = event;
        unit_event.updated = now;
        change_set.outbox.push(outbox_record(
            unit_id,
            &unit_event.id,
            OutboxKind::Updated,
            now,
        ));
        change_set.upserts.push(unit_event);
    }

    for unit_event in diff.cancelled {
        change_set.outbox.push(outbox_record(
            unit_id,
            &unit_event.id,
            OutboxKind::Cancelled,
            now,
        ));
        change_set.cancellations.push(unit_event.id);
    }

    change_set
}
