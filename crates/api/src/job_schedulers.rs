use crate::{
    shared::usecase::execute,
    unit::{dispatch_outbox::DispatchOutboxUseCase, refresh_unit::RefreshUnitUseCase},
};
use actix_web::rt::time::interval;
use futures::future::join_all;
use std::time::Duration;
use tracing::{error, info};
use ward_calendar_domain::RefreshReason;
use ward_calendar_infra::WardContext;

fn period(millis: u64) -> Duration {
    Duration::from_millis(millis.max(1))
}

pub fn start_scheduled_refresh_job(ctx: WardContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(period(ctx.config.scheduled_refresh_interval_millis));
        loop {
            interval.tick().await;
            refresh_all_units(&ctx).await;
        }
    });
}

pub fn start_dispatch_job(ctx: WardContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(period(ctx.config.dispatch_interval_millis));
        loop {
            interval.tick().await;
            dispatch_all_units(&ctx).await;
        }
    });
}

/// Units are refreshed concurrently, the feed sources of one unit in order
async fn refresh_all_units(ctx: &WardContext) {
    let units = match ctx.repos.units.find_all().await {
        Ok(units) => units,
        Err(e) => {
            error!("Unable to load units for the scheduled refresh: {:?}", e);
            return;
        }
    };
    info!("Scheduled refresh of {} units", units.len());

    let refreshes = units.into_iter().map(|unit| {
        execute(
            RefreshUnitUseCase {
                unit_id: unit.id,
                reason: RefreshReason::Scheduled,
            },
            ctx,
        )
    });
    join_all(refreshes).await;
}

async fn dispatch_all_units(ctx: &WardContext) {
    let units = match ctx.repos.units.find_all().await {
        Ok(units) => units,
        Err(e) => {
            error!("Unable to load units for dispatching: {:?}", e);
            return;
        }
    };

    let dispatches = units
        .into_iter()
        .map(|unit| execute(DispatchOutboxUseCase { unit_id: unit.id }, ctx));
    join_all(dispatches).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::test_helpers::{feed, setup, TestContext};
    use ward_calendar_domain::{FeedSource, Unit, Url};

    #[actix_web::test]
    async fn refreshes_and_dispatches_every_unit() {
        let TestContext {
            ctx,
            fetcher,
            queue,
            feed_sources,
            ..
        } = setup(1).await;
        fetcher.set_feed(&feed_sources[0].url, feed(&[("a@ward", "A")]));

        let other = Unit::new("Lakeside Ward");
        ctx.repos.units.insert(&other).await.unwrap();
        let other_feed = FeedSource::new(
            &other.id,
            Url::parse("https://calendar.example.org/lakeside.ics").unwrap(),
        );
        ctx.repos.feed_sources.insert(&other_feed).await.unwrap();
        fetcher.set_feed(&other_feed.url, feed(&[("b@ward", "B"), ("c@ward", "C")]));

        refresh_all_units(&ctx).await;
        // The refresh already dispatched, a second pass finds nothing new
        assert_eq!(queue.jobs().len(), 3);
        dispatch_all_units(&ctx).await;
        assert_eq!(queue.submissions(), 3);
    }

    #[test]
    fn zero_period_is_not_allowed() {
        assert_eq!(period(0), Duration::from_millis(1));
        assert_eq!(period(60_000), Duration::from_secs(60));
    }
}
