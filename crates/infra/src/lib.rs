mod config;
mod in_flight;
mod rate_limit;
mod repos;
mod services;
mod shared;
mod system;

pub use config::Config;
pub use in_flight::{InFlightGuard, InFlightLocks};
pub use rate_limit::{RateLimitBucket, RateLimiter};
pub use repos::{
    FeedChangeSet, IDispatchCursorRepo, IEventRepo, IFeedSourceRepo, IOutboxRepo, IUnitRepo,
    Repos,
};
pub use services::*;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
pub use system::{ISys, MockSys, RealSys};
use tracing::{info, warn};

#[derive(Clone)]
pub struct WardContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub feed_fetcher: Arc<dyn IFeedFetcher>,
    pub job_queue: Arc<dyn IJobQueue>,
    /// Throttles manual refreshes per actor and unit
    pub rate_limiter: Arc<RateLimiter>,
    /// Feed sources with a reconciliation pass in flight
    pub refresh_locks: Arc<InFlightLocks>,
    /// Units with a dispatch pass in flight
    pub dispatch_locks: Arc<InFlightLocks>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl WardContext {
    fn new(repos: Repos, job_queue: Arc<dyn IJobQueue>) -> Self {
        let config = Config::new();
        let sys: Arc<dyn ISys> = Arc::new(RealSys {});
        let rate_limiter = Arc::new(RateLimiter::new(
            config.manual_refresh_window_millis,
            sys.clone(),
        ));
        Self {
            repos,
            config,
            sys,
            feed_fetcher: Arc::new(HttpFeedFetcher::new()),
            job_queue,
            rate_limiter,
            refresh_locks: Arc::new(InFlightLocks::new()),
            dispatch_locks: Arc::new(InFlightLocks::new()),
        }
    }

    /// Context without any external infrastructure, feeds are still
    /// downloaded over http
    pub fn create_inmemory() -> Self {
        Self::new(Repos::create_inmemory(), Arc::new(InMemoryJobQueue::new()))
    }

    /// Replaces the clock. The rate limiter is rebuilt so that it reads
    /// the same clock.
    pub fn with_sys(mut self, sys: Arc<dyn ISys>) -> Self {
        self.rate_limiter = Arc::new(RateLimiter::new(
            self.config.manual_refresh_window_millis,
            sys.clone(),
        ));
        self.sys = sys;
        self
    }

    pub fn with_feed_fetcher(mut self, feed_fetcher: Arc<dyn IFeedFetcher>) -> Self {
        self.feed_fetcher = feed_fetcher;
        self
    }

    pub fn with_job_queue(mut self, job_queue: Arc<dyn IJobQueue>) -> Self {
        self.job_queue = job_queue;
        self
    }

    async fn create(params: ContextParams) -> Self {
        let pool = connect(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("Database migrations to succeed");
        Self::new(
            Repos::create_postgres(&pool),
            Arc::new(PostgresJobQueue::new(pool)),
        )
    }
}

async fn connect(connection_string: &str) -> Result<PgPool, sqlx::Error> {
    info!("DB CHECKING CONNECTION ...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(connection_string)
        .await?;
    info!("DB CHECKING CONNECTION ... [done]");
    Ok(pool)
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> WardContext {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    let args: Vec<_> = std::env::args().collect();

    // cargo run inmemory
    let inmemory_arg_set = args.len() > 1 && args[1].eq("inmemory");
    if inmemory_arg_set {
        info!("Inmemory argument provided. Going to use inmemory infra.");
        return WardContext::create_inmemory();
    }

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(postgres_connection_string) => {
            info!(
                "{} env var was provided. Going to use postgres.",
                PSQL_CONNECTION_STRING
            );
            WardContext::create(ContextParams {
                postgres_connection_string,
            })
            .await
        }
        Err(_) => {
            warn!(
                "{} env var was not provided. Going to use inmemory infra.",
                PSQL_CONNECTION_STRING
            );
            WardContext::create_inmemory()
        }
    }
}
