mod feed_fetcher;
mod job_queue;

pub use feed_fetcher::{FetchError, HttpFeedFetcher, IFeedFetcher, StaticFeedFetcher};
pub use job_queue::{
    IJobQueue, InMemoryJobQueue, PostgresJobQueue, QueueError, SubmitResult,
};
