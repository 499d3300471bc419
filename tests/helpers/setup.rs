use std::sync::Arc;
use ward_calendar_api::Application;
use ward_calendar_domain::{Url, ID};
use ward_calendar_infra::{InMemoryJobQueue, StaticFeedFetcher, WardContext};
use ward_calendar_sdk::WardSDK;

pub struct TestApp {
    pub ctx: WardContext,
    pub fetcher: Arc<StaticFeedFetcher>,
    pub queue: Arc<InMemoryJobQueue>,
}

impl TestApp {
    pub fn feed_url(&self, unit_id: &ID, name: &str) -> Url {
        Url::parse(&format!("https://calendar.example.org/{}/{}.ics", unit_id, name))
            .expect("Valid feed url")
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, WardSDK) {
    let fetcher = Arc::new(StaticFeedFetcher::new());
    let queue = Arc::new(InMemoryJobQueue::new());
    let mut ctx = WardContext::create_inmemory()
        .with_feed_fetcher(fetcher.clone())
        .with_job_queue(queue.clone());
    ctx.config.port = 0; // Random port
    // Only the requests of the tests should trigger work
    ctx.config.scheduled_refresh_interval_millis = 60 * 60 * 1000;
    ctx.config.dispatch_interval_millis = 60 * 60 * 1000;
    ctx.config.manual_refresh_max_attempts = 2;

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp {
        ctx,
        fetcher,
        queue,
    };
    let sdk = WardSDK::new(address);
    (app, sdk)
}

/// Feed text with one timed event per `(uid, summary)` pair
pub fn feed(events: &[(&str, &str)]) -> String {
    let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Ward//Calendar//EN\r\n");
    for (uid, summary) in events {
        ics.push_str("BEGIN:VEVENT\r\n");
        ics.push_str(&format!("UID:{}\r\n", uid));
        ics.push_str(&format!("SUMMARY:{}\r\n", summary));
        ics.push_str("DTSTART:20261108T170000Z\r\n");
        ics.push_str("DTEND:20261108T180000Z\r\n");
        ics.push_str("END:VEVENT\r\n");
    }
    ics.push_str("END:VCALENDAR\r\n");
    ics
}
