mod telemetry;

use telemetry::{get_subscriber, init_subscriber};
use ward_calendar_api::Application;
use ward_calendar_infra::setup_context;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("ward_calendar".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await;

    let app = Application::new(context).await?;
    app.start().await
}
