mod error;
mod job_schedulers;
mod shared;
mod status;
mod unit;

use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::{start_dispatch_job, start_scheduled_refresh_job};
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;
use ward_calendar_infra::WardContext;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    status::configure_routes(cfg);
    unit::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: WardContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        Application::start_job_schedulers(context);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: WardContext) {
        start_scheduled_refresh_job(context.clone());
        start_dispatch_job(context);
    }

    async fn configure_server(context: WardContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        info!("Listening on port: {}", port);

        let ctx = web::Data::new(context);
        let server = HttpServer::new(move || {
            App::new()
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(ctx.clone())
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
