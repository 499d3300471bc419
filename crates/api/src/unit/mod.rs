mod add_feed_source;
mod create_unit;
pub mod dispatch_outbox;
mod get_outbox;
mod get_unit;
pub mod refresh_unit;
mod remove_feed_source;
mod subscribers;
#[cfg(test)]
pub(crate) mod test_helpers;
mod update_unit;

use actix_web::web;
use add_feed_source::add_feed_source_controller;
use create_unit::create_unit_controller;
use dispatch_outbox::dispatch_outbox_controller;
use get_outbox::get_outbox_controller;
use get_unit::get_unit_controller;
use refresh_unit::refresh_unit_controller;
use remove_feed_source::remove_feed_source_controller;
use update_unit::update_unit_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/units", web::post().to(create_unit_controller));
    cfg.route("/units/{unit_id}", web::get().to(get_unit_controller));
    cfg.route("/units/{unit_id}", web::put().to(update_unit_controller));

    cfg.route(
        "/units/{unit_id}/feeds",
        web::post().to(add_feed_source_controller),
    );
    cfg.route(
        "/units/{unit_id}/feeds/{feed_source_id}",
        web::delete().to(remove_feed_source_controller),
    );

    cfg.route(
        "/units/{unit_id}/refresh",
        web::post().to(refresh_unit_controller),
    );

    cfg.route("/units/{unit_id}/outbox", web::get().to(get_outbox_controller));
    cfg.route(
        "/units/{unit_id}/outbox/dispatch",
        web::post().to(dispatch_outbox_controller),
    );
}
