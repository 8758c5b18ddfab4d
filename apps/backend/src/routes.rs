use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(crate::health::configure)
        .route("/game_ws", web::get().to(crate::ws::session::upgrade));
}
