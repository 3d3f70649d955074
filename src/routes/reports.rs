use actix_web::web;

use crate::handlers::reports;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports").route("/{report_type}", web::get().to(reports::get_report)),
    );
}
