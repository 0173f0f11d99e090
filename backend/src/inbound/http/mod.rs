//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::web;

pub mod articles;
pub mod auth;
pub mod error;
pub mod profiles;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

pub use crate::domain::ApiResult;

/// Register every route and the JSON extractor configuration.
///
/// # Examples
/// ```
/// use actix_web::App;
///
/// let _app = App::new().configure(conduit::inbound::http::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::update_user)
        .service(profiles::get_profile)
        .service(profiles::follow)
        .service(profiles::unfollow)
        .service(articles::list_articles)
        .service(articles::create_article);
}
