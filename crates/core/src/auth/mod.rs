//! Local authentication: offline credential check and session storage.

mod auth_session;
mod local_auth_service;

pub use auth_session::AuthSession;
pub use local_auth_service::LocalAuthService;
