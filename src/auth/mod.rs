//! Authentication: register, login, logout, refresh, JWT.

mod handlers;
mod jwt;
mod service;

pub use handlers::{login, logout, refresh, register};
pub use jwt::{IssuedToken, JwtSecret, SessionClaims};
pub use service::{validate_login, validate_registration, AuthAppService};
