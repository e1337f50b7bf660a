//! Authentication Module
//! Mission: Secure API access with hashed credentials, JWT tokens and role checks

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, CurrentUser};
pub use models::User;
pub use user_store::UserStore;
