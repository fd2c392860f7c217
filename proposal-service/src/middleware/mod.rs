mod auth;

pub use auth::{AuthContext, Role};
