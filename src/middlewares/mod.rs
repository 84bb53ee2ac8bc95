pub mod admin_key;
pub mod cors;

pub use admin_key::{ADMIN_KEY_HEADER, AdminKeyMiddleware};
pub use cors::create_cors;
