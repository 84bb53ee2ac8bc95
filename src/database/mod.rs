pub mod connection;
pub mod discount_store;
pub mod page_store;

pub use connection::{DbPool, create_pool, run_migrations};
pub use discount_store::{DbDiscountStore, DiscountStore};
pub use page_store::{DbPageStore, PageStore};
