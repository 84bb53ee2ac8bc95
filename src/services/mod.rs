pub mod checkout_service;
pub mod discount_code_service;
pub mod fulfillment_service;
pub mod page_service;

pub use checkout_service::*;
pub use discount_code_service::*;
pub use fulfillment_service::*;
pub use page_service::*;
