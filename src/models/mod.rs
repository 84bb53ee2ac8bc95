pub mod checkout;
pub mod common;
pub mod discount_code;
pub mod page;

pub use checkout::*;
pub use common::*;
pub use discount_code::*;
pub use page::*;
