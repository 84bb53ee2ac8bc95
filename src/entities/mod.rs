pub mod discount_codes;
pub mod pages;

pub use discount_codes as discount_code_entity;
pub use pages as page_entity;
pub use pages::Theme;
