//! Catalog domain - products and the credit packages sold for them.

mod package;
mod product;

pub use package::CreditPackage;
pub use product::{Product, ProductStatus};
