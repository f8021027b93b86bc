//! Catalog handlers.
//!
//! ## Queries
//! - Listing active products with their credit packages

mod list_products;

pub use list_products::{
    ListProductsHandler, ListProductsQuery, ProductWithPackages,
};
