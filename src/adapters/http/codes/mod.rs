//! HTTP adapter for code administration endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{GenerateCodesRequest, GenerateCodesResponse, GeneratedCodeResponse};
pub use handlers::{generate_codes, CodesApiError, CodesAppState};
pub use routes::codes_routes;
