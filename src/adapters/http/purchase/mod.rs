//! HTTP adapter for purchase endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreateIntentRequest, CreateIntentResponse,
    IssuedCodeResponse,
};
pub use handlers::{confirm_payment, create_payment_intent, PurchaseApiError, PurchaseAppState};
pub use routes::purchase_routes;
