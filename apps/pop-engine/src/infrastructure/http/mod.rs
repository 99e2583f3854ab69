//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing the PoP estimator over JSON.
//!
//! - `POST /pop`: estimate probability of profit for a position
//! - `GET /status`: engine settings
//! - `GET /health`: liveness

mod controller;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use request::*;
pub use response::*;
