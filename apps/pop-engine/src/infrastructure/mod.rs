//! Infrastructure Layer
//!
//! Driver adapters exposing the estimator to the outside world.
//!
//! - `http/`: REST API controllers

pub mod http;
