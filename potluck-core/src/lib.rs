#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod controllers;
pub mod error;
pub mod gateway;
pub mod hub;
pub mod utils;
