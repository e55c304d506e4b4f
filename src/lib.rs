// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod shape;
pub mod transport;
pub mod types;

pub use client::{ClientBuilder, TrackerClient};
pub use error::TrackerError;
pub use shape::{OutputShape, Shaped};
