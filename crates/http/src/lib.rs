//! # sheetbridge-http
//!
//! HTTP transport for the Google REST APIs.
//!
//! - [`Authenticator`] turns credentials into bearer tokens.
//! - [`GoogleHttp`] sends authenticated requests to one service and maps
//!   error responses to `BridgeError::Remote`.
//! - [`RelatedBody`] builds `multipart/related` upload bodies.

mod auth;
mod client;
mod multipart;

pub use auth::{Authenticator, SCOPES};
pub use client::{build_client, GoogleHttp};
pub use multipart::RelatedBody;

/// Re-export of the HTTP types service clients need.
pub use reqwest::{Method, Url};
