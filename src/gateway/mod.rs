//! Backend gateway: endpoint routing and the HTTP transport

pub mod client;
pub mod routes;

pub use client::{BackendRequest, HttpMethod, HttpTransport, ReqwestTransport};
pub use routes::route;
