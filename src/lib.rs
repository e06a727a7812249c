//! newsdesk: the API gateway of the newsdesk portal.
//!
//! Every browser-facing `/api` route is a thin relay to the content backend:
//! resolve the caller's session or bearer token, forward the request, relay
//! the JSON reply. The only state kept here is the session table and a
//! translation cache.

pub mod api;
pub mod backend;
pub mod config;
pub mod models;
pub mod store;
