//! Access to the content backend that owns every news, category, user and
//! comment record the gateway fronts.

mod client;

pub use client::*;
