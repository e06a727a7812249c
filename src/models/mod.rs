//! Data shapes owned by the gateway itself.
//!
//! News, categories, users, comments and the rest belong to the backend and
//! travel through the gateway as opaque JSON. What lives here is what the
//! gateway produces or keeps:
//!
//! - [`StandardEnvelope`] / [`SimpleError`]: the two response families.
//! - [`SessionRecord`] / [`LoginGrant`]: server-side sessions created at login.
//! - [`TranslateInput`] and friends: bodies of the cached translation routes.

mod envelope;
mod session;
mod translation;

pub use envelope::*;
pub use session::*;
pub use translation::*;
