//! In-process state the gateway keeps between requests.
//!
//! Neither store is authoritative: sessions map browser cookies to backend
//! tokens, and the translation cache avoids repeating identical backend
//! translations. Both are cheap to clone and safe to share across handlers.

mod sessions;
mod translations;

pub use sessions::SessionStore;
pub use translations::TranslationCache;
