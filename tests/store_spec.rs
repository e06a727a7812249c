use std::thread::sleep;
use std::time::Duration;

use newsdesk::models::LoginGrant;
use newsdesk::store::{SessionStore, TranslationCache};
use serde_json::json;
use speculate2::speculate;

fn grant(token: &str) -> LoginGrant {
    LoginGrant {
        access_token: token.to_string(),
        user: Some(json!({"id": 1, "name": "Editor"})),
    }
}

speculate! {
    describe "session store" {
        before {
            let sessions = SessionStore::new(Duration::from_secs(3600));
        }

        describe "create" {
            it "issues distinct ids for each login" {
                let first = sessions.create(grant("a"));
                let second = sessions.create(grant("b"));

                assert_ne!(first.id, second.id);
                assert_eq!(sessions.len(), 2);
            }

            it "sets expiry one ttl after creation" {
                let record = sessions.create(grant("a"));
                assert_eq!((record.expires_at - record.created_at).num_seconds(), 3600);
            }
        }

        describe "get" {
            it "returns the stored token and user" {
                let record = sessions.create(grant("backend-token"));

                let found = sessions.get(&record.id).expect("session should exist");
                assert_eq!(found.access_token, "backend-token");
                assert_eq!(found.user, Some(json!({"id": 1, "name": "Editor"})));
            }

            it "returns None for unknown ids" {
                assert!(sessions.get("no-such-session").is_none());
            }

            it "drops sessions once they expire" {
                let short = SessionStore::new(Duration::from_millis(10));
                let record = short.create(grant("a"));

                sleep(Duration::from_millis(20));

                assert!(short.get(&record.id).is_none());
                assert!(short.is_empty());
            }
        }

        describe "revoke" {
            it "removes the session" {
                let record = sessions.create(grant("a"));

                assert!(sessions.revoke(&record.id));
                assert!(sessions.get(&record.id).is_none());
            }

            it "reports false for unknown ids" {
                assert!(!sessions.revoke("missing"));
            }
        }

        describe "purge_expired" {
            it "removes only expired sessions" {
                let short = SessionStore::new(Duration::from_millis(10));
                short.create(grant("a"));
                short.create(grant("b"));
                sleep(Duration::from_millis(20));

                assert_eq!(short.purge_expired(), 2);
                assert!(short.is_empty());

                sessions.create(grant("c"));
                assert_eq!(sessions.purge_expired(), 0);
                assert_eq!(sessions.len(), 1);
            }
        }
    }

    describe "translation cache" {
        before {
            let cache = TranslationCache::new(2);
        }

        it "misses before insert and hits after" {
            assert!(cache.get("Hola", "en").is_none());

            cache.insert("Hola", "en", "Hello");

            assert_eq!(cache.get("Hola", "en").as_deref(), Some("Hello"));
        }

        it "keys on target language case-insensitively" {
            cache.insert("Hola", "EN", "Hello");

            assert_eq!(cache.get("Hola", "en").as_deref(), Some("Hello"));
            assert!(cache.get("Hola", "fr").is_none());
        }

        it "matches text exactly" {
            cache.insert("Hola", "en", "Hello");

            assert!(cache.get("hola", "en").is_none());
        }

        it "evicts the least recently used entry at capacity" {
            cache.insert("uno", "en", "one");
            cache.insert("dos", "en", "two");
            cache.get("uno", "en");
            cache.insert("tres", "en", "three");

            assert_eq!(cache.len(), 2);
            assert!(cache.get("dos", "en").is_none());
            assert_eq!(cache.get("uno", "en").as_deref(), Some("one"));
            assert_eq!(cache.get("tres", "en").as_deref(), Some("three"));
        }

        it "never has zero capacity" {
            assert_eq!(TranslationCache::new(0).capacity(), 1);
        }
    }
}
