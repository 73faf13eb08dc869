use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::models::user::SessionUser;

pub trait SessionStore: Send + Sync {
    fn get_user(&self, session_id: &str) -> Option<SessionUser>;
    fn put_user(&self, session_id: &str, user: SessionUser);
    fn remove(&self, session_id: &str);
}

#[derive(Default, Clone)]
pub struct InMemSessionStore(Arc<RwLock<HashMap<String, SessionUser>>>);

impl SessionStore for InMemSessionStore {
    fn get_user(&self, session_id: &str) -> Option<SessionUser> {
        self.0
            .read()
            .expect("session store lock poisoned")
            .get(session_id)
            .cloned()
    }

    fn put_user(&self, session_id: &str, user: SessionUser) {
        self.0
            .write()
            .expect("session store lock poisoned")
            .insert(session_id.to_string(), user);
    }

    fn remove(&self, session_id: &str) {
        self.0
            .write()
            .expect("session store lock poisoned")
            .remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> SessionUser {
        SessionUser {
            email: "employee@test.tld".to_string(),
            user_type: "Employee".to_string(),
        }
    }

    #[test]
    fn round_trips_a_user_record() {
        let store = InMemSessionStore::default();
        store.put_user("abc", employee());
        assert_eq!(store.get_user("abc"), Some(employee()));
    }

    #[test]
    fn unknown_session_yields_none() {
        let store = InMemSessionStore::default();
        assert_eq!(store.get_user("missing"), None);
    }

    #[test]
    fn remove_clears_the_record() {
        let store = InMemSessionStore::default();
        store.put_user("abc", employee());
        store.remove("abc");
        assert_eq!(store.get_user("abc"), None);
    }
}
