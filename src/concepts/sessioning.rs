//! Sessioning concept: opaque session handles for authenticated users.
//!
//! `_getUser` reports an unknown session as a single `{ error }` row
//! rather than zero rows, so rules can branch on authentication failure.

use crate::concepts::{fresh_id, out, str_field, unknown_action, unknown_query, Concept};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONCEPT: &str = "Sessioning";

pub fn create() -> ActionName {
    ActionName::new(CONCEPT, "create")
}

pub fn delete() -> ActionName {
    ActionName::new(CONCEPT, "delete")
}

pub fn get_user() -> ActionName {
    ActionName::new(CONCEPT, "_getUser")
}

#[derive(Default)]
pub struct Sessioning {
    // session id → user id
    sessions: Mutex<HashMap<String, String>>,
}

impl Sessioning {
    fn create(&self, input: &Payload) -> Result<Payload, String> {
        let user = str_field(input, "user")?;
        let session = fresh_id("session");
        self.sessions.lock().expect("session state").insert(session.clone(), user);
        Ok(payload! {"session" => session})
    }

    fn delete(&self, input: &Payload) -> Result<Payload, String> {
        let session = str_field(input, "session")?;
        match self.sessions.lock().expect("session state").remove(&session) {
            Some(_) => Ok(Payload::new()),
            None => Err(format!("Session {session} not found.")),
        }
    }
}

#[async_trait]
impl Concept for Sessioning {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "create" => out(self.create(input)),
            "delete" => out(self.delete(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, input: &Payload) -> Vec<Payload> {
        match query {
            "_getUser" => {
                let Ok(session) = str_field(input, "session") else {
                    return vec![payload! {"error" => "missing session id"}];
                };
                match self.sessions.lock().expect("session state").get(&session) {
                    Some(user) => vec![payload! {"user" => user.clone()}],
                    None => vec![payload! {"error" => "Session not found or expired."}],
                }
            }
            other => unknown_query(CONCEPT, other),
        }
    }
}
