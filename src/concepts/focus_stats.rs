//! FocusStats concept: per-user reading sessions with open/close times.

use crate::concepts::{fresh_id, out, str_field, unknown_action, unknown_query, Concept};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONCEPT: &str = "FocusStats";

pub fn init_user() -> ActionName {
    ActionName::new(CONCEPT, "initUser")
}

pub fn start_session() -> ActionName {
    ActionName::new(CONCEPT, "startSession")
}

pub fn end_session() -> ActionName {
    ActionName::new(CONCEPT, "endSession")
}

pub fn get_sessions() -> ActionName {
    ActionName::new(CONCEPT, "_getSessions")
}

struct FocusSession {
    user: String,
    document: String,
    library: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    // user id → stats id
    stats: HashMap<String, String>,
    // focus session id → session
    sessions: HashMap<String, FocusSession>,
    // discovery order for deterministic query rows
    session_order: Vec<String>,
}

#[derive(Default)]
pub struct FocusStats {
    state: Mutex<State>,
}

impl FocusStats {
    fn init_user(&self, input: &Payload) -> Result<Payload, String> {
        let user = str_field(input, "user")?;
        let mut state = self.state.lock().expect("focus state");
        if state.stats.contains_key(&user) {
            return Err(format!("User {user} already has FocusStats initialized."));
        }
        let id = fresh_id("focusStats");
        state.stats.insert(user, id.clone());
        Ok(payload! {"focusStats" => id})
    }

    fn start_session(&self, input: &Payload) -> Result<Payload, String> {
        let user = str_field(input, "user")?;
        let document = str_field(input, "document")?;
        let library = str_field(input, "library")?;
        let mut state = self.state.lock().expect("focus state");
        if !state.stats.contains_key(&user) {
            return Err(format!("User {user} has no FocusStats initialized."));
        }
        let id = fresh_id("focusSession");
        state.sessions.insert(
            id.clone(),
            FocusSession { user, document, library, started_at: Utc::now(), ended_at: None },
        );
        state.session_order.push(id.clone());
        Ok(payload! {"focusSession" => id})
    }

    fn end_session(&self, input: &Payload) -> Result<Payload, String> {
        let id = str_field(input, "focusSession")?;
        let mut state = self.state.lock().expect("focus state");
        let Some(session) = state.sessions.get_mut(&id) else {
            return Err(format!("Focus session {id} does not exist."));
        };
        if session.ended_at.is_some() {
            return Err(format!("Focus session {id} has already ended."));
        }
        session.ended_at = Some(Utc::now());
        Ok(Payload::new())
    }
}

#[async_trait]
impl Concept for FocusStats {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "initUser" => out(self.init_user(input)),
            "startSession" => out(self.start_session(input)),
            "endSession" => out(self.end_session(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, input: &Payload) -> Vec<Payload> {
        match query {
            // One row per session the user ever opened; an open session
            // carries a null endTime.
            "_getSessions" => {
                let Ok(user) = str_field(input, "user") else {
                    return Vec::new();
                };
                let state = self.state.lock().expect("focus state");
                state
                    .session_order
                    .iter()
                    .filter_map(|id| state.sessions.get(id).map(|s| (id, s)))
                    .filter(|(_, session)| session.user == user)
                    .map(|(id, session)| {
                        payload! {
                            "focusSession" => id.clone(),
                            "document" => session.document.clone(),
                            "library" => session.library.clone(),
                            "startTime" => session.started_at.to_rfc3339(),
                            "endTime" => session
                                .ended_at
                                .map(|t| Value::String(t.to_rfc3339()))
                                .unwrap_or(Value::Null),
                        }
                    })
                    .collect()
            }
            other => unknown_query(CONCEPT, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn sessions_track_open_and_closed_state() {
        let focus = FocusStats::default();
        focus.perform("initUser", &payload! {"user" => "u1"}).await;

        let started = focus
            .perform(
                "startSession",
                &payload! {"user" => "u1", "document" => "d1", "library" => "l1"},
            )
            .await;
        let id = started.fields().get("focusSession").unwrap().as_str().unwrap().to_string();

        let rows = focus.query("_getSessions", &payload! {"user" => "u1"}).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("endTime"), Some(&json!(null)));

        focus.perform("endSession", &payload! {"focusSession" => id.clone()}).await;
        let rows = focus.query("_getSessions", &payload! {"user" => "u1"}).await;
        assert_ne!(rows[0].get("endTime"), Some(&json!(null)));

        let again = focus.perform("endSession", &payload! {"focusSession" => id}).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn start_session_requires_initialized_stats() {
        let focus = FocusStats::default();
        let denied = focus
            .perform(
                "startSession",
                &payload! {"user" => "u1", "document" => "d1", "library" => "l1"},
            )
            .await;
        assert_eq!(denied, ActionOutput::err("User u1 has no FocusStats initialized."));
    }
}
