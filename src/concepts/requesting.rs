//! Requesting concept: the transport anchor and terminus.
//!
//! `request` mints a fresh request id for an incoming call; `respond`
//! echoes response fields back against that id. From the engine's point
//! of view both are ordinary actions; the HTTP layer digs the matching
//! respond record out of the finished chain.

use crate::concepts::{fresh_id, out, str_field, unknown_action, unknown_query, Concept};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;

pub const CONCEPT: &str = "Requesting";

pub fn request() -> ActionName {
    ActionName::new(CONCEPT, "request")
}

pub fn respond() -> ActionName {
    ActionName::new(CONCEPT, "respond")
}

#[derive(Default)]
pub struct Requesting;

impl Requesting {
    fn handle_request(&self) -> Result<Payload, String> {
        Ok(payload! {"request" => fresh_id("req")})
    }

    fn handle_respond(&self, input: &Payload) -> Result<Payload, String> {
        str_field(input, "request")?;
        Ok(Payload::new())
    }
}

#[async_trait]
impl Concept for Requesting {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "request" => out(self.handle_request()),
            "respond" => out(self.handle_respond(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, _input: &Payload) -> Vec<Payload> {
        unknown_query(CONCEPT, query)
    }
}
