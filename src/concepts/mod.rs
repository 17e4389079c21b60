//! Concepts: independent modules exposing actions and queries over their
//! own storage. Concepts never call each other; all cross-concept
//! behavior goes through sync rules.

pub mod annotation;
pub mod focus_stats;
pub mod library;
pub mod profile;
pub mod requesting;
pub mod sessioning;
pub mod text_settings;

use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::engine::error::EngineError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Actions take a concrete input mapping and return a success mapping or
/// `{ error }`. Queries return zero or more rows; "not found" is zero
/// rows unless the query documents a single error-shaped row instead.
#[async_trait]
pub trait Concept: Send + Sync {
    fn name(&self) -> &'static str;

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput;

    async fn query(&self, query: &str, input: &Payload) -> Vec<Payload>;
}

/// Concept lookup table, fixed after startup.
#[derive(Default, Clone)]
pub struct ConceptRegistry {
    concepts: HashMap<String, Arc<dyn Concept>>,
}

impl ConceptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, concept: Arc<dyn Concept>) {
        self.concepts.insert(concept.name().to_string(), concept);
    }

    pub fn contains(&self, concept: &str) -> bool {
        self.concepts.contains_key(concept)
    }

    fn lookup(&self, concept: &str) -> Result<&Arc<dyn Concept>, EngineError> {
        self.concepts
            .get(concept)
            .ok_or_else(|| EngineError::UnknownConcept(concept.to_string()))
    }

    pub async fn perform(
        &self,
        action: &ActionName,
        input: &Payload,
    ) -> Result<ActionOutput, EngineError> {
        let concept = self.lookup(&action.concept)?;
        Ok(concept.perform(&action.action, input).await)
    }

    pub async fn query(
        &self,
        query: &ActionName,
        input: &Payload,
    ) -> Result<Vec<Payload>, EngineError> {
        let concept = self.lookup(&query.concept)?;
        Ok(concept.query(&query.action, input).await)
    }
}

/// A fresh prefixed identifier, e.g. `user:9f3a51c2`.
pub(crate) fn fresh_id(prefix: &str) -> String {
    format!("{}:{:08x}", prefix, rand::random::<u32>())
}

/// Unknown-operation fallbacks shared by every concept.
pub(crate) fn unknown_action(concept: &str, action: &str) -> ActionOutput {
    ActionOutput::err(format!("{concept} has no action '{action}'"))
}

pub(crate) fn unknown_query(concept: &str, query: &str) -> Vec<Payload> {
    vec![crate::payload! {"error" => format!("{concept} has no query '{query}'")}]
}

/// Read a required string field, or produce the business error the
/// concept reports for a malformed input.
pub(crate) fn str_field(input: &Payload, field: &str) -> Result<String, String> {
    input
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("missing or non-string field '{field}'"))
}

pub(crate) fn num_field(input: &Payload, field: &str) -> Result<f64, String> {
    input
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| format!("missing or non-numeric field '{field}'"))
}

/// Lift a concept action's `Result` into the output contract.
pub(crate) fn out(result: Result<Payload, String>) -> ActionOutput {
    match result {
        Ok(fields) => ActionOutput::Ok(fields),
        Err(message) => ActionOutput::Err(message),
    }
}
