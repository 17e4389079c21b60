//! Node: wires the concept registry and rule sets into one engine and
//! exposes the request/respond round trip the transport layer uses.

mod config;

pub use config::NodeConfig;

use crate::concepts::{
    annotation::Annotation, focus_stats::FocusStats, library::Library, profile::Profile,
    requesting::{self, Requesting}, sessioning::Sessioning, text_settings::TextSettings,
    ConceptRegistry,
};
use crate::core::record::{ActionOutput, Payload, ShapeError};
use crate::engine::{Chain, Engine, EngineError};
use crate::syncs;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("request body must be a JSON object")]
    BadRequest,

    #[error("rule produced a malformed response: {0}")]
    MalformedResponse(#[from] ShapeError),

    #[error("no rule responded to '{path}'")]
    NoResponder { path: String },
}

pub struct Node {
    engine: Engine,
    app: String,
}

impl Node {
    /// Build the registry, register every rule set, and fail fast on any
    /// authoring error.
    pub fn new(config: NodeConfig) -> Result<Self, EngineError> {
        let mut registry = ConceptRegistry::new();
        registry.register(Arc::new(Requesting));
        registry.register(Arc::new(Profile::default()));
        registry.register(Arc::new(Sessioning::default()));
        registry.register(Arc::new(Library::default()));
        registry.register(Arc::new(Annotation::default()));
        registry.register(Arc::new(FocusStats::default()));
        registry.register(Arc::new(TextSettings::default()));

        let mut engine = Engine::new(registry);
        engine.register_all(syncs::all())?;
        tracing::info!(app = %config.app, syncs = engine.syncs().len(), "node ready");
        Ok(Self { engine, app: config.app })
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Turn one external call into a causal chain: dispatch the anchoring
    /// `Requesting.request` action, run the cascade to its fixed point,
    /// and dig the matching `Requesting.respond` out of the finished
    /// chain. A chain no rule responded to is surfaced as an error; the
    /// engine itself never synthesizes a response.
    pub async fn handle(&self, path: &str, body: Value) -> Result<Value, NodeError> {
        let Value::Object(fields) = body else {
            return Err(NodeError::BadRequest);
        };
        let mut input: Payload = fields.into_iter().collect();
        input.insert("path".to_string(), json!(path));

        let chain = self.engine.dispatch(requesting::request(), input).await?;
        match extract_response(&chain) {
            Some(fields) => Ok(shape_response(fields)?),
            None => Err(NodeError::NoResponder { path: path.to_string() }),
        }
    }
}

/// The response fields of the first successful respond record matching
/// the chain's originating request id.
fn extract_response(chain: &Chain) -> Option<Payload> {
    let request_id = chain.records().first()?.output.fields().get("request")?.clone();
    chain
        .records()
        .iter()
        .find(|record| {
            record.action == requesting::respond()
                && record.input.get("request") == Some(&request_id)
                && !record.output.is_err()
        })
        .map(|record| {
            let mut fields = record.input.clone();
            fields.remove("request");
            fields
        })
}

/// A response must leave the node either success-shaped or as exactly
/// `{ error }`; a rule that mixes the two is an authoring bug surfaced
/// here instead of handed to the caller.
fn shape_response(fields: Payload) -> Result<Value, ShapeError> {
    let output = ActionOutput::from_value(Value::Object(fields.into_iter().collect()))?;
    Ok(output.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload;
    use serde_json::json;

    #[test]
    fn responses_must_not_mix_error_and_success_fields() {
        let ok = shape_response(payload! {"user" => "u1", "session" => "s1"}).unwrap();
        assert_eq!(ok, json!({"user": "u1", "session": "s1"}));

        let err = shape_response(payload! {"error" => "nope"}).unwrap();
        assert_eq!(err, json!({"error": "nope"}));

        let mixed = shape_response(payload! {"error" => "nope", "user" => "u1"});
        assert_eq!(mixed, Err(ShapeError::MixedShape));
    }
}
