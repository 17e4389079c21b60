//! Synapse: a concept synchronization engine.
//!
//! Independent concept modules (library, annotations, focus tracking,
//! text settings, profile/auth) never call each other. Cross-concept
//! behavior is written as declarative sync rules and evaluated by a
//! central dispatch engine over the action stream of one request.
//!
//! # Architecture
//!
//! ```text
//! HTTP request ──▶ Requesting.request (chain anchor)
//!                        │
//!                        ▼
//!                  Engine (per-chain record log)
//!                   ├── when: join patterns against the chain
//!                   ├── where: query-join / filter / extend frames
//!                   └── then: invoke concept actions ──▶ new records
//!                        │                (cascade to fixed point)
//!                        ▼
//!                  Requesting.respond (chain terminus)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use synapse::{Node, NodeConfig};
//! use serde_json::json;
//!
//! let node = Node::new(NodeConfig::new("reader"))?;
//! let response = node
//!     .handle("/auth/login", json!({"username": "alice", "password": "p"}))
//!     .await?;
//! ```

pub mod concepts;
pub mod core;
pub mod engine;
pub mod logging;
pub mod node;
pub mod runtime;
pub mod server;
pub mod syncs;

pub use crate::core::frame::{join_all, Frame, Frames};
pub use crate::core::pattern::{lit, var, Pattern, Term};
pub use crate::core::record::{ActionName, ActionOutput, ActionRecord, Payload, ShapeError};
pub use concepts::{Concept, ConceptRegistry};
pub use engine::{Chain, Engine, EngineError, Refinement, Sync, Template};
pub use node::{Node, NodeConfig, NodeError};
pub use server::create_router;
