//! The synchronization engine: rule representation and the cascading
//! dispatcher.
//!
//! # Evaluation flow
//!
//! ```text
//! Requesting.request ──▶ ActionRecord appended to Chain
//!                              │
//!                              ▼
//!                  every registered Sync whose `when`
//!                  mentions the new record's action
//!                              │
//!              join `when` against chain history (anchored
//!              on the new record) ──▶ Frames
//!                              │
//!              `where` refinements: query-join / filter / extend
//!                              │
//!              instantiate `then` templates per frame and
//!              queue the invocations ──▶ new ActionRecords
//! ```
//!
//! The loop runs until a dispatch round produces no newly satisfied rule.

pub mod dispatch;
pub mod error;
pub mod sync;

pub use dispatch::{Chain, Engine};
pub use error::EngineError;
pub use sync::{Refinement, Sync, Template};
