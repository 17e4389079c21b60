//! The application's synchronization rules, grouped by flow.
//!
//! Every rule re-binds the originating request id, responds through
//! `Requesting.respond`, and handles its own error paths explicitly; the
//! engine never synthesizes a response.

pub mod annotations;
pub mod auth;
pub mod create_document;
pub mod focus;
pub mod settings;
pub mod user_management;

use crate::core::frame::Frame;
use crate::engine::Sync;
use serde_json::Value;

/// All rule sets, in registration order.
pub fn all() -> Vec<Sync> {
    let mut syncs = auth::all();
    syncs.extend(user_management::all());
    syncs.extend(create_document::all());
    syncs.extend(annotations::all());
    syncs.extend(settings::all());
    syncs.extend(focus::all());
    syncs
}

/// A binding rendered as message text.
pub(crate) fn text(frame: &Frame, variable: &str) -> String {
    match frame.get(variable) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
