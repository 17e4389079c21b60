//! Opening and closing documents: library-membership authorization plus
//! focus-session bookkeeping.

use crate::concepts::{focus_stats, library, requesting};
use crate::core::pattern::{lit, var, Pattern};
use crate::engine::{Sync, Template};
use serde_json::Value;

const OPEN_DOCUMENT: &str = "/Library/openDocument";
const CLOSE_DOCUMENT: &str = "/Library/closeDocument";

pub fn all() -> Vec<Sync> {
    vec![handle_open_document(), handle_close_document()]
}

fn document_request(path: &'static str) -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(path))
        .input("user", var("user"))
        .input("document", var("document"))
        .output("request", var("request"))
}

/// The requested document must live in the user's own library.
fn owns_document(frame: &crate::core::frame::Frame) -> bool {
    match (frame.get("documents").and_then(Value::as_array), frame.get("document")) {
        (Some(documents), Some(document)) => documents.contains(document),
        _ => false,
    }
}

fn handle_open_document() -> Sync {
    Sync::named("handle_open_document")
        .when(document_request(OPEN_DOCUMENT))
        .query(
            library::get_library_by_user(),
            &[("user", var("user"))],
            &[("library", var("library")), ("documents", var("documents"))],
        )
        .filter(owns_document)
        .then(
            Template::of(focus_stats::start_session())
                .arg("user", var("user"))
                .arg("document", var("document"))
                .arg("library", var("library")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("document", var("document")),
        )
}

/// Ends the still-open focus session for this user and document; the
/// query-join's `endTime: null` binding is what selects open sessions.
fn handle_close_document() -> Sync {
    Sync::named("handle_close_document")
        .when(document_request(CLOSE_DOCUMENT))
        .query(
            library::get_library_by_user(),
            &[("user", var("user"))],
            &[("library", var("library")), ("documents", var("documents"))],
        )
        .filter(owns_document)
        .query(
            focus_stats::get_sessions(),
            &[("user", var("user"))],
            &[
                ("focusSession", var("focusSession")),
                ("document", var("document")),
                ("endTime", lit(Value::Null)),
            ],
        )
        .then(Template::of(focus_stats::end_session()).arg("focusSession", var("focusSession")))
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("document", var("document")),
        )
}
