//! Document creation and deletion: the `where`-clause driven flows. The
//! request's session is resolved to a user, the user's library is
//! fetched, and the client-supplied library id must match the owned one
//! before anything side-effecting runs.

use crate::concepts::{annotation, library, requesting, sessioning, text_settings};
use crate::core::pattern::{lit, var, Pattern};
use crate::engine::{Sync, Template};
use crate::syncs::text;
use serde_json::json;

const CREATE_DOCUMENT: &str = "/Library/createDocument";
const DELETE_DOCUMENT: &str = "/Library/deleteDocument";

const DOCUMENT_FONT: &str = "serif";
const DOCUMENT_FONT_SIZE: i64 = 16;
const DOCUMENT_LINE_HEIGHT: i64 = 24;

pub fn all() -> Vec<Sync> {
    vec![
        create_document_authorized(),
        create_document_continue(),
        invalid_session(),
        no_library(),
        unauthorized_library(),
        create_document_failed(),
        register_document_failed(),
        document_settings_failed(),
        delete_document_authorized(),
        delete_document_respond(),
        delete_document_failed(),
    ]
}

fn create_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(CREATE_DOCUMENT))
        .input("name", var("name"))
        .input("epubContent", var("epubContent"))
        .input("session", var("session"))
        .input("library", var("library"))
        .output("request", var("request"))
}

/// Authenticate, authorize, and only then create the document.
fn create_document_authorized() -> Sync {
    Sync::named("create_document_authorized")
        .when(create_request())
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .query(
            library::get_library_by_user(),
            &[("user", var("user"))],
            &[("library", var("userLibrary"))],
        )
        .filter(|frame| frame.get("library") == frame.get("userLibrary"))
        .then(
            Template::of(library::create_document())
                .arg("name", var("name"))
                .arg("epubContent", var("epubContent"))
                .arg("library", var("library")),
        )
}

/// The document exists: register it for annotation, apply default
/// document text settings, and answer the request.
fn create_document_continue() -> Sync {
    Sync::named("create_document_continue")
        .when(
            Pattern::on(requesting::request())
                .input("path", lit(CREATE_DOCUMENT))
                .input("session", var("session"))
                .input("library", var("library"))
                .output("request", var("request")),
        )
        .when(
            Pattern::on(library::create_document())
                .input("library", var("library"))
                .output("document", var("document")),
        )
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .then(
            Template::of(annotation::register_document())
                .arg("documentId", var("document"))
                .arg("creatorId", var("user")),
        )
        .then(
            Template::of(text_settings::create_document_settings())
                .arg("document", var("document"))
                .arg("font", lit(DOCUMENT_FONT))
                .arg("fontSize", lit(DOCUMENT_FONT_SIZE))
                .arg("lineHeight", lit(DOCUMENT_LINE_HEIGHT)),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("document", var("document"))
                .arg("message", lit("Document created successfully.")),
        )
}

fn session_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(CREATE_DOCUMENT))
        .input("session", var("session"))
        .output("request", var("request"))
}

/// The session id is unknown or expired.
fn invalid_session() -> Sync {
    Sync::named("create_document_invalid_session")
        .when(session_request())
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("error", var("authError"))],
        )
        .extend(&["fullError"], |frame| {
            let message = format!("Authentication failed: {}", text(frame, "authError"));
            frame.insert("fullError".to_string(), json!(message));
        })
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("fullError")),
        )
}

/// The user is valid but owns no library.
fn no_library() -> Sync {
    Sync::named("create_document_no_library")
        .when(session_request())
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .query(
            library::get_library_by_user(),
            &[("user", var("user"))],
            &[("error", var("libraryError"))],
        )
        .extend(&["fullError"], |frame| {
            let message = format!("Library lookup failed: {}", text(frame, "libraryError"));
            frame.insert("fullError".to_string(), json!(message));
        })
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("fullError")),
        )
}

/// The supplied library id belongs to someone else.
fn unauthorized_library() -> Sync {
    Sync::named("create_document_unauthorized")
        .when(
            Pattern::on(requesting::request())
                .input("path", lit(CREATE_DOCUMENT))
                .input("session", var("session"))
                .input("library", var("library"))
                .output("request", var("request")),
        )
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .query(
            library::get_library_by_user(),
            &[("user", var("user"))],
            &[("library", var("userLibrary"))],
        )
        .filter(|frame| frame.get("library") != frame.get("userLibrary"))
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg(
                    "error",
                    lit("Authorization failed: the provided library does not belong to the authenticated user."),
                ),
        )
}

fn create_document_failed() -> Sync {
    Sync::named("create_document_failed")
        .when(
            Pattern::on(requesting::request())
                .input("path", lit(CREATE_DOCUMENT))
                .input("library", var("library"))
                .output("request", var("request")),
        )
        .when(
            Pattern::on(library::create_document())
                .input("library", var("library"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn register_document_failed() -> Sync {
    Sync::named("register_document_failed")
        .when(session_request())
        .when(Pattern::on(annotation::register_document()).output("error", var("error")))
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn delete_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(DELETE_DOCUMENT))
        .input("session", var("session"))
        .input("library", var("library"))
        .input("document", var("document"))
        .output("request", var("request"))
}

/// Same gate as creation: the supplied library must belong to the
/// session's user.
fn delete_document_authorized() -> Sync {
    Sync::named("delete_document_authorized")
        .when(delete_request())
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .query(
            library::get_library_by_user(),
            &[("user", var("user"))],
            &[("library", var("userLibrary"))],
        )
        .filter(|frame| frame.get("library") == frame.get("userLibrary"))
        .then(
            Template::of(library::delete_document())
                .arg("document", var("document"))
                .arg("library", var("library")),
        )
}

fn delete_document_respond() -> Sync {
    Sync::named("delete_document_respond")
        .when(delete_request())
        .when(
            Pattern::on(library::delete_document())
                .input("document", var("document"))
                .input("library", var("library")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("document", var("document"))
                .arg("message", lit("Document deleted successfully.")),
        )
}

fn delete_document_failed() -> Sync {
    Sync::named("delete_document_failed")
        .when(delete_request())
        .when(
            Pattern::on(library::delete_document())
                .input("document", var("document"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn document_settings_failed() -> Sync {
    Sync::named("document_settings_failed")
        .when(session_request())
        .when(
            Pattern::on(text_settings::create_document_settings()).output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}
