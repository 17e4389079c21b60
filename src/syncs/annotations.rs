//! Annotating documents: the session is resolved to a user, and the
//! annotation is stored under that user's id.

use crate::concepts::{annotation, requesting, sessioning};
use crate::core::pattern::{lit, var, Pattern};
use crate::engine::{Sync, Template};

const ADD_ANNOTATION: &str = "/Annotation/addAnnotation";

pub fn all() -> Vec<Sync> {
    vec![handle_add_annotation(), add_annotation_respond(), add_annotation_failed()]
}

fn annotation_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(ADD_ANNOTATION))
        .input("session", var("session"))
        .input("document", var("document"))
        .input("location", var("location"))
        .input("content", var("content"))
        .output("request", var("request"))
}

fn handle_add_annotation() -> Sync {
    Sync::named("handle_add_annotation")
        .when(annotation_request())
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .then(
            Template::of(annotation::add_annotation())
                .arg("documentId", var("document"))
                .arg("userId", var("user"))
                .arg("location", var("location"))
                .arg("content", var("content")),
        )
}

fn add_annotation_respond() -> Sync {
    Sync::named("add_annotation_respond")
        .when(annotation_request())
        .when(
            Pattern::on(annotation::add_annotation())
                .input("documentId", var("document"))
                .output("annotation", var("annotation")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("annotation", var("annotation")),
        )
}

/// Annotating an unregistered document is the concept's own error.
fn add_annotation_failed() -> Sync {
    Sync::named("add_annotation_failed")
        .when(annotation_request())
        .when(
            Pattern::on(annotation::add_annotation())
                .input("documentId", var("document"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}
