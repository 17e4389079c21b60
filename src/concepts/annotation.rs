//! Annotation concept: registers documents and stores annotations on them.

use crate::concepts::{fresh_id, out, str_field, unknown_action, unknown_query, Concept};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONCEPT: &str = "Annotation";

pub fn register_document() -> ActionName {
    ActionName::new(CONCEPT, "registerDocument")
}

pub fn add_annotation() -> ActionName {
    ActionName::new(CONCEPT, "addAnnotation")
}

pub fn get_annotations() -> ActionName {
    ActionName::new(CONCEPT, "_getAnnotations")
}

struct Note {
    id: String,
    user: String,
    location: String,
    content: String,
}

#[derive(Default)]
struct State {
    // document id → creator id
    registered: HashMap<String, String>,
    // document id → annotations
    notes: HashMap<String, Vec<Note>>,
}

#[derive(Default)]
pub struct Annotation {
    state: Mutex<State>,
}

impl Annotation {
    fn register_document(&self, input: &Payload) -> Result<Payload, String> {
        let document = str_field(input, "documentId")?;
        let creator = str_field(input, "creatorId")?;
        let mut state = self.state.lock().expect("annotation state");
        if state.registered.contains_key(&document) {
            return Err(format!("Document {document} is already registered."));
        }
        state.registered.insert(document, creator);
        Ok(Payload::new())
    }

    fn add_annotation(&self, input: &Payload) -> Result<Payload, String> {
        let document = str_field(input, "documentId")?;
        let user = str_field(input, "userId")?;
        let location = str_field(input, "location")?;
        let content = str_field(input, "content")?;
        let mut state = self.state.lock().expect("annotation state");
        if !state.registered.contains_key(&document) {
            return Err(format!("Document {document} is not registered for annotation."));
        }
        let id = fresh_id("annotation");
        state
            .notes
            .entry(document)
            .or_default()
            .push(Note { id: id.clone(), user, location, content });
        Ok(payload! {"annotation" => id})
    }
}

#[async_trait]
impl Concept for Annotation {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "registerDocument" => out(self.register_document(input)),
            "addAnnotation" => out(self.add_annotation(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, input: &Payload) -> Vec<Payload> {
        match query {
            // Zero rows for an unknown document: absence, not an error.
            "_getAnnotations" => {
                let Ok(document) = str_field(input, "documentId") else {
                    return Vec::new();
                };
                let state = self.state.lock().expect("annotation state");
                state
                    .notes
                    .get(&document)
                    .map(|notes| {
                        notes
                            .iter()
                            .map(|note| {
                                payload! {
                                    "annotation" => note.id.clone(),
                                    "userId" => note.user.clone(),
                                    "location" => note.location.clone(),
                                    "content" => note.content.clone(),
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            }
            other => unknown_query(CONCEPT, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn annotations_require_a_registered_document() {
        let annotation = Annotation::default();
        let add = payload! {
            "documentId" => "d1", "userId" => "u1",
            "location" => "ch1", "content" => "note",
        };
        assert!(annotation.perform("addAnnotation", &add).await.is_err());

        let register = payload! {"documentId" => "d1", "creatorId" => "u1"};
        assert!(!annotation.perform("registerDocument", &register).await.is_err());
        assert!(annotation.perform("registerDocument", &register).await.is_err());

        assert!(!annotation.perform("addAnnotation", &add).await.is_err());
        let rows = annotation.query("_getAnnotations", &payload! {"documentId" => "d1"}).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("content").unwrap(), "note");
    }

    #[tokio::test]
    async fn unknown_documents_have_zero_annotation_rows() {
        let annotation = Annotation::default();
        let rows = annotation.query("_getAnnotations", &payload! {"documentId" => "dx"}).await;
        assert!(rows.is_empty());
    }
}
