//! Library concept: one library per user, holding document ids.

use crate::concepts::{fresh_id, out, str_field, unknown_action, unknown_query, Concept};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONCEPT: &str = "Library";

pub fn create_library() -> ActionName {
    ActionName::new(CONCEPT, "createLibrary")
}

pub fn create_document() -> ActionName {
    ActionName::new(CONCEPT, "createDocument")
}

pub fn delete_document() -> ActionName {
    ActionName::new(CONCEPT, "deleteDocument")
}

pub fn get_library_by_user() -> ActionName {
    ActionName::new(CONCEPT, "_getLibraryByUser")
}

struct LibraryDoc {
    documents: Vec<String>,
}

#[derive(Default)]
struct State {
    // library id → library
    libraries: HashMap<String, LibraryDoc>,
    // user id → library id
    by_user: HashMap<String, String>,
}

#[derive(Default)]
pub struct Library {
    state: Mutex<State>,
}

impl Library {
    fn create_library(&self, input: &Payload) -> Result<Payload, String> {
        let user = str_field(input, "user")?;
        let mut state = self.state.lock().expect("library state");
        if state.by_user.contains_key(&user) {
            return Err(format!("User {user} already has a library."));
        }
        let library = fresh_id("library");
        state.by_user.insert(user, library.clone());
        state.libraries.insert(library.clone(), LibraryDoc { documents: Vec::new() });
        Ok(payload! {"library" => library})
    }

    fn create_document(&self, input: &Payload) -> Result<Payload, String> {
        let name = str_field(input, "name")?;
        str_field(input, "epubContent")?;
        let library = str_field(input, "library")?;
        if name.is_empty() {
            return Err("Document name must not be empty.".to_string());
        }
        let mut state = self.state.lock().expect("library state");
        let Some(doc) = state.libraries.get_mut(&library) else {
            return Err(format!("Library {library} does not exist."));
        };
        let document = fresh_id("document");
        doc.documents.push(document.clone());
        Ok(payload! {"document" => document})
    }

    fn delete_document(&self, input: &Payload) -> Result<Payload, String> {
        let document = str_field(input, "document")?;
        let library = str_field(input, "library")?;
        let mut state = self.state.lock().expect("library state");
        let Some(doc) = state.libraries.get_mut(&library) else {
            return Err(format!("Library {library} does not exist."));
        };
        match doc.documents.iter().position(|d| d == &document) {
            Some(index) => {
                doc.documents.remove(index);
                Ok(Payload::new())
            }
            None => Err(format!("Document {document} is not in library {library}.")),
        }
    }
}

#[async_trait]
impl Concept for Library {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "createLibrary" => out(self.create_library(input)),
            "createDocument" => out(self.create_document(input)),
            "deleteDocument" => out(self.delete_document(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, input: &Payload) -> Vec<Payload> {
        match query {
            "_getLibraryByUser" => {
                let Ok(user) = str_field(input, "user") else {
                    return vec![payload! {"error" => "missing user id"}];
                };
                let state = self.state.lock().expect("library state");
                match state.by_user.get(&user).and_then(|id| {
                    state.libraries.get(id).map(|doc| (id.clone(), doc))
                }) {
                    Some((id, doc)) => {
                        vec![payload! {"library" => id, "documents" => doc.documents.clone()}]
                    }
                    None => vec![payload! {"error" => format!("User {user} has no library.")}],
                }
            }
            other => unknown_query(CONCEPT, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_library_per_user() {
        let library = Library::default();
        let input = payload! {"user" => "u1"};
        assert!(!library.perform("createLibrary", &input).await.is_err());
        assert_eq!(
            library.perform("createLibrary", &input).await,
            ActionOutput::err("User u1 already has a library.")
        );
    }

    #[tokio::test]
    async fn documents_show_up_in_the_owner_query() {
        let library = Library::default();
        let created = library.perform("createLibrary", &payload! {"user" => "u1"}).await;
        let library_id =
            created.fields().get("library").unwrap().as_str().unwrap().to_string();

        let doc = library
            .perform(
                "createDocument",
                &payload! {"name" => "Moby Dick", "epubContent" => "bytes", "library" => library_id.clone()},
            )
            .await;
        let document = doc.fields().get("document").unwrap().as_str().unwrap().to_string();

        let rows = library.query("_getLibraryByUser", &payload! {"user" => "u1"}).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("library").unwrap().as_str().unwrap(), library_id);
        let documents = rows[0].get("documents").unwrap().as_array().unwrap();
        assert_eq!(documents, &vec![serde_json::json!(document)]);
    }

    #[tokio::test]
    async fn library_query_reports_an_error_row_for_unknown_users() {
        let library = Library::default();
        let rows = library.query("_getLibraryByUser", &payload! {"user" => "u9"}).await;
        assert_eq!(rows, vec![payload! {"error" => "User u9 has no library."}]);
    }
}
