//! TextSettings concept: rendering preferences per user and per document.

use crate::concepts::{
    fresh_id, num_field, out, str_field, unknown_action, unknown_query, Concept,
};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONCEPT: &str = "TextSettings";

pub fn create_user_settings() -> ActionName {
    ActionName::new(CONCEPT, "createUserSettings")
}

pub fn create_document_settings() -> ActionName {
    ActionName::new(CONCEPT, "createDocumentSettings")
}

pub fn update_user_settings() -> ActionName {
    ActionName::new(CONCEPT, "updateUserSettings")
}

pub fn get_user_settings() -> ActionName {
    ActionName::new(CONCEPT, "_getUserSettings")
}

#[derive(Clone)]
struct Settings {
    id: String,
    font: String,
    font_size: f64,
    line_height: f64,
}

#[derive(Default)]
struct State {
    // user id → settings
    by_user: HashMap<String, Settings>,
    // document id → settings
    by_document: HashMap<String, Settings>,
}

#[derive(Default)]
pub struct TextSettings {
    state: Mutex<State>,
}

fn read_settings(input: &Payload) -> Result<Settings, String> {
    let font = str_field(input, "font")?;
    let font_size = num_field(input, "fontSize")?;
    let line_height = num_field(input, "lineHeight")?;
    if font.is_empty() {
        return Err("Font must not be empty.".to_string());
    }
    if font_size <= 0.0 || line_height <= 0.0 {
        return Err("Font size and line height must be positive.".to_string());
    }
    Ok(Settings { id: fresh_id("settings"), font, font_size, line_height })
}

impl TextSettings {
    fn create_user_settings(&self, input: &Payload) -> Result<Payload, String> {
        let user = str_field(input, "user")?;
        let settings = read_settings(input)?;
        let mut state = self.state.lock().expect("settings state");
        if state.by_user.contains_key(&user) {
            return Err(format!("User {user} already has text settings."));
        }
        let id = settings.id.clone();
        state.by_user.insert(user, settings);
        Ok(payload! {"settings" => id})
    }

    fn create_document_settings(&self, input: &Payload) -> Result<Payload, String> {
        let document = str_field(input, "document")?;
        let settings = read_settings(input)?;
        let mut state = self.state.lock().expect("settings state");
        if state.by_document.contains_key(&document) {
            return Err(format!("Document {document} already has text settings."));
        }
        let id = settings.id.clone();
        state.by_document.insert(document, settings);
        Ok(payload! {"settings" => id})
    }

    fn update_user_settings(&self, input: &Payload) -> Result<Payload, String> {
        let user = str_field(input, "user")?;
        let updated = read_settings(input)?;
        let mut state = self.state.lock().expect("settings state");
        let Some(existing) = state.by_user.get_mut(&user) else {
            return Err(format!("User {user} has no text settings."));
        };
        existing.font = updated.font;
        existing.font_size = updated.font_size;
        existing.line_height = updated.line_height;
        Ok(payload! {"settings" => existing.id.clone()})
    }
}

#[async_trait]
impl Concept for TextSettings {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "createUserSettings" => out(self.create_user_settings(input)),
            "createDocumentSettings" => out(self.create_document_settings(input)),
            "updateUserSettings" => out(self.update_user_settings(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, input: &Payload) -> Vec<Payload> {
        match query {
            "_getUserSettings" => {
                let Ok(user) = str_field(input, "user") else {
                    return Vec::new();
                };
                let state = self.state.lock().expect("settings state");
                state
                    .by_user
                    .get(&user)
                    .map(|s| {
                        vec![payload! {
                            "settings" => s.id.clone(),
                            "font" => s.font.clone(),
                            "fontSize" => s.font_size,
                            "lineHeight" => s.line_height,
                        }]
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
    async fn settings_are_validated_and_unique_per_user() {
        let settings = TextSettings::default();
        let bad = settings
            .perform(
                "createUserSettings",
                &payload! {"user" => "u1", "font" => "serif", "fontSize" => -2, "lineHeight" => 24},
            )
            .await;
        assert_eq!(bad, ActionOutput::err("Font size and line height must be positive."));

        let good = payload! {"user" => "u1", "font" => "serif", "fontSize" => 16, "lineHeight" => 24};
        assert!(!settings.perform("createUserSettings", &good).await.is_err());
        assert!(settings.perform("createUserSettings", &good).await.is_err());

        let rows = settings.query("_getUserSettings", &payload! {"user" => "u1"}).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("font").unwrap(), "serif");
    }
}
