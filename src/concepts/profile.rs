//! Profile concept: account registry and credential checks.

use crate::concepts::{fresh_id, out, str_field, unknown_action, unknown_query, Concept};
use crate::core::record::{ActionName, ActionOutput, Payload};
use crate::payload;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

pub const CONCEPT: &str = "Profile";

pub fn create_account() -> ActionName {
    ActionName::new(CONCEPT, "createAccount")
}

pub fn authenticate() -> ActionName {
    ActionName::new(CONCEPT, "authenticate")
}

struct Account {
    user: String,
    password_digest: String,
}

#[derive(Default)]
pub struct Profile {
    // username → account
    accounts: Mutex<HashMap<String, Account>>,
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl Profile {
    fn create_account(&self, input: &Payload) -> Result<Payload, String> {
        let username = str_field(input, "username")?;
        let password = str_field(input, "password")?;
        let mut accounts = self.accounts.lock().expect("profile state");
        if accounts.contains_key(&username) {
            return Err(format!("Username {username} already exists."));
        }
        let user = fresh_id("user");
        accounts.insert(username, Account { user: user.clone(), password_digest: digest(&password) });
        Ok(payload! {"user" => user})
    }

    fn authenticate(&self, input: &Payload) -> Result<Payload, String> {
        let username = str_field(input, "username")?;
        let password = str_field(input, "password")?;
        let accounts = self.accounts.lock().expect("profile state");
        match accounts.get(&username) {
            Some(account) if account.password_digest == digest(&password) => {
                Ok(payload! {"user" => account.user.clone()})
            }
            _ => Err("Invalid username or password.".to_string()),
        }
    }
}

#[async_trait]
impl Concept for Profile {
    fn name(&self) -> &'static str {
        CONCEPT
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        match action {
            "createAccount" => out(self.create_account(input)),
            "authenticate" => out(self.authenticate(input)),
            other => unknown_action(CONCEPT, other),
        }
    }

    async fn query(&self, query: &str, _input: &Payload) -> Vec<Payload> {
        unknown_query(CONCEPT, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let profile = Profile::default();
        let input = payload! {"username" => "alice", "password" => "p"};
        assert!(!profile.perform("createAccount", &input).await.is_err());

        let dup = profile.perform("createAccount", &input).await;
        assert_eq!(dup, ActionOutput::err("Username alice already exists."));
    }

    #[tokio::test]
    async fn authenticate_checks_the_digest_not_the_raw_password() {
        let profile = Profile::default();
        let input = payload! {"username" => "alice", "password" => "p"};
        profile.perform("createAccount", &input).await;

        let ok = profile.perform("authenticate", &input).await;
        assert!(!ok.is_err());

        let bad = profile
            .perform("authenticate", &payload! {"username" => "alice", "password" => "x"})
            .await;
        assert_eq!(bad, ActionOutput::err("Invalid username or password."));
    }
}
