//! Login and logout flows.

use crate::concepts::{profile, requesting, sessioning};
use crate::core::pattern::{lit, var, Pattern};
use crate::engine::{Sync, Template};

const LOGIN: &str = "/auth/login";
const LOGOUT: &str = "/auth/logout";

pub fn all() -> Vec<Sync> {
    vec![
        handle_login_request(),
        login_success_create_session(),
        login_success_respond(),
        login_failed_bad_credentials(),
        login_failed_session_create(),
        handle_logout_request(),
        logout_success_respond(),
        logout_failed_respond(),
    ]
}

fn login_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(LOGIN))
        .input("username", var("username"))
        .output("request", var("request"))
}

/// Catch the incoming login request and attempt authentication.
fn handle_login_request() -> Sync {
    Sync::named("handle_login_request")
        .when(
            Pattern::on(requesting::request())
                .input("path", lit(LOGIN))
                .input("username", var("username"))
                .input("password", var("password"))
                .output("request", var("request")),
        )
        .then(
            Template::of(profile::authenticate())
                .arg("username", var("username"))
                .arg("password", var("password")),
        )
}

/// Authentication succeeded: open a session for the user.
fn login_success_create_session() -> Sync {
    Sync::named("login_success_create_session")
        .when(login_request())
        .when(
            Pattern::on(profile::authenticate())
                .input("username", var("username"))
                .output("user", var("user")),
        )
        .then(Template::of(sessioning::create()).arg("user", var("user")))
}

/// Session opened: answer the original request with user and session ids.
fn login_success_respond() -> Sync {
    Sync::named("login_success_respond")
        .when(login_request())
        .when(
            Pattern::on(profile::authenticate())
                .input("username", var("username"))
                .output("user", var("user")),
        )
        .when(
            Pattern::on(sessioning::create())
                .input("user", var("user"))
                .output("session", var("session")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("user", var("user"))
                .arg("session", var("session"))
                .arg("message", lit("Login successful")),
        )
}

fn login_failed_bad_credentials() -> Sync {
    Sync::named("login_failed_bad_credentials")
        .when(login_request())
        .when(
            Pattern::on(profile::authenticate())
                .input("username", var("username"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

/// Authentication succeeded but the session could not be created.
fn login_failed_session_create() -> Sync {
    Sync::named("login_failed_session_create")
        .when(login_request())
        .when(
            Pattern::on(profile::authenticate())
                .input("username", var("username"))
                .output("user", var("user")),
        )
        .when(
            Pattern::on(sessioning::create())
                .input("user", var("user"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn logout_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(LOGOUT))
        .input("session", var("session"))
        .output("request", var("request"))
}

fn handle_logout_request() -> Sync {
    Sync::named("handle_logout_request")
        .when(logout_request())
        .then(Template::of(sessioning::delete()).arg("session", var("session")))
}

/// Session deletion returns an empty success mapping.
fn logout_success_respond() -> Sync {
    Sync::named("logout_success_respond")
        .when(logout_request())
        .when(Pattern::on(sessioning::delete()).input("session", var("session")))
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("message", lit("Logged out successfully")),
        )
}

fn logout_failed_respond() -> Sync {
    Sync::named("logout_failed_respond")
        .when(logout_request())
        .when(
            Pattern::on(sessioning::delete())
                .input("session", var("session"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}
