//! Account creation: one request fans out to four concepts, and the
//! response fires only once every resource exists. Each step has its own
//! error responder.

use crate::concepts::{focus_stats, library, profile, requesting, text_settings};
use crate::core::pattern::{lit, var, Pattern};
use crate::engine::{Sync, Template};

const CREATE_ACCOUNT: &str = "/Profile/createAccount";

const DEFAULT_FONT: &str = "\"Times New Roman\", Times, serif";
const DEFAULT_FONT_SIZE: i64 = 16;
const DEFAULT_LINE_HEIGHT: i64 = 24;

pub fn all() -> Vec<Sync> {
    vec![
        create_account_request(),
        account_resources_create(),
        account_create_respond(),
        account_create_failed(),
        library_create_failed(),
        focus_init_failed(),
        user_settings_failed(),
    ]
}

fn account_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(CREATE_ACCOUNT))
        .input("username", var("username"))
        .input("password", var("password"))
        .output("request", var("request"))
}

fn account_created() -> Pattern {
    Pattern::on(profile::create_account())
        .input("username", var("username"))
        .input("password", var("password"))
        .output("user", var("user"))
}

fn default_settings_template() -> Template {
    Template::of(text_settings::create_user_settings())
        .arg("user", var("user"))
        .arg("font", lit(DEFAULT_FONT))
        .arg("fontSize", lit(DEFAULT_FONT_SIZE))
        .arg("lineHeight", lit(DEFAULT_LINE_HEIGHT))
}

fn create_account_request() -> Sync {
    Sync::named("create_account_request")
        .when(account_request())
        .then(
            Template::of(profile::create_account())
                .arg("username", var("username"))
                .arg("password", var("password")),
        )
}

/// The account exists: provision its library, focus stats, and default
/// text settings, in that order.
fn account_resources_create() -> Sync {
    Sync::named("account_resources_create")
        .when(account_request())
        .when(account_created())
        .then(Template::of(library::create_library()).arg("user", var("user")))
        .then(Template::of(focus_stats::init_user()).arg("user", var("user")))
        .then(default_settings_template())
}

/// Fires exactly once, when the last of the four resources has appeared
/// in the chain.
fn account_create_respond() -> Sync {
    Sync::named("account_create_respond")
        .when(account_request())
        .when(account_created())
        .when(
            Pattern::on(library::create_library())
                .input("user", var("user"))
                .output("library", var("library")),
        )
        .when(
            Pattern::on(focus_stats::init_user())
                .input("user", var("user"))
                .output("focusStats", var("focusStats")),
        )
        .when(
            Pattern::on(text_settings::create_user_settings())
                .input("user", var("user"))
                .output("settings", var("settings")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("user", var("user"))
                .arg("library", var("library"))
                .arg("focusStats", var("focusStats"))
                .arg("settings", var("settings"))
                .arg("message", lit("Account created successfully.")),
        )
}

fn account_create_failed() -> Sync {
    Sync::named("account_create_failed")
        .when(account_request())
        .when(
            Pattern::on(profile::create_account())
                .input("username", var("username"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn library_create_failed() -> Sync {
    Sync::named("library_create_failed")
        .when(account_request())
        .when(account_created())
        .when(
            Pattern::on(library::create_library())
                .input("user", var("user"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn focus_init_failed() -> Sync {
    Sync::named("focus_init_failed")
        .when(account_request())
        .when(account_created())
        .when(
            Pattern::on(focus_stats::init_user())
                .input("user", var("user"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

fn user_settings_failed() -> Sync {
    Sync::named("user_settings_failed")
        .when(account_request())
        .when(account_created())
        .when(
            Pattern::on(text_settings::create_user_settings())
                .input("user", var("user"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}
