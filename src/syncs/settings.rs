//! Text settings flows: session-keyed updates and reads of the user's
//! rendering preferences.

use crate::concepts::{requesting, sessioning, text_settings};
use crate::core::pattern::{lit, var, Pattern};
use crate::engine::{Sync, Template};

const UPDATE_SETTINGS: &str = "/TextSettings/updateUserSettings";
const GET_SETTINGS: &str = "/TextSettings/getUserSettings";

pub fn all() -> Vec<Sync> {
    vec![
        handle_update_settings(),
        update_settings_respond(),
        update_settings_failed(),
        read_user_settings(),
    ]
}

fn update_request() -> Pattern {
    Pattern::on(requesting::request())
        .input("path", lit(UPDATE_SETTINGS))
        .input("session", var("session"))
        .input("font", var("font"))
        .input("fontSize", var("fontSize"))
        .input("lineHeight", var("lineHeight"))
        .output("request", var("request"))
}

fn handle_update_settings() -> Sync {
    Sync::named("handle_update_settings")
        .when(update_request())
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .then(
            Template::of(text_settings::update_user_settings())
                .arg("user", var("user"))
                .arg("font", var("font"))
                .arg("fontSize", var("fontSize"))
                .arg("lineHeight", var("lineHeight")),
        )
}

fn update_settings_respond() -> Sync {
    Sync::named("update_settings_respond")
        .when(update_request())
        .when(
            Pattern::on(text_settings::update_user_settings())
                .input("font", var("font"))
                .output("settings", var("settings")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("settings", var("settings"))
                .arg("message", lit("Settings updated successfully.")),
        )
}

fn update_settings_failed() -> Sync {
    Sync::named("update_settings_failed")
        .when(update_request())
        .when(
            Pattern::on(text_settings::update_user_settings())
                .input("font", var("font"))
                .output("error", var("error")),
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("error", var("error")),
        )
}

/// Pure read: two query-joins and a respond, no action in between.
fn read_user_settings() -> Sync {
    Sync::named("read_user_settings")
        .when(
            Pattern::on(requesting::request())
                .input("path", lit(GET_SETTINGS))
                .input("session", var("session"))
                .output("request", var("request")),
        )
        .query(
            sessioning::get_user(),
            &[("session", var("session"))],
            &[("user", var("user"))],
        )
        .query(
            text_settings::get_user_settings(),
            &[("user", var("user"))],
            &[
                ("settings", var("settings")),
                ("font", var("font")),
                ("fontSize", var("fontSize")),
                ("lineHeight", var("lineHeight")),
            ],
        )
        .then(
            Template::of(requesting::respond())
                .arg("request", var("request"))
                .arg("settings", var("settings"))
                .arg("font", var("font"))
                .arg("fontSize", var("fontSize"))
                .arg("lineHeight", var("lineHeight")),
        )
}
