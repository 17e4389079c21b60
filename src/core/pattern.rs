//! Patterns: symbolic templates unified against concrete action records.

use crate::core::frame::Frame;
use crate::core::record::{ActionName, ActionOutput, ActionRecord, Payload};
use serde_json::Value;

/// A template field: either a concrete value that must equal the record's
/// field exactly, or a variable that binds on first sight and must unify
/// on every later sight.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Lit(Value),
    Var(String),
}

/// A concrete term.
pub fn lit(value: impl Into<Value>) -> Term {
    Term::Lit(value.into())
}

/// A variable term.
pub fn var(name: impl Into<String>) -> Term {
    Term::Var(name.into())
}

/// `(action, input template, output template)`. Fields absent from a
/// template are unconstrained.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub action: ActionName,
    pub input: Vec<(String, Term)>,
    pub output: Vec<(String, Term)>,
}

impl Pattern {
    pub fn on(action: ActionName) -> Self {
        Self { action, input: Vec::new(), output: Vec::new() }
    }

    pub fn input(mut self, field: impl Into<String>, term: Term) -> Self {
        self.input.push((field.into(), term));
        self
    }

    pub fn output(mut self, field: impl Into<String>, term: Term) -> Self {
        self.output.push((field.into(), term));
        self
    }

    /// Whether the output template requests the error shape. A pattern
    /// naming `error` matches only error-shaped records; one that does not
    /// matches only success-shaped records.
    pub fn wants_error(&self) -> bool {
        self.output.iter().any(|(field, _)| field == "error")
    }

    /// Unify this pattern against one record under an existing frame.
    /// Returns the extended frame, or `None` if any field is absent,
    /// any concrete value differs, or any bound variable disagrees.
    pub fn unify(&self, record: &ActionRecord, frame: &Frame) -> Option<Frame> {
        if self.action != record.action {
            return None;
        }
        match (&record.output, self.wants_error()) {
            (ActionOutput::Err(_), false) | (ActionOutput::Ok(_), true) => return None,
            _ => {}
        }
        let mut frame = frame.clone();
        unify_fields(&self.input, &record.input, &mut frame)?;
        unify_fields(&self.output, &record.output.fields(), &mut frame)?;
        Some(frame)
    }

    /// Variables named anywhere in this pattern.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.input
            .iter()
            .chain(self.output.iter())
            .filter_map(|(_, term)| match term {
                Term::Var(name) => Some(name.as_str()),
                Term::Lit(_) => None,
            })
    }
}

/// Unify a template against a field mapping, extending `frame` in place.
/// This is the single unification rule shared by `when` matching and
/// query-joins.
pub fn unify_fields(
    template: &[(String, Term)],
    fields: &Payload,
    frame: &mut Frame,
) -> Option<()> {
    for (field, term) in template {
        let actual = fields.get(field)?;
        match term {
            Term::Lit(expected) => {
                if expected != actual {
                    return None;
                }
            }
            Term::Var(name) => match frame.get(name) {
                Some(bound) if bound != actual => return None,
                Some(_) => {}
                None => {
                    frame.insert(name.clone(), actual.clone());
                }
            },
        }
    }
    Some(())
}

/// Resolve a template to a concrete payload under a frame. Fails on the
/// first unbound variable; sync validation makes that unreachable for
/// registered rules.
pub fn instantiate(template: &[(String, Term)], frame: &Frame) -> Result<Payload, String> {
    let mut payload = Payload::new();
    for (field, term) in template {
        let value = match term {
            Term::Lit(value) => value.clone(),
            Term::Var(name) => frame.get(name).cloned().ok_or_else(|| name.clone())?,
        };
        payload.insert(field.clone(), value);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload;
    use serde_json::json;

    fn record(output: ActionOutput) -> ActionRecord {
        ActionRecord::new(
            ActionName::new("Profile", "authenticate"),
            payload! {"username" => "alice", "password" => "p"},
            output,
        )
    }

    #[test]
    fn unify_binds_fresh_variables() {
        let pattern = Pattern::on(ActionName::new("Profile", "authenticate"))
            .input("username", var("username"))
            .output("user", var("user"));
        let rec = record(ActionOutput::ok(payload! {"user" => "u1"}));

        let frame = pattern.unify(&rec, &Frame::new()).unwrap();
        assert_eq!(frame.get("username"), Some(&json!("alice")));
        assert_eq!(frame.get("user"), Some(&json!("u1")));
    }

    #[test]
    fn unify_fails_on_concrete_mismatch_or_missing_field() {
        let rec = record(ActionOutput::ok(payload! {"user" => "u1"}));

        let wrong_lit = Pattern::on(rec.action.clone()).input("username", lit("bob"));
        assert!(wrong_lit.unify(&rec, &Frame::new()).is_none());

        let missing = Pattern::on(rec.action.clone()).input("token", var("t"));
        assert!(missing.unify(&rec, &Frame::new()).is_none());
    }

    #[test]
    fn unify_respects_existing_bindings() {
        let pattern = Pattern::on(ActionName::new("Profile", "authenticate"))
            .input("username", var("who"));
        let rec = record(ActionOutput::empty());

        let mut bound = Frame::new();
        bound.insert("who".to_string(), json!("alice"));
        assert!(pattern.unify(&rec, &bound).is_some());

        bound.insert("who".to_string(), json!("bob"));
        assert!(pattern.unify(&rec, &bound).is_none());
    }

    #[test]
    fn error_shape_gates_matching_both_ways() {
        let success_pattern = Pattern::on(ActionName::new("Profile", "authenticate"))
            .output("user", var("user"));
        let error_pattern = Pattern::on(ActionName::new("Profile", "authenticate"))
            .output("error", var("error"));

        let ok_rec = record(ActionOutput::ok(payload! {"user" => "u1"}));
        let err_rec = record(ActionOutput::err("bad credentials"));

        assert!(success_pattern.unify(&ok_rec, &Frame::new()).is_some());
        assert!(success_pattern.unify(&err_rec, &Frame::new()).is_none());
        assert!(error_pattern.unify(&ok_rec, &Frame::new()).is_none());

        let frame = error_pattern.unify(&err_rec, &Frame::new()).unwrap();
        assert_eq!(frame.get("error"), Some(&json!("bad credentials")));
    }

    #[test]
    fn instantiate_reports_unbound_variables() {
        let template = vec![("user".to_string(), var("user"))];
        assert_eq!(instantiate(&template, &Frame::new()), Err("user".to_string()));

        let mut frame = Frame::new();
        frame.insert("user".to_string(), json!("u1"));
        let payload = instantiate(&template, &frame).unwrap();
        assert_eq!(payload.get("user"), Some(&json!("u1")));
    }
}
