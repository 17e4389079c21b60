//! Sync rules: `when` patterns, `where` refinements, `then` templates.
//!
//! A sync is stateless, registered once at startup, and never mutated.
//! Registration validates that every variable a rule consumes is bound
//! before use, so unbound references are startup failures rather than
//! request-time surprises.

use crate::core::frame::Frame;
use crate::core::pattern::{Pattern, Term};
use crate::core::record::ActionName;
use crate::engine::error::EngineError;
use std::collections::BTreeSet;
use std::sync::Arc;

pub type FilterFn = Arc<dyn Fn(&Frame) -> bool + Send + std::marker::Sync>;
pub type ExtendFn = Arc<dyn Fn(&mut Frame) + Send + std::marker::Sync>;

/// One step of a `where` clause. Steps compose left to right; an empty
/// surviving frame set is a normal outcome, never an error.
pub enum Refinement {
    /// Call a concept query with inputs drawn from each frame, then
    /// inner-join the returned rows against the bind template.
    Query {
        query: ActionName,
        input: Vec<(String, Term)>,
        bind: Vec<(String, Term)>,
    },
    /// Pure predicate over one frame's bindings.
    Filter(FilterFn),
    /// Pure transform adding computed bindings. `binds` declares the
    /// variables introduced so validation stays static.
    Extend { binds: Vec<String>, apply: ExtendFn },
}

impl std::fmt::Debug for Refinement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Refinement::Query { query, .. } => write!(f, "Query({query})"),
            Refinement::Filter(_) => write!(f, "Filter"),
            Refinement::Extend { binds, .. } => write!(f, "Extend({binds:?})"),
        }
    }
}

/// An action invocation template, instantiated per surviving frame.
#[derive(Debug, Clone)]
pub struct Template {
    pub action: ActionName,
    pub input: Vec<(String, Term)>,
}

impl Template {
    pub fn of(action: ActionName) -> Self {
        Self { action, input: Vec::new() }
    }

    pub fn arg(mut self, field: impl Into<String>, term: Term) -> Self {
        self.input.push((field.into(), term));
        self
    }
}

/// A named synchronization rule.
#[derive(Debug)]
pub struct Sync {
    pub name: String,
    pub when: Vec<Pattern>,
    pub refinements: Vec<Refinement>,
    pub then: Vec<Template>,
}

impl Sync {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), when: Vec::new(), refinements: Vec::new(), then: Vec::new() }
    }

    pub fn when(mut self, pattern: Pattern) -> Self {
        self.when.push(pattern);
        self
    }

    pub fn query(
        mut self,
        query: ActionName,
        input: &[(&str, Term)],
        bind: &[(&str, Term)],
    ) -> Self {
        self.refinements.push(Refinement::Query {
            query,
            input: own_template(input),
            bind: own_template(bind),
        });
        self
    }

    pub fn filter(mut self, predicate: impl Fn(&Frame) -> bool + Send + std::marker::Sync + 'static) -> Self {
        self.refinements.push(Refinement::Filter(Arc::new(predicate)));
        self
    }

    pub fn extend(
        mut self,
        binds: &[&str],
        apply: impl Fn(&mut Frame) + Send + std::marker::Sync + 'static,
    ) -> Self {
        self.refinements.push(Refinement::Extend {
            binds: binds.iter().map(|b| b.to_string()).collect(),
            apply: Arc::new(apply),
        });
        self
    }

    pub fn then(mut self, template: Template) -> Self {
        self.then.push(template);
        self
    }

    /// Authoring-error check (fatal at registration): at least one `when`
    /// pattern, and every variable a query input or `then` template reads
    /// must be bound by an earlier pattern, query bind, or declared extend.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.when.is_empty() {
            return Err(EngineError::EmptyWhen { sync: self.name.clone() });
        }

        let mut bound: BTreeSet<String> = BTreeSet::new();
        for pattern in &self.when {
            for variable in pattern.variables() {
                bound.insert(variable.to_string());
            }
        }

        for refinement in &self.refinements {
            match refinement {
                Refinement::Query { input, bind, .. } => {
                    self.check_read(input, &bound)?;
                    for (_, term) in bind {
                        if let Term::Var(name) = term {
                            bound.insert(name.clone());
                        }
                    }
                }
                Refinement::Filter(_) => {}
                Refinement::Extend { binds, .. } => {
                    bound.extend(binds.iter().cloned());
                }
            }
        }

        for template in &self.then {
            self.check_read(&template.input, &bound)?;
        }
        Ok(())
    }

    fn check_read(
        &self,
        template: &[(String, Term)],
        bound: &BTreeSet<String>,
    ) -> Result<(), EngineError> {
        for (_, term) in template {
            if let Term::Var(name) = term {
                if !bound.contains(name) {
                    return Err(EngineError::UnboundVariable {
                        sync: self.name.clone(),
                        variable: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Every concept this sync touches, for registry cross-checking.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        let when = self.when.iter().map(|p| p.action.concept.as_str());
        let queries = self.refinements.iter().filter_map(|r| match r {
            Refinement::Query { query, .. } => Some(query.concept.as_str()),
            _ => None,
        });
        let then = self.then.iter().map(|t| t.action.concept.as_str());
        when.chain(queries).chain(then)
    }
}

fn own_template(template: &[(&str, Term)]) -> Vec<(String, Term)> {
    template.iter().map(|(field, term)| (field.to_string(), term.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::{lit, var};

    fn request() -> ActionName {
        ActionName::new("Requesting", "request")
    }

    fn respond() -> ActionName {
        ActionName::new("Requesting", "respond")
    }

    #[test]
    fn validation_requires_when_patterns() {
        let sync = Sync::named("empty").then(Template::of(respond()));
        assert!(matches!(sync.validate(), Err(EngineError::EmptyWhen { .. })));
    }

    #[test]
    fn validation_rejects_unbound_then_variable() {
        let sync = Sync::named("dangling")
            .when(Pattern::on(request()).output("request", var("request")))
            .then(
                Template::of(respond())
                    .arg("request", var("request"))
                    .arg("user", var("user")),
            );
        match sync.validate() {
            Err(EngineError::UnboundVariable { variable, .. }) => assert_eq!(variable, "user"),
            other => panic!("expected unbound variable error, got {other:?}"),
        }
    }

    #[test]
    fn validation_accepts_query_and_extend_bindings() {
        let sync = Sync::named("refined")
            .when(
                Pattern::on(request())
                    .input("session", var("session"))
                    .output("request", var("request")),
            )
            .query(
                ActionName::new("Sessioning", "_getUser"),
                &[("session", var("session"))],
                &[("user", var("user"))],
            )
            .extend(&["greeting"], |frame| {
                frame.insert("greeting".to_string(), serde_json::json!("hello"));
            })
            .then(
                Template::of(respond())
                    .arg("request", var("request"))
                    .arg("user", var("user"))
                    .arg("message", var("greeting")),
            );
        sync.validate().unwrap();
    }

    #[test]
    fn validation_rejects_query_reading_unbound_input() {
        let sync = Sync::named("bad-query")
            .when(Pattern::on(request()).output("request", var("request")))
            .query(
                ActionName::new("Sessioning", "_getUser"),
                &[("session", var("session"))],
                &[("user", var("user"))],
            );
        match sync.validate() {
            Err(EngineError::UnboundVariable { variable, .. }) => assert_eq!(variable, "session"),
            other => panic!("expected unbound variable error, got {other:?}"),
        }
    }

    #[test]
    fn literal_only_templates_always_validate() {
        let sync = Sync::named("static")
            .when(Pattern::on(request()).input("path", lit("/ping")))
            .then(Template::of(respond()).arg("message", lit("pong")));
        sync.validate().unwrap();
    }
}
