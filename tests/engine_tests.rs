//! Engine properties: candidate matching, cascade termination,
//! at-most-once firing, query fan-out, and chain isolation.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use synapse::concepts::{Concept, ConceptRegistry};
use synapse::{
    lit, payload, var, ActionName, ActionOutput, Chain, Engine, Pattern, Payload, Sync, Template,
};

/// Test double: any action named `fail*` errors, everything else echoes
/// its input; `_two` yields two rows, `_none` yields zero.
struct Stub(&'static str);

#[async_trait]
impl Concept for Stub {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn perform(&self, action: &str, input: &Payload) -> ActionOutput {
        if action.starts_with("fail") {
            ActionOutput::err("boom")
        } else {
            ActionOutput::Ok(input.clone())
        }
    }

    async fn query(&self, query: &str, _input: &Payload) -> Vec<Payload> {
        match query {
            "_two" => vec![payload! {"item" => "a"}, payload! {"item" => "b"}],
            "_none" => Vec::new(),
            _ => vec![payload! {"error" => "unknown query"}],
        }
    }
}

fn engine_with(syncs: Vec<Sync>) -> Engine {
    let mut registry = ConceptRegistry::new();
    registry.register(Arc::new(Stub("Alpha")));
    registry.register(Arc::new(Stub("Beta")));
    let mut engine = Engine::new(registry);
    engine.register_all(syncs).expect("valid rules");
    engine
}

fn act(name: &str) -> ActionName {
    ActionName::parse(name).unwrap()
}

fn count(chain: &Chain, action: &str) -> usize {
    let action = act(action);
    chain.records().iter().filter(|r| r.action == action).count()
}

#[tokio::test]
async fn cascade_reaches_a_fixed_point_along_the_dependency_chain() {
    let engine = engine_with(vec![
        Sync::named("a_to_b")
            .when(Pattern::on(act("Alpha.first")).input("n", var("n")))
            .then(Template::of(act("Alpha.second")).arg("n", var("n"))),
        Sync::named("b_to_c")
            .when(Pattern::on(act("Alpha.second")).input("n", var("n")))
            .then(Template::of(act("Alpha.third")).arg("n", var("n"))),
    ]);

    let chain = engine.dispatch(act("Alpha.first"), payload! {"n" => 1}).await.unwrap();

    let actions: Vec<String> =
        chain.records().iter().map(|r| r.action.to_string()).collect();
    assert_eq!(actions, vec!["Alpha.first", "Alpha.second", "Alpha.third"]);
    // bindings flowed through the whole cascade
    assert_eq!(chain.records()[2].input.get("n"), Some(&json!(1)));
}

#[tokio::test]
async fn multi_pattern_sync_fires_once_when_the_last_pattern_is_satisfied() {
    let engine = engine_with(vec![
        Sync::named("start")
            .when(Pattern::on(act("Alpha.start")).input("id", var("id")))
            .then(Template::of(act("Alpha.middle")).arg("id", var("id"))),
        Sync::named("finish")
            .when(Pattern::on(act("Alpha.start")).input("id", var("id")))
            .when(Pattern::on(act("Alpha.middle")).input("id", var("id")))
            .then(Template::of(act("Alpha.done")).arg("id", var("id"))),
    ]);

    let chain = engine.dispatch(act("Alpha.start"), payload! {"id" => "x"}).await.unwrap();
    assert_eq!(count(&chain, "Alpha.done"), 1);
}

#[tokio::test]
async fn independent_syncs_each_react_to_the_same_record() {
    let engine = engine_with(vec![
        Sync::named("first_reaction")
            .when(Pattern::on(act("Alpha.event")).input("id", var("id")))
            .then(Template::of(act("Alpha.reactionOne")).arg("id", var("id"))),
        Sync::named("second_reaction")
            .when(Pattern::on(act("Alpha.event")).input("id", var("id")))
            .then(Template::of(act("Beta.reactionTwo")).arg("id", var("id"))),
        Sync::named("unrelated")
            .when(Pattern::on(act("Alpha.event")).input("kind", lit("other")))
            .then(Template::of(act("Beta.never"))),
    ]);

    let chain = engine.dispatch(act("Alpha.event"), payload! {"id" => "x"}).await.unwrap();
    assert_eq!(count(&chain, "Alpha.reactionOne"), 1);
    assert_eq!(count(&chain, "Beta.reactionTwo"), 1);
    assert_eq!(count(&chain, "Beta.never"), 0);
}

#[tokio::test]
async fn error_records_route_only_to_error_shaped_patterns() {
    let engine = engine_with(vec![
        Sync::named("kick_off")
            .when(Pattern::on(act("Alpha.go")))
            .then(Template::of(act("Alpha.failStep"))),
        Sync::named("on_success")
            .when(Pattern::on(act("Alpha.failStep")).output("value", var("value")))
            .then(Template::of(act("Beta.successPath")).arg("value", var("value"))),
        Sync::named("on_error")
            .when(Pattern::on(act("Alpha.failStep")).output("error", var("error")))
            .then(Template::of(act("Beta.errorPath")).arg("reason", var("error"))),
    ]);

    let chain = engine.dispatch(act("Alpha.go"), Payload::new()).await.unwrap();
    assert_eq!(count(&chain, "Beta.successPath"), 0);
    assert_eq!(count(&chain, "Beta.errorPath"), 1);

    let error_path = chain.find(&act("Beta.errorPath")).unwrap();
    assert_eq!(error_path.input.get("reason"), Some(&json!("boom")));
}

#[tokio::test]
async fn query_join_fans_out_one_firing_per_row() {
    let engine = engine_with(vec![Sync::named("fan_out")
        .when(Pattern::on(act("Alpha.list")).input("id", var("id")))
        .query(act("Alpha._two"), &[("id", var("id"))], &[("item", var("item"))])
        .then(Template::of(act("Beta.each")).arg("item", var("item")))]);

    let chain = engine.dispatch(act("Alpha.list"), payload! {"id" => "x"}).await.unwrap();
    assert_eq!(count(&chain, "Beta.each"), 2);
    let items: Vec<_> = chain
        .records()
        .iter()
        .filter(|r| r.action == act("Beta.each"))
        .map(|r| r.input.get("item").cloned().unwrap())
        .collect();
    assert_eq!(items, vec![json!("a"), json!("b")]);
}

#[tokio::test]
async fn empty_query_result_drops_the_frame_silently() {
    let engine = engine_with(vec![Sync::named("dead_end")
        .when(Pattern::on(act("Alpha.list")).input("id", var("id")))
        .query(act("Alpha._none"), &[("id", var("id"))], &[("item", var("item"))])
        .then(Template::of(act("Beta.each")).arg("item", var("item")))]);

    let chain = engine.dispatch(act("Alpha.list"), payload! {"id" => "x"}).await.unwrap();
    assert_eq!(count(&chain, "Beta.each"), 0);
    // absence of matches is a normal outcome, not an error
    assert_eq!(chain.records().len(), 1);
}

#[tokio::test]
async fn chains_are_isolated_from_each_other() {
    let engine = engine_with(vec![Sync::named("pair")
        .when(Pattern::on(act("Alpha.left")).input("id", var("id")))
        .when(Pattern::on(act("Alpha.right")).input("id", var("id")))
        .then(Template::of(act("Beta.joined")).arg("id", var("id")))]);

    let left = engine.dispatch(act("Alpha.left"), payload! {"id" => "x"}).await.unwrap();
    let right = engine.dispatch(act("Alpha.right"), payload! {"id" => "x"}).await.unwrap();

    assert_ne!(left.id(), right.id());
    // the second chain never sees the first chain's record
    assert_eq!(count(&right, "Beta.joined"), 0);
}

#[tokio::test]
async fn registration_rejects_rules_naming_unknown_concepts() {
    let mut registry = ConceptRegistry::new();
    registry.register(Arc::new(Stub("Alpha")));
    let mut engine = Engine::new(registry);

    let result = engine.register(
        Sync::named("dangling_concept")
            .when(Pattern::on(act("Alpha.go")))
            .then(Template::of(act("Gamma.missing"))),
    );
    assert!(result.is_err());
}
