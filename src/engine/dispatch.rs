//! The dispatch engine: matches sync rules against a causal chain's
//! record history and fires their `then` actions to a fixed point.
//!
//! Each external request owns a private [`Chain`]; records from distinct
//! chains are never joined. The cascade is driven by an iterative
//! worklist, so stack depth stays bounded no matter how deep a rule set
//! chains reactions.

use crate::concepts::ConceptRegistry;
use crate::core::frame::{Frame, Frames};
use crate::core::pattern::instantiate;
use crate::core::record::{ActionName, ActionRecord, Payload};
use crate::engine::error::EngineError;
use crate::engine::sync::{Refinement, Sync};
use std::collections::VecDeque;

/// The append-only record log of one causal chain. Written only by the
/// engine; read-only to rule evaluation.
#[derive(Debug)]
pub struct Chain {
    id: String,
    records: Vec<ActionRecord>,
}

impl Chain {
    fn new() -> Self {
        Self { id: crate::concepts::fresh_id("chain"), records: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// First record whose input and output both unify trivially by action
    /// name; convenience for callers digging results out of a finished
    /// cascade.
    pub fn find(&self, action: &ActionName) -> Option<&ActionRecord> {
        self.records.iter().find(|r| &r.action == action)
    }
}

pub struct Engine {
    registry: ConceptRegistry,
    syncs: Vec<Sync>,
}

impl Engine {
    pub fn new(registry: ConceptRegistry) -> Self {
        Self { registry, syncs: Vec::new() }
    }

    pub fn registry(&self) -> &ConceptRegistry {
        &self.registry
    }

    pub fn syncs(&self) -> &[Sync] {
        &self.syncs
    }

    /// Register one rule. Authoring errors (unbound variables, empty
    /// `when`, unknown concepts) are fatal here, at startup.
    pub fn register(&mut self, sync: Sync) -> Result<(), EngineError> {
        sync.validate()?;
        if let Some(concept) = sync.concepts().find(|c| !self.registry.contains(c)) {
            return Err(EngineError::UnknownSyncConcept {
                sync: sync.name.clone(),
                concept: concept.to_string(),
            });
        }
        self.syncs.push(sync);
        Ok(())
    }

    pub fn register_all(
        &mut self,
        syncs: impl IntoIterator<Item = Sync>,
    ) -> Result<(), EngineError> {
        for sync in syncs {
            self.register(sync)?;
        }
        Ok(())
    }

    /// Run one causal chain to its fixed point: invoke the originating
    /// action, then keep matching rules against each newly completed
    /// record and firing their `then` actions until no rule is newly
    /// satisfied. Returns the finished chain log.
    pub async fn dispatch(
        &self,
        action: ActionName,
        input: Payload,
    ) -> Result<Chain, EngineError> {
        let mut chain = Chain::new();
        let mut worklist: VecDeque<(ActionName, Payload)> = VecDeque::new();
        worklist.push_back((action, input));

        while let Some((action, input)) = worklist.pop_front() {
            let output = self.registry.perform(&action, &input).await?;
            let record = ActionRecord::new(action, input, output);
            tracing::debug!(chain = %chain.id, action = %record.action,
                error = record.output.is_err(), "action completed");
            chain.records.push(record);

            for sync in &self.syncs {
                let frames = self.match_sync(sync, &chain).await?;
                for frame in frames.iter() {
                    tracing::debug!(chain = %chain.id, sync = %sync.name, "sync fired");
                    for template in &sync.then {
                        let input = instantiate(&template.input, frame).map_err(|variable| {
                            EngineError::UnboundVariable {
                                sync: sync.name.clone(),
                                variable,
                            }
                        })?;
                        worklist.push_back((template.action.clone(), input));
                    }
                }
            }
        }
        Ok(chain)
    }

    /// Evaluate one sync against the chain, anchored on the newest record:
    /// every `when` pattern joins against the full history, but only
    /// frames in which the newest record satisfied at least one pattern
    /// survive. Combinations seen in earlier rounds therefore never
    /// re-fire, which gives at-most-once firing per distinct frame.
    async fn match_sync(&self, sync: &Sync, chain: &Chain) -> Result<Frames, EngineError> {
        let newest = chain.records.len() - 1;
        let record = &chain.records[newest];
        if !sync.when.iter().any(|p| p.action == record.action) {
            return Ok(Frames::empty());
        }

        let mut partial: Vec<(Frame, bool)> = vec![(Frame::new(), false)];
        for pattern in &sync.when {
            let mut next = Vec::new();
            for (frame, used_newest) in &partial {
                for (index, candidate) in chain.records.iter().enumerate() {
                    if let Some(extended) = pattern.unify(candidate, frame) {
                        next.push((extended, *used_newest || index == newest));
                    }
                }
            }
            if next.is_empty() {
                return Ok(Frames::empty());
            }
            partial = next;
        }

        let matched: Frames = partial
            .into_iter()
            .filter_map(|(frame, used_newest)| used_newest.then_some(frame))
            .collect();
        self.refine(sync, matched.dedup()).await
    }

    /// Apply the sync's `where` refinements left to right. An empty frame
    /// set is a normal outcome and short-circuits the remaining steps.
    async fn refine(&self, sync: &Sync, mut frames: Frames) -> Result<Frames, EngineError> {
        for refinement in &sync.refinements {
            if frames.is_empty() {
                break;
            }
            frames = match refinement {
                Refinement::Filter(predicate) => frames.filter(|frame| predicate(frame)),
                Refinement::Extend { apply, .. } => frames.extend_each(|frame| apply(frame)),
                Refinement::Query { query, input, bind } => {
                    let mut joined = Vec::new();
                    for frame in frames.iter() {
                        let args = instantiate(input, frame).map_err(|variable| {
                            EngineError::UnboundVariable {
                                sync: sync.name.clone(),
                                variable,
                            }
                        })?;
                        let rows = self.registry.query(query, &args).await?;
                        joined.extend(Frames::fan_out(frame, bind, &rows));
                    }
                    joined.into()
                }
            };
        }
        Ok(frames)
    }
}
