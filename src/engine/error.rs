//! Engine errors: authoring mistakes caught at registration, and
//! invariant violations during dispatch. Business errors are not here;
//! those are ordinary error-shaped action records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sync '{sync}' has no when patterns")]
    EmptyWhen { sync: String },

    #[error("sync '{sync}' references variable '{variable}' before it is bound")]
    UnboundVariable { sync: String, variable: String },

    #[error("no concept '{0}' is registered")]
    UnknownConcept(String),

    #[error("sync '{sync}' refers to unregistered concept '{concept}'")]
    UnknownSyncConcept { sync: String, concept: String },
}
