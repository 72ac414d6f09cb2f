//! Retry orchestration collaborator (§6).
//!
//! When the core cannot dispatch a request right now — no endpoint, a
//! tripped breaker, a topology gap — it hands the request to a
//! `RetryOrchestrator` rather than deciding on its own whether and when to
//! retry. The core's job stops at "this attempt didn't happen."

use async_trait::async_trait;

use crate::request::Request;

/// Accepts requests the core could not currently dispatch and decides
/// whether/when to hand them back (§4.6, §6). An external collaborator:
/// this crate only defines the handoff point.
#[async_trait]
pub trait RetryOrchestrator: Send + Sync {
    /// Takes ownership of a request that failed to dispatch. Implementors
    /// may re-enqueue it, back off and retry, or give up and cancel it.
    async fn accept(&self, request: Box<dyn Request>);
}

/// A orchestrator that cancels everything handed to it immediately — useful
/// as a default for callers that want retries to be a purely external
/// concern, and in tests that don't exercise retry behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRetryOrchestrator;

#[async_trait]
impl RetryOrchestrator for NoRetryOrchestrator {
    async fn accept(&self, mut request: Box<dyn Request>) {
        request.cancel(crate::error::CancelReason::Requested);
    }
}
