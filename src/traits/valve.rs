use crate::errors::ValveResult;
use crate::pipeline::{RequestContext, ValveChain};

/// A single processing stage of a pipeline.
///
/// Valves are shared by every request that passes through their pipeline, so
/// per-request state belongs in the [`RequestContext`]. A valve continues the
/// chain by calling [`ValveChain::invoke_next`]; returning without doing so
/// short-circuits the rest of the pipeline. Returning an error aborts the
/// chain and the error reaches the caller of `Pipeline::invoke` unchanged.
pub trait Valve: Send + Sync {
    /// Identity used in diagnostics and ordering constraints.
    fn name(&self) -> &str;

    /// Called once, in chain order, before the pipeline accepts requests.
    fn initialize(&self) -> ValveResult {
        Ok(())
    }

    fn invoke(&self, ctx: &mut RequestContext, chain: &mut ValveChain<'_>) -> ValveResult;
}
