//! One automatic re-run on integrity conflicts.

use std::future::Future;

use sowcycle_core::error::CoreError;
use sowcycle_core::types::DbId;

use crate::error::{EngineError, EngineResult};

/// Identifies an operation in logs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpContext {
    pub op: &'static str,
    pub sow_id: Option<DbId>,
    pub record_id: Option<DbId>,
}

impl OpContext {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            sow_id: None,
            record_id: None,
        }
    }

    pub fn sow(mut self, sow_id: DbId) -> Self {
        self.sow_id = Some(sow_id);
        self
    }

    pub fn record(mut self, record_id: DbId) -> Self {
        self.record_id = Some(record_id);
        self
    }
}

/// Run `attempt`; on an integrity conflict run it once more from scratch.
///
/// Each attempt opens its own transaction, so the second run re-reads and
/// re-validates state. A second conflict surfaces as [`CoreError::Conflict`].
/// Unexpected errors are logged with the operation context before returning.
pub(crate) async fn with_integrity_retry<T, F, Fut>(ctx: OpContext, mut attempt: F) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    let result = match attempt().await {
        Err(err) if err.is_integrity_conflict() => {
            tracing::warn!(
                op = ctx.op,
                sow_id = ?ctx.sow_id,
                record_id = ?ctx.record_id,
                error = %err,
                "Integrity conflict, retrying operation once"
            );
            attempt().await.map_err(|err| {
                if err.is_integrity_conflict() {
                    EngineError::Core(CoreError::Conflict(format!(
                        "{} conflicted with a concurrent change: {err}",
                        ctx.op
                    )))
                } else {
                    err
                }
            })
        }
        other => other,
    };

    if let Err(err) = &result {
        if !err.is_expected() {
            tracing::error!(
                op = ctx.op,
                sow_id = ?ctx.sow_id,
                record_id = ?ctx.record_id,
                error = %err,
                "Breeding operation failed"
            );
        }
    }
    result
}
