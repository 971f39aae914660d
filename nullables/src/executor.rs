//! Nullable executor: record executed payloads instead of moving funds.

use grantfund_funding::{ActionExecutor, ProposalPayload};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A test [`ActionExecutor`] that records every payload it is asked to run.
///
/// Call [`NullExecutor::fail_next_calls`] to make it reject payloads, which
/// the engine must treat as a reverted execution.
pub struct NullExecutor {
    executed: Mutex<Vec<ProposalPayload>>,
    failing: AtomicBool,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Reject every subsequent call until switched back.
    pub fn fail_next_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Payloads executed so far, in order (for assertions).
    pub fn executed(&self) -> Vec<ProposalPayload> {
        self.executed.lock().unwrap().clone()
    }

    pub fn execution_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }
}

impl Default for NullExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionExecutor for NullExecutor {
    fn execute(&self, payload: &ProposalPayload) -> Result<(), String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("null executor set to fail".into());
        }
        self.executed.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "null-executor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantfund_types::{Account, Wad};

    #[test]
    fn records_and_fails_on_request() {
        let executor = NullExecutor::new();
        let payload = ProposalPayload::transfer(Account::new("bob"), Wad::tokens(1), "grant");

        executor.execute(&payload).unwrap();
        assert_eq!(executor.execution_count(), 1);

        executor.fail_next_calls(true);
        assert!(executor.execute(&payload).is_err());
        assert_eq!(executor.execution_count(), 1);

        executor.fail_next_calls(false);
        executor.execute(&payload).unwrap();
        assert_eq!(executor.executed(), vec![payload.clone(), payload]);
    }
}
