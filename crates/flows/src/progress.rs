//! Checkpoints a flow passes through, logged as it reaches each one.

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStep {
    GeneratingTransaction,
    VerifyingTransaction,
    SigningTransaction,
    GatheringSignatures,
    FinalisingTransaction,
}

impl ProgressStep {
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStep::GeneratingTransaction => "Generating transaction.",
            ProgressStep::VerifyingTransaction => "Verifying cash contract constraints.",
            ProgressStep::SigningTransaction => "Signing transaction with our private key.",
            ProgressStep::GatheringSignatures => "Gathering counterparty signatures.",
            ProgressStep::FinalisingTransaction => {
                "Obtaining notary signature and recording transaction."
            }
        }
    }
}

/// Records the steps a single flow run has visited, in order.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    flow: &'static str,
    steps: Vec<ProgressStep>,
}

impl ProgressTracker {
    pub fn new(flow: &'static str) -> Self {
        Self {
            flow,
            steps: Vec::new(),
        }
    }

    pub fn set_current_step(&mut self, step: ProgressStep) {
        tracing::info!(flow = self.flow, step = ?step, "{}", step.label());
        self.steps.push(step);
    }

    pub fn current_step(&self) -> Option<ProgressStep> {
        self.steps.last().copied()
    }

    pub fn steps(&self) -> &[ProgressStep] {
        &self.steps
    }

    /// Rename the tracker when a context is reused for another flow.
    pub fn restart(&mut self, flow: &'static str) {
        self.flow = flow;
        self.steps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_recorded_in_order() {
        let mut tracker = ProgressTracker::new("issue_cash");
        assert_eq!(tracker.current_step(), None);

        tracker.set_current_step(ProgressStep::GeneratingTransaction);
        tracker.set_current_step(ProgressStep::SigningTransaction);
        assert_eq!(
            tracker.steps(),
            &[
                ProgressStep::GeneratingTransaction,
                ProgressStep::SigningTransaction
            ]
        );
        assert_eq!(tracker.current_step(), Some(ProgressStep::SigningTransaction));

        tracker.restart("transfer_cash");
        assert!(tracker.steps().is_empty());
    }
}
