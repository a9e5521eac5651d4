use crate::models::{CheckOutcome, ServiceState};

/// Outcomes of every check that ran, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::worst(self.outcomes.iter().map(|outcome| outcome.state))
    }

    pub fn exit_code(&self) -> i32 {
        self.state().exit_code()
    }

    /// One line per outcome.
    pub fn render(&self) -> String {
        self.outcomes
            .iter()
            .map(|outcome| outcome.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<CheckOutcome> for Report {
    fn from(outcome: CheckOutcome) -> Self {
        Self {
            outcomes: vec![outcome],
        }
    }
}
