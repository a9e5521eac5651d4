use std::fmt;

/// Plugin status, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
}

impl ServiceState {
    pub fn exit_code(self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
        }
    }

    /// Worst state of the iterator, `Ok` when it is empty.
    pub fn worst(states: impl IntoIterator<Item = ServiceState>) -> ServiceState {
        states.into_iter().max().unwrap_or(ServiceState::Ok)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Result of a single check: a state and the line printed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub state: ServiceState,
    pub message: String,
}

impl CheckOutcome {
    pub fn new(state: ServiceState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(ServiceState::Ok, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ServiceState::Warning, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(ServiceState::Critical, message)
    }
}

/// Subset of block fields returned by `eth_getBlockByNumber`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub miner: String,
    pub timestamp: u64,
}

impl Block {
    /// Addresses are hex, so checksummed and lowercase forms name the same account.
    pub fn mined_by(&self, address: &str) -> bool {
        self.miner.eq_ignore_ascii_case(address)
    }
}
