use crate::config::DEFAULT_QUERY_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaState {
    Enabled,
    Disabled,
}

/// Outcome of a submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected,
}

/// Per-session cap on submissions.
///
/// The count only ever grows. The submission that reaches the limit is still
/// admitted; everything after it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaTracker {
    query_count: u32,
    limit: u32,
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_LIMIT)
    }
}

impl QuotaTracker {
    pub fn new(limit: u32) -> Self {
        Self { query_count: 0, limit }
    }

    pub fn query_count(&self) -> u32 {
        self.query_count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn state(&self) -> QuotaState {
        if self.query_count >= self.limit {
            QuotaState::Disabled
        } else {
            QuotaState::Enabled
        }
    }

    pub fn submit_disabled(&self) -> bool {
        self.state() == QuotaState::Disabled
    }

    pub fn try_submit(&mut self) -> Admission {
        match self.state() {
            QuotaState::Disabled => Admission::Rejected,
            QuotaState::Enabled => {
                self.query_count += 1;
                Admission::Admitted
            }
        }
    }

    pub fn limit_message(&self) -> String {
        format!(
            "You have reached the limit of {} queries. Please try again later.",
            self.limit
        )
    }
}
