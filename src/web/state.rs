use crate::workflow::Workflow;

/// Shared application state, read-only after start-up.
pub struct AppState {
    pub workflow: Workflow,
}

impl AppState {
    pub fn new(workflow: Workflow) -> Self {
        Self { workflow }
    }
}
