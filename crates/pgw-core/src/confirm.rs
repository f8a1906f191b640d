// Confirmation gate for destructive operations.

pub const DELETE_PROXY_PROMPT: &str =
    "Are you sure you want to delete this proxy? This will also remove any associated mappings.";
pub const DELETE_MAPPING_PROMPT: &str = "Are you sure you want to delete this mapping?";

/// Asks the operator before something irreversible happens.
pub trait ConfirmGate: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Approves everything (`--yes`, scripted use).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmGate for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl ConfirmGate for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
