//! Confirmation hook for operations that discard or destroy state.
//!
//! Anything that could lose unsaved edits asks a [`Confirm`] first. Closures
//! returning `bool` implement it, so tests can pass `|_| true`.

/// What the caller is being asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// Switching away from a definition with unsaved changes.
    DiscardChanges,
    DeleteComponent { title: String },
    DeleteDefinition { name: String },
    /// Dropping a definition that was never persisted.
    DiscardNewDefinition,
}

impl ConfirmRequest {
    /// Prompt text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::DiscardChanges => {
                "You have unsaved changes. Do you want to discard them?".to_string()
            }
            Self::DeleteComponent { title } => format!("Delete component \"{title}\"?"),
            Self::DeleteDefinition { name } => format!(
                "Are you sure you want to delete \"{name}\"?\n\nThis action cannot be undone and will permanently remove this entity definition and all its components."
            ),
            Self::DiscardNewDefinition => "Discard this unsaved definition?".to_string(),
        }
    }
}

impl std::fmt::Display for ConfirmRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Synchronous yes/no decision.
pub trait Confirm {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmRequest) -> bool,
{
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Confirms everything. For non-interactive callers that already decided.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _request: &ConfirmRequest) -> bool {
        true
    }
}
