use std::future::Future;

use barpark_services::ServiceError;

/// Result of a user intent.
///
/// Precondition failures are not errors: they produce [`Outcome::Skipped`]
/// and leave state untouched. Service failures produce
/// [`Outcome::Reverted`] after any optimistic change has been undone.
#[derive(Debug)]
pub enum Outcome {
    /// Applied and confirmed by the backing service.
    Committed,
    /// A precondition did not hold; nothing changed.
    Skipped,
    /// The service call failed; local state is as it was before the intent.
    Reverted(ServiceError),
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            Self::Reverted(e) => Some(e),
            _ => None,
        }
    }
}

/// Run the second phase of an intent on its own task.
///
/// The completion confirms or reverts the optimistic change and clears any
/// in-flight marker, so it must finish even when the caller stops polling
/// (a timed-out or torn-down screen). Panics inside the completion are
/// propagated to the caller.
pub(crate) async fn complete_detached<F>(completion: F) -> Outcome
where
    F: Future<Output = Outcome> + Send + 'static,
{
    match tokio::spawn(completion).await {
        Ok(outcome) => outcome,
        Err(e) => match e.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(e) => {
                tracing::error!(error = %e, "Completion task cancelled");
                Outcome::Skipped
            }
        },
    }
}
