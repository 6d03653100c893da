use std::sync::Arc;

use barpark_core::types::User;
use barpark_events::{ChangeBus, ChangeEvent};

/// Who is using the app and where view-models announce their changes.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub bus: Arc<ChangeBus>,
}

impl Session {
    pub fn new(user: User, bus: Arc<ChangeBus>) -> Self {
        Self { user, bus }
    }

    /// A session with its own private bus.
    pub fn standalone(user: User) -> Self {
        Self::new(user, Arc::new(ChangeBus::default()))
    }

    pub(crate) fn publish(&self, event: ChangeEvent) {
        self.bus.publish(event);
    }
}
