use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::domain::{PeerId, UserProfile};
use crate::ports::{TransportClient, TransportError};

/// Resolves a single peer id to a profile via the transport.
///
/// Total: every failure path folds into the error-variant profile, so the
/// caller never sees an error. Flood-wait is the exception in mechanism but
/// not in outcome: the transport's wait is honored and the same lookup is
/// retried, indefinitely if need be. Resolution is a pure read, so the retry
/// is safe to repeat.
#[derive(Clone)]
pub struct UserResolver {
    transport: Arc<dyn TransportClient>,
}

impl UserResolver {
    pub fn new(transport: Arc<dyn TransportClient>) -> Self {
        Self { transport }
    }

    pub async fn resolve(&self, id: PeerId) -> UserProfile {
        loop {
            match self.transport.get_user(id).await {
                Ok(user) => return user.into(),
                Err(TransportError::FloodWait { seconds }) => {
                    warn!(user_id = id.0, seconds, "flood wait, suspending lookup");
                    sleep(Duration::from_secs(seconds)).await;
                }
                Err(e) => return UserProfile::failed(id, e.to_string()),
            }
        }
    }
}
