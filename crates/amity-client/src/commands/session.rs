use amity_shared::Actor;
use tracing::{info, warn};

use crate::client::Client;
use crate::error::Result;
use crate::state::SessionState;

impl Client {
    /// Log in as `actor`, then load (or lazily create) the profile and run
    /// the first friend scan.
    pub async fn login(&mut self, actor: &Actor) -> Result<()> {
        if actor.as_str().is_empty() {
            return Err(crate::ClientError::InvalidInput("actor id is empty".into()));
        }

        let session = self.store.login(actor).await?;
        self.state = SessionState::new();
        self.state.session = Some(session);
        info!(actor = %actor, "logged in");

        self.load_profile().await?;
        self.refresh_friends().await?;
        Ok(())
    }

    /// End the session and forget all session-scoped state.
    pub async fn logout(&mut self) -> Result<()> {
        let Some(session) = self.state.session.take() else {
            warn!("no active session to log out");
            return Ok(());
        };

        self.state = SessionState::new();
        self.store.logout(&session).await?;
        info!(actor = %session.actor, "logged out");
        Ok(())
    }
}
