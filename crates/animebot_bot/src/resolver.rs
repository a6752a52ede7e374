//! Find-or-create wrapper over the user store.

use animebot_core::{NewUser, ResolvedUser, Sender};
use animebot_error::AnimebotResult;
use animebot_interface::UserStore;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolves the acting user of an interaction, creating it on first contact.
#[derive(Clone)]
pub struct UserResolver {
    users: Arc<dyn UserStore>,
}

impl UserResolver {
    /// Create a resolver over a user store.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Return the stored user for `sender` and whether it existed before.
    ///
    /// The display name is only recorded at creation.
    #[instrument(skip(self, sender), fields(external_id = %sender.external_id))]
    pub async fn resolve(&self, sender: &Sender) -> AnimebotResult<ResolvedUser> {
        let resolved = self
            .users
            .find_or_insert(&NewUser::new(
                sender.external_id.clone(),
                sender.display_name.clone(),
            ))
            .await?;
        debug!(
            user_id = resolved.user.id,
            existed_before = resolved.existed_before,
            "Resolved user"
        );
        Ok(resolved)
    }
}
