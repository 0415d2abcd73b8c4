//! Discord client setup and lifecycle management.

use crate::WardenHandler;
use serenity::Client;
use serenity::cache::Settings as CacheSettings;
use tracing::{info, instrument};
use warden_error::{PlatformError, WardenResult};

/// The running Warden bot.
///
/// # Example
/// ```no_run
/// # async fn run(handler: warden_social::WardenHandler) -> warden_error::WardenResult<()> {
/// let token = std::env::var("DISCORD_TOKEN").unwrap_or_default();
/// let mut bot = warden_social::WardenBot::new(&token, handler, 1000).await?;
/// bot.start().await?;
/// # Ok(())
/// # }
/// ```
pub struct WardenBot {
    client: Client,
}

impl std::fmt::Debug for WardenBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WardenBot").finish_non_exhaustive()
    }
}

impl WardenBot {
    /// Build the Serenity client around `handler`.
    ///
    /// `max_cached_messages` sizes Serenity's per-channel message cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the client fails to
    /// initialize.
    #[instrument(skip(token, handler), fields(token_len = token.len()))]
    pub async fn new(
        token: &str,
        handler: WardenHandler,
        max_cached_messages: usize,
    ) -> WardenResult<Self> {
        info!("Initializing Warden Discord bot");

        let intents = WardenHandler::intents();
        let mut cache_settings = CacheSettings::default();
        cache_settings.max_messages = max_cached_messages;

        info!(?intents, "Building Serenity client");
        let client = Client::builder(token, intents)
            .event_handler(handler)
            .cache_settings(cache_settings)
            .await
            .map_err(PlatformError::from)?;

        info!("Serenity client built successfully");
        Ok(Self { client })
    }

    /// Connect and process events until the gateway shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if the client fails to start or hits a fatal error.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> WardenResult<()> {
        info!("Starting Discord bot");
        self.client.start().await.map_err(PlatformError::from)?;
        Ok(())
    }
}
