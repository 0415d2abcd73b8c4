//! Wiring of the moderation components into a running bot.

use crate::WardenConfig;
use std::sync::Arc;
use tracing::{info, instrument};
use warden_error::WardenResult;
use warden_interface::{AuditTrail, ModerationPlatform, NotificationSink, StructurePlatform};
use warden_moderation::{AuditCorrelator, EnforcementExecutor, ModerationPipeline, OperatorConsole};
use warden_security::{ContentClassifier, ModerationState, PolicyEngine};
use warden_snapshot::{JsonSnapshotPersistence, SnapshotManager};
use warden_social::{DiscordNotifier, DiscordPlatform, WardenBot, WardenHandler};

/// Build the gateway handler with every component wired to Discord.
///
/// # Errors
///
/// Returns an error if no owner is configured or the content patterns fail
/// to compile.
#[instrument(skip(config, token), fields(token_len = token.len()))]
pub fn assemble(config: &WardenConfig, token: &str) -> WardenResult<WardenHandler> {
    let owner = config.owner()?;
    let state = Arc::new(ModerationState::new(owner, config.spam()));

    let platform = Arc::new(
        DiscordPlatform::new(token)
            .with_delete_message_days(*config.enforcement().delete_message_days()),
    );
    let notifier = Arc::new(DiscordNotifier::new(
        Arc::clone(platform.http()),
        config.log_channel().as_str(),
    ));
    let sink: Arc<dyn NotificationSink> = notifier.clone();

    let trail: Arc<dyn AuditTrail> = platform.clone();
    let moderation: Arc<dyn ModerationPlatform> = platform.clone();
    let structure: Arc<dyn StructurePlatform> = platform;

    let policy = PolicyEngine::new(
        config.policy().clone(),
        ContentClassifier::new()?,
        Arc::clone(&state),
    );
    let pipeline = Arc::new(ModerationPipeline::new(
        AuditCorrelator::new(trail, config.audit()),
        policy,
        EnforcementExecutor::new(moderation, config.enforcement().clone()),
        Arc::clone(&sink),
    ));

    let snapshots = Arc::new(SnapshotManager::with_persistence(
        structure,
        JsonSnapshotPersistence::new(config.snapshot().path().clone()),
    ));
    let console = Arc::new(
        OperatorConsole::new(
            config.command_prefix().as_str(),
            state,
            Arc::clone(&snapshots),
            sink,
        )
        .with_settings(config.summary()),
    );

    info!(owner = %owner, "Moderation components assembled");
    Ok(WardenHandler::new(
        pipeline,
        console,
        snapshots,
        notifier,
        config.snapshot().interval(),
        *config.message_cache_size(),
    ))
}

/// Assemble the bot and run it until the gateway shuts down.
///
/// # Errors
///
/// Returns an error if assembly fails or the client cannot connect.
pub async fn run(config: &WardenConfig, token: &str) -> WardenResult<()> {
    let handler = assemble(config, token)?;
    let mut bot = WardenBot::new(token, handler, *config.message_cache_size()).await?;
    bot.start().await
}
