//! Correlate, decide, enforce and report for one event.

use crate::{
    AuditCorrelator, CommandResponse, EnforcementContext, EnforcementExecutor, OperatorConsole,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use warden_core::{DecisionRecord, Event, EventKind};
use warden_interface::NotificationSink;
use warden_security::{MessageSignals, PolicyEngine, Trigger};

/// A posted message after moderation and command handling.
#[derive(Debug, Clone)]
pub struct MessageOutcome {
    /// Decision taken on the message itself
    pub record: DecisionRecord,
    /// Console reply, when the message was an operator command
    pub response: Option<CommandResponse>,
}

/// The moderation pipeline.
///
/// Every run produces exactly one [`DecisionRecord`], which is handed to the
/// notification sink whether or not remediation ran.
pub struct ModerationPipeline {
    correlator: AuditCorrelator,
    policy: PolicyEngine,
    executor: EnforcementExecutor,
    sink: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for ModerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationPipeline")
            .field("correlator", &self.correlator)
            .field("policy", &self.policy)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl ModerationPipeline {
    /// Assemble a pipeline from its stages.
    pub fn new(
        correlator: AuditCorrelator,
        policy: PolicyEngine,
        executor: EnforcementExecutor,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            correlator,
            policy,
            executor,
            sink,
        }
    }

    /// Policy engine in use.
    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    /// Run one event through the pipeline.
    #[instrument(skip(self, event), fields(community = %event.community(), kind = event.kind().label()))]
    pub async fn handle(&self, event: Event) -> DecisionRecord {
        debug!(subject = %event.kind().describe(), "Handling event");
        let attribution = self.correlator.attribute(&event).await;

        let signals = match event.kind() {
            EventKind::MessagePosted { message } => {
                self.policy.inspect_message(message, *event.occurred_at())
            }
            _ => MessageSignals::default(),
        };
        let trigger = Trigger::from_event(event.kind(), signals);
        let beneficiary = event.kind().beneficiary().map(|m| *m.id());
        let verdict = self.policy.decide(&trigger, attribution, beneficiary);

        let report = if verdict.is_violation() {
            let context = EnforcementContext::from_event(&event, attribution);
            Some(self.executor.apply(&verdict, &context).await)
        } else {
            None
        };

        let record = DecisionRecord::new(event, attribution, verdict, report);
        info!(
            actor = %record.attribution(),
            disposition = %record.verdict().disposition(),
            "Decision recorded"
        );
        if let Err(e) = self.sink.emit(&record).await {
            warn!(error = %e, "Decision record not delivered");
        }
        record
    }

    /// Moderate a posted message, then hand it to `console` as a command.
    ///
    /// The message is judged before the console runs, so a command from an
    /// untrusted author is deleted and sanctioned like any other message.
    /// Messages from bot accounts are ignored and yield `None`, as do events
    /// other than `MessagePosted`.
    #[instrument(skip(self, console, event), fields(community = %event.community()))]
    pub async fn handle_message(
        &self,
        console: &OperatorConsole,
        event: Event,
    ) -> Option<MessageOutcome> {
        let EventKind::MessagePosted { message } = event.kind() else {
            return None;
        };
        if *message.author().is_bot() {
            debug!(author = %message.author().id(), "Ignoring bot message");
            return None;
        }
        let invoker = *message.author().id();
        let content = message.content().clone();
        let community = *event.community();

        let record = self.handle(event).await;
        let response = console.handle_message(community, invoker, &content).await;
        Some(MessageOutcome { record, response })
    }

    /// Handle `event` on its own task.
    pub fn dispatch(self: &Arc<Self>, event: Event) -> JoinHandle<DecisionRecord> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.handle(event).await })
    }
}
