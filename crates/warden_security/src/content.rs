//! Message content classification.

use regex::Regex;
use tracing::{debug, instrument};
use warden_error::ConfigError;

/// Link pattern: an http(s) URL or a bare `www.` host.
const LINK_PATTERN: &str = r"(?i)(https?://\S+|www\.\S+)";

/// Broadcast mentions that notify every member.
const BROADCAST_PATTERN: &str = r"@(everyone|here)\b";

/// What a single message tripped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MessageSignals {
    /// Message contains a link
    pub link: bool,
    /// Author exceeded the message rate
    pub flood: bool,
    /// Message pings every member
    pub broadcast_mention: bool,
}

impl MessageSignals {
    /// No signal tripped.
    pub fn is_clean(&self) -> bool {
        !(self.link || self.flood || self.broadcast_mention)
    }

    /// Names of the tripped signals, for logs.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.link {
            labels.push("link");
        }
        if self.flood {
            labels.push("flood");
        }
        if self.broadcast_mention {
            labels.push("broadcast_mention");
        }
        labels
    }
}

/// Detects links and broadcast mentions in message text.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    link_regex: Regex,
    broadcast_regex: Regex,
}

impl ContentClassifier {
    /// Compile the classifier's patterns.
    pub fn new() -> Result<Self, ConfigError> {
        let link_regex = Regex::new(LINK_PATTERN)
            .map_err(|e| ConfigError::new(format!("Invalid link pattern: {}", e)))?;
        let broadcast_regex = Regex::new(BROADCAST_PATTERN)
            .map_err(|e| ConfigError::new(format!("Invalid mention pattern: {}", e)))?;
        Ok(Self {
            link_regex,
            broadcast_regex,
        })
    }

    /// Whether `content` contains a link.
    pub fn has_link(&self, content: &str) -> bool {
        self.link_regex.is_match(content)
    }

    /// Whether `content` mentions `@everyone` or `@here`.
    pub fn has_broadcast_mention(&self, content: &str) -> bool {
        self.broadcast_regex.is_match(content)
    }

    /// Content signals of a message. `flood` is always false here; the rate
    /// tracker fills it in.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn classify(&self, content: &str) -> MessageSignals {
        let signals = MessageSignals {
            link: self.has_link(content),
            flood: false,
            broadcast_mention: self.has_broadcast_mention(content),
        };
        debug!(?signals, "Classified message");
        signals
    }
}
