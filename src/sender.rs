//! Sender capability consumed by the engine.
//!
//! The world/session model lives outside this crate. The engine only needs to
//! ask a sender for its identity, its permissions, whether it is a player, and
//! to deliver a text reply.

use std::fmt;
use uuid::Uuid;

/// Stable identity used for cooldown keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SenderId {
    /// The server console (or any non-entity operator surface).
    Console,
    /// A player-like entity.
    Player(Uuid),
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => f.write_str("console"),
            Self::Player(id) => write!(f, "{id}"),
        }
    }
}

/// Capability handle for whoever issued a command.
pub trait CommandSender: Send + Sync {
    /// Stable identity of this sender.
    fn id(&self) -> SenderId;

    /// Display name, used in logs.
    fn name(&self) -> &str;

    /// Check a permission node.
    fn has_permission(&self, node: &str) -> bool;

    /// Deliver a reply to the sender.
    fn send_message(&self, text: &str);

    /// Whether this sender may run player-only commands.
    fn is_player(&self) -> bool {
        matches!(self.id(), SenderId::Player(_))
    }
}
