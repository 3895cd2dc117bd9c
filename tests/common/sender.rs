//! Recording sender for integration tests.

use parking_lot::Mutex;
use slcmd::sender::{CommandSender, SenderId};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// A sender that records every message it receives.
pub struct TestSender {
    id: SenderId,
    name: String,
    permissions: Mutex<HashSet<String>>,
    messages: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl TestSender {
    /// Console-like sender with no permissions.
    pub fn console() -> Arc<Self> {
        Arc::new(Self {
            id: SenderId::Console,
            name: "console".to_string(),
            permissions: Mutex::new(HashSet::new()),
            messages: Mutex::new(Vec::new()),
        })
    }

    /// Player sender with the given permissions.
    pub fn player(name: &str, permissions: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            id: SenderId::Player(Uuid::new_v4()),
            name: name.to_string(),
            permissions: Mutex::new(permissions.iter().map(|p| p.to_string()).collect()),
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn grant(&self, node: &str) {
        self.permissions.lock().insert(node.to_string());
    }

    pub fn revoke(&self, node: &str) {
        self.permissions.lock().remove(node);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }

    /// Type-erased handle for engine calls.
    pub fn handle(self: &Arc<Self>) -> Arc<dyn CommandSender> {
        self.clone()
    }
}

impl CommandSender for TestSender {
    fn id(&self) -> SenderId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions.lock().contains(node)
    }

    fn send_message(&self, text: &str) {
        self.messages.lock().push(text.to_string());
    }
}
