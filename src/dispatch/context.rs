//! Per-invocation command context.

use crate::args::ArgValue;
use crate::error::HandlerError;
use crate::sender::CommandSender;
use crate::tree::{CommandDescriptor, SubcommandPath};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Everything a handler knows about one invocation.
///
/// Parsers fill in argument values as they succeed and may leave typed
/// extensions for parsers that run after them. Handlers receive the context
/// read-only.
pub struct CommandContext {
    sender: Arc<dyn CommandSender>,
    label: String,
    raw_args: Vec<String>,
    command: Arc<CommandDescriptor>,
    path: Option<Arc<SubcommandPath>>,
    values: HashMap<String, ArgValue>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl CommandContext {
    pub fn new(
        sender: Arc<dyn CommandSender>,
        label: impl Into<String>,
        raw_args: Vec<String>,
        command: Arc<CommandDescriptor>,
    ) -> Self {
        Self {
            sender,
            label: label.into(),
            raw_args,
            command,
            path: None,
            values: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    pub(crate) fn with_path(mut self, path: Option<Arc<SubcommandPath>>) -> Self {
        self.path = path;
        self
    }

    pub fn sender(&self) -> &Arc<dyn CommandSender> {
        &self.sender
    }

    /// The label as typed, which may be an alias.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tokens after the label, before path matching.
    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    pub fn command(&self) -> &Arc<CommandDescriptor> {
        &self.command
    }

    pub fn path(&self) -> Option<&Arc<SubcommandPath>> {
        self.path.as_ref()
    }

    /// Parsed value of a parameter, if present and of type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|v| (**v).downcast_ref::<T>())
    }

    /// Parsed value of a parameter the handler declared as required.
    pub fn require<T: Any>(&self, name: &str) -> Result<&T, HandlerError> {
        self.get(name).ok_or_else(|| {
            HandlerError::Internal(anyhow::anyhow!(
                "argument '{name}' missing or not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn insert_value(&mut self, name: &str, value: ArgValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Typed side-channel value left by an earlier parser.
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Store a side-channel value, replacing any previous value of `T`.
    pub fn put_extension<T: Any + Send + Sync>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Send a message to the invoking sender.
    pub fn reply(&self, text: &str) {
        self.sender.send_message(text);
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("sender", &self.sender.id())
            .field("label", &self.label)
            .field("raw_args", &self.raw_args)
            .field("command", &self.command.name())
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
