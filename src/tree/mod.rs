//! Command tree: root commands, their subcommand paths, and resolution.
//!
//! The tree is published as an immutable snapshot behind a lock. Readers
//! clone the current `Arc<Snapshot>` and resolve against it without holding
//! the lock; writers build a new snapshot and swap it in, so a concurrent
//! dispatch sees either the old tree or the new one, never a mix.

mod descriptor;
mod params;
mod path;

pub use descriptor::{CommandDescriptor, DescriptorBuilder};
pub use params::{CompletionSource, Constraint, ParameterSpec, Presence};
pub use path::{CooldownPolicy, Execution, PathBuilder, SubcommandPath};

pub(crate) use path::check_params;

use crate::error::{CommandError, RegistrationError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A root command with its paths.
#[derive(Debug)]
pub struct RegisteredCommand {
    descriptor: Arc<CommandDescriptor>,
    /// Registration order.
    paths: Vec<Arc<SubcommandPath>>,
    /// Longest segment count first; registration order within a length.
    by_length: Vec<Arc<SubcommandPath>>,
    default: Option<Arc<SubcommandPath>>,
}

impl RegisteredCommand {
    fn new(
        descriptor: CommandDescriptor,
        paths: Vec<SubcommandPath>,
    ) -> Result<Self, RegistrationError> {
        let mut registered: Vec<Arc<SubcommandPath>> = Vec::with_capacity(paths.len());
        for path in paths {
            if registered.iter().any(|p| p.segments() == path.segments()) {
                return Err(RegistrationError::DuplicatePath {
                    command: descriptor.name().to_string(),
                    path: path.segments().join(" "),
                });
            }
            registered.push(Arc::new(path));
        }

        let default = registered.iter().find(|p| p.is_default()).cloned();
        let mut by_length: Vec<_> = registered
            .iter()
            .filter(|p| !p.is_default())
            .cloned()
            .collect();
        // Stable sort keeps registration order among equal lengths.
        by_length.sort_by(|a, b| b.segments().len().cmp(&a.segments().len()));

        Ok(Self {
            descriptor: Arc::new(descriptor),
            paths: registered,
            by_length,
            default,
        })
    }

    pub fn descriptor(&self) -> &Arc<CommandDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// All paths in registration order, including the default path.
    pub fn paths(&self) -> &[Arc<SubcommandPath>] {
        &self.paths
    }

    pub fn default_path(&self) -> Option<&Arc<SubcommandPath>> {
        self.default.as_ref()
    }

    /// Path with exactly these segments (aliases accepted for the last one).
    pub fn find_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Arc<SubcommandPath>> {
        if segments.is_empty() {
            return self.default.as_ref();
        }
        self.by_length
            .iter()
            .find(|p| p.segments().len() == segments.len() && p.matches(segments))
    }

    /// Longest-prefix match over `tokens`.
    fn match_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Option<&Arc<SubcommandPath>> {
        self.by_length.iter().find(|p| p.matches(tokens))
    }
}

/// Outcome of resolving a label and its tokens.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub command: Arc<RegisteredCommand>,
    /// Matched path; the default path when nothing matched, `None` when the
    /// root has no default path either.
    pub path: Option<Arc<SubcommandPath>>,
    /// Tokens used up by path segments.
    pub consumed: usize,
    /// Tokens left for parameters.
    pub residual: Vec<String>,
}

/// Where completion stands after the complete tokens of a partial input.
#[derive(Debug, Clone)]
pub struct PartialResolution {
    pub command: Arc<RegisteredCommand>,
    pub path: Option<Arc<SubcommandPath>>,
    /// Index of the token being completed among the residual tokens.
    pub arg_index: usize,
    /// Complete tokens that fell to the parameters of `path`.
    pub residual: Vec<String>,
    /// Paths whose next segment could follow the complete tokens.
    pub continuations: Vec<Arc<SubcommandPath>>,
}

#[derive(Debug, Default)]
struct Snapshot {
    /// Registration order.
    commands: Vec<Arc<RegisteredCommand>>,
    /// Name and every alias, lowercase.
    labels: HashMap<String, Arc<RegisteredCommand>>,
}

/// Registry of root commands.
#[derive(Debug, Default)]
pub struct CommandTree {
    current: RwLock<Arc<Snapshot>>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Register a root command with its paths.
    ///
    /// Fails if the name or any alias collides with an existing root label.
    pub fn register(
        &self,
        descriptor: CommandDescriptor,
        paths: Vec<SubcommandPath>,
    ) -> Result<Arc<RegisteredCommand>, RegistrationError> {
        let command = Arc::new(RegisteredCommand::new(descriptor, paths)?);

        let mut guard = self.current.write();
        if let Some(taken) = command
            .descriptor
            .labels()
            .find(|label| guard.labels.contains_key(*label))
        {
            return Err(RegistrationError::DuplicateCommand(taken.to_string()));
        }

        let mut next = Snapshot {
            commands: guard.commands.clone(),
            labels: guard.labels.clone(),
        };
        next.commands.push(command.clone());
        for label in command.descriptor.labels() {
            next.labels.insert(label.to_string(), command.clone());
        }
        *guard = Arc::new(next);
        drop(guard);

        info!(
            command = %command.name(),
            paths = command.paths.len(),
            "Registered command"
        );
        Ok(command)
    }

    /// Remove a root (by name or alias) with all its paths.
    pub fn unregister(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        let mut guard = self.current.write();
        let Some(command) = guard.labels.get(&label).cloned() else {
            return false;
        };

        let mut next = Snapshot {
            commands: guard
                .commands
                .iter()
                .filter(|c| !Arc::ptr_eq(c, &command))
                .cloned()
                .collect(),
            labels: guard.labels.clone(),
        };
        for label in command.descriptor.labels() {
            next.labels.remove(label);
        }
        *guard = Arc::new(next);
        drop(guard);

        info!(command = %command.name(), "Unregistered command");
        true
    }

    pub fn unregister_all(&self) {
        *self.current.write() = Arc::new(Snapshot::default());
        debug!("Cleared command tree");
    }

    /// Root command by name or alias.
    pub fn get(&self, label: &str) -> Option<Arc<RegisteredCommand>> {
        self.snapshot().labels.get(&label.to_lowercase()).cloned()
    }

    /// Roots in registration order.
    pub fn commands(&self) -> Vec<Arc<RegisteredCommand>> {
        self.snapshot().commands.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a label and its tokens to a path.
    pub fn resolve<S: AsRef<str>>(
        &self,
        label: &str,
        tokens: &[S],
    ) -> Result<Resolution, CommandError> {
        let command = self
            .get(label)
            .ok_or_else(|| CommandError::UnknownCommand(label.to_string()))?;

        let (path, consumed) = match command.match_tokens(tokens) {
            Some(path) => (Some(path.clone()), path.segments().len()),
            None => (command.default.clone(), 0),
        };
        let residual = tokens[consumed..]
            .iter()
            .map(|t| t.as_ref().to_string())
            .collect();

        Ok(Resolution {
            command,
            path,
            consumed,
            residual,
        })
    }

    /// Resolve the complete tokens of a partially typed input.
    pub fn resolve_partial<S: AsRef<str>>(
        &self,
        label: &str,
        complete: &[S],
    ) -> Option<PartialResolution> {
        let resolution = self.resolve(label, complete).ok()?;
        let continuations = resolution
            .command
            .paths
            .iter()
            .filter(|p| p.continues(complete))
            .cloned()
            .collect();

        Some(PartialResolution {
            arg_index: resolution.residual.len(),
            command: resolution.command,
            path: resolution.path,
            residual: resolution.residual,
            continuations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{CommandHandler, handler_fn};

    fn noop() -> impl CommandHandler {
        handler_fn(|_ctx| Ok(()))
    }

    fn path(segments: &str) -> SubcommandPath {
        SubcommandPath::builder(segments, noop()).build().unwrap()
    }

    fn team_tree() -> CommandTree {
        let tree = CommandTree::new();
        tree.register(
            CommandDescriptor::builder("team").alias("t").build().unwrap(),
            vec![
                path("member"),
                path("member add"),
                SubcommandPath::builder("member remove", noop())
                    .alias("rm")
                    .build()
                    .unwrap(),
                SubcommandPath::default_path(noop()).build().unwrap(),
            ],
        )
        .unwrap();
        tree
    }

    #[test]
    fn longest_prefix_wins() {
        let tree = team_tree();
        let r = tree.resolve("team", &["member", "add", "bob"]).unwrap();
        assert_eq!(r.path.unwrap().segments(), ["member", "add"]);
        assert_eq!(r.consumed, 2);
        assert_eq!(r.residual, ["bob"]);

        let r = tree.resolve("T", &["MEMBER", "list"]).unwrap();
        assert_eq!(r.path.unwrap().segments(), ["member"]);
        assert_eq!(r.residual, ["list"]);
    }

    #[test]
    fn alias_applies_to_final_segment() {
        let tree = team_tree();
        let r = tree.resolve("team", &["member", "rm", "bob"]).unwrap();
        assert_eq!(r.path.unwrap().segments(), ["member", "remove"]);
    }

    #[test]
    fn no_match_falls_back_to_default() {
        let tree = team_tree();
        let r = tree.resolve("team", &["info", "x"]).unwrap();
        assert!(r.path.unwrap().is_default());
        assert_eq!(r.consumed, 0);
        assert_eq!(r.residual, ["info", "x"]);
    }

    #[test]
    fn unknown_root() {
        let tree = team_tree();
        assert!(matches!(
            tree.resolve::<&str>("nope", &[]),
            Err(CommandError::UnknownCommand(label)) if label == "nope"
        ));
    }

    #[test]
    fn missing_default_resolves_to_none() {
        let tree = CommandTree::new();
        tree.register(
            CommandDescriptor::builder("kit").build().unwrap(),
            vec![path("give")],
        )
        .unwrap();
        let r = tree.resolve("kit", &["take"]).unwrap();
        assert!(r.path.is_none());
        assert_eq!(r.residual, ["take"]);
    }

    #[test]
    fn duplicate_labels_rejected() {
        let tree = team_tree();
        let err = tree
            .register(
                CommandDescriptor::builder("teams").alias("T").build().unwrap(),
                vec![],
            )
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateCommand("t".into()));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn subcommand_names_do_not_collide_across_roots() {
        let tree = team_tree();
        tree.register(
            CommandDescriptor::builder("guild").build().unwrap(),
            vec![path("member add")],
        )
        .unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn duplicate_paths_rejected() {
        let tree = CommandTree::new();
        let err = tree
            .register(
                CommandDescriptor::builder("kit").build().unwrap(),
                vec![path("give"), path("GIVE")],
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicatePath { .. }));
    }

    #[test]
    fn unregister_by_alias_removes_all_labels() {
        let tree = team_tree();
        assert!(tree.unregister("T"));
        assert!(tree.get("team").is_none());
        assert!(tree.get("t").is_none());
        assert!(!tree.unregister("team"));
    }

    #[test]
    fn readers_keep_old_snapshot() {
        let tree = team_tree();
        let held = tree.get("team").unwrap();
        tree.unregister_all();
        assert!(tree.is_empty());
        assert_eq!(held.paths().len(), 4);
    }

    #[test]
    fn partial_resolution_reports_continuations() {
        let tree = team_tree();
        let p = tree.resolve_partial("team", &["member"]).unwrap();
        assert_eq!(p.path.unwrap().segments(), ["member"]);
        assert_eq!(p.arg_index, 0);
        let mut next: Vec<_> = p.continuations.iter().flat_map(|c| c.names_at(1)).collect();
        next.sort_unstable();
        assert_eq!(next, ["add", "remove", "rm"]);

        let p = tree.resolve_partial("team", &["member", "add", "bob"]).unwrap();
        assert_eq!(p.arg_index, 1);
        assert!(p.continuations.is_empty());
    }

    #[test]
    fn find_path_by_segments() {
        let tree = team_tree();
        let team = tree.get("team").unwrap();
        assert!(team.find_path(&["member", "rm"]).is_some());
        assert!(team.find_path(&["member", "add", "x"]).is_none());
        assert!(team.find_path::<&str>(&[]).unwrap().is_default());
    }
}
