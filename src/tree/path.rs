//! Subcommand paths.

use super::descriptor::normalize_label;
use super::params::ParameterSpec;
use crate::dispatch::CommandHandler;
use crate::error::RegistrationError;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How the handler of a path runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Awaited on the dispatching task.
    #[default]
    Inline,
    /// Submitted to the engine's scheduler.
    Async,
}

/// Rate limit attached to a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub duration: Option<Duration>,
    /// Holders of this node skip the cooldown. Overrides the configured
    /// global bypass node.
    pub bypass_permission: Option<String>,
}

impl CooldownPolicy {
    /// Window length, if a non-zero cooldown applies.
    pub fn window(&self) -> Option<Duration> {
        self.duration.filter(|d| !d.is_zero())
    }
}

/// A registered token sequence under a root command, bound to a handler.
///
/// The default path has no segments and runs when no subcommand matches.
pub struct SubcommandPath {
    segments: Vec<String>,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    params: Vec<ParameterSpec>,
    cooldown: CooldownPolicy,
    execution: Execution,
    hidden: bool,
    handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for SubcommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubcommandPath")
            .field("segments", &self.segments)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("params", &self.params)
            .field("cooldown", &self.cooldown)
            .field("execution", &self.execution)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl SubcommandPath {
    /// Start a path from space-separated segments, e.g. `"member add"`.
    pub fn builder<H: CommandHandler>(segments: &str, handler: H) -> PathBuilder {
        PathBuilder::new(
            segments.split_whitespace().map(str::to_string).collect(),
            Arc::new(handler),
        )
    }

    /// Start the default path of a root.
    pub fn default_path<H: CommandHandler>(handler: H) -> PathBuilder {
        PathBuilder::new(Vec::new(), Arc::new(handler))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_default(&self) -> bool {
        self.segments.is_empty()
    }

    /// Aliases of the final segment.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn cooldown(&self) -> &CooldownPolicy {
        &self.cooldown
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Whether the leading tokens select this path.
    ///
    /// Every segment compares case-insensitively; aliases apply to the final
    /// segment only.
    pub fn matches<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        if tokens.len() < self.segments.len() {
            return false;
        }
        let last = self.segments.len().saturating_sub(1);
        self.segments.iter().enumerate().all(|(i, segment)| {
            let token = tokens[i].as_ref();
            segment.eq_ignore_ascii_case(token)
                || (i == last && self.aliases.iter().any(|a| a.eq_ignore_ascii_case(token)))
        })
    }

    /// Whether `tokens` is a strict prefix of this path's segments.
    pub(crate) fn continues<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.len() < self.segments.len()
            && tokens
                .iter()
                .zip(&self.segments)
                .all(|(t, s)| s.eq_ignore_ascii_case(t.as_ref()))
    }

    /// Names that may appear at segment position `depth`.
    pub(crate) fn names_at(&self, depth: usize) -> Vec<&str> {
        let Some(segment) = self.segments.get(depth) else {
            return Vec::new();
        };
        let mut names = vec![segment.as_str()];
        if depth + 1 == self.segments.len() {
            names.extend(self.aliases.iter().map(String::as_str));
        }
        names
    }

    /// `root seg seg`, the key used for cooldowns and metrics.
    pub fn qualified_name(&self, root: &str) -> String {
        if self.segments.is_empty() {
            root.to_string()
        } else {
            format!("{root} {}", self.segments.join(" "))
        }
    }

    /// Usage line, e.g. `/team member add <player> [role]`.
    pub fn usage(&self, label: &str) -> String {
        let mut out = format!("/{label}");
        for segment in &self.segments {
            out.push(' ');
            out.push_str(segment);
        }
        for param in &self.params {
            out.push(' ');
            out.push_str(&param.usage());
        }
        out
    }
}

/// Builder for [`SubcommandPath`].
pub struct PathBuilder {
    segments: Vec<String>,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    params: Vec<ParameterSpec>,
    cooldown: CooldownPolicy,
    execution: Execution,
    hidden: bool,
    handler: Arc<dyn CommandHandler>,
}

impl PathBuilder {
    fn new(segments: Vec<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            segments,
            aliases: Vec::new(),
            description: None,
            permission: None,
            params: Vec::new(),
            cooldown: CooldownPolicy::default(),
            execution: Execution::Inline,
            hidden: false,
            handler,
        }
    }

    /// Alias for the final segment.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn permission(mut self, node: impl Into<String>) -> Self {
        self.permission = Some(node.into());
        self
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn cooldown(mut self, duration: Duration) -> Self {
        self.cooldown.duration = Some(duration);
        self
    }

    pub fn cooldown_bypass(mut self, node: impl Into<String>) -> Self {
        self.cooldown.bypass_permission = Some(node.into());
        self
    }

    /// Run the handler on the scheduler instead of inline.
    pub fn asynchronous(mut self) -> Self {
        self.execution = Execution::Async;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Validate and build the path.
    ///
    /// Greedy parameters declared through their parser (rather than
    /// [`ParameterSpec::greedy`]) are checked again at registration, once
    /// the parser registry is known.
    pub fn build(self) -> Result<SubcommandPath, RegistrationError> {
        let segments = self
            .segments
            .iter()
            .map(|s| normalize_label(s))
            .collect::<Result<Vec<_>, _>>()?;

        if segments.is_empty() && !self.aliases.is_empty() {
            return Err(RegistrationError::InvalidName(self.aliases.join(",")));
        }
        let mut aliases = Vec::with_capacity(self.aliases.len());
        for alias in &self.aliases {
            let alias = normalize_label(alias)?;
            if segments.last() != Some(&alias) && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        let path_name = segments.join(" ");
        check_params(&path_name, &self.params, |spec| spec.is_greedy())?;

        Ok(SubcommandPath {
            segments,
            aliases,
            description: self.description,
            permission: self.permission,
            params: self.params,
            cooldown: self.cooldown,
            execution: self.execution,
            hidden: self.hidden,
            handler: self.handler,
        })
    }
}

/// Parameter-list invariants: unique names, optional parameters trail
/// required ones, greedy only last, ranges only on numeric types.
pub(crate) fn check_params(
    path: &str,
    params: &[ParameterSpec],
    is_greedy: impl Fn(&ParameterSpec) -> bool,
) -> Result<(), RegistrationError> {
    let mut seen = HashSet::new();
    let mut optional_seen = false;
    for (i, spec) in params.iter().enumerate() {
        if !seen.insert(spec.name()) {
            return Err(RegistrationError::DuplicateParameter {
                path: path.to_string(),
                parameter: spec.name().to_string(),
            });
        }
        if spec.is_required() && optional_seen {
            return Err(RegistrationError::RequiredAfterOptional {
                path: path.to_string(),
                parameter: spec.name().to_string(),
            });
        }
        optional_seen |= !spec.is_required();
        if is_greedy(spec) && i + 1 != params.len() {
            return Err(RegistrationError::GreedyNotLast {
                path: path.to_string(),
                parameter: spec.name().to_string(),
            });
        }
        if spec.has_range() && !spec.type_key().is_numeric() {
            return Err(RegistrationError::RangeOnNonNumeric {
                parameter: spec.name().to_string(),
                type_name: spec.type_key().name(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Text;
    use crate::dispatch::handler_fn;

    fn noop() -> impl CommandHandler {
        handler_fn(|_ctx| Ok(()))
    }

    #[test]
    fn segments_and_aliases_normalize() {
        let path = SubcommandPath::builder("Member ADD", noop())
            .alias("A")
            .build()
            .unwrap();
        assert_eq!(path.segments(), ["member", "add"]);
        assert!(path.matches(&["member", "add", "bob"]));
        assert!(path.matches(&["MEMBER", "a"]));
        assert!(!path.matches(&["m", "add"]));
        assert!(!path.matches(&["member"]));
        assert_eq!(path.qualified_name("team"), "team member add");
    }

    #[test]
    fn greedy_must_be_last() {
        let err = SubcommandPath::builder("say", noop())
            .param(ParameterSpec::new::<Text>("message").greedy())
            .param(ParameterSpec::new::<i32>("times"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::GreedyNotLast {
                path: "say".into(),
                parameter: "message".into()
            }
        );
    }

    #[test]
    fn required_cannot_follow_optional() {
        let err = SubcommandPath::default_path(noop())
            .param(ParameterSpec::new::<i32>("a").optional())
            .param(ParameterSpec::new::<i32>("b"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::RequiredAfterOptional { .. }));
    }

    #[test]
    fn duplicate_parameters_rejected() {
        let err = SubcommandPath::default_path(noop())
            .param(ParameterSpec::new::<i32>("a"))
            .param(ParameterSpec::new::<String>("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateParameter { .. }));
    }

    #[test]
    fn range_requires_numeric_type() {
        let err = SubcommandPath::default_path(noop())
            .param(ParameterSpec::new::<String>("name").min(1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::RangeOnNonNumeric { .. }));
    }

    #[test]
    fn default_path_cannot_have_aliases() {
        assert!(SubcommandPath::default_path(noop()).alias("x").build().is_err());
    }

    #[test]
    fn usage_lists_segments_and_params() {
        let path = SubcommandPath::builder("member add", noop())
            .param(ParameterSpec::new::<String>("player"))
            .param(ParameterSpec::new::<String>("role").optional())
            .build()
            .unwrap();
        assert_eq!(path.usage("team"), "/team member add <player> [role]");
    }

    #[test]
    fn continuation_and_names() {
        let path = SubcommandPath::builder("member add", noop())
            .alias("a")
            .build()
            .unwrap();
        assert!(path.continues(&["member"]));
        assert!(path.continues::<&str>(&[]));
        assert!(!path.continues(&["member", "add"]));
        assert_eq!(path.names_at(0), ["member"]);
        assert_eq!(path.names_at(1), ["add", "a"]);
        assert!(path.names_at(2).is_empty());
    }
}
