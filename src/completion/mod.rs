//! Context-aware completion.
//!
//! Completion walks the same tree as dispatch, using only the tokens the user
//! has finished typing, then asks the parameter under the cursor for
//! candidates. Nothing is cached; every request sees the current tree and
//! provider state.
//!
//! Completion never reveals more than dispatch would: a sender that fails the
//! sender-kind or root permission gate gets nothing, a denied path yields no
//! parameter candidates, and subcommand names are only offered for paths the
//! sender may use.

mod providers;

pub use providers::{CompletionProvider, FnProvider, ProviderRegistry, provider_fn};

use crate::args::ParserRegistry;
use crate::dispatch::pipeline::{check_root, may_use};
use crate::metrics;
use crate::sender::CommandSender;
use crate::tree::{CommandTree, CompletionSource, ParameterSpec};
use std::collections::HashSet;
use std::sync::Arc;

/// What is being completed.
pub struct CompletionContext {
    sender: Arc<dyn CommandSender>,
    command: String,
    prior: Vec<String>,
    partial: String,
    index: usize,
}

impl CompletionContext {
    pub fn new(
        sender: Arc<dyn CommandSender>,
        command: impl Into<String>,
        prior: Vec<String>,
        partial: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            sender,
            command: command.into(),
            prior,
            partial: partial.into(),
            index,
        }
    }

    pub fn sender(&self) -> &Arc<dyn CommandSender> {
        &self.sender
    }

    /// Canonical root name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Complete argument tokens before the one being typed.
    pub fn prior(&self) -> &[String] {
        &self.prior
    }

    /// The token being typed; may be empty.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Zero-based argument position of the partial token.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Completion over a tree and its parser and provider registries.
pub(crate) struct CompletionEngine<'a> {
    pub tree: &'a CommandTree,
    pub parsers: &'a ParserRegistry,
    pub providers: &'a ProviderRegistry,
    pub max_suggestions: Option<usize>,
}

impl CompletionEngine<'_> {
    /// Candidates for the last element of `args` (the partial token).
    pub fn complete(
        &self,
        sender: &Arc<dyn CommandSender>,
        label: &str,
        args: &[String],
    ) -> Vec<String> {
        let (partial, complete) = match args.split_last() {
            Some((partial, complete)) => (partial.as_str(), complete),
            None => ("", args),
        };

        let Some(position) = self.tree.resolve_partial(label, complete) else {
            return Vec::new();
        };
        let command = &position.command;
        if check_root(sender.as_ref(), command).is_err() {
            return Vec::new();
        }

        let mut filtered = Vec::new();
        let mut unfiltered = Vec::new();

        let depth = complete.len();
        for path in &position.continuations {
            if !path.is_hidden() && may_use(sender.as_ref(), path) {
                filtered.extend(path.names_at(depth).into_iter().map(str::to_string));
            }
        }

        if let Some(path) = &position.path
            && may_use(sender.as_ref(), path)
            && let Some(spec) = self.param_at(path.params(), position.arg_index)
        {
            let ctx = CompletionContext::new(
                sender.clone(),
                command.name(),
                position.residual.clone(),
                partial,
                position.arg_index,
            );
            let (candidates, filter) = self.gather(spec, &ctx);
            if filter {
                filtered.extend(candidates);
            } else {
                unfiltered.extend(candidates);
            }
        }

        metrics::record_completion(command.name());
        self.finalize(filter_prefix(filtered, partial).chain(unfiltered))
    }

    /// Root labels matching `partial` that the sender may use.
    pub fn complete_roots(&self, sender: &dyn CommandSender, partial: &str) -> Vec<String> {
        let labels = self
            .tree
            .commands()
            .into_iter()
            .filter(|c| !c.descriptor().is_hidden() && check_root(sender, c).is_ok())
            .flat_map(|c| {
                c.descriptor()
                    .labels()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        self.finalize(filter_prefix(labels, partial))
    }

    /// Parameter receiving the token at `index`; a greedy last parameter
    /// keeps receiving every later index.
    fn param_at<'p>(&self, params: &'p [ParameterSpec], index: usize) -> Option<&'p ParameterSpec> {
        params.get(index).or_else(|| {
            params.last().filter(|spec| {
                spec.is_greedy()
                    || self
                        .parsers
                        .lookup(spec.type_key())
                        .is_ok_and(|p| p.is_greedy())
            })
        })
    }

    /// Candidates for one parameter, and whether to prefix-filter them.
    fn gather(&self, spec: &ParameterSpec, ctx: &CompletionContext) -> (Vec<String>, bool) {
        match spec.completion() {
            CompletionSource::Static(values) => return (values.clone(), true),
            CompletionSource::Provider(key) => {
                if let Some(provider) = self.providers.get(key) {
                    return (provider.complete(ctx), provider.filter_by_prefix());
                }
            }
            CompletionSource::Parser => {}
        }
        match self.parsers.lookup(spec.type_key()) {
            Ok(parser) => (parser.suggest(ctx), true),
            Err(_) => (Vec::new(), true),
        }
    }

    /// De-duplicate (keeping first occurrences) and truncate.
    fn finalize(&self, candidates: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out: Vec<String> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        if let Some(max) = self.max_suggestions {
            out.truncate(max);
        }
        out
    }
}

fn filter_prefix(candidates: Vec<String>, partial: &str) -> impl Iterator<Item = String> {
    let prefix = partial.to_lowercase();
    candidates
        .into_iter()
        .filter(move |c| c.to_lowercase().starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::testing::QuietSender;
    use crate::dispatch::{CommandHandler, handler_fn};
    use crate::tree::{CommandDescriptor, SubcommandPath};

    fn noop() -> impl CommandHandler {
        handler_fn(|_ctx| Ok(()))
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    struct Fixture {
        tree: CommandTree,
        parsers: ParserRegistry,
        providers: ProviderRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let tree = CommandTree::new();
            tree.register(
                CommandDescriptor::builder("warp").build().unwrap(),
                vec![
                    SubcommandPath::default_path(noop())
                        .param(ParameterSpec::new::<String>("name").provider("warps"))
                        .build()
                        .unwrap(),
                    SubcommandPath::builder("set", noop())
                        .param(ParameterSpec::new::<String>("name"))
                        .param(ParameterSpec::new::<bool>("public").optional())
                        .build()
                        .unwrap(),
                    SubcommandPath::builder("secret", noop())
                        .hidden()
                        .build()
                        .unwrap(),
                ],
            )
            .unwrap();
            let providers = ProviderRegistry::new();
            providers.register(
                "warps",
                provider_fn(|_| vec!["spawn".into(), "shop".into(), "arena".into()]),
            );
            Self {
                tree,
                parsers: ParserRegistry::with_builtins(),
                providers,
            }
        }

        fn engine(&self, max: Option<usize>) -> CompletionEngine<'_> {
            CompletionEngine {
                tree: &self.tree,
                parsers: &self.parsers,
                providers: &self.providers,
                max_suggestions: max,
            }
        }
    }

    fn quiet() -> Arc<dyn CommandSender> {
        Arc::new(QuietSender)
    }

    #[test]
    fn first_argument_mixes_subcommands_and_provider() {
        let fx = Fixture::new();
        let out = fx.engine(None).complete(&quiet(), "warp", &args(&["s"]));
        assert_eq!(out, ["set", "spawn", "shop"]);
    }

    #[test]
    fn parser_suggestions_after_subcommand() {
        let fx = Fixture::new();
        let out = fx
            .engine(None)
            .complete(&quiet(), "warp", &args(&["set", "home", "y"]));
        assert_eq!(out, ["yes"]);
    }

    #[test]
    fn unknown_root_gives_nothing() {
        let fx = Fixture::new();
        assert!(fx.engine(None).complete(&quiet(), "nope", &args(&[""])).is_empty());
    }

    #[test]
    fn truncates_to_maximum() {
        let fx = Fixture::new();
        let out = fx.engine(Some(2)).complete(&quiet(), "warp", &args(&[""]));
        assert_eq!(out, ["set", "spawn"]);
    }

    #[test]
    fn root_labels() {
        let fx = Fixture::new();
        assert_eq!(fx.engine(None).complete_roots(&QuietSender, "W"), ["warp"]);
        assert!(fx.engine(None).complete_roots(&QuietSender, "x").is_empty());
    }
}
