//! Console host: senders and a handful of demo commands.

use async_trait::async_trait;
use parking_lot::RwLock;
use slcmd::args::{ChoiceParser, Text, format_duration};
use slcmd::completion::provider_fn;
use slcmd::dispatch::{CommandContext, CommandEngine, CommandHandler, handler_fn};
use slcmd::error::{HandlerError, HandlerResult, RegistrationError};
use slcmd::sender::{CommandSender, SenderId};
use slcmd::tree::{CommandDescriptor, ParameterSpec, SubcommandPath};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The operator at the terminal. Holds every permission.
pub struct ConsoleSender;

impl CommandSender for ConsoleSender {
    fn id(&self) -> SenderId {
        SenderId::Console
    }

    fn name(&self) -> &str {
        "console"
    }

    fn has_permission(&self, _node: &str) -> bool {
        true
    }

    fn send_message(&self, text: &str) {
        println!("{text}");
    }
}

/// A simulated player with an explicit permission set.
pub struct DemoPlayer {
    id: Uuid,
    name: String,
    permissions: HashSet<String>,
}

impl DemoPlayer {
    pub fn new(name: &str, permissions: &[&str]) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl CommandSender for DemoPlayer {
    fn id(&self) -> SenderId {
        SenderId::Player(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions.contains(node)
    }

    fn send_message(&self, text: &str) {
        println!("[to {}] {text}", self.name);
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// Replies once the requested time has passed.
struct TimerHandler;

#[async_trait]
impl CommandHandler for TimerHandler {
    async fn handle(&self, ctx: &CommandContext) -> HandlerResult {
        let duration = *ctx.require::<Duration>("duration")?;
        let label = ctx
            .get::<Text>("label")
            .map(Text::to_string)
            .unwrap_or_else(|| "timer".to_string());
        ctx.reply(&format!("{label}: started ({})", format_duration(duration)));
        tokio::time::sleep(duration).await;
        ctx.reply(&format!("{label}: done"));
        Ok(())
    }
}

/// Register the demo commands and their providers and parsers.
pub fn register_demo_commands(engine: &CommandEngine) -> Result<(), RegistrationError> {
    engine.parsers().register(
        ChoiceParser::new("operation")
            .choice("add", Op::Add)
            .choice("sub", Op::Sub)
            .choice("mul", Op::Mul)
            .choice("div", Op::Div),
    );

    let warps: Arc<RwLock<Vec<String>>> = Arc::new(RwLock::new(vec![
        "spawn".to_string(),
        "arena".to_string(),
        "market".to_string(),
    ]));
    let listed = warps.clone();
    engine
        .providers()
        .register("warps", provider_fn(move |_ctx| listed.read().clone()));

    engine.register(
        CommandDescriptor::builder("echo")
            .alias("say")
            .description("Repeat a message")
            .build()?,
        vec![
            SubcommandPath::default_path(handler_fn(|ctx| {
                let message = ctx.require::<Text>("message")?;
                ctx.reply(message);
                Ok(())
            }))
            .param(ParameterSpec::new::<Text>("message").non_empty())
            .build()?,
        ],
    )?;

    engine.register(
        CommandDescriptor::builder("calc")
            .description("Arithmetic on two numbers")
            .build()?,
        vec![
            SubcommandPath::default_path(handler_fn(|ctx| {
                let op = *ctx.require::<Op>("operation")?;
                let a = *ctx.require::<f64>("a")?;
                let b = *ctx.require::<f64>("b")?;
                let value = match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div if b == 0.0 => return Err(HandlerError::failed("Cannot divide by zero")),
                    Op::Div => a / b,
                };
                ctx.reply(&format!("{value}"));
                Ok(())
            }))
            .param(ParameterSpec::new::<Op>("operation"))
            .param(ParameterSpec::new::<f64>("a"))
            .param(ParameterSpec::new::<f64>("b"))
            .build()?,
        ],
    )?;

    engine.register(
        CommandDescriptor::builder("timer")
            .description("Start a countdown")
            .build()?,
        vec![
            SubcommandPath::builder("start", TimerHandler)
                .param(ParameterSpec::new::<Duration>("duration").range(1.0, 3600.0))
                .param(ParameterSpec::new::<Text>("label").optional())
                .asynchronous()
                .cooldown(Duration::from_secs(10))
                .build()?,
        ],
    )?;

    let toggled = Arc::new(RwLock::new(false));
    let state = toggled.clone();
    engine.register(
        CommandDescriptor::builder("toggle")
            .description("Flip a flag")
            .permission("slcmd.toggle")
            .build()?,
        vec![
            SubcommandPath::default_path(handler_fn(move |ctx| {
                let value = match ctx.get::<bool>("value") {
                    Some(value) => *value,
                    None => !*state.read(),
                };
                *state.write() = value;
                ctx.reply(&format!("Flag is now {}", if value { "on" } else { "off" }));
                Ok(())
            }))
            .param(ParameterSpec::new::<bool>("value").optional())
            .cooldown(Duration::from_secs(5))
            .build()?,
        ],
    )?;

    let known = warps.clone();
    let created = warps;
    engine.register(
        CommandDescriptor::builder("warp")
            .description("Travel to a named location")
            .player_only()
            .build()?,
        vec![
            SubcommandPath::default_path(handler_fn(move |ctx| {
                let name = ctx.require::<String>("name")?;
                if !known.read().iter().any(|w| w.eq_ignore_ascii_case(name)) {
                    return Err(HandlerError::failed(format!("No warp named '{name}'")));
                }
                ctx.reply(&format!("Warped to {name}"));
                Ok(())
            }))
            .param(ParameterSpec::new::<String>("name").provider("warps"))
            .build()?,
            SubcommandPath::builder("set", handler_fn(move |ctx| {
                let name = ctx.require::<String>("name")?;
                created.write().push(name.to_lowercase());
                ctx.reply(&format!("Created warp {name}"));
                Ok(())
            }))
            .permission("slcmd.warp.set")
            .param(ParameterSpec::new::<String>("name").check(|name: &String, _ctx| {
                if name.chars().all(|c| c.is_ascii_alphanumeric()) {
                    Ok(())
                } else {
                    Err("Warp names are letters and digits only".to_string())
                }
            }))
            .build()?,
        ],
    )?;

    Ok(())
}
