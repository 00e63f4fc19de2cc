use std::collections::HashMap;
use std::time::Instant;

use crate::bus::EventBus;
use crate::console::Console;
use crate::stack::ActivityStack;
use crate::tracker::{EventTracker, LifecycleEvent};

/// Output from a command execution.
pub enum CommandOutput {
    /// Lines to display in the console.
    Lines(Vec<String>),
    /// Signal that the app should quit.
    Quit,
}

impl CommandOutput {
    fn line(s: impl Into<String>) -> Self {
        CommandOutput::Lines(vec![s.into()])
    }

    fn error(err: impl std::fmt::Display) -> Self {
        CommandOutput::line(format!("error: {}", err))
    }
}

/// Context available to commands during execution.
///
/// Lifecycle callbacks go through the bus rather than straight into the
/// tracker, so they are recorded in the same place as every other source.
pub struct CommandContext<'a> {
    pub tracker: &'a EventTracker,
    pub stack: &'a mut ActivityStack,
    pub console: &'a mut Console,
    pub bus: &'a mut EventBus,
    pub started_at: Instant,
}

/// A console command.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[&str] { &[] }
    fn description(&self) -> &str;
    fn usage(&self) -> &str { self.name() }
    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput;
}

/// Registry of console commands. `help` and `?` are answered by the registry itself.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    lookup: HashMap<String, usize>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let idx = self.commands.len();
        self.lookup.insert(cmd.name().to_string(), idx);
        for alias in cmd.aliases() {
            self.lookup.insert(alias.to_string(), idx);
        }
        self.commands.push(cmd);
    }

    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandOutput {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return CommandOutput::Lines(vec![]);
        };

        if name == "help" || name == "?" {
            return CommandOutput::Lines(self.help(args.first().copied()));
        }

        match self.lookup.get(name) {
            Some(&idx) => {
                tracing::debug!(command = name, args = args.len(), "executing command");
                self.commands[idx].execute(args, ctx)
            }
            None => CommandOutput::line(format!(
                "unknown command: '{}'. Type 'help' for available commands.",
                name
            )),
        }
    }

    fn help(&self, topic: Option<&str>) -> Vec<String> {
        if let Some(topic) = topic {
            return match self.lookup.get(topic) {
                Some(&idx) => {
                    let cmd = &self.commands[idx];
                    vec![format!("usage: {}", cmd.usage()), format!("  {}", cmd.description())]
                }
                None => vec![format!("no help for '{}'", topic)],
            };
        }

        let mut lines = vec![format!("  {:22} {} (aliases: ?)", "help [command]", "List commands")];
        for cmd in &self.commands {
            let aliases = cmd.aliases();
            if aliases.is_empty() {
                lines.push(format!("  {:22} {}", cmd.usage(), cmd.description()));
            } else {
                lines.push(format!(
                    "  {:22} {} (aliases: {})",
                    cmd.usage(),
                    cmd.description(),
                    aliases.join(", ")
                ));
            }
        }
        lines
    }

    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }
}

// ── Built-in commands ──

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &str { "clear" }
    fn aliases(&self) -> &[&str] { &["cls"] }
    fn description(&self) -> &str { "Clear console output" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        ctx.console.clear_lines();
        CommandOutput::Lines(vec![])
    }
}

pub struct RecordCommand;

impl Command for RecordCommand {
    fn name(&self) -> &str { "record" }
    fn aliases(&self) -> &[&str] { &["rec"] }
    fn description(&self) -> &str { "Report a lifecycle callback" }
    fn usage(&self) -> &str { "record <key> <method>" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        // The key may contain spaces; the method never does.
        let Some((method, key)) = args.split_last() else {
            return CommandOutput::line(format!("usage: {}", self.usage()));
        };
        if key.is_empty() {
            return CommandOutput::line(format!("usage: {}", self.usage()));
        }
        let event = LifecycleEvent::new(key.join(" "), *method);
        let line = format!("recorded {}", event);
        ctx.bus.publish_lifecycle(vec![event]);
        CommandOutput::line(line)
    }
}

pub struct StatusCommand;

impl Command for StatusCommand {
    fn name(&self) -> &str { "status" }
    fn aliases(&self) -> &[&str] { &["st"] }
    fn description(&self) -> &str { "Show current status of one key or all" }
    fn usage(&self) -> &str { "status [key]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        if !args.is_empty() {
            let key = args.join(" ");
            return match ctx.tracker.status(&key) {
                Ok(label) => CommandOutput::line(format!("{}: {}", key, label)),
                Err(err) => CommandOutput::line(format!("{}: unknown ({})", key, err)),
            };
        }

        let statuses = ctx.tracker.statuses();
        if statuses.is_empty() {
            return CommandOutput::line("no statuses recorded");
        }
        CommandOutput::Lines(
            statuses
                .into_iter()
                .map(|(key, raw)| match ctx.tracker.status(&key) {
                    Ok(label) => format!("  {}: {}", key, label),
                    Err(_) => format!("  {}: unknown ({})", key, raw),
                })
                .collect(),
        )
    }
}

pub struct LogCommand;

impl Command for LogCommand {
    fn name(&self) -> &str { "log" }
    fn description(&self) -> &str { "Show recorded callbacks, newest first" }
    fn usage(&self) -> &str { "log [count]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let limit = match args.first() {
            None => usize::MAX,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) => n,
                Err(_) => return CommandOutput::error(format!("not a count: {}", raw)),
            },
        };

        let log = ctx.tracker.event_log();
        if log.is_empty() {
            return CommandOutput::line("event log is empty");
        }
        let mut lines: Vec<String> = log
            .iter()
            .rev()
            .take(limit)
            .map(|entry| format!("  {}", entry))
            .collect();
        let evicted = ctx.tracker.evicted();
        if evicted > 0 {
            lines.push(format!("  ({} older entries evicted)", evicted));
        }
        CommandOutput::Lines(lines)
    }
}

pub struct ResetCommand;

impl Command for ResetCommand {
    fn name(&self) -> &str { "reset" }
    fn description(&self) -> &str { "Clear tracked history and statuses" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        ctx.tracker.clear();
        CommandOutput::line("tracker cleared")
    }
}

pub struct StartCommand;

impl Command for StartCommand {
    fn name(&self) -> &str { "start" }
    fn aliases(&self) -> &[&str] { &["launch"] }
    fn description(&self) -> &str { "Launch an activity on top of the stack" }
    fn usage(&self) -> &str { "start [name]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let name = if args.is_empty() {
            ctx.stack.next_name()
        } else {
            args.join(" ")
        };
        match ctx.stack.launch(&name) {
            Ok(events) => {
                ctx.bus.publish_lifecycle(events);
                CommandOutput::line(format!("started {}", name))
            }
            Err(e) => CommandOutput::error(e),
        }
    }
}

pub struct DialogCommand;

impl Command for DialogCommand {
    fn name(&self) -> &str { "dialog" }
    fn description(&self) -> &str { "Launch a translucent activity over the current one" }
    fn usage(&self) -> &str { "dialog [name]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let name = if args.is_empty() {
            "Dialog".to_string()
        } else {
            args.join(" ")
        };
        match ctx.stack.launch_translucent(&name) {
            Ok(events) => {
                ctx.bus.publish_lifecycle(events);
                CommandOutput::line(format!("opened {}", name))
            }
            Err(e) => CommandOutput::error(e),
        }
    }
}

pub struct FinishCommand;

impl Command for FinishCommand {
    fn name(&self) -> &str { "finish" }
    fn aliases(&self) -> &[&str] { &["back"] }
    fn description(&self) -> &str { "Finish the front activity" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let name = ctx.stack.top().map(str::to_string);
        match ctx.stack.finish() {
            Ok(events) => {
                ctx.bus.publish_lifecycle(events);
                CommandOutput::line(format!("finished {}", name.unwrap_or_default()))
            }
            Err(e) => CommandOutput::error(e),
        }
    }
}

pub struct StackCommand;

impl Command for StackCommand {
    fn name(&self) -> &str { "stack" }
    fn description(&self) -> &str { "List the activity stack, front first" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        if ctx.stack.is_empty() {
            return CommandOutput::line("stack is empty");
        }
        let lines = ctx
            .stack
            .names()
            .iter()
            .rev()
            .enumerate()
            .map(|(i, name)| {
                let marker = if i == 0 { " *" } else { "" };
                format!("  {}{}", name, marker)
            })
            .collect();
        CommandOutput::Lines(lines)
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str { "quit" }
    fn aliases(&self) -> &[&str] { &["exit", "q"] }
    fn description(&self) -> &str { "Exit lifespy" }

    fn execute(&self, _args: &[&str], _ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Quit
    }
}

pub struct UptimeCommand;

impl Command for UptimeCommand {
    fn name(&self) -> &str { "uptime" }
    fn description(&self) -> &str { "Show runtime uptime" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let secs = ctx.started_at.elapsed().as_secs();
        CommandOutput::line(format!(
            "Uptime: {:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        ))
    }
}

/// Create a CommandRegistry pre-loaded with all built-in commands.
pub fn builtin_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    reg.register(Box::new(RecordCommand));
    reg.register(Box::new(StatusCommand));
    reg.register(Box::new(LogCommand));
    reg.register(Box::new(ResetCommand));
    reg.register(Box::new(StartCommand));
    reg.register(Box::new(DialogCommand));
    reg.register(Box::new(FinishCommand));
    reg.register(Box::new(StackCommand));
    reg.register(Box::new(ClearCommand));
    reg.register(Box::new(UptimeCommand));
    reg.register(Box::new(QuitCommand));
    reg
}
