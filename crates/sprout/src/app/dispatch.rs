//! Dispatch: from an argument list to a finished command run.
//!
//! ```text
//! args ─┬─ empty ──────────→ root command │ help command │ banner
//!       ├─ resolves to cmd ─→ bind flags → validate → before → action → after
//!       └─ no command ──────→ not-found handler
//! ```
//!
//! Everything below [`App::parse`] runs inside a single `catch_unwind`, so a
//! panicking callback turns into an error instead of unwinding into the
//! caller.

use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::command::Command;
use crate::context::Context;
use crate::error::{Error, FlagError};
use crate::flags::FlagSet;
use crate::hooks::{HookEvent, HookPayload};

use super::App;

impl App {
    /// Dispatches `args` (without the binary name).
    ///
    /// Errors from flag parsing, validation, callbacks and hooks are returned
    /// as-is; toolkit errors can be recovered with
    /// `err.downcast_ref::<sprout::Error>()`. A panic inside dispatch is
    /// caught and returned as an error too.
    ///
    /// The process panic hook still runs for a caught panic, so by default
    /// the usual "thread panicked at" message reaches stderr before the error
    /// is returned. With [`AppBuilder::quiet_panics`](crate::AppBuilder::quiet_panics)
    /// the hook is swapped for a silent one while dispatch runs.
    pub fn parse<I, S>(&self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let caught = if self.config.quiet_panics {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(|_| {}));
            let caught = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(args)));
            panic::set_hook(previous);
            caught
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(args)))
        };
        match caught {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                if self.is_debug() {
                    debug!(app = %self.name(), panic = %message, "recovered from panic");
                }
                Err(match &self.config.panic_handler {
                    Some(handler) => handler(message),
                    None => Error::Panic(message).into(),
                })
            }
        }
    }

    /// Dispatches `args` and reports any error through the error handler.
    ///
    /// Returns the process exit code: 0 on success, 1 if dispatch failed.
    pub fn run_from<I, S>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Err(err) = self.parse(args) else {
            return 0;
        };
        let mut ctx = Context::bare(self, Vec::new());
        let handled = match &self.on_error {
            Some(handler) => handler(&mut ctx, err),
            None => default_error(&mut ctx, err),
        };
        if let (Err(err), true) = (handled, self.is_debug()) {
            debug!(app = %self.name(), error = %err, "error handler returned");
        }
        1
    }

    /// Dispatches the process arguments and exits.
    ///
    /// In debug mode a stderr subscriber is installed first, unless one is
    /// already set.
    pub fn run(&self) -> ! {
        if self.is_debug() {
            let _ = crate::logging::init_subscriber_with_config(crate::logging::LogConfig::debug());
        }
        std::process::exit(self.run_from(std::env::args().skip(1)))
    }

    fn dispatch(&self, args: Vec<String>) -> anyhow::Result<()> {
        if self.is_debug() {
            debug!(app = %self.name(), "starting dispatch");
        }
        {
            let mut ctx = Context::bare(self, args.clone());
            self.hooks
                .trigger(HookEvent::BeforeParse, &mut ctx, HookPayload::Args(&args))?;
        }

        if args.is_empty() {
            return self.dispatch_empty();
        }

        let resolution = self.tree.resolve(&args);
        match resolution.command() {
            Some(command) => {
                let path = resolution.consumed.join(" ");
                if self.is_debug() {
                    debug!(app = %self.name(), command = %path, args = ?args, "dispatching command");
                }
                let mut ctx = self.bind(command, &path, args.clone(), &resolution.leftover)?;
                self.hooks.trigger(
                    HookEvent::BeforeCommand,
                    &mut ctx,
                    HookPayload::Command(command),
                )?;
                run_lifecycle(command, &path, &mut ctx)?;
                self.hooks.trigger(
                    HookEvent::AfterCommand,
                    &mut ctx,
                    HookPayload::Command(command),
                )
            }
            None => {
                let name = resolution.attempted_name();
                if self.is_debug() {
                    debug!(app = %self.name(), command = %name, "command not found");
                }
                let mut ctx = Context::bare(self, resolution.leftover.clone());
                self.hooks
                    .trigger(HookEvent::NotFound, &mut ctx, HookPayload::Name(&name))?;
                match &self.not_found {
                    Some(handler) => handler(&mut ctx, &name),
                    None => default_not_found(&mut ctx, &name),
                }
            }
        }
    }

    fn dispatch_empty(&self) -> anyhow::Result<()> {
        if let Some(root) = self.tree.root_command() {
            if self.is_debug() {
                debug!(app = %self.name(), "running root command");
            }
            let mut ctx = self.bind(root, "", vec![String::new()], &[])?;
            self.hooks
                .trigger(HookEvent::BeforeRoot, &mut ctx, HookPayload::None)?;
            run_lifecycle(root, "", &mut ctx)?;
            return self
                .hooks
                .trigger(HookEvent::AfterRoot, &mut ctx, HookPayload::None);
        }

        if let Some(help) = self.tree.get("help") {
            if self.is_debug() {
                debug!(app = %self.name(), "no root command, running help");
            }
            let mut ctx = self.bind(help, "help", vec!["help".to_string()], &[])?;
            return run_lifecycle(help, "help", &mut ctx);
        }

        if self.is_debug() {
            debug!(app = %self.name(), "no root or help command, printing banner");
        }
        self.print_banner()
    }

    /// Parses `leftover` against the command's flags plus the global flags,
    /// validates them, and returns the context for the run.
    fn bind<'a>(
        &'a self,
        command: &'a Command,
        path: &str,
        raw_args: Vec<String>,
        leftover: &[String],
    ) -> anyhow::Result<Context<'a>> {
        let mut flags = command.flag_set(format!("{} {}", self.name(), path).trim_end());
        for flag in &self.global_flags {
            flag.apply(&mut flags);
        }
        flags.parse(leftover.iter().cloned()).map_err(Error::Parse)?;
        self.validate(command, &flags).map_err(Error::Flag)?;

        let mut ctx = Context::new(self, Some(command), raw_args, flags);
        self.hooks
            .trigger(HookEvent::AfterParse, &mut ctx, HookPayload::Args(leftover))?;
        Ok(ctx)
    }

    /// Runs every descriptor's validation and reports the last failure.
    fn validate(&self, command: &Command, flags: &FlagSet) -> Result<(), FlagError> {
        let shadowed = |name: &str| command.flags().iter().any(|f| f.name() == name);
        let globals = self
            .global_flags
            .iter()
            .filter(|flag| !shadowed(flag.name()));

        let mut last = None;
        for flag in command.flags().iter().chain(globals) {
            if let Err(err) = flag.validate(flags) {
                last = Some(err);
            }
        }
        last.map_or(Ok(()), Err)
    }

    fn print_banner(&self) -> anyhow::Result<()> {
        let mut out = self.out.clone();
        if self.version().is_empty() {
            writeln!(out, "{}", self.name())?;
        } else {
            writeln!(out, "{} - {}", self.name(), self.version())?;
        }
        if !self.description().is_empty() {
            write!(out, "\n{}\n", self.description())?;
        }
        Ok(())
    }
}

/// Runs `before`, `action` and `after`. `after` always runs when set; the
/// first error wins.
fn run_lifecycle(command: &Command, path: &str, ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let mut result = match command.before_fn() {
        Some(before) => before(ctx),
        None => Ok(()),
    };
    if result.is_ok() {
        result = match command.action_fn() {
            Some(action) => action(ctx),
            None => Err(Error::NoAction(path.to_string()).into()),
        };
    }
    if let Some(after) = command.after_fn() {
        let after_result = after(ctx);
        if result.is_ok() {
            result = after_result;
        }
    }
    result
}

fn default_not_found(ctx: &mut Context<'_>, name: &str) -> anyhow::Result<()> {
    writeln!(ctx.err(), "command {:?} not found", name)?;
    Ok(())
}

fn default_error(ctx: &mut Context<'_>, err: anyhow::Error) -> anyhow::Result<()> {
    writeln!(ctx.err(), "{}", err)?;
    Err(err)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
