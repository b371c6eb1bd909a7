//! The application: a built command tree plus everything dispatch needs.
//!
//! An [`App`] is produced by [`AppBuilder::build`] and is immutable from then
//! on. It owns:
//!
//! - the [`CommandTree`](crate::tree::CommandTree) with every registered command
//! - the global flag descriptors applied to every command
//! - the [`HookManager`] and the app-level [`Store`]
//! - the not-found, error and panic handlers
//! - the output and error [`Stream`]s
//!
//! Nothing is global, so several apps can live side by side in one process.
//!
//! # Entry points
//!
//! | Method | Returns | Use |
//! |--------|---------|-----|
//! | [`App::parse`] | `anyhow::Result<()>` | Dispatch an argument list; tests and embedding |
//! | [`App::run_from`] | exit code | `parse` + error handler |
//! | [`App::run`] | never | `run_from(env::args)` then `process::exit` |

mod builder;
mod dispatch;

pub use builder::AppBuilder;

use std::fmt;
use std::rc::Rc;

use crate::command::{Command, CommandInfo};
use crate::context::Context;
use crate::flags::Flag;
use crate::hooks::HookManager;
use crate::store::Store;
use crate::stream::Stream;
use crate::tree::CommandTree;

/// Converts a caught panic message into the dispatch error.
pub type PanicHandler = Rc<dyn Fn(String) -> anyhow::Error>;

/// Called with the attempted command name when nothing matches.
pub type NotFoundHandler = Rc<dyn Fn(&mut Context<'_>, &str) -> anyhow::Result<()>>;

/// Called by [`App::run_from`] with the error returned by dispatch.
pub type ErrorHandler = Rc<dyn Fn(&mut Context<'_>, anyhow::Error) -> anyhow::Result<()>>;

/// Application settings.
#[derive(Clone, Default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Emit `debug` tracing events while dispatching.
    pub debug: bool,
    /// Replaces the default `panic: <message>` error.
    pub panic_handler: Option<PanicHandler>,
    /// Silence the process panic hook while dispatching.
    pub quiet_panics: bool,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("description", &self.description)
            .field("debug", &self.debug)
            .field("panic_handler", &self.panic_handler.is_some())
            .field("quiet_panics", &self.quiet_panics)
            .finish()
    }
}

/// A built command-line application.
///
/// ```rust
/// use std::io::Write;
/// use sprout::{App, Buffer, Stream, StringFlag};
///
/// let out = Buffer::new();
/// let app = App::builder("greeter")
///     .version("1.0.0")
///     .out(Stream::new(out.clone()))
///     .command_with(
///         "greet",
///         |ctx| {
///             writeln!(ctx.out(), "hello {}", ctx.string("name"))?;
///             Ok(())
///         },
///         |cmd| cmd.short("Say hello").flag(StringFlag::new("name").default("world")),
///     )
///     .unwrap()
///     .build();
///
/// app.parse(["greet", "--name", "ada"]).unwrap();
/// assert_eq!(out.contents(), "hello ada\n");
/// ```
pub struct App {
    config: AppConfig,
    tree: CommandTree,
    global_flags: Vec<Rc<dyn Flag>>,
    plugins: Vec<String>,
    hooks: HookManager,
    store: Store,
    not_found: Option<NotFoundHandler>,
    on_error: Option<ErrorHandler>,
    out: Stream,
    err: Stream,
}

impl App {
    /// Starts building an app called `name`.
    pub fn builder(name: impl Into<String>) -> AppBuilder {
        AppBuilder::new(name)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The configured version, empty if unset.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn description(&self) -> &str {
        &self.config.description
    }

    pub fn is_debug(&self) -> bool {
        self.config.debug
    }

    /// The app-level store, shared by every dispatch.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn hooks(&self) -> &HookManager {
        &self.hooks
    }

    pub fn out(&self) -> &Stream {
        &self.out
    }

    pub fn err(&self) -> &Stream {
        &self.err
    }

    /// Returns the command registered at exactly `path`.
    pub fn command(&self, path: &str) -> Option<&Command> {
        self.tree.get(path)
    }

    pub fn has_command(&self, path: &str) -> bool {
        self.tree.contains(path)
    }

    /// Every registered command, root override first, then by path.
    pub fn commands(&self) -> Vec<CommandInfo> {
        self.tree.commands()
    }

    pub fn global_flags(&self) -> &[Rc<dyn Flag>] {
        &self.global_flags
    }

    /// Names of the installed plugins, in install order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("global_flags", &self.global_flags)
            .field("plugins", &self.plugins)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
