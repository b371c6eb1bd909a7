//! AppBuilder for constructing App instances.
//!
//! Registration errors surface immediately from the method that caused them,
//! so a builder chain reads as a sequence of `?`:
//!
//! ```rust,ignore
//! let app = App::builder("tool")
//!     .version(env!("CARGO_PKG_VERSION"))
//!     .flag(BoolFlag::new("verbose").alias("v"))
//!     .plugin(VersionPlugin)?
//!     .command("server start", server::start)?
//!     .command_with("server stop", server::stop, |cmd| cmd.short("Stop the server"))?
//!     .handler(Deploy)?
//!     .build();
//! ```
//!
//! Plugins receive `&mut AppBuilder` and use the non-consuming methods
//! ([`register`](AppBuilder::register),
//! [`add_global_flag`](AppBuilder::add_global_flag)) to extend the app.

use std::fmt;
use std::rc::Rc;

use crate::command::{Command, Handler};
use crate::context::Context;
use crate::error::SetupError;
use crate::flags::Flag;
use crate::hooks::HookManager;
use crate::plugin::Plugin;
use crate::store::Store;
use crate::stream::Stream;
use crate::tree::CommandTree;

use super::{App, AppConfig, ErrorHandler, NotFoundHandler};

/// Builder for an [`App`].
pub struct AppBuilder {
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

impl AppBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(AppConfig::new(name))
    }

    /// Starts from a prepared configuration.
    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config,
            tree: CommandTree::new(),
            global_flags: Vec::new(),
            plugins: Vec::new(),
            hooks: HookManager::new(),
            store: Store::new(),
            not_found: None,
            on_error: None,
            out: Stream::stdout(),
            err: Stream::stderr(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = description.into();
        self
    }

    /// Turns dispatch tracing on or off.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Sets how a panic caught during dispatch becomes an error.
    pub fn panic_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> anyhow::Error + 'static,
    {
        self.config.panic_handler = Some(Rc::new(f));
        self
    }

    /// Keeps caught panics off stderr.
    ///
    /// The process-wide panic hook is replaced by a silent one for the length
    /// of each dispatch and restored afterwards. Panics on other threads during
    /// that window are silenced too.
    pub fn quiet_panics(mut self, quiet: bool) -> Self {
        self.config.quiet_panics = quiet;
        self
    }

    /// Adds a global flag, bound for every command.
    pub fn flag<F: Flag + 'static>(mut self, flag: F) -> Self {
        self.add_global_flag(flag);
        self
    }

    /// Installs a plugin right away.
    pub fn plugin<P: Plugin>(mut self, plugin: P) -> Result<Self, SetupError> {
        self.install(&plugin)?;
        Ok(self)
    }

    /// Installs `plugin` if present; `None` is skipped.
    pub fn maybe_plugin<P: Plugin>(self, plugin: Option<P>) -> Result<Self, SetupError> {
        match plugin {
            Some(plugin) => self.plugin(plugin),
            None => {
                if self.config.debug {
                    tracing::debug!(app = %self.config.name, "skipping empty plugin");
                }
                Ok(self)
            }
        }
    }

    fn install<P: Plugin>(&mut self, plugin: &P) -> Result<(), SetupError> {
        let name = plugin.name().to_string();
        plugin
            .install(self)
            .map_err(|source| SetupError::Install {
                plugin: name.clone(),
                source: source.into(),
            })?;
        if self.config.debug {
            tracing::debug!(app = %self.config.name, plugin = %name, "installed plugin");
        }
        self.plugins.push(name);
        Ok(())
    }

    /// Registers `action` at the space-separated `path`.
    ///
    /// An empty path registers the root command, run when the app is invoked
    /// without arguments.
    pub fn command<F>(self, path: &str, action: F) -> Result<Self, SetupError>
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.command_with(path, action, |cmd| cmd)
    }

    /// Registers `action` at `path`, letting `configure` add metadata, flags
    /// and `before`/`after` callbacks.
    pub fn command_with<F, C>(self, path: &str, action: F, configure: C) -> Result<Self, SetupError>
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
        C: FnOnce(Command) -> Command,
    {
        let command = configure(Command::default().action(action));
        self.add_command(path, command)
    }

    /// Registers a fully built [`Command`] at `path`.
    pub fn add_command(mut self, path: &str, command: Command) -> Result<Self, SetupError> {
        self.register(path, command)?;
        Ok(self)
    }

    /// Registers a [`Handler`] under the name of the command it describes.
    pub fn handler<H: Handler + 'static>(self, handler: H) -> Result<Self, SetupError> {
        let command = handler.command();
        let path = command.name.clone();
        self.add_command(&path, command.action(move |ctx| handler.run(ctx)))
    }

    /// Replaces the default not-found handler.
    pub fn on_not_found<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, &str) -> anyhow::Result<()> + 'static,
    {
        self.not_found = Some(Rc::new(f));
        self
    }

    /// Replaces the default error handler used by [`App::run`].
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, anyhow::Error) -> anyhow::Result<()> + 'static,
    {
        self.on_error = Some(Rc::new(f));
        self
    }

    /// Registers lifecycle hooks.
    pub fn hooks<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut HookManager),
    {
        configure(&mut self.hooks);
        self
    }

    pub fn out(mut self, stream: Stream) -> Self {
        self.out = stream;
        self
    }

    pub fn err(mut self, stream: Stream) -> Self {
        self.err = stream;
        self
    }

    /// Registers `command` at `path` without consuming the builder.
    pub fn register(&mut self, path: &str, command: Command) -> Result<(), SetupError> {
        self.tree.register(path, command)
    }

    pub fn has_command(&self, path: &str) -> bool {
        self.tree.contains(path)
    }

    /// Adds a global flag without consuming the builder.
    pub fn add_global_flag<F: Flag + 'static>(&mut self, flag: F) -> &mut Self {
        self.global_flags.push(Rc::new(flag));
        self
    }

    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    /// The store the built app will own.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> App {
        if self.config.debug {
            tracing::debug!(
                app = %self.config.name,
                commands = self.tree.commands().len(),
                plugins = ?self.plugins,
                "app built"
            );
        }
        App {
            config: self.config,
            tree: self.tree,
            global_flags: self.global_flags,
            plugins: self.plugins,
            hooks: self.hooks,
            store: self.store,
            not_found: self.not_found,
            on_error: self.on_error,
            out: self.out,
            err: self.err,
        }
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("global_flags", &self.global_flags)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::BoolFlag;

    #[test]
    fn test_builder_sets_config() {
        let app = App::builder("tool")
            .version("0.1.0")
            .description("A tool")
            .debug(true)
            .build();
        assert_eq!(app.name(), "tool");
        assert_eq!(app.version(), "0.1.0");
        assert_eq!(app.description(), "A tool");
        assert!(app.is_debug());
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::new("tool");
        config.version = "2.0".into();
        let app = AppBuilder::from_config(config).build();
        assert_eq!(app.version(), "2.0");
    }

    #[test]
    fn test_duplicate_command_is_setup_error() {
        let err = App::builder("tool")
            .command("a b", |_| Ok(()))
            .unwrap()
            .command("a b", |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, SetupError::DuplicateCommand(ref p) if p == "a b"));
    }

    #[test]
    fn test_command_with_configures_command() {
        let app = App::builder("tool")
            .command_with("list", |_| Ok(()), |cmd| cmd.alias("ls").short("List"))
            .unwrap()
            .build();
        let cmd = app.command("ls").unwrap();
        assert_eq!(cmd.name, "list");
        assert_eq!(cmd.short, "List");
        assert!(cmd.has_action());
    }

    #[test]
    fn test_handler_registration() {
        struct Deploy;
        impl Handler for Deploy {
            fn command(&self) -> Command {
                Command::new("app deploy").short("Deploy")
            }
            fn run(&self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
                ctx.store().set("deployed", true);
                Ok(())
            }
        }

        let app = App::builder("tool").handler(Deploy).unwrap().build();
        assert!(app.has_command("app deploy"));
        app.parse(["app", "deploy"]).unwrap();
        assert_eq!(app.store().get::<bool>("deployed"), Some(true));
    }

    #[test]
    fn test_global_flags_are_kept() {
        let mut builder = App::builder("tool").flag(BoolFlag::new("verbose"));
        builder.add_global_flag(BoolFlag::new("quiet"));
        let app = builder.build();
        let names: Vec<&str> = app.global_flags().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["verbose", "quiet"]);
    }
}
