//! Command descriptors.
//!
//! A [`Command`] is the node payload of the command tree: metadata used for
//! listings, up to three lifecycle callbacks, and the flag descriptors local to
//! the command.
//!
//! # Lifecycle
//!
//! ```text
//! bind flags → validate → before → action → after
//! ```
//!
//! `before` can abort the run; `action` is skipped when it does. `after` runs
//! whenever it is set, even after a failure, and the first error observed is
//! the one reported.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::context::Context;
use crate::flags::{Flag, FlagSet};

/// Callback type shared by `before`, `action` and `after`.
pub type Action = Rc<dyn Fn(&mut Context<'_>) -> anyhow::Result<()>>;

/// A runnable node of the command tree.
///
/// ```rust
/// use sprout::{Command, IntFlag};
///
/// let cmd = Command::new("start")
///     .short("Start the server")
///     .alias("up")
///     .flag(IntFlag::new("port").default(8080))
///     .action(|_ctx| Ok(()));
///
/// assert!(cmd.has_action());
/// assert_eq!(cmd.flags().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Command {
    /// Final path segment. Set by the tree when the command is registered.
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub short: String,
    pub long: String,
    pub category: String,
    before: Option<Action>,
    action: Option<Action>,
    after: Option<Action>,
    flags: Vec<Rc<dyn Flag>>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the callback run before the action. An error skips the action.
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.before = Some(Rc::new(f));
        self
    }

    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.action = Some(Rc::new(f));
        self
    }

    /// Sets the callback run after the action, whether or not it failed.
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.after = Some(Rc::new(f));
        self
    }

    /// Adds a flag local to this command.
    pub fn flag<F: Flag + 'static>(mut self, flag: F) -> Self {
        self.flags.push(Rc::new(flag));
        self
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub(crate) fn before_fn(&self) -> Option<&Action> {
        self.before.as_ref()
    }

    pub(crate) fn action_fn(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub(crate) fn after_fn(&self) -> Option<&Action> {
        self.after.as_ref()
    }

    /// The command's own flag descriptors, in registration order.
    pub fn flags(&self) -> &[Rc<dyn Flag>] {
        &self.flags
    }

    /// Builds a fresh flag set called `name` holding this command's flags.
    pub fn flag_set(&self, name: impl Into<String>) -> FlagSet {
        let mut set = FlagSet::new(name);
        for flag in &self.flags {
            flag.apply(&mut set);
        }
        set
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("short", &self.short)
            .field("category", &self.category)
            .field("has_before", &self.before.is_some())
            .field("has_action", &self.action.is_some())
            .field("has_after", &self.after.is_some())
            .field("flags", &self.flags.len())
            .finish()
    }
}

/// A command that describes itself.
///
/// Implementors are registered with
/// [`AppBuilder::handler`](crate::AppBuilder::handler); the name of the
/// returned [`Command`] is used as the registration path.
///
/// ```rust
/// use sprout::{Command, Context, Handler};
///
/// struct Deploy;
///
/// impl Handler for Deploy {
///     fn command(&self) -> Command {
///         Command::new("app deploy").short("Deploy the app")
///     }
///
///     fn run(&self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait Handler {
    /// Metadata and flags. Any action set here is replaced by [`run`](Self::run).
    fn command(&self) -> Command;

    fn run(&self, ctx: &mut Context<'_>) -> anyhow::Result<()>;
}

/// Serializable summary of a registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    /// Full space-separated path; empty for the root override.
    pub path: String,
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usage: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    pub flags: Vec<String>,
}

impl CommandInfo {
    pub(crate) fn new(path: String, cmd: &Command) -> Self {
        Self {
            path,
            aliases: cmd.aliases.clone(),
            short: cmd.short.clone(),
            usage: cmd.usage.clone(),
            category: cmd.category.clone(),
            flags: cmd.flags.iter().map(|f| f.name().to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{BoolFlag, StringFlag};

    #[test]
    fn test_builder_sets_metadata() {
        let cmd = Command::new("list")
            .alias("ls")
            .alias("l")
            .usage("list [filter]")
            .short("List items")
            .long("List every item in the store")
            .category("items");

        assert_eq!(cmd.name, "list");
        assert_eq!(cmd.aliases, vec!["ls", "l"]);
        assert_eq!(cmd.usage, "list [filter]");
        assert_eq!(cmd.category, "items");
        assert!(!cmd.has_action());
    }

    #[test]
    fn test_flag_set_contains_local_flags() {
        let cmd = Command::new("add")
            .flag(StringFlag::new("title").alias("t"))
            .flag(BoolFlag::new("done"));

        let set = cmd.flag_set("tool add");
        assert_eq!(set.name(), "tool add");
        assert_eq!(set.len(), 2);
        assert!(set.lookup("t"));
        assert!(set.lookup("done"));
    }

    #[test]
    fn test_command_info() {
        let cmd = Command::new("start")
            .short("Start it")
            .flag(BoolFlag::new("detach"));
        let info = CommandInfo::new("server start".into(), &cmd);
        assert_eq!(info.path, "server start");
        assert_eq!(info.flags, vec!["detach"]);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["short"], "Start it");
        assert!(json.get("usage").is_none());
    }
}
