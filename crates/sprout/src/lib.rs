//! A small command tree toolkit for clap-based CLIs.
//!
//! `sprout` maps space-separated command paths (`"server start"`) to
//! callbacks, binds typed flags through clap, and runs each command through a
//! `before → action → after` lifecycle. Hooks and plugins extend an app without
//! touching its commands.
//!
//! # Features
//!
//! - **Command tree**: nested paths, aliases, a root command for empty input
//! - **Typed flags**: string, bool and int flags with defaults, aliases,
//!   required checks and inclusive ranges
//! - **Lifecycle callbacks**: per-command `before`/`after`, with `after`
//!   always running
//! - **Hooks**: app-wide handlers for parse, command, root and not-found events
//! - **Plugins**: bundles of commands and global flags (`version`, `--help`)
//! - **Stores**: per-run scratch values and a namespaced, thread-safe app store
//!
//! # Quick Start
//!
//! ```rust
//! use std::io::Write;
//! use sprout::{App, Buffer, IntFlag, Stream, VersionPlugin};
//!
//! let out = Buffer::new();
//! let app = App::builder("server")
//!     .version("0.4.0")
//!     .out(Stream::new(out.clone()))
//!     .plugin(VersionPlugin)?
//!     .command_with(
//!         "start",
//!         |ctx| {
//!             writeln!(ctx.out(), "listening on {}", ctx.int("port"))?;
//!             Ok(())
//!         },
//!         |cmd| cmd.flag(IntFlag::new("port").alias("p").default(8080).range(1, 65535)),
//!     )?
//!     .build();
//!
//! app.parse(["start", "-p", "9000"])?;
//! app.parse(["version"])?;
//! assert_eq!(out.contents(), "listening on 9000\n0.4.0\n");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! In a binary, finish with [`App::run`], which dispatches the process
//! arguments, prints any error to stderr and exits with status 1 on failure.
//!
//! # Dispatch
//!
//! | Input | Outcome |
//! |-------|---------|
//! | empty | root command, else `help` command, else a one-line banner |
//! | resolves to a command | flags bound on the remaining args, lifecycle runs |
//! | anything else | not-found handler (default: message on stderr, no error) |

pub mod app;
pub mod args;
pub mod command;
pub mod context;
pub mod error;
pub mod flags;
pub mod hooks;
pub mod logging;
pub mod plugin;
pub mod store;
pub mod stream;
pub mod tree;

pub use app::{App, AppBuilder, AppConfig, ErrorHandler, NotFoundHandler, PanicHandler};
pub use args::Args;
pub use command::{Action, Command, CommandInfo, Handler};
pub use context::{Context, Scratch};
pub use error::{Error, FlagError, SetupError};
pub use flags::{BoolFlag, Flag, FlagKind, FlagSet, IntFlag, StringFlag};
pub use hooks::{HookEvent, HookManager, HookPayload};
pub use plugin::{HelpFlagPlugin, Plugin, VersionPlugin};
pub use store::Store;
pub use stream::{Buffer, Stream};
