//! Plugins: reusable bundles of commands and global flags.
//!
//! A plugin gets mutable access to the [`AppBuilder`] while the app is being
//! built and can register commands or global flags through it. Plugins are
//! installed immediately, in the order they are added, so a plugin sees every
//! command registered before it.

use std::io::Write;

use crate::app::AppBuilder;
use crate::command::Command;
use crate::error::Error;
use crate::flags::BoolFlag;

/// Something that extends an app at build time.
///
/// ```rust
/// use sprout::{App, AppBuilder, Plugin};
///
/// struct Ping;
///
/// impl Plugin for Ping {
///     fn install(&self, app: &mut AppBuilder) -> anyhow::Result<()> {
///         if !app.has_command("ping") {
///             app.register("ping", sprout::Command::new("ping").action(|_| Ok(())))?;
///         }
///         Ok(())
///     }
/// }
///
/// let app = App::builder("tool").plugin(Ping).unwrap().build();
/// assert!(app.has_command("ping"));
/// ```
pub trait Plugin {
    /// Name used in install errors and debug output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn install(&self, app: &mut AppBuilder) -> anyhow::Result<()>;
}

/// Adds a `version` command printing the app version, unless the app already
/// has one.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionPlugin;

impl Plugin for VersionPlugin {
    fn name(&self) -> &str {
        "version"
    }

    fn install(&self, app: &mut AppBuilder) -> anyhow::Result<()> {
        if app.has_command("version") {
            return Ok(());
        }
        let command = Command::new("version")
            .short("Print the version")
            .action(|ctx| {
                let version = ctx.app().version();
                if version.is_empty() {
                    return Err(Error::VersionNotSet.into());
                }
                writeln!(ctx.out(), "{}", version)?;
                Ok(())
            });
        app.register("version", command)?;
        Ok(())
    }
}

/// Adds a global `--help`/`-h` switch.
///
/// The switch is only bound; reading `ctx.bool("help")` and acting on it is up
/// to the commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpFlagPlugin;

impl Plugin for HelpFlagPlugin {
    fn name(&self) -> &str {
        "help-flag"
    }

    fn install(&self, app: &mut AppBuilder) -> anyhow::Result<()> {
        app.add_global_flag(
            BoolFlag::new("help")
                .alias("h")
                .help("Print help for the command"),
        );
        Ok(())
    }
}
