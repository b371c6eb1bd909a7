//! Error types for registration and dispatch.
//!
//! Registration problems surface as [`SetupError`] from the builder, before the
//! application serves any request. Everything that can go wrong while
//! dispatching is an [`Error`], carried inside the `anyhow::Error` returned by
//! [`App::parse`](crate::App::parse) so callers can `downcast_ref` it.

use thiserror::Error;

/// Error raised while building an application.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A non-builtin command was registered twice at the same path.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    /// A plugin failed to install.
    #[error("plugin {plugin} failed to install: {source}")]
    Install {
        /// Name reported by [`Plugin::name`](crate::Plugin::name).
        plugin: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Error raised while dispatching a command.
#[derive(Debug, Error)]
pub enum Error {
    /// The flag parser rejected the argument list.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// A flag descriptor rejected its bound value.
    #[error(transparent)]
    Flag(#[from] FlagError),

    /// The resolved command has no action callback.
    #[error("command {0:?} has no action defined")]
    NoAction(String),

    /// A callback panicked and no panic handler was configured.
    #[error("panic: {0}")]
    Panic(String),

    /// The builtin `version` command ran without a configured version.
    #[error("version not set")]
    VersionNotSet,
}

/// Validation failure for a single flag descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A required flag still holds its default value after parsing.
    #[error("flag --{name} is required")]
    Required { name: String },

    /// An integer flag is outside its inclusive range.
    #[error("flag --{name} value {value} out of range [{min},{max}]")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::DuplicateCommand("server start".into());
        assert_eq!(err.to_string(), "duplicate command: server start");

        let err = SetupError::Install {
            plugin: "audit".into(),
            source: anyhow::anyhow!("boom").into(),
        };
        assert_eq!(err.to_string(), "plugin audit failed to install: boom");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Panic("oops".into()).to_string(), "panic: oops");
        assert_eq!(Error::VersionNotSet.to_string(), "version not set");
        assert_eq!(
            Error::NoAction("deploy".into()).to_string(),
            "command \"deploy\" has no action defined"
        );
    }

    #[test]
    fn test_flag_error_display() {
        let err = FlagError::OutOfRange {
            name: "level".into(),
            value: 11,
            min: 1,
            max: 10,
        };
        assert_eq!(err.to_string(), "flag --level value 11 out of range [1,10]");

        let err: Error = FlagError::Required {
            name: "token".into(),
        }
        .into();
        assert_eq!(err.to_string(), "flag --token is required");
    }
}
