//! sprout-demo: a small CLI showing commands, flags, hooks and plugins.
//!
//! ```text
//! sprout-demo greet --name ada --shout
//! sprout-demo server start -p 9000
//! sprout-demo config list --json
//! sprout-demo version
//! ```
//!
//! Set `SPROUT_DEBUG=1` to trace dispatch on stderr.

mod commands;

use std::io::Write;

use sprout::logging::{self, LogConfig};
use sprout::{
    App, AppBuilder, BoolFlag, HelpFlagPlugin, IntFlag, SetupError, StringFlag, VersionPlugin,
};

fn builder(debug: bool) -> Result<AppBuilder, SetupError> {
    App::builder("sprout-demo")
        .version(env!("CARGO_PKG_VERSION"))
        .description("A worked example of a sprout-based CLI app")
        .debug(debug)
        .flag(BoolFlag::new("verbose").alias("v").help("Log each command"))
        .plugin(VersionPlugin)?
        .plugin(HelpFlagPlugin)?
        .hooks(|hooks| {
            hooks.before_command(|ctx, cmd| {
                if ctx.bool("verbose") {
                    tracing::info!(command = %cmd.name, args = ?ctx.raw_args(), "running");
                }
                if ctx.bool("help") {
                    writeln!(ctx.err(), "{}: {}", cmd.usage, cmd.short)?;
                }
                Ok(())
            });
        })
        .command("", commands::root)?
        .command_with("greet", commands::greet, |cmd| {
            cmd.short("Print a greeting")
                .usage("greet [--name NAME] [--shout]")
                .alias("hi")
                .flag(StringFlag::new("name").alias("n").default("world"))
                .flag(BoolFlag::new("shout").alias("s"))
        })?
        .command_with("server start", commands::server_start, |cmd| {
            cmd.short("Start the server")
                .usage("server start [--host HOST] [--port PORT]")
                .category("server")
                .flag(StringFlag::new("host").default("127.0.0.1"))
                .flag(IntFlag::new("port").alias("p").default(8080).range(1, 65535))
        })?
        .command_with("config list", commands::config_list, |cmd| {
            cmd.short("List commands")
                .usage("config list [--json]")
                .category("config")
                .flag(BoolFlag::new("json"))
        })
}

fn main() -> anyhow::Result<()> {
    let debug = std::env::var_os("SPROUT_DEBUG").is_some();
    let config = if debug {
        LogConfig::debug()
    } else {
        LogConfig::default()
    };
    logging::init_subscriber_with_config(config).ok();

    let app = builder(debug)?.build();
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout::{Buffer, Stream};

    fn app() -> (App, Buffer, Buffer) {
        let out = Buffer::new();
        let err = Buffer::new();
        let app = builder(false)
            .unwrap()
            .out(Stream::new(out.clone()))
            .err(Stream::new(err.clone()))
            .build();
        (app, out, err)
    }

    #[test]
    fn test_greet() {
        let (app, out, _) = app();
        app.parse(["greet"]).unwrap();
        app.parse(["hi", "-n", "ada", "--shout"]).unwrap();
        assert_eq!(out.contents(), "Hello, world!\nHELLO, ADA!\n");
    }

    #[test]
    fn test_server_start_port_range() {
        let (app, out, _) = app();
        app.parse(["server", "start", "-p", "9000"]).unwrap();
        assert_eq!(out.contents(), "listening on 127.0.0.1:9000\n");
        assert_eq!(
            app.store().get::<String>("server.addr").as_deref(),
            Some("127.0.0.1:9000")
        );
        assert_eq!(app.run_from(["server", "start", "--port", "0"]), 1);
    }

    #[test]
    fn test_config_list_json() {
        let (app, out, _) = app();
        app.parse(["config", "list", "--json"]).unwrap();
        let listed: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
        let paths: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["", "config list", "greet", "server start", "version"]);
    }

    #[test]
    fn test_root_and_version() {
        let (app, out, _) = app();
        app.parse(Vec::<String>::new()).unwrap();
        assert!(out.contents().starts_with("sprout-demo "));
        assert!(out.contents().contains("server start"));

        out.clear();
        app.parse(["version"]).unwrap();
        assert_eq!(out.contents(), format!("{}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_unknown_command() {
        let (app, _, err) = app();
        assert_eq!(app.run_from(["deploy"]), 0);
        assert_eq!(err.contents(), "command \"deploy\" not found\n");
    }

    #[test]
    fn test_help_flag_prints_usage() {
        let (app, _, err) = app();
        app.parse(["greet", "-h"]).unwrap();
        assert_eq!(
            err.contents(),
            "greet [--name NAME] [--shout]: Print a greeting\n"
        );
    }
}
