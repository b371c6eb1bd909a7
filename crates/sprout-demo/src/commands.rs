//! Command actions for the demo app.

use std::io::Write;

use sprout::Context;

pub fn greet(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let mut greeting = format!("Hello, {}!", ctx.string("name"));
    if ctx.bool("shout") {
        greeting = greeting.to_uppercase();
    }
    writeln!(ctx.out(), "{}", greeting)?;
    Ok(())
}

pub fn server_start(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let host = ctx.string("host");
    let port = ctx.int("port");
    ctx.store().namespace("server").set("addr", format!("{}:{}", host, port));
    writeln!(ctx.out(), "listening on {}:{}", host, port)?;
    Ok(())
}

/// Prints every registered command, as JSON with `--json`.
pub fn config_list(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let commands = ctx.app().commands();
    if ctx.bool("json") {
        let json = serde_json::to_string_pretty(&commands)?;
        writeln!(ctx.out(), "{}", json)?;
        return Ok(());
    }
    let mut out = ctx.out();
    for info in commands.iter().filter(|c| !c.path.is_empty()) {
        writeln!(out, "{:<16} {}", info.path, info.short)?;
    }
    Ok(())
}

/// Root command: a short usage line plus the top-level commands.
pub fn root(ctx: &mut Context<'_>) -> anyhow::Result<()> {
    let app = ctx.app();
    let mut out = ctx.out();
    writeln!(out, "{} {}", app.name(), app.version())?;
    writeln!(out, "\nUsage: {} <command> [flags]\n", app.name())?;
    for info in app.commands().iter().filter(|c| !c.path.is_empty()) {
        writeln!(out, "  {:<16} {}", info.path, info.short)?;
    }
    Ok(())
}
