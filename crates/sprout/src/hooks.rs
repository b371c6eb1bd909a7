//! Lifecycle hooks around dispatch.
//!
//! A [`HookManager`] keeps an ordered list of handlers per [`HookEvent`].
//! The app triggers the events while dispatching:
//!
//! ```text
//! argv
//!   → BEFORE_PARSE   (raw args)
//!   → resolve
//!   ├─ matched:    bind flags → AFTER_PARSE → BEFORE_COMMAND → before/action/after → AFTER_COMMAND
//!   ├─ root:       bind flags → AFTER_PARSE → BEFORE_ROOT → root command → AFTER_ROOT
//!   └─ no match:   NOT_FOUND → not-found handler
//! ```
//!
//! `AFTER_PARSE` receives the arguments that were parsed as flags, i.e. what
//! is left once the command path is stripped.
//!
//! Handlers run in registration order. The first one to return an error stops
//! the rest, and the error becomes the dispatch result.
//!
//! Hooks are independent of the per-command `before`/`after` callbacks: those
//! belong to one command, hooks apply to every dispatch of the app.
//!
//! # Example
//!
//! ```rust
//! use sprout::{App, Buffer, Stream};
//! use std::io::Write;
//!
//! let out = Buffer::new();
//! let app = App::builder("tool")
//!     .out(Stream::new(out.clone()))
//!     .hooks(|hooks| {
//!         hooks.before_command(|ctx, cmd| {
//!             writeln!(ctx.out(), "running {}", cmd.name)?;
//!             Ok(())
//!         });
//!     })
//!     .command("build", |_ctx| Ok(()))
//!     .unwrap()
//!     .build();
//!
//! app.parse(["build"]).unwrap();
//! assert_eq!(out.contents(), "running build\n");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::command::Command;
use crate::context::Context;
use crate::store::Store;

/// A point in the dispatch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    BeforeParse,
    AfterParse,
    BeforeCommand,
    AfterCommand,
    BeforeRoot,
    AfterRoot,
    NotFound,
}

impl HookEvent {
    pub const ALL: [HookEvent; 7] = [
        HookEvent::BeforeParse,
        HookEvent::AfterParse,
        HookEvent::BeforeCommand,
        HookEvent::AfterCommand,
        HookEvent::BeforeRoot,
        HookEvent::AfterRoot,
        HookEvent::NotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::BeforeParse => "before_parse",
            HookEvent::AfterParse => "after_parse",
            HookEvent::BeforeCommand => "before_command",
            HookEvent::AfterCommand => "after_command",
            HookEvent::BeforeRoot => "before_root",
            HookEvent::AfterRoot => "after_root",
            HookEvent::NotFound => "not_found",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-specific data passed to a handler.
#[derive(Debug, Clone, Copy)]
pub enum HookPayload<'p> {
    None,
    /// Raw arguments, for the parse events.
    Args(&'p [String]),
    /// The matched command, for the command events.
    Command(&'p Command),
    /// The attempted command name, for `NotFound`.
    Name(&'p str),
}

impl<'p> HookPayload<'p> {
    pub fn args(&self) -> Option<&'p [String]> {
        match *self {
            HookPayload::Args(args) => Some(args),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&'p Command> {
        match *self {
            HookPayload::Command(cmd) => Some(cmd),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&'p str> {
        match *self {
            HookPayload::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// Type-erased hook handler.
pub type HookFn = Rc<dyn Fn(&mut Context<'_>, &HookPayload<'_>) -> anyhow::Result<()>>;

/// Ordered hook handlers per event, plus a store for hook-scoped data.
#[derive(Clone, Default)]
pub struct HookManager {
    handlers: HashMap<HookEvent, Vec<HookFn>>,
    store: Store,
}

impl HookManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store shared by all hooks of this manager. Separate from the app store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Adds an untyped handler for `event`.
    pub fn register<F>(&mut self, event: HookEvent, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &HookPayload<'_>) -> anyhow::Result<()> + 'static,
    {
        self.handlers.entry(event).or_default().push(Rc::new(f));
        self
    }

    pub fn before_parse<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::BeforeParse, move |ctx, payload| {
            f(ctx, payload.args().unwrap_or_default())
        })
    }

    pub fn after_parse<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::AfterParse, move |ctx, payload| {
            f(ctx, payload.args().unwrap_or_default())
        })
    }

    /// Runs before the matched command's own `before` callback.
    pub fn before_command<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &Command) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::BeforeCommand, move |ctx, payload| {
            match payload.command() {
                Some(cmd) => f(ctx, cmd),
                None => Ok(()),
            }
        })
    }

    /// Runs after the matched command completed successfully.
    pub fn after_command<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &Command) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::AfterCommand, move |ctx, payload| {
            match payload.command() {
                Some(cmd) => f(ctx, cmd),
                None => Ok(()),
            }
        })
    }

    pub fn before_root<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::BeforeRoot, move |ctx, _| f(ctx))
    }

    pub fn after_root<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::AfterRoot, move |ctx, _| f(ctx))
    }

    /// Runs before the app's not-found handler with the attempted name.
    pub fn on_not_found<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &str) -> anyhow::Result<()> + 'static,
    {
        self.register(HookEvent::NotFound, move |ctx, payload| {
            f(ctx, payload.name().unwrap_or_default())
        })
    }

    pub fn has_hook(&self, event: HookEvent) -> bool {
        self.handlers.get(&event).is_some_and(|h| !h.is_empty())
    }

    /// Number of handlers registered for `event`.
    pub fn count(&self, event: HookEvent) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Runs every handler for `event` in order, stopping at the first error.
    pub fn trigger(
        &self,
        event: HookEvent,
        ctx: &mut Context<'_>,
        payload: HookPayload<'_>,
    ) -> anyhow::Result<()> {
        let Some(handlers) = self.handlers.get(&event) else {
            return Ok(());
        };
        for handler in handlers {
            handler(ctx, &payload)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        counts.sort();
        f.debug_struct("HookManager")
            .field("handlers", &counts)
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use std::cell::RefCell;

    fn app() -> App {
        App::builder("hooks-test").build()
    }

    #[test]
    fn test_event_names() {
        assert_eq!(HookEvent::BeforeParse.to_string(), "before_parse");
        assert_eq!(HookEvent::NotFound.as_str(), "not_found");
        assert_eq!(HookEvent::ALL.len(), 7);
    }

    #[test]
    fn test_empty_manager() {
        let hooks = HookManager::new();
        for event in HookEvent::ALL {
            assert!(!hooks.has_hook(event));
        }
        let app = app();
        let mut ctx = Context::bare(&app, vec![]);
        assert!(hooks
            .trigger(HookEvent::AfterRoot, &mut ctx, HookPayload::None)
            .is_ok());
    }

    #[test]
    fn test_handlers_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookManager::new();
        for i in 0..3 {
            let seen = seen.clone();
            hooks.before_root(move |_| {
                seen.borrow_mut().push(i);
                Ok(())
            });
        }
        assert_eq!(hooks.count(HookEvent::BeforeRoot), 3);

        let app = app();
        let mut ctx = Context::bare(&app, vec![]);
        hooks
            .trigger(HookEvent::BeforeRoot, &mut ctx, HookPayload::None)
            .unwrap();
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_first_error_short_circuits() {
        let mut hooks = HookManager::new();
        hooks
            .after_root(|_| Err(anyhow::anyhow!("first fails")))
            .after_root(|_| panic!("should not be called"));

        let app = app();
        let mut ctx = Context::bare(&app, vec![]);
        let err = hooks
            .trigger(HookEvent::AfterRoot, &mut ctx, HookPayload::None)
            .unwrap_err();
        assert_eq!(err.to_string(), "first fails");
    }

    #[test]
    fn test_typed_payloads() {
        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let mut hooks = HookManager::new();
        let s = seen.clone();
        hooks.before_parse(move |_, args| {
            s.borrow_mut().push(args.join(","));
            Ok(())
        });
        let s = seen.clone();
        hooks.before_command(move |_, cmd| {
            s.borrow_mut().push(cmd.name.clone());
            Ok(())
        });
        let s = seen.clone();
        hooks.on_not_found(move |_, name| {
            s.borrow_mut().push(format!("missing {}", name));
            Ok(())
        });

        let app = app();
        let mut ctx = Context::bare(&app, vec![]);
        let args = vec!["a".to_string(), "b".to_string()];
        let cmd = Command::new("deploy");
        hooks
            .trigger(HookEvent::BeforeParse, &mut ctx, HookPayload::Args(&args))
            .unwrap();
        hooks
            .trigger(HookEvent::BeforeCommand, &mut ctx, HookPayload::Command(&cmd))
            .unwrap();
        hooks
            .trigger(HookEvent::NotFound, &mut ctx, HookPayload::Name("zap"))
            .unwrap();

        assert_eq!(*seen.borrow(), vec!["a,b", "deploy", "missing zap"]);
    }

    #[test]
    fn test_handlers_share_context_scratch() {
        let mut hooks = HookManager::new();
        hooks
            .before_root(|ctx| {
                ctx.scratch.insert("count", 1u32);
                Ok(())
            })
            .before_root(|ctx| {
                if let Some(count) = ctx.scratch.get_mut::<u32>("count") {
                    *count += 10;
                }
                Ok(())
            });

        let app = app();
        let mut ctx = Context::bare(&app, vec![]);
        hooks
            .trigger(HookEvent::BeforeRoot, &mut ctx, HookPayload::None)
            .unwrap();
        assert_eq!(ctx.scratch.get::<u32>("count"), Some(&11));
    }

    #[test]
    fn test_own_store() {
        let hooks = HookManager::new();
        hooks.store().namespace("audit").set("enabled", true);
        assert_eq!(hooks.store().get::<bool>("audit.enabled"), Some(true));

        let app = app();
        assert!(!app.store().contains("audit.enabled"));
    }
}
