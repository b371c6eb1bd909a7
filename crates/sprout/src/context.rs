//! Per-invocation context.
//!
//! Every dispatch builds a fresh [`Context`] and hands it to the command's
//! `before`, `action` and `after` callbacks in turn. It borrows the running
//! [`App`] and the resolved [`Command`], owns the raw arguments and the bound
//! [`FlagSet`], and carries a [`Scratch`] map for passing data between the
//! callbacks of one run.
//!
//! # Scratch vs Store
//!
//! | Container | Scope | Keys | Thread-safe |
//! |-----------|-------|------|-------------|
//! | [`Context::scratch`] | One dispatch | string | no |
//! | [`App::store`] | App lifetime | dotted string, namespaced | yes |
//!
//! ```rust,ignore
//! Command::new("deploy")
//!     .before(|ctx| {
//!         ctx.scratch.insert("started", std::time::Instant::now());
//!         Ok(())
//!     })
//!     .action(|ctx| {
//!         let started = ctx.scratch.get_required::<std::time::Instant>("started")?;
//!         writeln!(ctx.out(), "took {:?}", started.elapsed())?;
//!         Ok(())
//!     })
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::app::App;
use crate::args::Args;
use crate::command::Command;
use crate::flags::FlagSet;
use crate::store::Store;
use crate::stream::Stream;

/// String-keyed container for request-scoped values.
#[derive(Default)]
pub struct Scratch {
    map: HashMap<String, Box<dyn Any>>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one if it had the same type.
    pub fn insert<T: 'static>(&mut self, key: impl Into<String>, val: T) -> Option<T> {
        self.map
            .insert(key.into(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Returns the value under `key` if it has type `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.map.get(key).and_then(|boxed| boxed.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.map.get_mut(key).and_then(|boxed| boxed.downcast_mut())
    }

    /// Like [`get`](Self::get), but missing values are an error.
    pub fn get_required<T: 'static>(&self, key: &str) -> Result<&T, anyhow::Error> {
        self.get::<T>(key).ok_or_else(|| {
            anyhow::anyhow!(
                "scratch value {:?} of type {} not found in context",
                key,
                std::any::type_name::<T>()
            )
        })
    }

    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        self.map
            .remove(key)
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl fmt::Debug for Scratch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.map.keys().collect();
        keys.sort();
        f.debug_struct("Scratch")
            .field("keys", &keys)
            .finish_non_exhaustive()
    }
}

/// Request-scoped data for one dispatch.
pub struct Context<'a> {
    app: &'a App,
    command: Option<&'a Command>,
    raw_args: Vec<String>,
    flags: FlagSet,
    /// Values shared between the callbacks of this dispatch.
    pub scratch: Scratch,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        app: &'a App,
        command: Option<&'a Command>,
        raw_args: Vec<String>,
        flags: FlagSet,
    ) -> Self {
        Self {
            app,
            command,
            raw_args,
            flags,
            scratch: Scratch::new(),
        }
    }

    /// A context with no resolved command and an empty flag set.
    pub(crate) fn bare(app: &'a App, raw_args: Vec<String>) -> Self {
        Self::new(app, None, raw_args, FlagSet::new(app.name()))
    }

    pub fn app(&self) -> &'a App {
        self.app
    }

    /// The resolved command, if dispatch found one.
    pub fn command(&self) -> Option<&'a Command> {
        self.command
    }

    /// Unprocessed arguments, including the command path.
    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    /// The flag set bound for this run.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Positional arguments left after flag parsing.
    pub fn args(&self) -> Args<'_> {
        Args::new(self.flags.args())
    }

    /// Value of a string flag, empty if no such flag is bound.
    pub fn string(&self, name: &str) -> String {
        self.flags.string(name).unwrap_or_default()
    }

    /// Value of a bool flag, false if no such flag is bound.
    pub fn bool(&self, name: &str) -> bool {
        self.flags.bool(name).unwrap_or(false)
    }

    /// Value of an int flag, 0 if no such flag is bound.
    pub fn int(&self, name: &str) -> i64 {
        self.flags.int(name).unwrap_or(0)
    }

    /// The application's output stream.
    ///
    /// The handle borrows the writer only for the length of each write, so it
    /// can be held across [`exec`](Self::exec).
    pub fn out(&self) -> Stream {
        self.app.out().clone()
    }

    /// The application's error stream.
    pub fn err(&self) -> Stream {
        self.app.err().clone()
    }

    /// The application-level store.
    pub fn store(&self) -> &'a Store {
        self.app.store()
    }

    /// Dispatches another command as if it came from the command line.
    ///
    /// `path` is split on spaces and followed by `args`:
    ///
    /// ```rust,ignore
    /// app.command("hello", |ctx| ctx.exec("greet", ["--name", "world"]))
    /// ```
    pub fn exec<I, S>(&self, path: &str, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = path
            .split(' ')
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .chain(args.into_iter().map(Into::into))
            .collect();
        self.app.parse(argv)
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("app", &self.app.name())
            .field("command", &self.command.map(|c| c.name.as_str()))
            .field("raw_args", &self.raw_args)
            .field("flags", &self.flags)
            .field("scratch", &self.scratch)
            .finish()
    }
}
