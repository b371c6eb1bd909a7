//! Typed flag descriptors and the clap-backed flag set they bind into.
//!
//! A [`FlagSet`] collects `clap::Arg` definitions and parses an argument list
//! against them, keeping whatever positional arguments are left over. Flag
//! descriptors ([`StringFlag`], [`BoolFlag`], [`IntFlag`]) describe one option
//! each and know how to register themselves into a set and how to validate the
//! value bound after parsing.
//!
//! # Example
//!
//! ```rust
//! use sprout::{BoolFlag, Flag, FlagSet, IntFlag};
//!
//! let mut set = FlagSet::new("serve");
//! BoolFlag::new("verbose").alias("v").apply(&mut set);
//! IntFlag::new("port").default(8080).range(1, 65535).apply(&mut set);
//!
//! set.parse(["-v", "--port", "9000", "public"]).unwrap();
//! assert_eq!(set.bool("verbose"), Some(true));
//! assert_eq!(set.int("port"), Some(9000));
//! assert_eq!(set.args(), ["public"]);
//! ```
//!
//! A string or int flag always takes the next argument as its value, even
//! when it starts with `-` (`--name -x` sets `name` to `-x`).
//!
//! # Required flags
//!
//! A required flag is satisfied when its post-parse value differs from its
//! default, compared through their string forms. Passing the default value
//! explicitly therefore looks the same as not passing the flag at all.

use std::collections::{HashMap, HashSet};
use std::fmt;

use clap::{Arg, ArgAction, ArgMatches};

use crate::error::FlagError;

/// Id of the trailing positional argument that soaks up non-flag values.
const POSITIONAL: &str = "__positional";

/// Value type of a registered flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Bool,
    Int,
}

#[derive(Debug, Clone)]
struct Registered {
    kind: FlagKind,
    default: String,
}

/// A set of named, typed options plus the positional arguments left after
/// parsing.
#[derive(Debug, Clone)]
pub struct FlagSet {
    name: String,
    args: Vec<Arg>,
    flags: HashMap<String, Registered>,
    /// Every long name and alias already claimed by a registered flag.
    taken: HashSet<String>,
    matches: Option<ArgMatches>,
    positional: Vec<String>,
}

impl FlagSet {
    /// Creates an empty flag set. The name only shows up in parse errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            flags: HashMap::new(),
            taken: HashSet::new(),
            matches: None,
            positional: Vec::new(),
        }
    }

    /// Returns the set's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `name` is already claimed, either as a flag name or as
    /// an alias.
    pub fn lookup(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Returns the kind of the flag registered under `name`.
    pub fn kind(&self, name: &str) -> Option<FlagKind> {
        self.flags.get(name).map(|r| r.kind)
    }

    /// Returns the number of registered flags (aliases not counted).
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if no flags are registered.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns true once [`parse`](Self::parse) has succeeded.
    pub fn is_parsed(&self) -> bool {
        self.matches.is_some()
    }

    fn register(&mut self, name: &str, kind: FlagKind, default: String, bound: BoundArg) {
        self.taken.insert(name.to_string());
        self.taken.extend(bound.aliases);
        self.flags.insert(name.to_string(), Registered { kind, default });
        self.args.push(bound.arg);
    }

    /// Parses `args` against the registered flags.
    ///
    /// Parsing stops treating arguments as flags at the first positional
    /// value; that value and everything after it become [`args`](Self::args).
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let command = clap::Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args(self.args.iter().cloned())
            .arg(
                Arg::new(POSITIONAL)
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .trailing_var_arg(true),
            );

        let matches = command.try_get_matches_from(args)?;
        self.positional = matches
            .get_many::<String>(POSITIONAL)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        self.matches = Some(matches);
        Ok(())
    }

    /// Positional arguments left over after parsing.
    pub fn args(&self) -> &[String] {
        &self.positional
    }

    /// Returns the value of a string flag, or its default before parsing.
    pub fn string(&self, name: &str) -> Option<String> {
        let registered = self.registered(name, FlagKind::String)?;
        match &self.matches {
            Some(m) => Some(
                m.try_get_one::<String>(name)
                    .ok()
                    .flatten()
                    .cloned()
                    .unwrap_or_default(),
            ),
            None => Some(registered.default.clone()),
        }
    }

    /// Returns the value of a bool flag, or its default before parsing.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.registered(name, FlagKind::Bool)?;
        match &self.matches {
            Some(m) => Some(
                m.try_get_one::<bool>(name)
                    .ok()
                    .flatten()
                    .copied()
                    .unwrap_or(false),
            ),
            None => Some(false),
        }
    }

    /// Returns the value of an int flag, or its default before parsing.
    pub fn int(&self, name: &str) -> Option<i64> {
        let registered = self.registered(name, FlagKind::Int)?;
        let default = registered.default.parse().ok();
        match &self.matches {
            Some(m) => m.try_get_one::<i64>(name).ok().flatten().copied().or(default),
            None => default,
        }
    }

    /// Returns the string form of a flag's current value.
    pub fn value_string(&self, name: &str) -> Option<String> {
        match self.kind(name)? {
            FlagKind::String => self.string(name),
            FlagKind::Bool => self.bool(name).map(|b| b.to_string()),
            FlagKind::Int => self.int(name).map(|i| i.to_string()),
        }
    }

    /// Returns the string form of a flag's default value.
    pub fn default_string(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(|r| r.default.as_str())
    }

    fn registered(&self, name: &str, kind: FlagKind) -> Option<&Registered> {
        self.flags.get(name).filter(|r| r.kind == kind)
    }
}

/// A flag descriptor that can register itself into a [`FlagSet`].
pub trait Flag: fmt::Debug {
    /// The flag's long name.
    fn name(&self) -> &str;

    /// Registers the flag and its aliases into `set`. Names already present
    /// are skipped, so applying twice is a no-op.
    fn apply(&self, set: &mut FlagSet);

    /// Checks the value bound in `set` after parsing.
    fn validate(&self, set: &FlagSet) -> Result<(), FlagError>;
}

/// A clap argument together with the aliases it claimed.
struct BoundArg {
    arg: Arg,
    aliases: Vec<String>,
}

impl BoundArg {
    /// Builds the clap argument shared by every descriptor kind, skipping
    /// aliases another flag already owns.
    fn new(set: &FlagSet, name: &str, aliases: &[String], help: &str) -> Self {
        let mut arg = Arg::new(name.to_string()).long(name.to_string());
        if !help.is_empty() {
            arg = arg.help(help.to_string());
        }

        let mut claimed = Vec::new();
        for alias in aliases {
            if alias == name || set.lookup(alias) || claimed.contains(alias) {
                continue;
            }
            let mut chars = alias.chars();
            arg = match (chars.next(), chars.next()) {
                (Some(c), None) if arg.get_short().is_none() => arg.short(c),
                (Some(c), None) => arg.short_alias(c),
                _ => arg.visible_alias(alias.clone()),
            };
            claimed.push(alias.clone());
        }

        Self {
            arg,
            aliases: claimed,
        }
    }

    fn map(self, f: impl FnOnce(Arg) -> Arg) -> Self {
        Self {
            arg: f(self.arg),
            aliases: self.aliases,
        }
    }
}

fn check_required(set: &FlagSet, name: &str, default: &str) -> Result<(), FlagError> {
    let observed = set.value_string(name);
    if observed.as_deref().unwrap_or(default) == default {
        return Err(FlagError::Required {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A string-valued flag.
#[derive(Debug, Clone, Default)]
pub struct StringFlag {
    name: String,
    aliases: Vec<String>,
    default: String,
    help: String,
    required: bool,
}

impl StringFlag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an alias. Single characters become short flags (`-o`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Flag for StringFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, set: &mut FlagSet) {
        if set.lookup(&self.name) {
            return;
        }
        let default = self.default.clone();
        let bound = BoundArg::new(set, &self.name, &self.aliases, &self.help).map(|arg| {
            let arg = arg
                .action(ArgAction::Set)
                .num_args(1)
                .allow_hyphen_values(true);
            if default.is_empty() {
                arg
            } else {
                arg.default_value(default)
            }
        });
        set.register(&self.name, FlagKind::String, self.default.clone(), bound);
    }

    fn validate(&self, set: &FlagSet) -> Result<(), FlagError> {
        if self.required {
            check_required(set, &self.name, &self.default)?;
        }
        Ok(())
    }
}

/// A boolean switch. Its default is always `false`.
#[derive(Debug, Clone, Default)]
pub struct BoolFlag {
    name: String,
    aliases: Vec<String>,
    help: String,
    required: bool,
}

impl BoolFlag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an alias. Single characters become short flags (`-v`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Flag for BoolFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, set: &mut FlagSet) {
        if set.lookup(&self.name) {
            return;
        }
        let bound = BoundArg::new(set, &self.name, &self.aliases, &self.help)
            .map(|arg| arg.action(ArgAction::SetTrue));
        set.register(&self.name, FlagKind::Bool, false.to_string(), bound);
    }

    fn validate(&self, set: &FlagSet) -> Result<(), FlagError> {
        if self.required {
            check_required(set, &self.name, "false")?;
        }
        Ok(())
    }
}

/// A 64-bit integer flag with an optional inclusive range.
#[derive(Debug, Clone, Default)]
pub struct IntFlag {
    name: String,
    aliases: Vec<String>,
    default: i64,
    help: String,
    required: bool,
    range: Option<(i64, i64)>,
}

impl IntFlag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an alias. Single characters become short flags (`-n`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn default(mut self, value: i64) -> Self {
        self.default = value;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the value to `min..=max`. The default is checked too.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }
}

impl Flag for IntFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, set: &mut FlagSet) {
        if set.lookup(&self.name) {
            return;
        }
        let default = self.default.to_string();
        let bound = BoundArg::new(set, &self.name, &self.aliases, &self.help).map(|arg| {
            arg.action(ArgAction::Set)
                .num_args(1)
                .allow_hyphen_values(true)
                .value_parser(clap::value_parser!(i64))
                .default_value(default.clone())
        });
        set.register(&self.name, FlagKind::Int, default, bound);
    }

    fn validate(&self, set: &FlagSet) -> Result<(), FlagError> {
        if self.required {
            check_required(set, &self.name, &self.default.to_string())?;
        }
        if let Some((min, max)) = self.range {
            let value = set.int(&self.name).unwrap_or(self.default);
            if value < min || value > max {
                return Err(FlagError::OutOfRange {
                    name: self.name.clone(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}
