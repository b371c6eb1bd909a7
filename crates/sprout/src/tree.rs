//! Command tree: a trie keyed by space-separated path segments.
//!
//! `"server start"` is stored as the child `start` of the node `server`.
//! Resolution walks an argument list left to right, one segment per level,
//! and stops at the first segment without a matching child; that segment and
//! everything after it is returned as leftover.
//!
//! The empty path is the root override: it is stored in its own slot rather
//! than in the trie, and serves as the app's default command.
//!
//! # Collisions
//!
//! Registering a path that already holds a command fails with
//! [`SetupError::DuplicateCommand`], unless the path is one of the
//! [`BUILTIN_COMMANDS`], in which case the new command silently replaces the
//! old one. Registering `a b` before `a` creates a command-less `a` node that
//! a later registration of `a` fills in without colliding.

use std::collections::BTreeMap;

use crate::command::{Command, CommandInfo};
use crate::error::SetupError;

/// Top-level names that may be registered over an existing command.
pub const BUILTIN_COMMANDS: &[&str] = &["version", "help"];

/// A node of the command tree.
#[derive(Debug, Default)]
pub struct Node {
    command: Option<Command>,
    children: BTreeMap<String, Node>,
    /// Alias → canonical child name.
    aliases: BTreeMap<String, String>,
}

impl Node {
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Child names in sorted order. Aliases are not included.
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Looks up a child by name or alias, returning its canonical name.
    fn child(&self, segment: &str) -> Option<(&String, &Node)> {
        self.children.get_key_value(segment).or_else(|| {
            let target = self.aliases.get(segment)?;
            self.children.get_key_value(target)
        })
    }

    fn canonical<'s>(&'s self, segment: &'s str) -> &'s str {
        self.aliases
            .get(segment)
            .map(String::as_str)
            .unwrap_or(segment)
    }
}

/// Outcome of resolving a path against the tree.
#[derive(Debug)]
pub struct Resolution<'t> {
    /// Deepest node reached.
    pub node: &'t Node,
    /// Canonical names of the consumed segments.
    pub consumed: Vec<String>,
    /// Segments from the first unmatched one onwards.
    pub leftover: Vec<String>,
}

impl<'t> Resolution<'t> {
    /// True when every segment was consumed.
    pub fn is_full_match(&self) -> bool {
        self.leftover.is_empty()
    }

    /// The command at the deepest node reached, if any.
    pub fn command(&self) -> Option<&'t Command> {
        self.node.command()
    }

    /// Best-effort name for error messages: the consumed path plus the first
    /// unmatched segment.
    pub fn attempted_name(&self) -> String {
        self.consumed
            .iter()
            .chain(self.leftover.first())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The command tree owned by an [`App`](crate::App).
#[derive(Debug, Default)]
pub struct CommandTree {
    root: Node,
    root_override: Option<Command>,
}

fn split_path(path: &str) -> Vec<&str> {
    path.split(' ').filter(|s| !s.is_empty()).collect()
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The command registered under the empty path.
    pub fn root_command(&self) -> Option<&Command> {
        self.root_override.as_ref()
    }

    /// Registers `command` at `path`.
    pub fn register(&mut self, path: &str, mut command: Command) -> Result<(), SetupError> {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            if self.root_override.is_some() {
                return Err(SetupError::DuplicateCommand(String::new()));
            }
            command.name = String::new();
            self.root_override = Some(command);
            return Ok(());
        };

        let mut prefix = Vec::with_capacity(parents.len());
        let mut cur = &mut self.root;
        for segment in parents {
            let name = cur.canonical(segment).to_string();
            prefix.push(name.clone());
            cur = cur.children.entry(name).or_default();
        }
        let full = |name: &str| {
            prefix
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(name))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let builtin = parents.is_empty() && BUILTIN_COMMANDS.contains(last);
        let occupied = cur
            .children
            .get(*last)
            .is_some_and(|node| node.command.is_some());
        if (occupied && !builtin) || cur.aliases.contains_key(*last) {
            return Err(SetupError::DuplicateCommand(full(last)));
        }
        for alias in &command.aliases {
            let taken_by_other = cur
                .aliases
                .get(alias)
                .is_some_and(|target| target != last);
            if alias != last && (cur.children.contains_key(alias) || taken_by_other) {
                return Err(SetupError::DuplicateCommand(full(alias)));
            }
        }

        if occupied {
            cur.aliases.retain(|_, target| target.as_str() != *last);
        }
        for alias in &command.aliases {
            if alias != last {
                cur.aliases.insert(alias.clone(), last.to_string());
            }
        }
        command.name = last.to_string();
        cur.children.entry(last.to_string()).or_default().command = Some(command);
        Ok(())
    }

    /// Walks `segments` from the root as far as children match.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Resolution<'_> {
        let mut node = &self.root;
        let mut consumed = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            match node.child(segment.as_ref()) {
                Some((name, next)) => {
                    consumed.push(name.clone());
                    node = next;
                }
                None => {
                    return Resolution {
                        node,
                        consumed,
                        leftover: segments[i..]
                            .iter()
                            .map(|s| s.as_ref().to_string())
                            .collect(),
                    }
                }
            }
        }
        Resolution {
            node,
            consumed,
            leftover: Vec::new(),
        }
    }

    /// Returns the command registered at exactly `path`.
    pub fn get(&self, path: &str) -> Option<&Command> {
        let segments = split_path(path);
        if segments.is_empty() {
            return self.root_command();
        }
        let resolution = self.resolve(&segments);
        if resolution.is_full_match() {
            resolution.node.command()
        } else {
            None
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Every registered command with its full path, root override first,
    /// then in path order.
    pub fn commands(&self) -> Vec<CommandInfo> {
        let mut out = Vec::new();
        if let Some(root) = &self.root_override {
            out.push(CommandInfo::new(String::new(), root));
        }
        collect(&self.root, &mut Vec::new(), &mut out);
        out
    }
}

fn collect<'t>(node: &'t Node, path: &mut Vec<&'t str>, out: &mut Vec<CommandInfo>) {
    for (name, child) in &node.children {
        path.push(name);
        if let Some(cmd) = &child.command {
            out.push(CommandInfo::new(path.join(" "), cmd));
        }
        collect(child, path, out);
        path.pop();
    }
}
