//! Read-only view over the positional arguments left after flag parsing.

use std::ops::Deref;

/// Positional (non-flag) arguments of the running command.
///
/// ```rust
/// use sprout::Args;
///
/// let raw = vec!["a.txt".to_string(), "b.txt".to_string()];
/// let args = Args::new(&raw);
/// assert_eq!(args.get(1), "b.txt");
/// assert_eq!(args.get(5), "");
/// assert_eq!(args.all(), "a.txt b.txt");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Args<'a>(&'a [String]);

impl<'a> Args<'a> {
    pub fn new(args: &'a [String]) -> Self {
        Self(args)
    }

    /// Returns the i-th argument, or an empty string when out of range.
    pub fn get(&self, i: usize) -> &'a str {
        self.0.get(i).map(String::as_str).unwrap_or("")
    }

    /// Returns the first argument, if any.
    pub fn first(&self) -> Option<&'a str> {
        self.0.first().map(String::as_str)
    }

    /// Joins every argument with single spaces.
    pub fn all(&self) -> String {
        self.0.join(" ")
    }

    pub fn as_slice(&self) -> &'a [String] {
        self.0
    }
}

impl Deref for Args<'_> {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'a> IntoIterator for Args<'a> {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get_in_and_out_of_range() {
        let raw = owned(&["extra", "more"]);
        let args = Args::new(&raw);
        assert_eq!(args.get(0), "extra");
        assert_eq!(args.get(1), "more");
        assert_eq!(args.get(2), "");
    }

    #[test]
    fn test_empty() {
        let raw: Vec<String> = Vec::new();
        let args = Args::new(&raw);
        assert!(args.is_empty());
        assert_eq!(args.first(), None);
        assert_eq!(args.all(), "");
    }

    #[test]
    fn test_iterates_in_order() {
        let raw = owned(&["a", "b", "c"]);
        let collected: Vec<&str> = Args::new(&raw).into_iter().map(String::as_str).collect();
        assert_eq!(collected, ["a", "b", "c"]);
        assert_eq!(Args::new(&raw).len(), 3);
    }
}
