//! Depth-first iteration over every section of a tree.

use crate::configuration::Configuration;
use crate::path::KEY_DELIMITER;
use crate::section::ConfigurationSection;

/// Iterator over `(path, value)` for every descendant section of a node,
/// in depth-first pre-order. The start node itself is not yielded.
pub struct Entries {
    stack: Vec<ConfigurationSection>,
    prefix_len: usize,
}

impl Iterator for Entries {
    type Item = (String, Option<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let section = self.stack.pop()?;

        let mut children = section.children();
        children.reverse();
        self.stack.extend(children);

        let key = section.path()[self.prefix_len..].to_owned();
        Some((key, section.value()))
    }
}

/// Iterates every descendant section, yielding full paths.
pub fn entries(configuration: &(impl Configuration + ?Sized)) -> Entries {
    start(configuration, 0)
}

/// Iterates every descendant section, trimming the start node's path (and
/// the delimiter after it) from the yielded keys. For a root this is the
/// same as [`entries`].
pub fn entries_relative(configuration: &(impl Configuration + ?Sized)) -> Entries {
    let prefix_len = configuration
        .node_path()
        .map(|p| p.len() + KEY_DELIMITER.len_utf8())
        .unwrap_or(0);
    start(configuration, prefix_len)
}

fn start(configuration: &(impl Configuration + ?Sized), prefix_len: usize) -> Entries {
    let mut stack = configuration.children();
    stack.reverse();
    Entries { stack, prefix_len }
}
