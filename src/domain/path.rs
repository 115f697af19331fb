//! Location of a record inside a tree
//!
//! A [`TreePath`] lists the `(sequence tag, item index)` steps leading from the root
//! record to a nested one. Together with a tag it addresses one element anywhere in
//! the tree, which is how reversible store entries are keyed.

use super::tag::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step into a sequence item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathStep {
    /// Tag of the sequence element
    pub sequence: Tag,
    /// Zero-based item index
    pub item: usize,
}

/// Path from the root record to a nested record
///
/// # Examples
///
/// ```
/// use veil::domain::{Tag, TreePath};
///
/// let path = TreePath::root().child(Tag::new(0x0008, 0x1115), 0);
/// assert_eq!(path.to_string(), "(0008,1115)[0]");
/// assert_eq!(TreePath::root().to_string(), "/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreePath(Vec<PathStep>);

impl TreePath {
    /// Path of the root record
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of item `item` of sequence `sequence` below this record
    pub fn child(&self, sequence: Tag, item: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep { sequence, item });
        Self(steps)
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth, 0 for the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Steps from the root
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}[{}]", step.sequence, step.item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_does_not_modify_parent() {
        let root = TreePath::root();
        let child = root.child(Tag::new(0x0008, 0x1115), 2);
        assert!(root.is_root());
        assert_eq!(child.depth(), 1);
        assert_eq!(child.steps()[0].item, 2);
    }

    #[test]
    fn test_display_nested() {
        let path = TreePath::root()
            .child(Tag::new(0x0008, 0x1115), 0)
            .child(Tag::new(0x0008, 0x114A), 2);
        assert_eq!(path.to_string(), "(0008,1115)[0]/(0008,114A)[2]");
    }
}
