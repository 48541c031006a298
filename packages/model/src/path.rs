//! Tree addressing by sibling index.

use serde::{Deserialize, Serialize};

/// Address of a node: the sequence of sibling indices from the document
/// root down to the node. Paths are only meaningful against the tree
/// revision they were computed for.
///
/// The derived ordering is document order: a parent sorts before its
/// descendants, earlier siblings before later ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<usize>);

impl Path {
    pub fn root() -> Path {
        Path(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Path {
        Path(indices)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Last index, i.e. the node's position among its siblings.
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Sibling immediately after this node.
    pub fn next_sibling(&self) -> Option<Path> {
        let index = self.index()?;
        let mut indices = self.0.clone();
        *indices.last_mut()? = index + 1;
        Some(Path(indices))
    }

    /// Sibling immediately before this node, if any.
    pub fn previous_sibling(&self) -> Option<Path> {
        let index = self.index()?;
        if index == 0 {
            return None;
        }
        let mut indices = self.0.clone();
        *indices.last_mut()? = index - 1;
        Some(Path(indices))
    }

    /// Strict ancestry: `[0]` is an ancestor of `[0, 2]` but not of itself.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// Ancestry including equality.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.0.len() <= other.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.0.is_empty() && self.0.len() == other.0.len() && self.parent() == other.parent()
    }

    /// Longest shared prefix of the two paths.
    pub fn common_ancestor(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Path(self.0[..shared].to_vec())
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for index in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_document_order() {
        let a = Path::new(vec![0]);
        let b = Path::new(vec![0, 1]);
        let c = Path::new(vec![1]);
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn ancestry_and_siblings() {
        let parent = Path::new(vec![1]);
        let child = Path::new(vec![1, 0]);
        assert!(parent.is_ancestor_of(&child));
        assert!(!parent.is_ancestor_of(&parent));
        assert!(parent.is_prefix_of(&parent));
        assert_eq!(child.parent(), Some(parent.clone()));
        assert_eq!(child.next_sibling(), Some(Path::new(vec![1, 1])));
        assert_eq!(child.previous_sibling(), None);
        assert!(Path::new(vec![1, 2]).is_sibling_of(&child));
        assert!(!Path::new(vec![0, 0]).is_sibling_of(&child));
    }

    #[test]
    fn common_ancestor_is_shared_prefix() {
        let a = Path::new(vec![0, 1, 2]);
        let b = Path::new(vec![0, 1, 5, 3]);
        assert_eq!(a.common_ancestor(&b), Path::new(vec![0, 1]));
        assert_eq!(a.common_ancestor(&Path::new(vec![2])), Path::root());
    }

    #[test]
    fn display_joins_with_dots() {
        assert_eq!(Path::new(vec![0, 2, 1]).to_string(), "0.2.1");
        assert_eq!(Path::root().to_string(), "");
    }
}
