// --- File: src/core/trie.rs
use crate::core::types::{Aksara, AksaraSequence};
use serde::Serialize;

/// One node of the suffix trie.
///
/// Children are owned by their parent and kept sorted by descending
/// frequency after every insertion that touches them. That order is also the
/// persisted order, so it must hold whenever the tree is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrieNode {
    pub(crate) symbol: Aksara,
    pub(crate) frequency: i64,
    pub(crate) is_leaf: bool,
    pub(crate) children: Vec<TrieNode>,
}

impl TrieNode {
    /// An empty root node.
    pub fn root() -> Self {
        Self::new(String::new(), 0)
    }

    fn new(symbol: Aksara, frequency: i64) -> Self {
        Self { symbol, frequency, is_leaf: false, children: Vec::new() }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn frequency(&self) -> i64 {
        self.frequency
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn children(&self) -> &[TrieNode] {
        &self.children
    }

    /// Sum of the immediate children's frequencies. This is the total used for
    /// the root, whose own counter is never updated.
    pub fn child_total(&self) -> i64 {
        self.children.iter().map(|c| c.frequency).sum()
    }

    /// Inserts `sequence` below this node, adding `frequency` to every node on
    /// the path.
    /// O(k * b log b) where k is the sequence length and b the branching factor.
    pub fn insert(&mut self, sequence: &[Aksara], frequency: i64) {
        let Some((head, rest)) = sequence.split_first() else {
            if self.children.is_empty() {
                self.is_leaf = true;
            }
            return;
        };

        // A node that gains children is no longer a leaf.
        self.is_leaf = false;

        let idx = match self.children.iter().position(|c| &c.symbol == head) {
            Some(idx) => {
                self.children[idx].frequency += frequency;
                idx
            }
            None => {
                self.children.push(TrieNode::new(head.clone(), frequency));
                self.children.len() - 1
            }
        };
        self.children[idx].insert(rest, frequency);

        // Stable sort keeps first-inserted order among equal frequencies.
        self.children.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    }

    pub fn child(&self, symbol: &str) -> Option<&TrieNode> {
        self.children.iter().find(|c| c.symbol == symbol)
    }

    /// Follows `sequence` symbol by symbol. The empty sequence returns `self`.
    pub fn lookup(&self, sequence: &[Aksara]) -> Option<&TrieNode> {
        let mut node = self;
        for symbol in sequence {
            node = node.child(symbol)?;
        }
        Some(node)
    }

    /// Every root-to-leaf path below this node.
    pub fn collect_words(&self) -> Vec<AksaraSequence> {
        let mut words = Vec::new();
        let mut path = Vec::new();
        self.collect_into(&mut path, &mut words);
        words
    }

    fn collect_into(&self, path: &mut Vec<Aksara>, words: &mut Vec<AksaraSequence>) {
        for child in &self.children {
            path.push(child.symbol.clone());
            if child.is_leaf {
                words.push(AksaraSequence::new(path.clone()));
            }
            child.collect_into(path, words);
            path.pop();
        }
    }

    /// Depth-first walk over every path of exactly `length` symbols below this
    /// node, skipping any child whose symbol is `skip`. The frequency of a
    /// path is the frequency of its last node.
    pub(crate) fn paths_of_length(&self, length: usize, skip: &str) -> Vec<(AksaraSequence, i64)> {
        let mut out = Vec::new();
        if length == 0 {
            return out;
        }
        let mut path = Vec::with_capacity(length);
        self.walk_paths(length, skip, &mut path, &mut out);
        out
    }

    fn walk_paths(
        &self,
        remaining: usize,
        skip: &str,
        path: &mut Vec<Aksara>,
        out: &mut Vec<(AksaraSequence, i64)>,
    ) {
        for child in self.children.iter().filter(|c| c.symbol != skip) {
            path.push(child.symbol.clone());
            if remaining == 1 {
                out.push((AksaraSequence::new(path.clone()), child.frequency));
            } else {
                child.walk_paths(remaining - 1, skip, path, out);
            }
            path.pop();
        }
    }

    /// Total number of nodes, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TrieNode::node_count).sum::<usize>()
    }

    /// Number of nodes on the longest root-to-leaf chain, counting `self`.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.children.iter().map(|c| (c, level + 1)));
        }
        deepest
    }
}

impl Default for TrieNode {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(text: &str) -> Vec<Aksara> {
        text.chars().map(String::from).collect()
    }

    #[test]
    fn test_insert_accumulates_frequency() {
        let mut root = TrieNode::root();
        root.insert(&seq("ab"), 3);
        root.insert(&seq("ac"), 2);

        let a = root.lookup(&seq("a")).unwrap();
        assert_eq!(a.frequency(), 5);
        assert_eq!(root.lookup(&seq("ab")).unwrap().frequency(), 3);
        assert_eq!(root.lookup(&seq("ac")).unwrap().frequency(), 2);
        assert!(root.lookup(&seq("ad")).is_none());
    }

    #[test]
    fn test_children_sorted_descending() {
        let mut root = TrieNode::root();
        root.insert(&seq("x"), 1);
        root.insert(&seq("y"), 5);
        root.insert(&seq("z"), 3);
        root.insert(&seq("x"), 10);

        let order: Vec<&str> = root.children().iter().map(TrieNode::symbol).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_leaf_is_demoted_when_extended() {
        let mut root = TrieNode::root();
        root.insert(&seq("ab"), 1);
        assert!(root.lookup(&seq("ab")).unwrap().is_leaf());

        root.insert(&seq("abc"), 1);
        assert!(!root.lookup(&seq("ab")).unwrap().is_leaf());
        assert!(root.lookup(&seq("abc")).unwrap().is_leaf());

        // Re-inserting a prefix of an existing path does not mark it a leaf.
        root.insert(&seq("ab"), 1);
        assert!(!root.lookup(&seq("ab")).unwrap().is_leaf());
    }

    #[test]
    fn test_depth_counts_longest_chain() {
        let mut root = TrieNode::root();
        assert_eq!(root.depth(), 1);
        root.insert(&seq("ab"), 1);
        root.insert(&seq("cde"), 1);
        assert_eq!(root.depth(), 4);
    }

    #[test]
    fn test_empty_lookup_returns_self() {
        let root = TrieNode::root();
        let found = root.lookup(&[]).unwrap();
        assert_eq!(found.symbol(), "");
    }

    #[test]
    fn test_collect_words() {
        let mut root = TrieNode::root();
        root.insert(&seq("ab"), 2);
        root.insert(&seq("abc"), 1);
        root.insert(&seq("d"), 4);

        let words: Vec<String> = root.collect_words().iter().map(|w| w.text()).collect();
        assert_eq!(words, vec!["d", "abc"]);
    }

    #[test]
    fn test_paths_of_length_skips_symbol() {
        let mut root = TrieNode::root();
        root.insert(&seq("@ab"), 2);
        root.insert(&seq("bc"), 1);

        let paths: Vec<String> = root
            .paths_of_length(2, "@")
            .into_iter()
            .map(|(s, _)| s.text())
            .collect();
        assert_eq!(paths, vec!["bc"]);
        assert!(root.paths_of_length(0, "@").is_empty());
    }
}
