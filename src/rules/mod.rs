// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Rule tree: which word may legally follow which.
//!
//! The tree is built once from an indented rule source and is read-only
//! afterwards. Nodes live in a single arena owned by [`RuleTree`] and refer to
//! their children by [`NodeId`]; there are no parent links. The root holds the
//! empty token and stands for "nothing typed yet".
//!
//! ## Example
//!
//! ```
//! use cli_autocomplete::rules::RuleTree;
//!
//! let tree = RuleTree::parse("git\n    commit\n    checkout\n")?;
//! let git = tree.traverse(&["git"]).unwrap();
//! let words: Vec<&str> = git.children().map(|c| c.token().as_str()).collect();
//! assert_eq!(words, ["commit", "checkout"]);
//! # Ok::<(), cli_autocomplete::ConfigFormatError>(())
//! ```

pub mod parser;

use std::fmt;
use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ConfigErrorKind, ConfigFormatError, Error, Result};

pub use parser::{parse_dictionary, parse_lines, ConfigLine, Dictionary};

/// An immutable word of the rule vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(Box<str>);

impl Token {
    pub fn new(text: impl Into<Box<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Token {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable index of a node inside its [`RuleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RuleNode {
    token: Token,
    children: Vec<NodeId>,
}

impl RuleNode {
    fn new(token: Token) -> Self {
        Self {
            token,
            children: Vec::new(),
        }
    }
}

/// Hierarchy of tokens built from a rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTree {
    nodes: Vec<RuleNode>,
}

impl RuleTree {
    /// Build a tree from already validated lines.
    ///
    /// The parent of a line at depth `d` is the most recent node placed at
    /// depth `d - 1`, even when a shallower line came in between. Re-declaring an existing sibling merges
    /// into it instead of adding a duplicate.
    pub fn from_lines(lines: &[ConfigLine]) -> std::result::Result<Self, ConfigFormatError> {
        let mut tree = Self {
            nodes: vec![RuleNode::new(Token::default())],
        };

        // chain[d] = node that receives children at depth d
        let mut chain = vec![NodeId::ROOT];

        for line in lines {
            let Some(&parent) = chain.get(line.depth) else {
                return Err(ConfigFormatError::new(
                    line.number,
                    ConfigErrorKind::Orphan { depth: line.depth },
                ));
            };

            let node = tree.insert_child(parent, &line.token);
            let slot = line.depth + 1;
            if slot < chain.len() {
                chain[slot] = node;
            } else {
                chain.push(node);
            }
        }

        tracing::debug!(nodes = tree.nodes.len(), lines = lines.len(), "rule tree built");
        Ok(tree)
    }

    /// Parse and build from rule source text.
    pub fn parse(source: &str) -> std::result::Result<Self, ConfigFormatError> {
        Self::from_lines(&parse_lines(source)?)
    }

    /// Read and build from a rule file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::RuleSource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&source)?)
    }

    fn insert_child(&mut self, parent: NodeId, token: &str) -> NodeId {
        if let Some(existing) = self.node(parent).child(token) {
            return existing.id();
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(RuleNode::new(Token::from(token)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId::ROOT)
    }

    /// View of the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node id {} out of range", id.0);
        NodeRef { tree: self, id }
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Follow `path` from the root, one exact-match child hop per token.
    ///
    /// Returns `None` as soon as a hop has no matching child.
    pub fn traverse<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeRef<'_>> {
        path.iter()
            .try_fold(self.root(), |node, token| node.child(token.as_ref()))
    }

    /// Flatten into the parent token -> children mapping.
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        let mut stack = vec![self.root()];

        while let Some(node) = stack.pop() {
            if !node.is_leaf() {
                let entry = dict.entry(node.token().to_string()).or_default();
                for child in node.children() {
                    if !entry.iter().any(|word| child.token() == word.as_str()) {
                        entry.push(child.token().to_string());
                    }
                }
            }
            // reversed so the first child is visited first
            stack.extend(node.children().collect::<Vec<_>>().into_iter().rev());
        }

        dict
    }
}

impl FromStr for RuleTree {
    type Err = ConfigFormatError;

    fn from_str(source: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(source)
    }
}

/// Borrowed view of one node in a [`RuleTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a RuleTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn token(&self) -> &'a Token {
        &self.tree.nodes[self.id.0].token
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.nodes[self.id.0]
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// Child whose token equals `token` exactly.
    pub fn child(&self, token: &str) -> Option<NodeRef<'a>> {
        self.children().find(|child| child.token() == token)
    }

    pub fn child_count(&self) -> usize {
        self.tree.nodes[self.id.0].children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("token", self.token())
            .field("children", &self.child_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIT_RULES: &str = "\
git
    commit
        --amend
        --message
    checkout
        [branch]
    push
";

    fn child_tokens(node: NodeRef<'_>) -> Vec<String> {
        node.children().map(|c| c.token().to_string()).collect()
    }

    #[test]
    fn test_root_holds_empty_token() {
        let tree = RuleTree::parse(GIT_RULES).unwrap();
        assert_eq!(tree.root().token(), "");
        assert_eq!(child_tokens(tree.root()), vec!["git"]);
        assert_eq!(tree.len(), 8);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let tree = RuleTree::parse(GIT_RULES).unwrap();
        let git = tree.traverse(&["git"]).unwrap();
        assert_eq!(child_tokens(git), vec!["commit", "checkout", "push"]);

        let commit = tree.traverse(&["git", "commit"]).unwrap();
        assert_eq!(child_tokens(commit), vec!["--amend", "--message"]);
    }

    #[test]
    fn test_duplicate_siblings_merge() {
        let source = "git\n  commit\n    --amend\n  commit\n    --all\ngit\n  push\n";
        let tree = RuleTree::parse(source).unwrap();

        assert_eq!(child_tokens(tree.root()), vec!["git"]);
        let git = tree.traverse(&["git"]).unwrap();
        assert_eq!(child_tokens(git), vec!["commit", "push"]);
        let commit = tree.traverse(&["git", "commit"]).unwrap();
        assert_eq!(child_tokens(commit), vec!["--amend", "--all"]);
    }

    #[test]
    fn test_same_token_under_different_parents_is_not_merged() {
        let source = "a\n  x\nb\n  x\n    y\n";
        let tree = RuleTree::parse(source).unwrap();
        assert!(tree.traverse(&["a", "x"]).unwrap().is_leaf());
        assert_eq!(child_tokens(tree.traverse(&["b", "x"]).unwrap()), vec!["y"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = RuleTree::parse(GIT_RULES).unwrap();
        let second: RuleTree = GIT_RULES.parse().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_node_has_duplicate_children() {
        let source = "a\n  b\n  b\n  c\n  b\n    d\n    d\n";
        let tree = RuleTree::parse(source).unwrap();
        for index in 0..tree.len() {
            let tokens = child_tokens(tree.node(NodeId(index)));
            let mut deduped = tokens.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(tokens.len(), deduped.len());
        }
    }

    #[test]
    fn test_first_line_indented_is_orphan() {
        let err = RuleTree::parse("    git\n").unwrap_err();
        assert_eq!(err, ConfigFormatError::new(1, ConfigErrorKind::Orphan { depth: 1 }));
    }

    #[test]
    fn test_skipped_level_is_orphan() {
        let err = RuleTree::parse("git\n  commit\n      --amend\n").unwrap_err();
        assert_eq!(err, ConfigFormatError::new(3, ConfigErrorKind::Orphan { depth: 3 }));
    }

    #[test]
    fn test_deep_line_after_shallower_one_attaches_to_latest_parent() {
        let tree = RuleTree::parse("a\n  b\n    c\nd\n    e\n").unwrap();
        assert_eq!(child_tokens(tree.traverse(&["a", "b"]).unwrap()), vec!["c", "e"]);
        assert!(tree.traverse(&["d"]).unwrap().is_leaf());
    }

    #[test]
    fn test_latest_node_at_depth_wins() {
        let tree = RuleTree::parse("a\n  b\n  x\nd\n    y\n").unwrap();
        assert_eq!(child_tokens(tree.traverse(&["a", "x"]).unwrap()), vec!["y"]);
        assert!(tree.traverse(&["a", "b"]).unwrap().is_leaf());
    }

    #[test]
    fn test_traverse_fails_on_unknown_hop() {
        let tree = RuleTree::parse(GIT_RULES).unwrap();
        assert!(tree.traverse(&["git", "rebase"]).is_none());
        assert!(tree.traverse(&["svn"]).is_none());
        assert_eq!(tree.traverse::<&str>(&[]).unwrap().id(), NodeId::ROOT);
    }

    #[test]
    fn test_traverse_is_case_sensitive() {
        let tree = RuleTree::parse(GIT_RULES).unwrap();
        assert!(tree.traverse(&["Git"]).is_none());
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = RuleTree::from_file("/definitely/not/here/rules.txt").unwrap_err();
        assert!(matches!(err, Error::RuleSource { .. }));
    }

    #[test]
    fn test_dictionary_merges_same_parent_token() {
        let tree = RuleTree::parse("a\n  x\n    one\nb\n  x\n    two\n").unwrap();
        let dict = tree.to_dictionary();
        assert_eq!(dict[""], vec!["a", "b"]);
        assert_eq!(dict["x"], vec!["one", "two"]);
        let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["", "a", "x", "b"]);
    }
}
