//! Segment trie keyed by method + path.
//!
//! # Responsibilities
//! - Store one value per route key (`GET/users/:id`)
//! - Resolve a concrete key to its value plus captured parameters
//! - Merge two tries when one router is mounted into another
//!
//! # Design Decisions
//! - One node per `/`-delimited segment; the method token is simply the first segment
//! - At most one parameter child per node; re-registering a parameter at the same
//!   position replaces its bound name
//! - Lookup is greedy: a literal child always beats the parameter child and the
//!   choice is never revisited, even if a deeper segment then fails. Lookup cost is
//!   O(segments) with no backtracking; routes a backtracking matcher would accept
//!   can be rejected here.
//! - Merge copies; neither input is modified

use std::collections::HashMap;

const PARAM_SIGIL: char = ':';

/// Route trie holding values of type `V`.
#[derive(Debug, Clone)]
pub struct Trie<V> {
    root: Node<V>,
}

#[derive(Debug, Clone)]
struct Node<V> {
    children: HashMap<String, Node<V>>,
    param: Option<Box<ParamChild<V>>>,
    value: Option<V>,
}

#[derive(Debug, Clone)]
struct ParamChild<V> {
    name: String,
    node: Node<V>,
}

/// Successful lookup result.
#[derive(Debug, PartialEq, Eq)]
pub struct Match<'a, V> {
    pub value: &'a V,
    pub parameters: HashMap<String, String>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            param: None,
            value: None,
        }
    }

    fn collect_routes(&self, prefix: &mut Vec<String>, out: &mut Vec<String>) {
        if self.value.is_some() {
            out.push(prefix.join("/"));
        }
        for (segment, child) in &self.children {
            prefix.push(segment.clone());
            child.collect_routes(prefix, out);
            prefix.pop();
        }
        if let Some(param) = &self.param {
            prefix.push(format!("{}{}", PARAM_SIGIL, param.name));
            param.node.collect_routes(prefix, out);
            prefix.pop();
        }
    }
}

impl<V: Clone> Node<V> {
    /// Fold `other` into `self`; `other` wins wherever both carry a value.
    fn merge_from(&mut self, other: &Node<V>) {
        for (segment, child) in &other.children {
            match self.children.get_mut(segment) {
                Some(existing) => existing.merge_from(child),
                None => {
                    self.children.insert(segment.clone(), child.clone());
                }
            }
        }

        if let Some(other_param) = &other.param {
            match &mut self.param {
                Some(param) => {
                    param.name = other_param.name.clone();
                    param.node.merge_from(&other_param.node);
                }
                None => self.param = Some(other_param.clone()),
            }
        }

        if let Some(value) = &other.value {
            self.value = Some(value.clone());
        }
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Store `value` under `key`. An existing value under the same key is replaced.
    pub fn insert(&mut self, key: &str, value: V) {
        let mut node = &mut self.root;
        for segment in key.split('/') {
            node = match segment.strip_prefix(PARAM_SIGIL) {
                Some(name) => {
                    let param = node.param.get_or_insert_with(|| {
                        Box::new(ParamChild {
                            name: name.to_string(),
                            node: Node::new(),
                        })
                    });
                    param.name = name.to_string();
                    &mut param.node
                }
                None => node
                    .children
                    .entry(segment.to_string())
                    .or_insert_with(Node::new),
            };
        }
        node.value = Some(value);
    }

    /// Resolve a concrete key such as `GET/users/42`.
    ///
    /// Returns `None` when traversal runs off the tree or ends on a node that
    /// carries no value.
    pub fn lookup(&self, key: &str) -> Option<Match<'_, V>> {
        let mut node = &self.root;
        let mut parameters = HashMap::new();

        for segment in key.split('/') {
            node = match node.children.get(segment) {
                Some(child) => child,
                None => {
                    let param = node.param.as_deref()?;
                    parameters.insert(param.name.clone(), segment.to_string());
                    &param.node
                }
            };
        }

        node.value.as_ref().map(|value| Match { value, parameters })
    }

    /// All registered keys, sorted. Parameters are rendered with their bound name.
    pub fn routes(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_routes(&mut Vec::new(), &mut out);
        out.sort();
        out
    }

    /// Number of keys carrying a value.
    pub fn len(&self) -> usize {
        self.routes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Trie<V> {
    /// Structural union of `self` and `other`.
    ///
    /// Subtrees present in both are merged recursively. Where both define a value
    /// for the same key, or a parameter child at the same position, `other` wins.
    pub fn merge(&self, other: &Self) -> Self {
        let mut root = self.root.clone();
        root.merge_from(&other.root);
        Self { root }
    }
}
