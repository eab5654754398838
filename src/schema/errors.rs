//! Structured validation failure for schema operations.
//!
//! `Invalid` is the one error shape every serialize/deserialize path raises,
//! whether at construction time or on a later mutation: callers cannot tell
//! the two apart. Composite operations never stop at the first bad child:
//! they attempt every child, fold each failure into one `Invalid`, and raise
//! the aggregate once the whole record has been tried.
//!
//! # Path convention
//!
//! Failures flatten to paths relative to the receiver of the failing
//! operation, with the receiver's own name omitted: `name`, `address.city`,
//! `rows[1][2]`. An operation invoked directly on a sub-record reports paths
//! relative to that sub-record.

use std::collections::BTreeMap;
use std::fmt;

use super::node::SchemaNode;

/// Where a child failure sits inside its parent: a named mapping field or a
/// positional sequence/tuple index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    Key(String),
    Index(usize),
}

impl Position {
    fn join(&self, prefix: &str) -> String {
        match self {
            Position::Key(name) if prefix.is_empty() => name.clone(),
            Position::Key(name) => format!("{}.{}", prefix, name),
            Position::Index(i) => format!("{}[{}]", prefix, i),
        }
    }
}

/// A validation failure, possibly aggregating child failures.
///
/// A leaf `Invalid` carries just a message ("Required", `"x" is not a
/// number`). A composite `Invalid` carries one child per failed cell, keyed
/// by that cell's position.
#[derive(Debug, Clone)]
pub struct Invalid {
    node: String,
    msg: Option<String>,
    children: Vec<(Position, Invalid)>,
}

impl Invalid {
    /// A failure at `node` with a message.
    pub fn new(node: &SchemaNode, msg: impl Into<String>) -> Self {
        Self {
            node: node.name().to_string(),
            msg: Some(msg.into()),
            children: Vec::new(),
        }
    }

    /// An empty aggregate rooted at `node`, to be filled with `add`.
    pub fn root(node: &SchemaNode) -> Self {
        Self {
            node: node.name().to_string(),
            msg: None,
            children: Vec::new(),
        }
    }

    /// Attaches a child failure at the given position.
    pub fn add(&mut self, position: Position, child: Invalid) {
        self.children.push((position, child));
    }

    /// True when nothing has gone wrong: no message and no children.
    pub fn is_empty(&self) -> bool {
        self.msg.is_none() && self.children.is_empty()
    }

    /// Name of the schema node this failure is rooted at.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// The failure's own message, if it is not a pure aggregate.
    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    /// Child failures with their positions, in the order they were added.
    pub fn children(&self) -> &[(Position, Invalid)] {
        &self.children
    }

    /// Flattens the failure tree to `path -> message`.
    ///
    /// A leaf failure with no children maps its node name to its message.
    pub fn asdict(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        if self.children.is_empty() {
            if let Some(msg) = &self.msg {
                out.insert(self.node.clone(), msg.clone());
            }
            return out;
        }
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut BTreeMap<String, String>) {
        for (position, child) in &self.children {
            let path = position.join(prefix);
            if let Some(msg) = &child.msg {
                // A node message and a validator message can land on one path.
                out.entry(path.clone())
                    .and_modify(|existing| {
                        existing.push_str("; ");
                        existing.push_str(msg);
                    })
                    .or_insert_with(|| msg.clone());
            }
            child.flatten_into(&path, out);
        }
    }

    /// Every message in the tree, depth first.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages(&self, out: &mut Vec<String>) {
        if let Some(msg) = &self.msg {
            out.push(msg.clone());
        }
        for (_, child) in &self.children {
            child.collect_messages(out);
        }
    }

    /// The flattened paths that failed, in sorted order.
    pub fn paths(&self) -> Vec<String> {
        self.asdict().into_keys().collect()
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return write!(f, "{}", self.msg.as_deref().unwrap_or("invalid"));
        }
        let flattened = self.asdict();
        for (i, (path, msg)) in flattened.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", path, msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for Invalid {}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> SchemaNode {
        SchemaNode::string(name)
    }

    #[test]
    fn test_leaf_asdict_uses_node_name() {
        let err = Invalid::new(&node("age"), "Required");
        assert_eq!(err.asdict()[&"age".to_string()], "Required");
        assert_eq!(err.to_string(), "Required");
    }

    #[test]
    fn test_aggregate_flattens_by_key() {
        let mut root = Invalid::root(&node("person"));
        root.add(
            Position::Key("name".into()),
            Invalid::new(&node("name"), "Required"),
        );
        root.add(
            Position::Key("age".into()),
            Invalid::new(&node("age"), "\"x\" is not a number"),
        );

        let dict = root.asdict();
        assert_eq!(dict[&"name".to_string()], "Required");
        assert_eq!(dict[&"age".to_string()], "\"x\" is not a number");
    }

    #[test]
    fn test_nested_paths_mix_keys_and_indices() {
        let mut rows = Invalid::root(&node("rows"));
        let mut row1 = Invalid::root(&node(""));
        row1.add(
            Position::Index(2),
            Invalid::new(&node(""), "\"three\" is not a number"),
        );
        rows.add(Position::Index(1), row1);

        let mut root = Invalid::root(&node("matrix"));
        root.add(Position::Key("rows".into()), rows);

        let dict = root.asdict();
        assert_eq!(dict[&"rows[1][2]".to_string()], "\"three\" is not a number");
    }

    #[test]
    fn test_is_empty() {
        let mut root = Invalid::root(&node("person"));
        assert!(root.is_empty());
        root.add(
            Position::Key("name".into()),
            Invalid::new(&node("name"), "Required"),
        );
        assert!(!root.is_empty());
    }

    #[test]
    fn test_messages_collects_depth_first() {
        let mut root = Invalid::root(&node("person"));
        root.add(
            Position::Key("name".into()),
            Invalid::new(&node("name"), "Required"),
        );
        assert_eq!(root.messages(), vec!["Required".to_string()]);
    }

    #[test]
    fn test_display_renders_paths() {
        let mut root = Invalid::root(&node("person"));
        root.add(
            Position::Key("name".into()),
            Invalid::new(&node("name"), "Required"),
        );
        assert_eq!(root.to_string(), "name: Required");
    }
}
