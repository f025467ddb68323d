//! Tree node types shared by the walker, the renderers and JSON output

use serde::Serialize;

use crate::content::Payload;

/// What kind of filesystem entry a node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
    /// A symlink that was not followed (or could not be).
    Symlink {
        target: String,
    },
    /// Sockets, FIFOs, devices: listed but never read.
    Special,
}

impl NodeKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Dir)
    }
}

/// Per-node soft failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Ok,
    Unreadable(String),
    /// Following a symlink led back onto the current ancestor chain.
    CycleDetected,
}

impl NodeStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, NodeStatus::Ok)
    }
}

/// One node of the materialized tree. Parents own their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    /// Root-relative path with `/` separators; empty for the root itself.
    pub path: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "NodeStatus::is_ok")]
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Payload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn dir(name: impl Into<String>, path: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Dir,
            status: NodeStatus::Ok,
            content: None,
            children,
        }
    }

    pub fn file(
        name: impl Into<String>,
        path: impl Into<String>,
        content: Option<Payload>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            status: NodeStatus::Ok,
            content,
            children: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Count descendant directories and non-directories, excluding `self`.
    pub fn counts(&self) -> (usize, usize) {
        self.children.iter().fold((0, 0), |(dirs, files), child| {
            let (d, f) = child.counts();
            if child.is_dir() {
                (dirs + d + 1, files + f)
            } else {
                (dirs + d, files + f + 1)
            }
        })
    }

    /// Find a descendant (or `self`) by its relative path.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter()
            .filter(|child| child.path == path || path.starts_with(&format!("{}/", child.path)))
            .find_map(|child| child.find(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::dir(
            "project",
            "",
            vec![
                TreeNode::dir(
                    "src",
                    "src",
                    vec![TreeNode::file("main.rs", "src/main.rs", None)],
                ),
                TreeNode::dir("empty", "empty", Vec::new()),
                TreeNode::file("README.md", "README.md", None),
            ],
        )
    }

    #[test]
    fn test_counts_exclude_root() {
        assert_eq!(sample().counts(), (2, 2));
        assert_eq!(TreeNode::dir("x", "", Vec::new()).counts(), (0, 0));
    }

    #[test]
    fn test_find_by_relative_path() {
        let tree = sample();
        assert_eq!(tree.find("src/main.rs").map(|n| n.name.as_str()), Some("main.rs"));
        assert_eq!(tree.find("").map(|n| n.name.as_str()), Some("project"));
        assert!(tree.find("src/missing.rs").is_none());
        assert!(tree.find("sr").is_none());
    }

    #[test]
    fn test_json_shape() {
        let node = TreeNode::file(
            "a.txt",
            "a.txt",
            Some(Payload::Binary { size: 3 }),
        );
        let json: serde_json::Value = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["content"]["kind"], "binary");
        assert_eq!(json["content"]["size"], 3);
        assert!(json.get("status").is_none(), "ok status is omitted");
        assert!(json.get("children").is_none(), "empty children are omitted");

        let node = TreeNode::dir("d", "d", Vec::new()).with_status(NodeStatus::CycleDetected);
        let json: serde_json::Value = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "dir");
        assert_eq!(json["status"], "cycle_detected");
    }
}
