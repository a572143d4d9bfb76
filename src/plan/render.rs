//! Rendering of the resolved virtual tree for `status` output.
//!
//! The virtual tree shows the *destination* layout, which can differ from
//! the source layout due to redirects. Entries are grouped under the target
//! root, sorted, and annotated with their reconciliation state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-entry annotation in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Already linked correctly.
    Ok,
    /// Would be newly created.
    New,
    /// Would replace an existing entry.
    Replace,
    /// Conflicts with existing target state.
    Conflict,
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "[ok]"),
            Self::New => write!(f, "[new]"),
            Self::Replace => write!(f, "[replace]"),
            Self::Conflict => write!(f, "[conflict]"),
        }
    }
}

/// One leaf of the virtual tree: a destination path and its state.
#[derive(Debug, Clone)]
pub struct RenderEntry {
    /// Absolute destination path of the planned link.
    pub target: PathBuf,
    /// Reconciliation state annotation.
    pub mark: Mark,
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
    mark: Option<Mark>,
}

/// Render the virtual tree rooted at `target_root`.
///
/// Destinations under the root are shown relative to it; destinations
/// elsewhere (absolute redirects) appear under their full path. When `home`
/// is given, it is abbreviated to `~` wherever it prefixes a displayed
/// path.
#[must_use]
pub fn render_tree(entries: &[RenderEntry], target_root: &Path, home: Option<&Path>) -> String {
    let mut root = Node::default();

    for entry in entries {
        let components: Vec<String> = entry.target.strip_prefix(target_root).map_or_else(
            |_| vec![abbreviate_home(&entry.target, home)],
            |rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            },
        );
        insert(&mut root, &components, entry.mark);
    }

    let mut out = format!("{}/", abbreviate_home(target_root, home));
    render_children(&mut out, &root, 1);
    out
}

fn insert(node: &mut Node, components: &[String], mark: Mark) {
    let Some((head, rest)) = components.split_first() else {
        node.mark = Some(mark);
        return;
    };
    let child = node.children.entry(head.clone()).or_default();
    insert(child, rest, mark);
}

fn render_children(out: &mut String, node: &Node, depth: usize) {
    for (name, child) in &node.children {
        out.push('\n');
        out.push_str(&indent(depth));
        out.push_str(name);
        if !child.children.is_empty() {
            out.push('/');
        }
        if let Some(mark) = child.mark {
            out.push(' ');
            out.push_str(&mark.to_string());
        }
        render_children(out, child, depth + 1);
    }
}

fn indent(depth: usize) -> String {
    let tail = depth * 4 - 1;
    let mut s = "─".repeat(tail);
    s.push_str("> ");
    s
}

/// Display `path`, substituting a leading `home` with `~`.
#[must_use]
pub fn abbreviate_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
