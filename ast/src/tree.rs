//! Parsed files, node handles and position-sensitive path search.

use crate::types::Diagnostic;
use crate::types::TextRange;
use crate::views::DeclItem;
use crate::views::FileView;
use tree_sitter::Node;
use tree_sitter::Tree;

/// Node kinds that may legally appear directly below the file root.
const TOP_LEVEL_DECLARATIONS: &[&str] = &[
    "function_declaration",
    "method_declaration",
    "type_declaration",
    "var_declaration",
    "const_declaration",
    "import_declaration",
];

/// A parsed source file: the tree, the text it was parsed from and the
/// errors the parser recovered from.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    tree: Tree,
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl ParsedFile {
    pub(crate) const fn new(tree: Tree, source: String, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            tree,
            source,
            diagnostics,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), &self.source)
    }

    /// The name from the `package` clause, if the file has one.
    pub fn package_name(&self) -> Option<&str> {
        FileView::new(self.root()).package_name()
    }

    /// Every top-level declaration item in source order.
    pub fn declarations(&self) -> Vec<DeclItem<'_>> {
        FileView::new(self.root()).declarations()
    }

    /// Smallest ordered path of nodes enclosing `range`, innermost first and
    /// ending at the file root.
    ///
    /// Each child's interval is widened over the gap separating it from its
    /// neighbours, so a range that spills into adjacent whitespace or
    /// punctuation still resolves into the node it touches. A child is only
    /// entered when the range overlaps the child itself.
    ///
    /// When the node below the root is not a declaration the path is cut to
    /// `[that node, root]`: Go has no top-level statements, so anything else
    /// there is a package clause or an error fragment.
    pub fn enclosing_path(&self, range: TextRange) -> Vec<SyntaxNode<'_>> {
        let root = self.root();
        let bounds = root.range();

        let mut start = range.start.min(range.end);
        let mut end = range.start.max(range.end);
        if start == end {
            end = start + 1;
        }
        if start >= bounds.end || end <= bounds.start {
            return vec![root];
        }

        let mut path = Vec::new();
        let mut node = root;
        loop {
            path.push(node);
            let bounds = node.range();
            start = start.max(bounds.start);
            end = end.min(bounds.end);

            match sole_child(&node.named_children(), bounds, TextRange::new(start, end)) {
                Some(child) => node = child,
                None => break,
            }
        }
        path.reverse();

        if path.len() > 2 {
            let top = path[path.len() - 2];
            if !TOP_LEVEL_DECLARATIONS.contains(&top.kind_name()) {
                return vec![top, root];
            }
        }
        path
    }
}

/// The one child whose widened interval holds `window`, if any.
fn sole_child<'t>(
    children: &[SyntaxNode<'t>],
    parent: TextRange,
    window: TextRange,
) -> Option<SyntaxNode<'t>> {
    for (i, child) in children.iter().enumerate() {
        let own = child.range();
        if !own.intersects(window) {
            continue;
        }

        let widened_start = if i > 0 {
            children[i - 1].range().end
        } else {
            parent.start
        };
        let widened_end = children
            .get(i + 1)
            .map_or(parent.end, |next| next.range().start);

        if widened_start <= window.start && window.end <= widened_end {
            return Some(*child);
        }
        // The window straddles several children.
        return None;
    }
    None
}

/// A node together with the text it was parsed from.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> SyntaxNode<'t> {
    pub(crate) const fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    /// Grammar name of the node, e.g. `selector_expression`.
    pub fn kind_name(&self) -> &'static str {
        self.node.kind()
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.node.start_byte(), self.node.end_byte())
    }

    pub fn text(&self) -> &'t str {
        self.source.get(self.node.byte_range()).unwrap_or("")
    }

    /// Zero-based line the node starts on.
    pub fn start_row(&self) -> usize {
        self.node.start_position().row
    }

    /// Zero-based line the node ends on.
    pub fn end_row(&self) -> usize {
        self.node.end_position().row
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.node.parent().map(|n| self.wrap(n))
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode<'t>> {
        self.node.prev_sibling().map(|n| self.wrap(n))
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode<'t>> {
        self.node.next_sibling().map(|n| self.wrap(n))
    }

    pub fn is_comment(&self) -> bool {
        self.node.kind() == "comment"
    }

    /// Named children, skipping comments.
    pub fn named_children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .map(|n| self.wrap(n))
            .collect()
    }

    /// All children including anonymous tokens.
    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|n| self.wrap(n))
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<SyntaxNode<'t>> {
        self.node.child_by_field_name(name).map(|n| self.wrap(n))
    }

    /// Every child stored under a repeated field such as a spec's `name`.
    pub fn fields(&self, name: &str) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .children_by_field_name(name, &mut cursor)
            .map(|n| self.wrap(n))
            .collect()
    }

    const fn wrap(&self, node: Node<'t>) -> SyntaxNode<'t> {
        SyntaxNode {
            node,
            source: self.source,
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for SyntaxNode<'_> {}
