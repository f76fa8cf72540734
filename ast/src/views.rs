//! Typed views over Go syntax nodes.
//!
//! Consumers never match on grammar node names. They call
//! [`SyntaxNode::kind`] and match exhaustively on [`NodeKind`], then use the
//! accessors of the view they got back.

use crate::tree::SyntaxNode;

/// Closed classification of the nodes scope and selector logic care about.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'t> {
    /// The file root.
    File(FileView<'t>),
    /// A statement list: braces block, or a case clause body.
    Block(BlockView<'t>),
    /// `if` or expression `switch`, possibly with an init statement.
    Conditional(ConditionalView<'t>),
    /// Type switch; `x := v.(type)` binds `x` for the clauses.
    TypeSwitch(TypeSwitchView<'t>),
    /// `x.y` in expression or type position.
    Selector(SelectorView<'t>),
    /// A bare identifier of any flavour, with its text.
    Identifier(&'t str),
    Other,
}

impl<'t> SyntaxNode<'t> {
    pub fn kind(&self) -> NodeKind<'t> {
        match self.kind_name() {
            "source_file" => NodeKind::File(FileView::new(*self)),
            "block" | "statement_list" | "expression_case" | "default_case" | "type_case"
            | "communication_case" => NodeKind::Block(BlockView(*self)),
            "if_statement" | "expression_switch_statement" => {
                NodeKind::Conditional(ConditionalView(*self))
            }
            "type_switch_statement" => NodeKind::TypeSwitch(TypeSwitchView(*self)),
            "selector_expression" | "qualified_type" => NodeKind::Selector(SelectorView(*self)),
            "identifier" | "type_identifier" | "field_identifier" | "package_identifier" => {
                NodeKind::Identifier(self.text())
            }
            _ => NodeKind::Other,
        }
    }

    /// Classify a statement inside a block.
    pub fn statement(&self) -> Statement<'t> {
        match self.kind_name() {
            "var_declaration" | "const_declaration" | "type_declaration" => {
                Statement::Declaration(decl_items(*self))
            }
            "short_var_declaration" => Statement::Define(left_identifiers(*self)),
            "assignment_statement" => Statement::Assign,
            _ => Statement::Other,
        }
    }
}

/// What a statement introduces into the scope of the statements after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'t> {
    /// `var`, `const` or `type` declaration.
    Declaration(Vec<DeclItem<'t>>),
    /// `a, b := ...`
    Define(Vec<&'t str>),
    /// `a = ...`; introduces nothing.
    Assign,
    Other,
}

/// One declared entity, as found in a declaration or spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclItem<'t> {
    Import {
        alias: Option<&'t str>,
        path: String,
    },
    /// One `var` or `const` spec; may declare several names.
    Value {
        names: Vec<&'t str>,
        doc: Option<String>,
    },
    Type {
        name: &'t str,
        doc: Option<String>,
    },
    Function {
        name: &'t str,
        doc: Option<String>,
    },
    /// Function with a receiver.
    Method {
        name: &'t str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FileView<'t>(SyntaxNode<'t>);

impl<'t> FileView<'t> {
    pub const fn new(node: SyntaxNode<'t>) -> Self {
        Self(node)
    }

    pub fn package_name(&self) -> Option<&'t str> {
        self.0
            .named_children()
            .into_iter()
            .find(|n| n.kind_name() == "package_clause")?
            .named_children()
            .into_iter()
            .find(|n| n.kind_name() == "package_identifier")
            .map(|n| n.text())
    }

    pub fn declarations(&self) -> Vec<DeclItem<'t>> {
        self.0
            .named_children()
            .into_iter()
            .flat_map(decl_items)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BlockView<'t>(SyntaxNode<'t>);

impl<'t> BlockView<'t> {
    /// Statements in source order. Case clauses also yield their case
    /// expressions, which classify as [`Statement::Other`].
    pub fn statements(&self) -> Vec<SyntaxNode<'t>> {
        self.0.named_children()
    }
}

/// Names bound by a statement header and where the header ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBindings<'t> {
    pub names: Vec<&'t str>,
    /// Bindings are only visible to nodes starting at or after this offset.
    pub end: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ConditionalView<'t>(SyntaxNode<'t>);

impl<'t> ConditionalView<'t> {
    /// Names defined by the init statement, when it is a `:=` form.
    pub fn bindings(&self) -> Option<HeaderBindings<'t>> {
        let init = self.0.field("initializer")?;
        match init.statement() {
            Statement::Define(names) => Some(HeaderBindings {
                names,
                end: init.range().end,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeSwitchView<'t>(SyntaxNode<'t>);

impl<'t> TypeSwitchView<'t> {
    /// The guard alias (`x` in `switch x := v.(type)`) followed by any names
    /// from a `:=` init statement.
    pub fn bindings(&self) -> Option<HeaderBindings<'t>> {
        let mut names = Vec::new();
        let mut end = None;

        if let Some(alias) = self.0.field("alias") {
            names.extend(identifiers(alias));
            end = self.0.field("value").map(|v| v.range().end);
        }
        if let Some(init) = self.0.field("initializer") {
            if let Statement::Define(defined) = init.statement() {
                names.extend(defined);
                end = end.or(Some(init.range().end));
            }
        }

        if names.is_empty() {
            return None;
        }
        Some(HeaderBindings {
            names,
            end: end.unwrap_or(self.0.range().start),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectorView<'t>(SyntaxNode<'t>);

impl<'t> SelectorView<'t> {
    /// Left-hand side of the dot.
    pub fn operand(&self) -> Option<SyntaxNode<'t>> {
        self.0.field("operand").or_else(|| self.0.field("package"))
    }

    /// Operand text when the operand is a bare identifier.
    pub fn operand_name(&self) -> Option<&'t str> {
        self.operand().and_then(|n| match n.kind() {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        })
    }

    /// Right-hand side of the dot.
    pub fn member(&self) -> Option<SyntaxNode<'t>> {
        self.0.field("field").or_else(|| self.0.field("name"))
    }
}

/// Every item declared by a top-level or block-level declaration node.
fn decl_items(node: SyntaxNode<'_>) -> Vec<DeclItem<'_>> {
    match node.kind_name() {
        "import_declaration" => specs(node, &["import_spec"])
            .into_iter()
            .filter_map(|spec| {
                let path = unquote(spec.field("path")?.text())?;
                let alias = spec.field("name").map(|n| n.text());
                Some(DeclItem::Import { alias, path })
            })
            .collect(),
        "var_declaration" | "const_declaration" => {
            specs(node, &["var_spec", "const_spec"])
                .into_iter()
                .map(|spec| DeclItem::Value {
                    names: spec.fields("name").into_iter().map(|n| n.text()).collect(),
                    doc: spec_doc(spec, node),
                })
                .collect()
        }
        "type_declaration" => specs(node, &["type_spec", "type_alias"])
            .into_iter()
            .filter_map(|spec| {
                Some(DeclItem::Type {
                    name: spec.field("name")?.text(),
                    doc: spec_doc(spec, node),
                })
            })
            .collect(),
        "function_declaration" => node
            .field("name")
            .map(|name| DeclItem::Function {
                name: name.text(),
                doc: leading_doc(node),
            })
            .into_iter()
            .collect(),
        "method_declaration" => node
            .field("name")
            .map(|name| DeclItem::Method { name: name.text() })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Specs of a declaration, looking through `( ... )` list wrappers.
fn specs<'t>(node: SyntaxNode<'t>, kinds: &[&str]) -> Vec<SyntaxNode<'t>> {
    let mut found = Vec::new();
    for child in node.named_children() {
        if kinds.contains(&child.kind_name()) {
            found.push(child);
        } else if child.kind_name().ends_with("_spec_list") {
            found.extend(specs(child, kinds));
        }
    }
    found
}

fn left_identifiers(node: SyntaxNode<'_>) -> Vec<&str> {
    node.field("left").map(identifiers).unwrap_or_default()
}

fn identifiers(list: SyntaxNode<'_>) -> Vec<&str> {
    if list.kind_name() == "identifier" {
        return vec![list.text()];
    }
    list.named_children()
        .into_iter()
        .filter(|n| n.kind_name() == "identifier")
        .map(|n| n.text())
        .collect()
}

/// Import path literal without its quotes.
fn unquote(literal: &str) -> Option<String> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')))?;
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Doc for a spec: its own leading comments, the declaration's when the spec
/// is not grouped, or else a trailing comment on the same line.
fn spec_doc(spec: SyntaxNode<'_>, decl: SyntaxNode<'_>) -> Option<String> {
    let grouped = spec.parent().is_some_and(|p| p != decl)
        || decl.children().iter().any(|c| c.kind_name() == "(");
    leading_doc(spec)
        .or_else(|| if grouped { None } else { leading_doc(decl) })
        .or_else(|| trailing_doc(spec))
        .or_else(|| if grouped { None } else { trailing_doc(decl) })
}

/// Comment lines directly above `node`, with no blank line in between.
fn leading_doc(node: SyntaxNode<'_>) -> Option<String> {
    let mut lines = Vec::new();
    let mut first_row = node.start_row();
    let mut cursor = node.prev_sibling();

    while let Some(prev) = cursor {
        if !prev.is_comment() || prev.end_row() + 1 < first_row {
            break;
        }
        lines.push(prev.text());
        first_row = prev.start_row();
        cursor = prev.prev_sibling();
    }

    lines.reverse();
    comment_text(&lines)
}

/// A comment following `node` on the line where it ends.
fn trailing_doc(node: SyntaxNode<'_>) -> Option<String> {
    let next = node.next_sibling()?;
    if next.is_comment() && next.start_row() == node.end_row() {
        comment_text(&[next.text()])
    } else {
        None
    }
}

/// Comment text without markers: `//` plus one following space, or the
/// `/* */` delimiters. Surrounding blank lines are dropped and the result
/// ends in a newline.
fn comment_text(comments: &[&str]) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();
    for comment in comments {
        if let Some(line) = comment.strip_prefix("//") {
            lines.push(line.strip_prefix(' ').unwrap_or(line).trim_end());
        } else if let Some(body) = comment.strip_prefix("/*") {
            let body = body.strip_suffix("*/").unwrap_or(body);
            lines.extend(body.lines().map(str::trim_end));
        }
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return None;
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SyntaxProvider;
    use crate::tree::ParsedFile;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> ParsedFile {
        SyntaxProvider::new().parse(src).unwrap()
    }

    #[test]
    fn test_package_name() {
        assert_eq!(parse("package fmt\n").package_name(), Some("fmt"));
        assert_eq!(parse("func f() {}\n").package_name(), None);
    }

    #[test]
    fn test_top_level_declarations() {
        let file = parse(
            r#"package sample

import (
	"fmt"
	str "strings"
)

var A, b = 1, 2

const (
	C = iota
	D
)

type (
	T int
	U = T
)

func F() {}

func (T) M() {}
"#,
        );

        assert_eq!(
            file.declarations(),
            vec![
                DeclItem::Import {
                    alias: None,
                    path: "fmt".to_string()
                },
                DeclItem::Import {
                    alias: Some("str"),
                    path: "strings".to_string()
                },
                DeclItem::Value {
                    names: vec!["A", "b"],
                    doc: None
                },
                DeclItem::Value {
                    names: vec!["C"],
                    doc: None
                },
                DeclItem::Value {
                    names: vec!["D"],
                    doc: None
                },
                DeclItem::Type { name: "T", doc: None },
                DeclItem::Type { name: "U", doc: None },
                DeclItem::Function { name: "F", doc: None },
                DeclItem::Method { name: "M" },
            ]
        );
    }

    #[test]
    fn test_doc_comments() {
        let file = parse(
            r#"package sample

// Println formats using the default formats
// and writes to standard output.
func Println() {}

// Detached comment.

func NoDoc() {}

var Limit = 10 // upper bound

const (
	// Grouped doc.
	X = 1
)
"#,
        );

        let docs: Vec<(String, Option<String>)> = file
            .declarations()
            .into_iter()
            .map(|item| match item {
                DeclItem::Function { name, doc } | DeclItem::Type { name, doc } => {
                    (name.to_string(), doc)
                }
                DeclItem::Value { names, doc } => (names.join(","), doc),
                other => panic!("unexpected item {other:?}"),
            })
            .collect();

        assert_eq!(
            docs,
            vec![
                (
                    "Println".to_string(),
                    Some(
                        "Println formats using the default formats\nand writes to standard output.\n"
                            .to_string()
                    )
                ),
                ("NoDoc".to_string(), None),
                ("Limit".to_string(), Some("upper bound\n".to_string())),
                ("X".to_string(), Some("Grouped doc.\n".to_string())),
            ]
        );
    }

    #[test]
    fn test_comment_text_block_markers() {
        assert_eq!(
            comment_text(&["/*\n Package fmt implements formatted I/O.\n*/"]),
            Some(" Package fmt implements formatted I/O.\n".to_string())
        );
        assert_eq!(comment_text(&["//"]), None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"text/template\""), Some("text/template".to_string()));
        assert_eq!(unquote("`fmt`"), Some("fmt".to_string()));
        assert_eq!(unquote("\"\""), None);
        assert_eq!(unquote("fmt"), None);
    }

    #[test]
    fn test_statement_classification() {
        let file = parse(
            "package main\n\nfunc main() {\n\tvar a int\n\tb, c := 1, 2\n\ta = b\n\tprintln(a)\n}\n",
        );
        let main = file.root().named_children()[1];
        let body = main.field("body").unwrap();
        let NodeKind::Block(block) = body.kind() else {
            panic!("function body is not a block");
        };

        let mut statements: Vec<SyntaxNode<'_>> = Vec::new();
        for node in block.statements() {
            // Newer grammars wrap the statements in a statement_list.
            match node.kind() {
                NodeKind::Block(inner) => statements.extend(inner.statements()),
                _ => statements.push(node),
            }
        }

        let classified: Vec<Statement<'_>> = statements.iter().map(|s| s.statement()).collect();
        assert_eq!(
            classified,
            vec![
                Statement::Declaration(vec![DeclItem::Value {
                    names: vec!["a"],
                    doc: None
                }]),
                Statement::Define(vec!["b", "c"]),
                Statement::Assign,
                Statement::Other,
            ]
        );
    }

    #[test]
    fn test_header_bindings() {
        let file = parse(
            "package main\n\nfunc main() {\n\tif v, err := f(); ok {\n\t}\n\tswitch t := x.(type) {\n\t}\n}\n",
        );

        let mut conditional = None;
        let mut type_switch = None;
        let mut stack = vec![file.root()];
        while let Some(node) = stack.pop() {
            match node.kind() {
                NodeKind::Conditional(view) => conditional = Some(view),
                NodeKind::TypeSwitch(view) => type_switch = Some(view),
                _ => {}
            }
            stack.extend(node.named_children());
        }

        let if_bindings = conditional.unwrap().bindings().unwrap();
        assert_eq!(if_bindings.names, vec!["v", "err"]);

        let switch_bindings = type_switch.unwrap().bindings().unwrap();
        assert_eq!(switch_bindings.names, vec!["t"]);
    }

    #[test]
    fn test_selector_views() {
        let file = parse("package main\n\nvar w fmt.Stringer\n\nfunc main() { a.b.C() }\n");

        let mut selectors = Vec::new();
        let mut stack = vec![file.root()];
        while let Some(node) = stack.pop() {
            if let NodeKind::Selector(view) = node.kind() {
                selectors.push((view.operand_name(), view.member().map(|m| m.text())));
            }
            stack.extend(node.named_children());
        }
        selectors.sort();

        assert_eq!(
            selectors,
            vec![
                (None, Some("C")),
                (Some("a"), Some("b")),
                (Some("fmt"), Some("Stringer")),
            ]
        );
    }
}
