use std::collections::VecDeque;
use std::ops::Range;

use crate::diagnostics::Diagnostic;
use crate::keywords::KeywordTable;
use crate::lexer::Statement;
use crate::syntax::{NodeId, SyntaxData, SyntaxKind, SyntaxTree};

/// A syntax tree plus everything worth telling the author about it.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The parsed tree.
    pub tree: SyntaxTree,
    /// Warnings and errors in source order of discovery.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Builds a [`SyntaxTree`] from normalized statements.
///
/// Statements are consumed from a work queue. Opening a grouping pushes the
/// text after `{` back onto the front of the queue, so it is parsed next as a
/// child of the new grouping. Text following the `}` of a close is requeued
/// the same way and parsed next, after the close.
#[derive(Debug, Clone)]
pub struct Parser<'k> {
    keywords: &'k KeywordTable,
}

struct OpenGroup {
    node: NodeId,
    keyword: String,
    span: Range<usize>,
}

impl<'k> Parser<'k> {
    /// A parser recognizing `keywords` as commands.
    pub fn new(keywords: &'k KeywordTable) -> Self {
        Self { keywords }
    }

    /// Parse `statements` into a tree.
    ///
    /// Stray closing braces and groupings left open are reported as warnings;
    /// parsing never fails.
    pub fn parse(&self, statements: Vec<Statement>) -> ParseOutput {
        let mut queue: VecDeque<Statement> = statements.into();
        let mut tree = SyntaxTree::new();
        let mut diagnostics = Vec::new();

        let root = tree.root();
        let mut current = root;
        let mut depth = 0usize;
        let mut open: Vec<OpenGroup> = Vec::new();

        while let Some(stmt) = queue.pop_front() {
            let (keyword, rest) = stmt.text.split_once(':').unwrap_or((stmt.text.as_str(), ""));
            let keyword = keyword.trim();

            if keyword.contains('}') {
                if open.pop().is_none() {
                    diagnostics.push(
                        Diagnostic::warning(stmt.span.clone(), "unmatched `}`")
                            .with_label("no grouping is open here"),
                    );
                }
                depth = depth.saturating_sub(1);
                current = tree.get(current).and_then(|n| n.parent()).unwrap_or(root);

                // `} else: {` closes one grouping and carries on with the rest.
                let trailing = stmt.text.split_once('}').map_or("", |(_, after)| after.trim());
                if !trailing.is_empty() {
                    queue.push_front(Statement::new(trailing, stmt.span));
                }
                continue;
            }

            let mut kind = if self.keywords.contains(keyword) {
                SyntaxKind::Command
            } else {
                SyntaxKind::Value
            };
            let rest = rest.trim();
            let (first, second) = rest.split_once(' ').unwrap_or((rest, ""));

            let node_depth = depth;
            let mut arguments = Vec::new();
            if let Some(inner) = first.strip_prefix('{') {
                kind = kind.grouped();
                depth += 1;
                let remainder = format!("{inner} {second}");
                let remainder = remainder.trim();
                if !remainder.is_empty() {
                    queue.push_front(Statement::new(remainder, stmt.span.clone()));
                }
            } else {
                arguments.extend(
                    [first, second]
                        .into_iter()
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }

            let node = tree.create_node(
                SyntaxData {
                    kind,
                    depth: node_depth,
                    keyword: keyword.to_string(),
                    arguments,
                },
                stmt.span.clone(),
            );
            tree.add_child(current, node);
            tracing::debug!(%node, keyword, %kind, depth = node_depth, "parsed statement");

            if kind.is_grouping() {
                open.push(OpenGroup {
                    node,
                    keyword: keyword.to_string(),
                    span: stmt.span,
                });
                current = node;
            }
        }

        for group in open {
            diagnostics.push(
                Diagnostic::warning(group.span, format!("grouping `{}` is never closed", group.keyword))
                    .with_label(format!("node {} opened here", group.node)),
            );
        }

        ParseOutput { tree, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::normalize;

    fn parse(source: &str) -> ParseOutput {
        let keywords = KeywordTable::default();
        Parser::new(&keywords).parse(normalize(source).statements)
    }

    fn outline(out: &ParseOutput) -> Vec<String> {
        out.tree
            .nodes()
            .skip(1)
            .map(|n| {
                format!(
                    "{} {} {} depth={} parent={} args={:?}",
                    n.id(),
                    n.data.keyword,
                    n.data.kind,
                    n.data.depth,
                    n.parent().map_or(-1, |p| p.0 as i64),
                    n.data.arguments
                )
            })
            .collect()
    }

    #[test]
    fn grouping_command_with_child() {
        let out = parse("look: { say: \"hi\"; };");
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);

        let root = out.tree.root();
        let top: Vec<_> = out.tree.children(root).collect();
        assert_eq!(top.len(), 1);
        let look = top[0];
        assert_eq!(look.data.keyword, "look");
        assert_eq!(look.data.kind, SyntaxKind::GroupingCommand);
        assert_eq!(look.data.depth, 0);
        assert!(look.data.arguments.is_empty());

        let inner: Vec<_> = out.tree.children(look.id()).collect();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].data.keyword, "say");
        assert_eq!(inner[0].data.kind, SyntaxKind::Command);
        assert_eq!(inner[0].data.arguments, vec!["\"hi\"".to_string()]);
        assert_eq!(inner[0].data.depth, 1);
    }

    #[test]
    fn values_and_two_argument_split() {
        let out = parse("title: The Great Hall;");
        let node = out.tree.children(out.tree.root()).next().unwrap();
        assert_eq!(node.data.kind, SyntaxKind::Value);
        assert_eq!(node.data.arguments, vec!["The", "Great Hall"]);
    }

    #[test]
    fn statement_without_colon_has_no_arguments() {
        let out = parse("endsuccess;");
        let node = out.tree.children(out.tree.root()).next().unwrap();
        assert_eq!(node.data.keyword, "endsuccess");
        assert_eq!(node.data.kind, SyntaxKind::Command);
        assert!(node.data.arguments.is_empty());
    }

    #[test]
    fn nested_groupings_outline() {
        let out = parse(
            "room: {
                title: Hall;
                look: {
                    if: {
                        endsuccess;
                    };
                };
            };
            item: Lamp;",
        );
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        insta::assert_debug_snapshot!(outline(&out), @r#"
        [
            "1 room grouping_command depth=0 parent=0 args=[]",
            "2 title value depth=1 parent=1 args=[\"Hall\"]",
            "3 look grouping_command depth=1 parent=1 args=[]",
            "4 if grouping_command depth=2 parent=3 args=[]",
            "5 endsuccess command depth=3 parent=4 args=[]",
            "6 item command depth=0 parent=0 args=[\"Lamp\"]",
        ]
        "#);
    }

    #[test]
    fn unmatched_close_clamps_and_warns() {
        let out = parse("}; room: Hall; }; item: Lamp;");
        assert_eq!(out.diagnostics.len(), 2);
        assert!(out.diagnostics.iter().all(|d| d.message == "unmatched `}`"));

        let top: Vec<_> = out
            .tree
            .children(out.tree.root())
            .map(|n| (n.data.keyword.as_str(), n.data.depth))
            .collect();
        assert_eq!(top, vec![("room", 0), ("item", 0)]);
    }

    #[test]
    fn siblings_after_a_close_reattach_to_the_parent() {
        let out = parse("verb: { say: a; }; }; say: b;");
        assert_eq!(out.diagnostics.len(), 1);
        let keywords: Vec<_> = out
            .tree
            .children(out.tree.root())
            .map(|n| n.data.keyword.as_str())
            .collect();
        assert_eq!(keywords, vec!["verb", "say"]);
    }

    #[test]
    fn text_after_a_close_is_parsed_as_a_sibling() {
        let out = parse("if: {say: a; } else: {say: b; };");
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);

        let top: Vec<_> = out.tree.children(out.tree.root()).collect();
        let keywords: Vec<_> = top.iter().map(|n| n.data.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["if", "else"]);
        for (group, arg) in top.iter().zip(["a", "b"]) {
            assert!(group.data.kind.is_grouping());
            assert_eq!(group.data.depth, 0);
            let inner: Vec<_> = out.tree.children(group.id()).collect();
            assert_eq!(inner.len(), 1);
            assert_eq!(inner[0].data.keyword, "say");
            assert_eq!(inner[0].data.arguments, vec![arg]);
        }
    }

    #[test]
    fn doubled_close_closes_twice() {
        let out = parse("room: { look: { say: hi; }}; item: Lamp;");
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let top: Vec<_> = out
            .tree
            .children(out.tree.root())
            .map(|n| n.data.keyword.as_str())
            .collect();
        assert_eq!(top, vec!["room", "item"]);
    }

    #[test]
    fn unclosed_grouping_is_reported() {
        let out = parse("look: { say: hi;");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].message, "grouping `look` is never closed");
        assert!(!out.has_errors());
    }

    #[test]
    fn open_brace_with_trailing_text_is_requeued() {
        let out = parse("descriptions: {default: \"Dusty\"; };");
        let group = out.tree.children(out.tree.root()).next().unwrap();
        assert_eq!(group.data.kind, SyntaxKind::GroupingCommand);
        let child = out.tree.children(group.id()).next().unwrap();
        assert_eq!(child.data.keyword, "default");
        assert_eq!(child.data.arguments, vec!["\"Dusty\""]);
    }
}
