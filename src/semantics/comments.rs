//! Comment preservation for generated replacement text
//!
//! Rewrites regenerate the text of a subtree. Comments inside the replaced
//! range would be lost unless they sit inside a node whose original text was
//! reused verbatim. The tracker records which nodes were reused and, when the
//! replacement is built, re-emits every other comment in front of it exactly
//! once.

use std::collections::HashSet;

use crate::syntax::edits::{deletion_span_for_statement, indentation_at, TextEdit};
use crate::syntax::{Comment, NodeId, Span, SyntaxTree};

#[derive(Debug)]
pub struct CommentTracker<'t> {
    tree: &'t SyntaxTree,
    preserved: Vec<Span>,
    /// Start offsets of comments already re-emitted
    emitted: HashSet<usize>,
}

impl<'t> CommentTracker<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            preserved: Vec::new(),
            emitted: HashSet::new(),
        }
    }

    /// Original text of `node`; its comments travel with it
    pub fn text(&mut self, node: NodeId) -> String {
        self.mark_unchanged(node);
        self.tree.text(node).to_string()
    }

    pub fn mark_unchanged(&mut self, node: NodeId) {
        self.preserved.push(self.tree.span(node));
    }

    /// Text of `node`, parenthesized when it binds looser than `precedence`
    pub fn text_with_precedence(&mut self, node: NodeId, precedence: u8) -> String {
        let text = self.text(node);
        if self.tree.syntax(node).precedence() > precedence {
            format!("({})", text)
        } else {
            text
        }
    }

    fn is_preserved(&self, comment: &Comment) -> bool {
        self.preserved.iter().any(|span| span.contains(comment.span))
    }

    /// Comments inside `target` that the replacement does not carry
    fn take_orphaned_comments(&mut self, target: NodeId) -> Vec<Comment> {
        let span = self.tree.span(target);
        let orphaned: Vec<Comment> = self
            .tree
            .comments()
            .iter()
            .filter(|c| span.contains(c.span))
            .filter(|c| !self.is_preserved(c) && !self.emitted.contains(&c.span.start))
            .copied()
            .collect();
        self.emitted.extend(orphaned.iter().map(|c| c.span.start));
        orphaned
    }

    fn render_comments(&self, comments: &[Comment], at: usize) -> String {
        let indentation = indentation_at(self.tree.source(), at);
        comments
            .iter()
            .map(|c| {
                let text = self.tree.comment_text(c);
                if c.is_line {
                    format!("{}\n{}", text, indentation)
                } else {
                    format!("{} ", text)
                }
            })
            .collect()
    }

    /// Edit replacing `target` with `replacement`, orphaned comments first
    pub fn replace_and_restore_comments(&mut self, target: NodeId, replacement: &str) -> TextEdit {
        let span = self.tree.span(target);
        let comments = self.take_orphaned_comments(target);
        let prefix = self.render_comments(&comments, span.start);
        TextEdit::replace(span, format!("{}{}", prefix, replacement))
    }

    /// Edit removing the statement `target`; its comments stay behind
    pub fn delete_and_restore_comments(&mut self, target: NodeId) -> TextEdit {
        let span = self.tree.span(target);
        let comments = self.take_orphaned_comments(target);
        if comments.is_empty() {
            return TextEdit::delete(deletion_span_for_statement(self.tree.source(), span));
        }
        let restored = self.render_comments(&comments, span.start);
        TextEdit::replace(span, restored.trim_end().to_string())
    }
}
