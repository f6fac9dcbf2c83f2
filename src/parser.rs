//! Parse driver: a table-driven shift/reduce stack machine over an external
//! token stream, producing a concrete parse tree.

use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::item::StateId;
use crate::symbol::{Symbol, TIdx};
use crate::tables::{Action, Tables};

/// One token from an external lexer: a terminal kind plus its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TIdx,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TIdx, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }
}

/// A node of the concrete parse tree built by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTreeNode {
    Leaf { kind: Symbol, lexeme: String },
    Internal { symbol: Symbol, children: Vec<ParseTreeNode> },
}

impl ParseTreeNode {
    pub fn symbol(&self) -> Symbol {
        match self {
            ParseTreeNode::Leaf { kind, .. } => *kind,
            ParseTreeNode::Internal { symbol, .. } => *symbol,
        }
    }

    /// Renders an indented tree dump, as printed by the `lalr-parse` binary.
    pub fn dump(&self, grammar: &Grammar, indent: usize) -> String {
        let mut out = String::new();
        self.dump_into(grammar, indent, &mut out);
        out
    }

    fn dump_into(&self, grammar: &Grammar, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match self {
            ParseTreeNode::Leaf { kind, lexeme } => {
                out.push_str(&format!("{pad}{} \"{}\"\n", grammar.symtab().show(*kind), lexeme));
            }
            ParseTreeNode::Internal { symbol, children } => {
                out.push_str(&format!("{pad}{}\n", grammar.symtab().show(*symbol)));
                for child in children {
                    child.dump_into(grammar, indent + 1, out);
                }
            }
        }
    }
}

/// Drives a shift/reduce parse of `tokens` against `tables`, returning the
/// resulting parse tree, or the first error encountered: an out-of-grammar
/// token (`SyntaxError`), or a reduce with no corresponding GOTO entry
/// (`InternalGoto`, which indicates corrupted or mismatched tables rather
/// than a malformed source file).
///
/// `tokens` must not include a trailing EOF marker; the EOF terminal is
/// consulted implicitly once the token stream is exhausted.
pub fn parse(grammar: &Grammar, tables: &Tables, tokens: &[Token]) -> Result<ParseTreeNode> {
    let eof = TIdx(grammar.symtab().eof_terminal_index() as u32);

    let mut stack: Vec<(StateId, Option<ParseTreeNode>)> = vec![(tables.start_state(), None)];
    let mut pos = 0usize;

    loop {
        let current_state = stack.last().expect("stack is never empty").0;
        let (lookahead, lexeme): (TIdx, &str) = match tokens.get(pos) {
            Some(tok) => (tok.kind, tok.lexeme.as_str()),
            None => (eof, ""),
        };

        let Some(action) = tables.action(current_state, lookahead) else {
            return Err(GrammarError::SyntaxError {
                index: pos,
                token: grammar.symtab().terminal_name(lookahead).to_string(),
            });
        };

        match action {
            Action::Shift(next) => {
                let node = ParseTreeNode::Leaf {
                    kind: Symbol::Terminal(lookahead),
                    lexeme: lexeme.to_string(),
                };
                stack.push((next, Some(node)));
                pos += 1;
            }
            Action::Reduce(production_id) => {
                let production = grammar.production(production_id);
                let arity = production.rhs.len();
                let mut children = Vec::with_capacity(arity);
                for _ in 0..arity {
                    let (_, node) = stack.pop().expect("stack underflow during reduce");
                    children.push(node.expect("every non-bottom stack entry carries a node"));
                }
                children.reverse();

                let prior_state = stack.last().expect("stack is never empty").0;
                let Some(goto_state) = tables.goto(prior_state, production.lhs) else {
                    return Err(GrammarError::InternalGoto {
                        state: prior_state.as_usize(),
                        nonterminal: grammar.symtab().nonterminal_name(production.lhs).to_string(),
                    });
                };

                let node = ParseTreeNode::Internal {
                    symbol: Symbol::NonTerminal(production.lhs),
                    children,
                };
                stack.push((goto_state, Some(node)));
            }
            Action::Accept => {
                let (_, node) = stack.pop().expect("accept requires the start symbol on the stack");
                return Ok(node.expect("start symbol's reduction always carries a node"));
            }
        }
    }
}
