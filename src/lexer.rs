//! Reference lexer: a hand-rolled scanner for the demo C-subset token
//! alphabet — punctuators, the keywords `if`/`else`/`const`, identifiers,
//! decimal integer constants, and the
//! arithmetic operators `+ * ( )`. Whitespace is discarded; the bundled
//! `lalr-parse` binary is the only consumer that requires this exact
//! alphabet — any other token stream can implement its own lexer and call
//! [`crate::parser::parse`] directly.

use crate::error::{GrammarError, Result};
use crate::parser::Token;
use crate::symbol::SymbolTable;

/// Scans `source` into a token stream over `symtab`'s terminal namespace.
///
/// Terminal names are looked up by their surface spelling (`"If"`, `"Const"`,
/// `"Identifier"`, `"Num"`, `"LeftParen"`, ...); a grammar that never
/// declares one of these terminals simply never receives that token kind
/// (its productions can't mention it), so lexing is independent of exactly
/// which subset of the alphabet a given grammar uses.
pub fn lex(source: &str, symtab: &SymbolTable) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }
            push(&mut tokens, symtab, "Num", &source[start..i]);
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && {
                let ch = bytes[i] as char;
                ch.is_ascii_alphanumeric() || ch == '_'
            } {
                i += 1;
            }
            let word = &source[start..i];
            let kind = match word {
                "if" => "If",
                "else" => "Else",
                "const" => "Const",
                _ => "Identifier",
            };
            push(&mut tokens, symtab, kind, word);
            continue;
        }

        let (kind, width) = match c {
            '+' => ("Plus", 1),
            '*' => ("Star", 1),
            '(' => ("LeftParen", 1),
            ')' => ("RightParen", 1),
            ';' => ("SemiColon", 1),
            ',' => ("Comma", 1),
            '{' => ("LeftBrace", 1),
            '}' => ("RightBrace", 1),
            _ => {
                return Err(GrammarError::LexError {
                    offset: i,
                    character: c,
                });
            }
        };
        push(&mut tokens, symtab, kind, &source[i..i + width]);
        i += width;
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<Token>, symtab: &SymbolTable, kind: &str, lexeme: &str) {
    if let Some(idx) = symtab.find_terminal(kind) {
        tokens.push(Token::new(idx, lexeme));
    }
}
