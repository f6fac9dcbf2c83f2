//! Integration tests for the grammar data structures: productions,
//! start-symbol augmentation, and the textual grammar format.

use lalr_core::grammar::parse_text;
use lalr_core::{Grammar, GrammarError};

#[test]
fn classifies_terminals_by_absence_from_every_lhs() {
    let spec = parse_text("S -> A B ; A -> a ; B -> b ;").unwrap();
    let grammar = Grammar::from_spec(spec).unwrap();
    assert!(grammar
        .symtab()
        .find_nonterminal("A")
        .map(|nt| grammar.is_nonterminal(lalr_core::Symbol::NonTerminal(nt)))
        .unwrap_or(false));
    assert!(grammar.symtab().find_terminal("a").is_some());
    assert!(grammar.symtab().find_nonterminal("a").is_none());
}

#[test]
fn alternatives_become_separate_productions() {
    let spec = parse_text("S -> a | b | c ;").unwrap();
    let grammar = Grammar::from_spec(spec).unwrap();
    assert_eq!(grammar.num_productions(), 3);
}

#[test]
fn empty_rhs_denotes_the_epsilon_production() {
    let spec = parse_text("S -> a S | ;").unwrap();
    let grammar = Grammar::from_spec(spec).unwrap();
    let has_epsilon = grammar
        .productions_of(grammar.start())
        .iter()
        .any(|id| grammar.production(*id).rhs.is_empty());
    assert!(has_epsilon);
}

#[test]
fn augmenting_twice_is_an_error() {
    let spec = parse_text("S -> a ;").unwrap();
    let mut grammar = Grammar::from_spec(spec).unwrap();
    grammar.augment().unwrap();
    assert!(matches!(grammar.augment(), Err(GrammarError::AlreadyAugmented)));
}

#[test]
fn empty_grammar_is_malformed() {
    assert!(matches!(parse_text(""), Err(GrammarError::EmptyInput)));
}

#[test]
fn digest_is_stable_across_rebuilds_of_the_same_source() {
    // Invariant 6 (idempotent build): rebuilding from the same grammar text
    // twice must yield the same digest, since production order and symbol
    // interning order are both deterministic by insertion.
    let text = "CompilationUnit -> Declaration CompilationUnit | ; \
                Declaration -> DeclarationSpecifiers SemiColon ; \
                DeclarationSpecifiers -> Const | Identifier ;";

    let first = {
        let spec = parse_text(text).unwrap();
        let mut g = Grammar::from_spec(spec).unwrap();
        g.augment().unwrap();
        g.digest()
    };
    let second = {
        let spec = parse_text(text).unwrap();
        let mut g = Grammar::from_spec(spec).unwrap();
        g.augment().unwrap();
        g.digest()
    };
    assert_eq!(first, second);
}

#[test]
fn digest_changes_when_a_production_changes() {
    let a = {
        let spec = parse_text("S -> a ;").unwrap();
        Grammar::from_spec(spec).unwrap().digest()
    };
    let b = {
        let spec = parse_text("S -> b ;").unwrap();
        Grammar::from_spec(spec).unwrap().digest()
    };
    assert_ne!(a, b);
}

#[test]
fn duplicate_production_is_rejected() {
    let spec = parse_text("S -> a b | a b ;").unwrap();
    assert!(Grammar::from_spec(spec).is_err());
}

#[test]
fn text_format_rejects_a_multi_symbol_left_hand_side() {
    assert!(parse_text("S T -> a ;").is_err());
}
