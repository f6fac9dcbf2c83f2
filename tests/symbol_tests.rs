//! Unit tests for the symbol module.

use lalr_core::symbol::*;

#[test]
fn eof_is_always_terminal_index_zero() {
    let symtab = SymbolTable::new();
    assert_eq!(symtab.eof(), Symbol::Terminal(TIdx(0)));
    assert_eq!(symtab.eof_terminal_index(), 0);
    assert_eq!(symtab.terminal_name(TIdx(0)), EOF_NAME);
}

#[test]
fn interning_is_idempotent_and_order_preserving() {
    let mut symtab = SymbolTable::new();
    let a = symtab.intern_terminal("a");
    let b = symtab.intern_terminal("b");
    let a_again = symtab.intern_terminal("a");
    assert_eq!(a, a_again);
    assert_ne!(a, b);
    assert_eq!(symtab.terminal_name(a), "a");
    assert_eq!(symtab.terminal_name(b), "b");
}

#[test]
fn nonterminal_and_terminal_namespaces_are_independent() {
    let mut symtab = SymbolTable::new();
    let t = symtab.intern_terminal("X");
    let nt = symtab.intern_nonterminal("X");
    assert_ne!(Symbol::Terminal(t), Symbol::NonTerminal(nt));
    assert!(Symbol::Terminal(t).is_terminal());
    assert!(Symbol::NonTerminal(nt).is_nonterminal());
}

#[test]
fn symbols_order_terminals_before_nonterminals() {
    let mut symtab = SymbolTable::new();
    let t = symtab.intern_terminal("a");
    let nt = symtab.intern_nonterminal("A");
    assert!(Symbol::Terminal(t) < Symbol::NonTerminal(nt));
}

#[test]
fn find_does_not_intern() {
    let symtab = SymbolTable::new();
    assert_eq!(symtab.find_terminal("never-seen"), None);
    assert_eq!(symtab.find_nonterminal("never-seen"), None);
}

#[test]
fn show_renders_the_interned_name() {
    let mut symtab = SymbolTable::new();
    let nt = symtab.intern_nonterminal("DeclarationSpecifiers");
    assert_eq!(
        format!("{}", symtab.show(Symbol::NonTerminal(nt))),
        "DeclarationSpecifiers"
    );
}
