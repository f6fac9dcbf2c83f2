//! Grammar model for context-free grammars.
//!
//! This module owns the `Production`/`Grammar` data structures, the
//! terminal/nonterminal classification rule, start-symbol augmentation, and
//! the small textual format used by the `lalr-build` binary to load a
//! grammar from a file.

use crate::error::{GrammarError, Result};
use crate::symbol::{NTIdx, Symbol, SymbolTable};
use std::collections::HashSet;
use std::fmt;

/// Stable index of a production, assigned at grammar load and never
/// reordered afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(pub u32);

impl ProductionId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A production rule `lhs -> rhs`. An empty `rhs` is the epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: NTIdx,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: NTIdx, rhs: Vec<Symbol>) -> Self {
        Self { lhs, rhs }
    }
}

/// An in-memory grammar source: an ordered mapping from nonterminal name to
/// its alternative right-hand sides. The first entry's name is the start
/// symbol.
#[derive(Debug, Clone, Default)]
pub struct GrammarSpec {
    pub rules: Vec<(String, Vec<Vec<String>>)>,
}

impl GrammarSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a nonterminal's alternatives, merging into an existing entry
    /// of the same name if one is already present.
    pub fn push(&mut self, lhs: impl Into<String>, alternatives: Vec<Vec<String>>) {
        let lhs = lhs.into();
        if let Some((_, existing)) = self.rules.iter_mut().find(|(n, _)| *n == lhs) {
            existing.extend(alternatives);
        } else {
            self.rules.push((lhs, alternatives));
        }
    }
}

/// A context-free grammar: productions plus the interned symbol table.
#[derive(Debug, Clone)]
pub struct Grammar {
    symtab: SymbolTable,
    productions: Vec<Production>,
    productions_of: Vec<Vec<ProductionId>>,
    start: NTIdx,
    augmented_start: Option<NTIdx>,
}

impl Grammar {
    /// Builds a grammar from an ordered, in-memory specification.
    ///
    /// Classification rule: every name that appears as some rule's
    /// left-hand side is a nonterminal; every other name that appears in a
    /// right-hand side is a terminal.
    pub fn from_spec(spec: GrammarSpec) -> Result<Self> {
        if spec.rules.is_empty() {
            return Err(GrammarError::EmptyInput);
        }

        let lhs_names: HashSet<&str> = spec.rules.iter().map(|(n, _)| n.as_str()).collect();

        let mut symtab = SymbolTable::new();
        // Intern nonterminals first, in first-declared order, so that the
        // start symbol is always nonterminal index 0.
        for (name, _) in &spec.rules {
            symtab.intern_nonterminal(name);
        }

        let mut productions: Vec<Production> = Vec::new();
        let mut seen: HashSet<(NTIdx, Vec<Symbol>)> = HashSet::new();

        for (name, alternatives) in &spec.rules {
            let lhs = symtab
                .find_nonterminal(name)
                .expect("interned immediately above");
            for alt in alternatives {
                let mut rhs = Vec::with_capacity(alt.len());
                for sym_name in alt {
                    let sym = if lhs_names.contains(sym_name.as_str()) {
                        Symbol::NonTerminal(symtab.intern_nonterminal(sym_name))
                    } else {
                        Symbol::Terminal(symtab.intern_terminal(sym_name))
                    };
                    rhs.push(sym);
                }
                if !seen.insert((lhs, rhs.clone())) {
                    return Err(GrammarError::InvalidProduction(format!(
                        "duplicate production for '{}'",
                        name
                    )));
                }
                productions.push(Production::new(lhs, rhs));
            }
        }

        let start = symtab
            .find_nonterminal(&spec.rules[0].0)
            .expect("start symbol interned above");

        let mut productions_of: Vec<Vec<ProductionId>> =
            vec![Vec::new(); symtab.num_nonterminals()];
        for (i, prod) in productions.iter().enumerate() {
            productions_of[prod.lhs.as_usize()].push(ProductionId(i as u32));
        }

        Ok(Self {
            symtab,
            productions,
            productions_of,
            start,
            augmented_start: None,
        })
    }

    /// Adds the augmented start production `S' -> S`. May only be called
    /// once; a second call is a [`GrammarError::AlreadyAugmented`] error.
    pub fn augment(&mut self) -> Result<()> {
        if self.augmented_start.is_some() {
            return Err(GrammarError::AlreadyAugmented);
        }
        let fresh_name = format!("{}'", self.symtab.nonterminal_name(self.start));
        let augmented = self.symtab.intern_nonterminal(&fresh_name);

        let id = ProductionId(self.productions.len() as u32);
        self.productions
            .push(Production::new(augmented, vec![Symbol::NonTerminal(self.start)]));
        self.productions_of.push(vec![id]);

        self.augmented_start = Some(augmented);
        Ok(())
    }

    #[inline]
    pub fn is_augmented(&self) -> bool {
        self.augmented_start.is_some()
    }

    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    #[inline]
    pub fn is_terminal(&self, sym: Symbol) -> bool {
        sym.is_terminal()
    }

    #[inline]
    pub fn is_nonterminal(&self, sym: Symbol) -> bool {
        sym.is_nonterminal()
    }

    pub fn productions_of(&self, nt: NTIdx) -> &[ProductionId] {
        &self.productions_of[nt.as_usize()]
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.as_usize()]
    }

    pub fn all_production_ids(&self) -> impl Iterator<Item = ProductionId> {
        (0..self.productions.len() as u32).map(ProductionId)
    }

    pub fn num_productions(&self) -> usize {
        self.productions.len()
    }

    pub fn start(&self) -> NTIdx {
        self.start
    }

    /// The augmented start nonterminal. Only `Some` once [`Grammar::augment`]
    /// has run.
    pub fn augmented_start(&self) -> Option<NTIdx> {
        self.augmented_start
    }

    /// Renders `lhs -> rhs` for diagnostics.
    pub fn format_production(&self, id: ProductionId) -> String {
        let p = &self.productions[id.as_usize()];
        let rhs = if p.rhs.is_empty() {
            "ε".to_string()
        } else {
            p.rhs
                .iter()
                .map(|s| self.symtab.symbol_name(*s))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!("{} -> {}", self.symtab.nonterminal_name(p.lhs), rhs)
    }

    /// A digest of the canonical production list, used to detect a
    /// mismatched grammar/table pairing at parse time.
    pub fn digest(&self) -> u64 {
        // FNV-1a, chosen for a small dependency-free stable hash.
        const OFFSET: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;
        let mut hash = OFFSET;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                hash ^= b as u64;
                hash = hash.wrapping_mul(PRIME);
            }
        };
        for id in self.all_production_ids() {
            mix(self.format_production(id).as_bytes());
            mix(b"\0");
        }
        hash
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.all_production_ids() {
            writeln!(f, "{}", self.format_production(id))?;
        }
        Ok(())
    }
}

/// Parses the grammar text format:
///
/// ```text
/// CompilationUnit -> Declaration CompilationUnit | ;
/// Declaration -> DeclarationSpecifiers SemiColon ;
/// ```
///
/// One or more statements of the form `Lhs -> alt1 | alt2 | ... ;`, where
/// each alternative is a whitespace-separated list of symbol names (an empty
/// alternative denotes the empty production). The first statement's `Lhs`
/// becomes the start symbol.
pub fn parse_text(source: &str) -> Result<GrammarSpec> {
    let mut spec = GrammarSpec::new();

    for raw_statement in source.split(';') {
        let statement = raw_statement.trim();
        if statement.is_empty() {
            continue;
        }

        let parts: Vec<&str> = statement.splitn(2, "->").collect();
        if parts.len() != 2 {
            return Err(GrammarError::InvalidProduction(statement.to_string()));
        }

        let lhs = parts[0].trim();
        if lhs.is_empty() || lhs.split_whitespace().count() != 1 {
            return Err(GrammarError::InvalidProduction(format!(
                "left-hand side must be a single symbol name: '{}'",
                statement
            )));
        }

        let mut alternatives = Vec::new();
        for alt in parts[1].split('|') {
            let symbols: Vec<String> = alt.split_whitespace().map(str::to_string).collect();
            alternatives.push(symbols);
        }

        spec.push(lhs, alternatives);
    }

    if spec.rules.is_empty() {
        return Err(GrammarError::EmptyInput);
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_terminals_and_nonterminals() {
        let spec = parse_text("S -> A B ; A -> a ; B -> b ;").unwrap();
        let grammar = Grammar::from_spec(spec).unwrap();
        assert_eq!(grammar.num_productions(), 3);
        assert_eq!(grammar.symtab().num_nonterminals(), 3);
        // terminals: $ (reserved) + a + b
        assert_eq!(grammar.symtab().num_terminals(), 3);
    }

    #[test]
    fn start_symbol_is_first_declared() {
        let spec = parse_text("S -> A ; A -> a ;").unwrap();
        let grammar = Grammar::from_spec(spec).unwrap();
        assert_eq!(grammar.symtab().nonterminal_name(grammar.start()), "S");
    }

    #[test]
    fn empty_alternative_is_epsilon_production() {
        let spec = parse_text("S -> a S | ;").unwrap();
        let grammar = Grammar::from_spec(spec).unwrap();
        assert!(grammar
            .productions_of(grammar.start())
            .iter()
            .any(|id| grammar.production(*id).rhs.is_empty()));
    }

    #[test]
    fn augment_adds_fresh_start_once() {
        let spec = parse_text("S -> a ;").unwrap();
        let mut grammar = Grammar::from_spec(spec).unwrap();
        grammar.augment().unwrap();
        assert!(grammar.is_augmented());
        assert!(matches!(grammar.augment(), Err(GrammarError::AlreadyAugmented)));
    }

    #[test]
    fn rejects_duplicate_productions() {
        let spec = parse_text("S -> a a | a a ;").unwrap();
        assert!(Grammar::from_spec(spec).is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse_text(""), Err(GrammarError::EmptyInput)));
    }
}
