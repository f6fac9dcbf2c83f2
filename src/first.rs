//! FIRST-set engine.
//!
//! FIRST sets are stored as bitsets over the terminal namespace (terminal
//! index 0 is always `$`) plus one reserved trailing bit for ε, so that
//! closure's repeated set unions are machine-word operations instead of
//! string-keyed hash-set merges. Lookahead sets carried on items never need
//! a *separate* slot for `$`: because `$` already occupies terminal index 0,
//! "terminals ∪ {EOF}" and "terminals" coincide in this representation.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use fixedbitset::FixedBitSet;

/// FIRST(N) for every nonterminal N, as bitsets over terminals ∪ {ε}.
#[derive(Debug, Clone)]
pub struct FirstTable {
    sets: Vec<FixedBitSet>,
    num_terminals: usize,
}

impl FirstTable {
    /// The bit index reserved for ε within a FIRST bitset.
    #[inline]
    pub fn epsilon_bit(&self) -> usize {
        self.num_terminals
    }

    /// Width of a FIRST bitset (terminals + the ε bit).
    #[inline]
    pub fn width(&self) -> usize {
        self.num_terminals + 1
    }

    /// FIRST(sym) as a bitset of width [`FirstTable::width`].
    pub fn first_of_symbol(&self, sym: Symbol) -> FixedBitSet {
        match sym {
            Symbol::Terminal(t) => {
                let mut bs = FixedBitSet::with_capacity(self.width());
                bs.insert(t.as_usize());
                bs
            }
            Symbol::NonTerminal(n) => self.sets[n.as_usize()].clone(),
        }
    }

    /// FIRST(α) for an arbitrary symbol sequence: union in FIRST(X₁)\{ε};
    /// if ε ∈ FIRST(X₁) continue to X₂; if every Xᵢ is nullable, ε is in the
    /// result (an empty sequence derives only ε, so it returns {ε}).
    pub fn first_of_string(&self, symbols: &[Symbol]) -> FixedBitSet {
        let mut result = FixedBitSet::with_capacity(self.width());
        let mut nullable_so_far = true;

        for sym in symbols {
            if !nullable_so_far {
                break;
            }
            let f = self.first_of_symbol(*sym);
            for bit in f.ones() {
                if bit != self.epsilon_bit() {
                    result.insert(bit);
                }
            }
            nullable_so_far = f.contains(self.epsilon_bit());
        }

        if nullable_so_far {
            result.insert(self.epsilon_bit());
        }
        result
    }

    /// The quantity the item closure step actually needs:
    /// `FIRST(β)\{ε} ∪ (lookahead if β is nullable)`, as a bitset over
    /// terminals only (width = `num_terminals`, no ε bit — lookahead sets
    /// never carry ε).
    pub fn closure_lookahead(&self, beta: &[Symbol], lookahead: &FixedBitSet) -> FixedBitSet {
        let first_beta = self.first_of_string(beta);
        let mut result = FixedBitSet::with_capacity(self.num_terminals);
        for bit in first_beta.ones() {
            if bit != self.epsilon_bit() {
                result.insert(bit);
            }
        }
        if first_beta.contains(self.epsilon_bit()) {
            result.union_with(lookahead);
        }
        result
    }
}

/// Computes FIRST(N) for every nonterminal N by fixpoint iteration over the
/// grammar's productions.
pub fn compute_first_sets(grammar: &Grammar) -> FirstTable {
    let num_terminals = grammar.symtab().num_terminals();
    let width = num_terminals + 1;

    let mut table = FirstTable {
        sets: vec![FixedBitSet::with_capacity(width); grammar.symtab().num_nonterminals()],
        num_terminals,
    };

    let mut changed = true;
    while changed {
        changed = false;
        for id in grammar.all_production_ids() {
            let production = grammar.production(id);
            let rhs_first = table.first_of_string(&production.rhs);

            let lhs_idx = production.lhs.as_usize();
            let before = table.sets[lhs_idx].count_ones(..);
            table.sets[lhs_idx].union_with(&rhs_first);
            let after = table.sets[lhs_idx].count_ones(..);

            if after != before {
                changed = true;
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{parse_text, Grammar};

    #[test]
    fn first_of_terminal_is_itself() {
        let spec = parse_text("S -> a S | ;").unwrap();
        let grammar = Grammar::from_spec(spec).unwrap();
        let first = compute_first_sets(&grammar);
        let start_first = first.first_of_symbol(Symbol::NonTerminal(grammar.start()));
        // S derives 'a' or ε.
        assert!(start_first.contains(first.epsilon_bit()));
        let a = grammar.symtab().find_terminal("a").unwrap();
        assert!(start_first.contains(a.as_usize()));
    }

    #[test]
    fn nullable_chain_propagates() {
        // S -> A B ; A -> ; B -> b ;  FIRST(S) should contain 'b'.
        let spec = parse_text("S -> A B ; A -> ; B -> b ;").unwrap();
        let grammar = Grammar::from_spec(spec).unwrap();
        let first = compute_first_sets(&grammar);
        let start_first = first.first_of_symbol(Symbol::NonTerminal(grammar.start()));
        let b = grammar.symtab().find_terminal("b").unwrap();
        assert!(start_first.contains(b.as_usize()));
        assert!(!start_first.contains(first.epsilon_bit()));
    }
}
