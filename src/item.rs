//! LR(1) items and item-sets.
//!
//! An item is a dotted production plus a lookahead *set* (stored as a
//! bitset) rather than the textbook single-terminal lookahead — this is
//! the standard compact representation and is
//! equivalent to the cross-product of core × lookahead terminal. Merging
//! identical cores within one item-set's closure is ordinary set semantics
//! and happens the same way in both canonical-LR(1) and LALR(1) builds;
//! the two modes differ only in whether whole *states* with matching cores
//! get merged (see [`crate::automaton`]).

use crate::first::FirstTable;
use crate::grammar::{Grammar, ProductionId};
use crate::symbol::Symbol;
use fixedbitset::FixedBitSet;
use std::collections::BTreeMap;

/// Index of a state in the automaton. The state-id is the index into the
/// automaton's state vector; state 0 is always the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A dotted production with a lookahead set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub production: ProductionId,
    pub dot: u16,
    pub lookahead: FixedBitSet,
}

impl Item {
    pub fn new(production: ProductionId, dot: u16, lookahead: FixedBitSet) -> Self {
        Self {
            production,
            dot,
            lookahead,
        }
    }

    /// The symbol immediately to the right of the dot, if any.
    pub fn symbol_after_dot(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar
            .production(self.production)
            .rhs
            .get(self.dot as usize)
            .copied()
    }

    /// Whether the dot has reached the end of the production (a reduce
    /// item).
    pub fn is_reduce_item(&self, grammar: &Grammar) -> bool {
        self.dot as usize >= grammar.production(self.production).rhs.len()
    }

    /// The core `(production, dot)`, ignoring lookahead — two items with the
    /// same core are "the same configuration" for LALR merging purposes.
    #[inline]
    pub fn core(&self) -> (ProductionId, u16) {
        (self.production, self.dot)
    }

    /// Renders `lhs -> α · β` for diagnostics, used by the conflict arbiter
    /// to name colliding items.
    pub fn display(&self, grammar: &Grammar) -> String {
        let prod = grammar.production(self.production);
        let symtab = grammar.symtab();
        let mut rhs_with_dot = Vec::with_capacity(prod.rhs.len() + 1);
        for (i, sym) in prod.rhs.iter().enumerate() {
            if i == self.dot as usize {
                rhs_with_dot.push("\u{b7}".to_string());
            }
            rhs_with_dot.push(symtab.symbol_name(*sym).to_string());
        }
        if self.dot as usize == prod.rhs.len() {
            rhs_with_dot.push("\u{b7}".to_string());
        }
        format!(
            "{} -> {}",
            symtab.nonterminal_name(prod.lhs),
            rhs_with_dot.join(" ")
        )
    }
}

/// A closed set of items, plus the transitions discovered for it once it
/// becomes a state in the automaton. Items are kept in a canonical sorted
/// order so that two item-sets with the same content compare equal via
/// plain `Vec` equality.
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    pub items: Vec<Item>,
    pub transitions: BTreeMap<Symbol, StateId>,
}

impl ItemSet {
    /// The set of cores present, independent of lookahead — used to decide
    /// LALR state merges.
    pub fn cores(&self) -> Vec<(ProductionId, u16)> {
        let mut cores: Vec<_> = self.items.iter().map(Item::core).collect();
        cores.sort_unstable();
        cores
    }
}

/// Computes the closure of a seed set of items.
///
/// For every item `A -> α · B β, L` where `B` is a nonterminal, and for
/// every production `B -> γ`, adds `B -> · γ, FIRST(β L)`. Items sharing a
/// core accumulate (union) their lookahead sets. Iterates to a fixpoint:
/// both new items and lookahead growth on existing items can require
/// further passes.
pub fn closure(grammar: &Grammar, first_table: &FirstTable, seed: Vec<Item>) -> ItemSet {
    let mut items = seed;

    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < items.len() {
            let expansion = match items[i].symbol_after_dot(grammar) {
                Some(Symbol::NonTerminal(b)) => {
                    let prod = grammar.production(items[i].production);
                    let beta = prod.rhs[items[i].dot as usize + 1..].to_vec();
                    let new_lookahead = first_table.closure_lookahead(&beta, &items[i].lookahead);
                    Some((b, new_lookahead))
                }
                _ => None,
            };

            if let Some((b, new_lookahead)) = expansion {
                for &pid in grammar.productions_of(b) {
                    match items.iter().position(|it| it.production == pid && it.dot == 0) {
                        Some(existing_idx) => {
                            let before = items[existing_idx].lookahead.count_ones(..);
                            items[existing_idx].lookahead.union_with(&new_lookahead);
                            if items[existing_idx].lookahead.count_ones(..) != before {
                                changed = true;
                            }
                        }
                        None => {
                            items.push(Item::new(pid, 0, new_lookahead.clone()));
                            changed = true;
                        }
                    }
                }
            }

            i += 1;
        }
    }

    items.sort_by(|a, b| a.production.cmp(&b.production).then(a.dot.cmp(&b.dot)));
    ItemSet {
        items,
        transitions: BTreeMap::new(),
    }
}

/// `goto(I, X)`: the closure of every item in `I` advanced over `X`. Returns
/// `None` if no item in `I` has `X` immediately after its dot, so callers
/// can skip adding a transition instead of recording one to an empty state.
pub fn goto(
    grammar: &Grammar,
    first_table: &FirstTable,
    set: &ItemSet,
    x: Symbol,
) -> Option<ItemSet> {
    let mut advanced = Vec::new();
    for item in &set.items {
        if item.symbol_after_dot(grammar) == Some(x) {
            advanced.push(Item::new(item.production, item.dot + 1, item.lookahead.clone()));
        }
    }
    if advanced.is_empty() {
        return None;
    }
    Some(closure(grammar, first_table, advanced))
}
