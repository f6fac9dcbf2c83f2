//! Automaton builder: the canonical LR(1) collection and its LALR(1)
//! core-merged variant.

use crate::error::{GrammarError, Result};
use crate::first::FirstTable;
use crate::grammar::Grammar;
use crate::item::{closure, goto, Item, ItemSet, StateId};
use crate::symbol::Symbol;
use fixedbitset::FixedBitSet;
use std::collections::{BTreeSet, VecDeque};

/// Selects which collection the builder constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Keep every state distinct by full item equality (core + lookahead).
    CanonicalLr1,
    /// Merge states that share the same item cores, unioning lookaheads.
    /// The default for the bundled C-subset grammar: fewer states than the
    /// canonical collection, at the cost of merged states occasionally
    /// admitting a reduce/reduce conflict the canonical build wouldn't have.
    Lalr1,
}

/// The finite collection of closed item-sets, with transitions recorded on
/// each state. State 0 is always the initial state.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<ItemSet>,
    mode: BuildMode,
}

impl Automaton {
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &ItemSet {
        &self.states[id.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }
}

/// Builds the canonical collection (or its LALR(1) merge) from an augmented
/// grammar.
///
/// The two modes share everything except how a freshly-computed `goto(s, X)`
/// is reconciled against already-discovered states:
///
/// - canonical LR(1): a state is reused only when its items match exactly
///   (core *and* lookahead);
/// - LALR(1): a state is reused whenever its *cores* match an existing
///   state's cores, and the existing state's lookaheads are unioned with
///   the new ones in place.
///
/// Because a union-in-place can grow a state's lookaheads after its
/// transitions were already computed, a state whose lookaheads grow is
/// re-queued so its outgoing `goto`s are recomputed with the larger
/// lookahead. Lookahead bitsets only grow and are bounded by the terminal
/// count, so re-queuing can only happen finitely often and the loop always
/// reaches a fixpoint where no state's lookaheads grow in a full pass.
pub fn build(grammar: &Grammar, first_table: &FirstTable, mode: BuildMode) -> Result<Automaton> {
    let Some(augmented_start) = grammar.augmented_start() else {
        return Err(GrammarError::InvalidFormat(
            "grammar must be augmented before building the automaton".to_string(),
        ));
    };
    let start_production = grammar.productions_of(augmented_start)[0];

    let mut eof_lookahead = FixedBitSet::with_capacity(grammar.symtab().num_terminals());
    eof_lookahead.insert(grammar.symtab().eof_terminal_index());

    let initial = closure(
        grammar,
        first_table,
        vec![Item::new(start_production, 0, eof_lookahead)],
    );

    let mut states: Vec<ItemSet> = vec![initial];
    let mut queue: VecDeque<StateId> = VecDeque::new();
    queue.push_back(StateId(0));

    while let Some(state_id) = queue.pop_front() {
        let mut symbols: BTreeSet<Symbol> = BTreeSet::new();
        for item in &states[state_id.as_usize()].items {
            if let Some(sym) = item.symbol_after_dot(grammar) {
                symbols.insert(sym);
            }
        }

        for x in symbols {
            let Some(target_set) = goto(grammar, first_table, &states[state_id.as_usize()], x)
            else {
                continue;
            };

            let target_id = match mode {
                BuildMode::CanonicalLr1 => {
                    match states.iter().position(|s| s.items == target_set.items) {
                        Some(existing) => StateId(existing as u32),
                        None => {
                            let id = StateId(states.len() as u32);
                            states.push(target_set);
                            queue.push_back(id);
                            id
                        }
                    }
                }
                BuildMode::Lalr1 => {
                    let target_cores = target_set.cores();
                    match states.iter().position(|s| s.cores() == target_cores) {
                        Some(existing) => {
                            let mut grew = false;
                            for new_item in &target_set.items {
                                if let Some(old_item) = states[existing]
                                    .items
                                    .iter_mut()
                                    .find(|it| it.core() == new_item.core())
                                {
                                    let before = old_item.lookahead.count_ones(..);
                                    old_item.lookahead.union_with(&new_item.lookahead);
                                    if old_item.lookahead.count_ones(..) != before {
                                        grew = true;
                                    }
                                }
                            }
                            if grew {
                                queue.push_back(StateId(existing as u32));
                            }
                            StateId(existing as u32)
                        }
                        None => {
                            let id = StateId(states.len() as u32);
                            states.push(target_set);
                            queue.push_back(id);
                            id
                        }
                    }
                }
            };

            states[state_id.as_usize()].transitions.insert(x, target_id);
        }
    }

    Ok(Automaton { states, mode })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::compute_first_sets;
    use crate::grammar::{parse_text, Grammar};

    fn build_for(src: &str, mode: BuildMode) -> (Grammar, Automaton) {
        let spec = parse_text(src).unwrap();
        let mut grammar = Grammar::from_spec(spec).unwrap();
        grammar.augment().unwrap();
        let first = compute_first_sets(&grammar);
        let automaton = build(&grammar, &first, mode).unwrap();
        (grammar, automaton)
    }

    #[test]
    fn arithmetic_grammar_builds_without_blowing_up() {
        // E -> E plus T | T ; T -> T star F | F ; F -> lparen E rparen | id ;
        let src = "E -> E plus T | T ; T -> T star F | F ; F -> lparen E rparen | id ;";
        let (_grammar, automaton) = build_for(src, BuildMode::Lalr1);
        assert!(automaton.len() > 1);
    }

    #[test]
    fn lalr_never_has_two_states_with_the_same_core() {
        let src = "E -> E plus T | T ; T -> T star F | F ; F -> lparen E rparen | id ;";
        let (_grammar, automaton) = build_for(src, BuildMode::Lalr1);
        let mut seen = std::collections::HashSet::new();
        for state in automaton.states() {
            assert!(seen.insert(state.cores()), "duplicate core set across LALR states");
        }
    }

    #[test]
    fn canonical_lr1_can_have_more_states_than_lalr() {
        let src = "E -> E plus T | T ; T -> T star F | F ; F -> lparen E rparen | id ;";
        let (_grammar, canonical) = build_for(src, BuildMode::CanonicalLr1);
        let (_grammar2, lalr) = build_for(src, BuildMode::Lalr1);
        assert!(canonical.len() >= lalr.len());
    }
}
