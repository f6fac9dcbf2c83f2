//! Table assembler: turns an automaton into ACTION/GOTO tables, resolving
//! shift/reduce and reduce/reduce collisions through the [`ConflictArbiter`].

use crate::arbiter::ConflictArbiter;
use crate::automaton::{Automaton, BuildMode};
use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, ProductionId};
use crate::item::{Item, StateId};
use crate::symbol::{NTIdx, Symbol, TIdx};
use std::collections::BTreeMap;

/// One entry of the ACTION table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

/// The assembled ACTION/GOTO tables plus enough bookkeeping to drive a
/// parse and to persist the result.
#[derive(Debug, Clone)]
pub struct Tables {
    action: Vec<BTreeMap<TIdx, Action>>,
    goto: Vec<BTreeMap<NTIdx, StateId>>,
    start_state: StateId,
    mode: BuildMode,
}

impl Tables {
    pub fn action(&self, state: StateId, terminal: TIdx) -> Option<Action> {
        self.action[state.as_usize()].get(&terminal).copied()
    }

    pub fn goto(&self, state: StateId, nonterminal: NTIdx) -> Option<StateId> {
        self.goto[state.as_usize()].get(&nonterminal).copied()
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn num_states(&self) -> usize {
        self.action.len()
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Every `(state, terminal) -> action` entry, in state then terminal
    /// order. Used by [`crate::persist`] to flatten the tables for
    /// serialization.
    pub fn iter_actions(&self) -> impl Iterator<Item = (StateId, TIdx, Action)> + '_ {
        self.action.iter().enumerate().flat_map(|(s, row)| {
            row.iter()
                .map(move |(t, a)| (StateId(s as u32), *t, *a))
        })
    }

    /// Every `(state, nonterminal) -> state` GOTO entry, in state then
    /// nonterminal order.
    pub fn iter_gotos(&self) -> impl Iterator<Item = (StateId, NTIdx, StateId)> + '_ {
        self.goto.iter().enumerate().flat_map(|(s, row)| {
            row.iter()
                .map(move |(nt, target)| (StateId(s as u32), *nt, *target))
        })
    }

    pub(crate) fn from_raw(
        action: Vec<BTreeMap<TIdx, Action>>,
        goto: Vec<BTreeMap<NTIdx, StateId>>,
        start_state: StateId,
        mode: BuildMode,
    ) -> Self {
        Self {
            action,
            goto,
            start_state,
            mode,
        }
    }
}

/// One proposal for an ACTION cell, carrying the item it came from so the
/// arbiter can pattern-match it and so an unresolved collision can name both
/// sides in its error.
struct Proposal<'g> {
    item: &'g Item,
    action: Action,
}

/// Assembles ACTION/GOTO tables from a built automaton.
///
/// Every outgoing terminal transition proposes a `Shift`; every reduce item
/// proposes a `Reduce` at each terminal in its lookahead set (or `Accept`,
/// for the augmented start production on `$`). Proposals landing on the
/// same cell are folded pairwise, in item order, through
/// [`ConflictArbiter::compare`]: the dominant item's action wins. A tie
/// (arbiter returns 0) keeps the later proposal ("the newcomer") unless
/// `arbiter.strict_conflicts` is set, in which case it is a hard error.
pub fn build_tables<'g>(
    grammar: &'g Grammar,
    automaton: &'g Automaton,
    arbiter: &ConflictArbiter,
) -> Result<Tables> {
    let augmented_start = grammar
        .augmented_start()
        .expect("automaton is only built from an augmented grammar");
    let accept_production = grammar.productions_of(augmented_start)[0];
    let eof = TIdx(grammar.symtab().eof_terminal_index() as u32);

    let mut action: Vec<BTreeMap<TIdx, Action>> = Vec::with_capacity(automaton.len());
    let mut goto: Vec<BTreeMap<NTIdx, StateId>> = Vec::with_capacity(automaton.len());

    for (state_idx, state) in automaton.states().iter().enumerate() {
        let state_id = StateId(state_idx as u32);
        let mut cells: BTreeMap<TIdx, Proposal> = BTreeMap::new();
        let mut goto_row: BTreeMap<NTIdx, StateId> = BTreeMap::new();

        for (sym, target) in &state.transitions {
            if let Symbol::NonTerminal(nt) = sym {
                goto_row.insert(*nt, *target);
            }
        }

        for item in &state.items {
            match item.symbol_after_dot(grammar) {
                Some(Symbol::Terminal(t)) => {
                    let target = state.transitions[&Symbol::Terminal(t)];
                    propose(grammar, arbiter, state_id, &mut cells, t, item, Action::Shift(target))?;
                }
                Some(Symbol::NonTerminal(_)) => {}
                None => {
                    if item.production == accept_production {
                        propose(grammar, arbiter, state_id, &mut cells, eof, item, Action::Accept)?;
                    } else {
                        for bit in item.lookahead.ones() {
                            let t = TIdx(bit as u32);
                            propose(
                                grammar,
                                arbiter,
                                state_id,
                                &mut cells,
                                t,
                                item,
                                Action::Reduce(item.production),
                            )?;
                        }
                    }
                }
            }
        }

        action.push(cells.into_iter().map(|(t, p)| (t, p.action)).collect());
        goto.push(goto_row);
    }

    Ok(Tables::from_raw(action, goto, StateId(0), automaton.mode()))
}

fn propose<'g>(
    grammar: &'g Grammar,
    arbiter: &ConflictArbiter,
    state_id: StateId,
    cells: &mut BTreeMap<TIdx, Proposal<'g>>,
    terminal: TIdx,
    item: &'g Item,
    action: Action,
) -> Result<()> {
    match cells.get(&terminal) {
        None => {
            cells.insert(terminal, Proposal { item, action });
        }
        Some(existing) => {
            if existing.action == action {
                return Ok(());
            }
            match arbiter.compare(grammar, existing.item, item) {
                -1 => {}
                1 => {
                    cells.insert(terminal, Proposal { item, action });
                }
                _ => {
                    if arbiter.strict_conflicts {
                        return Err(GrammarError::UnresolvableConflict {
                            state: state_id.as_usize(),
                            symbol: grammar.symtab().terminal_name(terminal).to_string(),
                            item_a: existing.item.display(grammar),
                            item_b: item.display(grammar),
                        });
                    }
                    cells.insert(terminal, Proposal { item, action });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{build, BuildMode};
    use crate::first::compute_first_sets;
    use crate::grammar::parse_text;

    fn build_tables_for(src: &str, strict: bool) -> Result<(Grammar, Tables)> {
        let spec = parse_text(src).unwrap();
        let mut grammar = Grammar::from_spec(spec).unwrap();
        grammar.augment().unwrap();
        let first = compute_first_sets(&grammar);
        let automaton = build(&grammar, &first, BuildMode::Lalr1).unwrap();
        let arbiter = ConflictArbiter::new(strict);
        let tables = build_tables(&grammar, &automaton, &arbiter)?;
        Ok((grammar, tables))
    }

    #[test]
    fn arithmetic_grammar_has_no_conflicts_even_when_strict() {
        let src = "E -> E plus T | T ; T -> T star F | F ; F -> lparen E rparen | id ;";
        let result = build_tables_for(src, true);
        assert!(result.is_ok());
    }

    #[test]
    fn accept_is_proposed_on_eof_at_the_start_states_reduce() {
        let (grammar, tables) = build_tables_for("S -> a ;", false).unwrap();
        let eof = TIdx(grammar.symtab().eof_terminal_index() as u32);
        // Drive: shift 'a', then Accept must appear somewhere in the table.
        let a = grammar.symtab().find_terminal("a").unwrap();
        let shift = tables.action(tables.start_state(), a).unwrap();
        let Action::Shift(next) = shift else {
            panic!("expected shift on 'a'");
        };
        assert_eq!(tables.action(next, eof), Some(Action::Accept));
    }

    #[test]
    fn dangling_else_resolves_to_shift_under_the_c_subset_chain() {
        let src = "IfStatement -> If LeftParen Expression RightParen Statement \
                       | If LeftParen Expression RightParen Statement Else Statement ; \
                   Statement -> IfStatement | Other ; \
                   Expression -> Id ;";
        let spec = parse_text(src).unwrap();
        let mut grammar = Grammar::from_spec(spec).unwrap();
        grammar.augment().unwrap();
        let first = compute_first_sets(&grammar);
        let automaton = build(&grammar, &first, BuildMode::Lalr1).unwrap();
        let mut arbiter = ConflictArbiter::new(true);
        arbiter.add_chain(crate::arbiter::c_subset::dangling_else_chain());
        let tables = build_tables(&grammar, &automaton, &arbiter);
        assert!(tables.is_ok(), "dangling-else chain must resolve the conflict");
    }
}
