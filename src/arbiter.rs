//! Conflict arbiter.
//!
//! The arbiter is configured with an ordered list of declarative
//! **precedence chains**. A chain is a sequence of dotted-item *patterns*;
//! earlier entries dominate later ones. This is data, not a branch of
//! virtual dispatch — adding a new chain is pushing a `Vec` entry, never a
//! recompile of the table assembler.

use crate::grammar::Grammar;
use crate::item::Item;

/// One token of a dotted-item pattern: either the dot marker or a named
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSymbol {
    Dot,
    Name(String),
}

/// A single dotted-production shape: `lhs -> rhs-with-one-dot`.
#[derive(Debug, Clone)]
pub struct ItemPattern {
    lhs: String,
    rhs_with_dot: Vec<PatternSymbol>,
}

impl ItemPattern {
    /// Builds a pattern from a nonterminal name and its rhs tokens, with a
    /// literal `"."` standing in for the dot, e.g.
    /// `ItemPattern::new("TypedefName", &[".", "Identifier"])`.
    pub fn new(lhs: &str, tokens: &[&str]) -> Self {
        let rhs_with_dot = tokens
            .iter()
            .map(|t| {
                if *t == "." {
                    PatternSymbol::Dot
                } else {
                    PatternSymbol::Name((*t).to_string())
                }
            })
            .collect();
        Self {
            lhs: lhs.to_string(),
            rhs_with_dot,
        }
    }

    /// Whether `item` has this exact lhs and rhs-with-dot shape.
    fn matches(&self, grammar: &Grammar, item: &Item) -> bool {
        let production = grammar.production(item.production);
        if grammar.symtab().nonterminal_name(production.lhs) != self.lhs {
            return false;
        }

        let mut actual = Vec::with_capacity(production.rhs.len() + 1);
        for (i, sym) in production.rhs.iter().enumerate() {
            if i == item.dot as usize {
                actual.push(PatternSymbol::Dot);
            }
            actual.push(PatternSymbol::Name(
                grammar.symtab().symbol_name(*sym).to_string(),
            ));
        }
        if item.dot as usize == production.rhs.len() {
            actual.push(PatternSymbol::Dot);
        }

        actual == self.rhs_with_dot
    }
}

/// An ordered sequence of patterns; earlier entries dominate later ones.
pub type Chain = Vec<ItemPattern>;

/// Declarative, precedence-driven shift/reduce and reduce/reduce resolver.
#[derive(Debug, Clone, Default)]
pub struct ConflictArbiter {
    chains: Vec<Chain>,
    /// When set, an incomparable collision is a fatal `UnresolvableConflict`
    /// instead of the default "newcomer wins" tie-break.
    pub strict_conflicts: bool,
}

impl ConflictArbiter {
    pub fn new(strict_conflicts: bool) -> Self {
        Self {
            chains: Vec::new(),
            strict_conflicts,
        }
    }

    pub fn add_chain(&mut self, chain: Chain) -> &mut Self {
        self.chains.push(chain);
        self
    }

    /// `-1` if `a` dominates `b`, `1` if `b` dominates `a`, `0` if no chain
    /// matches both with differing precedence (incomparable).
    pub fn compare(&self, grammar: &Grammar, a: &Item, b: &Item) -> i8 {
        for chain in &self.chains {
            let pos_a = chain.iter().position(|p| p.matches(grammar, a));
            let pos_b = chain.iter().position(|p| p.matches(grammar, b));
            if let (Some(ia), Some(ib)) = (pos_a, pos_b) {
                if ia < ib {
                    return -1;
                }
                if ib < ia {
                    return 1;
                }
            }
        }
        0
    }
}

/// The hard-coded chain groups the bundled C-subset grammar needs. These are
/// expressed purely as data over symbol *names*; they only take effect for
/// a grammar that actually declares nonterminals with these names
/// (`DeclarationSpecifiers`, `SpecifierQualifierList`, `TypedefName`,
/// `PrimaryExpression`, `IfStatement`).
pub mod c_subset {
    use super::{Chain, ItemPattern};

    /// Prefer extending the declaration-specifier sequence (shift a further
    /// type-specifier) over reducing `Identifier` to a typedef-name.
    pub fn declaration_specifiers_chain() -> Chain {
        vec![
            ItemPattern::new("TypedefName", &[".", "Identifier"]),
            ItemPattern::new("DeclarationSpecifiers", &["Const", "."]),
        ]
    }

    /// The symmetric chain for struct/union specifier-qualifier lists.
    pub fn specifier_qualifier_list_chain() -> Chain {
        vec![
            ItemPattern::new("TypedefName", &[".", "Identifier"]),
            ItemPattern::new("SpecifierQualifierList", &["Const", "."]),
        ]
    }

    /// Prefer `PrimaryExpression` over `TypedefName` on a bare
    /// `Identifier ·` reduce/reduce: without a symbol table, a lone
    /// identifier is assumed to be an expression, not a type name.
    pub fn typedef_vs_primary_expression_chain() -> Chain {
        vec![
            ItemPattern::new("PrimaryExpression", &["Identifier", "."]),
            ItemPattern::new("TypedefName", &["Identifier", "."]),
        ]
    }

    /// Dangling else: prefer shifting `else` (binding it to the nearest
    /// `if`) over reducing the shorter `if` without an else-branch.
    pub fn dangling_else_chain() -> Chain {
        vec![
            ItemPattern::new(
                "IfStatement",
                &[
                    "If",
                    "LeftParen",
                    "Expression",
                    "RightParen",
                    "Statement",
                    ".",
                    "Else",
                    "Statement",
                ],
            ),
            ItemPattern::new(
                "IfStatement",
                &["If", "LeftParen", "Expression", "RightParen", "Statement", "."],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::compute_first_sets;
    use crate::grammar::{parse_text, Grammar};
    use crate::item::Item;
    use fixedbitset::FixedBitSet;

    #[test]
    fn dominant_pattern_wins_regardless_of_argument_order() {
        let spec = parse_text(
            "S -> DeclarationSpecifiers Identifier ; \
             DeclarationSpecifiers -> Const DeclarationSpecifiers | Const | TypedefName ; \
             TypedefName -> Identifier ;",
        )
        .unwrap();
        let mut grammar = Grammar::from_spec(spec).unwrap();
        grammar.augment().unwrap();
        let first = compute_first_sets(&grammar);

        let ds_const_prod = grammar
            .all_production_ids()
            .find(|id| {
                let p = grammar.production(*id);
                grammar.symtab().nonterminal_name(p.lhs) == "DeclarationSpecifiers"
                    && p.rhs.len() == 1
            })
            .unwrap();
        let tn_prod = grammar
            .all_production_ids()
            .find(|id| {
                grammar.symtab().nonterminal_name(grammar.production(*id).lhs) == "TypedefName"
            })
            .unwrap();

        let la = FixedBitSet::with_capacity(grammar.symtab().num_terminals());
        let reduce_item = Item::new(ds_const_prod, 1, la.clone());
        let shift_item = Item::new(tn_prod, 0, la);

        let mut arbiter = ConflictArbiter::new(false);
        arbiter.add_chain(c_subset::declaration_specifiers_chain());

        assert_eq!(arbiter.compare(&grammar, &shift_item, &reduce_item), -1);
        assert_eq!(arbiter.compare(&grammar, &reduce_item, &shift_item), 1);
    }

    #[test]
    fn incomparable_items_return_zero() {
        let spec = parse_text("S -> a | b ;").unwrap();
        let mut grammar = Grammar::from_spec(spec).unwrap();
        grammar.augment().unwrap();
        let la = FixedBitSet::with_capacity(grammar.symtab().num_terminals());
        let ids: Vec<_> = grammar.all_production_ids().collect();
        let item_a = Item::new(ids[0], 1, la.clone());
        let item_b = Item::new(ids[1], 1, la);
        let arbiter = ConflictArbiter::new(false);
        assert_eq!(arbiter.compare(&grammar, &item_a, &item_b), 0);
    }
}
