//! Table persistence: a self-describing on-disk form for built ACTION/GOTO
//! tables, so the `lalr-parse` binary can drive a parse without re-running
//! grammar construction.
//!
//! The persisted file embeds the original grammar *text*, not just its
//! digest: a table file is meant to be handed to `lalr-parse` on its own
//! (its CLI signature takes no grammar file), so the grammar has to be
//! reconstructable from the table file alone. The digest then catches the
//! case that matters in practice — a table file whose `action`/`goto`
//! payload was built from different grammar text than the copy it now
//! carries (e.g. hand-edited, or produced by a stale `build` run).

use crate::automaton::BuildMode;
use crate::error::{GrammarError, Result};
use crate::grammar::{parse_text, Grammar};
use crate::item::StateId;
use crate::symbol::{NTIdx, TIdx};
use crate::tables::{Action, Tables};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Bumped whenever the on-disk shape changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistedMode {
    CanonicalLr1,
    Lalr1,
}

impl From<BuildMode> for PersistedMode {
    fn from(mode: BuildMode) -> Self {
        match mode {
            BuildMode::CanonicalLr1 => PersistedMode::CanonicalLr1,
            BuildMode::Lalr1 => PersistedMode::Lalr1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistedAction {
    Shift(u32),
    Reduce(u32),
    Accept,
}

impl From<Action> for PersistedAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Shift(s) => PersistedAction::Shift(s.0),
            Action::Reduce(p) => PersistedAction::Reduce(p.0),
            Action::Accept => PersistedAction::Accept,
        }
    }
}

impl From<PersistedAction> for Action {
    fn from(action: PersistedAction) -> Self {
        match action {
            PersistedAction::Shift(s) => Action::Shift(StateId(s)),
            PersistedAction::Reduce(p) => Action::Reduce(crate::grammar::ProductionId(p)),
            PersistedAction::Accept => Action::Accept,
        }
    }
}

/// The on-disk table format: the flattened ACTION/GOTO relation plus enough
/// grammar context to reconstruct a matching [`Grammar`] and verify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTables {
    pub format_version: u32,
    pub grammar_digest: u64,
    pub grammar_text: String,
    pub mode: PersistedMode,
    pub start_state: u32,
    pub num_states: u32,
    pub strict_conflicts: bool,
    pub action: Vec<((u32, u32), PersistedAction)>,
    pub goto: Vec<((u32, u32), u32)>,
}

/// Flattens `tables` into its persisted form, embedding `grammar_text` (the
/// source the `build` binary loaded) so `lalr-parse` can reconstruct the
/// grammar on its own.
pub fn to_persisted(
    grammar: &Grammar,
    grammar_text: &str,
    tables: &Tables,
    strict_conflicts: bool,
) -> PersistedTables {
    let action = tables
        .iter_actions()
        .map(|(s, t, a)| ((s.0, t.0), PersistedAction::from(a)))
        .collect();
    let goto = tables
        .iter_gotos()
        .map(|(s, nt, target)| ((s.0, nt.0), target.0))
        .collect();

    PersistedTables {
        format_version: FORMAT_VERSION,
        grammar_digest: grammar.digest(),
        grammar_text: grammar_text.to_string(),
        mode: tables.mode().into(),
        start_state: tables.start_state().0,
        num_states: tables.num_states() as u32,
        strict_conflicts,
        action,
        goto,
    }
}

pub fn save(path: impl AsRef<Path>, persisted: &PersistedTables) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), persisted)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<PersistedTables> {
    let file = File::open(path)?;
    let persisted: PersistedTables = serde_json::from_reader(file)?;
    Ok(persisted)
}

impl PersistedTables {
    /// Reconstructs the `Grammar` and `Tables` this file describes,
    /// verifying the format version and grammar digest along the way.
    pub fn rebuild(&self) -> Result<(Grammar, Tables)> {
        if self.format_version != FORMAT_VERSION {
            return Err(GrammarError::FormatVersionMismatch {
                expected: FORMAT_VERSION,
                found: self.format_version,
            });
        }

        let spec = parse_text(&self.grammar_text)?;
        let mut grammar = Grammar::from_spec(spec)?;
        grammar.augment()?;

        let found_digest = grammar.digest();
        if found_digest != self.grammar_digest {
            return Err(GrammarError::TableMismatch {
                expected: self.grammar_digest,
                found: found_digest,
            });
        }

        let mut action_rows: Vec<std::collections::BTreeMap<TIdx, Action>> =
            vec![std::collections::BTreeMap::new(); self.num_states as usize];
        for ((state, terminal), action) in &self.action {
            action_rows[*state as usize].insert(TIdx(*terminal), Action::from(*action));
        }

        let mut goto_rows: Vec<std::collections::BTreeMap<NTIdx, StateId>> =
            vec![std::collections::BTreeMap::new(); self.num_states as usize];
        for ((state, nonterminal), target) in &self.goto {
            goto_rows[*state as usize].insert(NTIdx(*nonterminal), StateId(*target));
        }

        let mode = match self.mode {
            PersistedMode::CanonicalLr1 => BuildMode::CanonicalLr1,
            PersistedMode::Lalr1 => BuildMode::Lalr1,
        };
        let tables = Tables::from_raw(action_rows, goto_rows, StateId(self.start_state), mode);

        Ok((grammar, tables))
    }
}
