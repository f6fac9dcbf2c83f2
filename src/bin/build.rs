//! `lalr-build`: loads a grammar from the text format (§4.9), builds the
//! automaton and tables, and persists them for `lalr-parse`.
//!
//! Usage: `lalr-build <grammar-file> <tables-file> [--lalr|--lr1] [--strict]`

use lalr_core::{self as lib, BuildMode};
use std::env;
use std::fs;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> lib::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: lalr-build <grammar-file> <tables-file> [--lalr|--lr1] [--strict]");
        process::exit(2);
    }

    let grammar_path = &args[1];
    let tables_path = &args[2];
    let mut mode = BuildMode::Lalr1;
    let mut strict = false;
    for flag in &args[3..] {
        match flag.as_str() {
            "--lalr" => mode = BuildMode::Lalr1,
            "--lr1" => mode = BuildMode::CanonicalLr1,
            "--strict" => strict = true,
            other => {
                eprintln!("unrecognized flag: {other}");
                process::exit(2);
            }
        }
    }

    let grammar_text = fs::read_to_string(grammar_path)?;
    let spec = lib::parse_text(&grammar_text)?;
    let mut grammar = lib::Grammar::from_spec(spec)?;
    grammar.augment()?;

    let first = lib::compute_first_sets(&grammar);
    let automaton = lib::build_automaton(&grammar, &first, mode)?;

    let mut arbiter = lib::ConflictArbiter::new(strict);
    arbiter.add_chain(lalr_core::arbiter::c_subset::declaration_specifiers_chain());
    arbiter.add_chain(lalr_core::arbiter::c_subset::specifier_qualifier_list_chain());
    arbiter.add_chain(lalr_core::arbiter::c_subset::typedef_vs_primary_expression_chain());
    arbiter.add_chain(lalr_core::arbiter::c_subset::dangling_else_chain());

    let tables = lib::build_tables(&grammar, &automaton, &arbiter)?;

    let persisted = lib::persist::to_persisted(&grammar, &grammar_text, &tables, strict);
    lib::persist::save(tables_path, &persisted)?;

    println!(
        "built {} states ({:?}) from {} productions -> {}",
        tables.num_states(),
        mode,
        grammar.num_productions(),
        tables_path
    );

    Ok(())
}
