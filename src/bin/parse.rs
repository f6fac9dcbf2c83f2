//! `lalr-parse`: loads persisted tables, lexes a source file with the
//! bundled reference lexer (§4.10), drives the parse loop, and prints an
//! indented dump of the resulting parse tree.
//!
//! Usage: `lalr-parse <tables-file> <source-file>`

use lalr_core as lib;
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
    if args.len() != 3 {
        eprintln!("usage: lalr-parse <tables-file> <source-file>");
        process::exit(2);
    }

    let persisted = lib::persist::load(&args[1])?;
    let (grammar, tables) = persisted.rebuild()?;

    let source = fs::read_to_string(&args[2])?;
    let tokens = lib::lexer::lex(&source, grammar.symtab())?;

    let tree = lib::parse(&grammar, &tables, &tokens)?;
    print!("{}", tree.dump(&grammar, 0));

    Ok(())
}
