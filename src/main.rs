use std::{fs, path::PathBuf};

use clap::{Parser as _, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};

mod ast;
mod automaton;
mod check;
mod grammar;
mod item;
mod lexer;
mod parser;
mod quad;
mod table;
mod target;

use ast::Ast;
use automaton::Automaton;
use check::check_correctness;
use grammar::Grammar;
use lexer::{Token, tokenize};
use parser::Parser;
use table::Tables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    Lex,
    Parse,
    Ast,
    Quads,
    Optimize,
    Target,
    All,
}

#[derive(clap::Parser)]
#[command(about = "LR(0) front end for boolean expressions")]
struct AppArgs {
    /// Grammar text: nonterminals, terminals, then productions
    #[arg(short, long, default_value = "input.txt")]
    grammar: PathBuf,

    /// Expression source to compile
    #[arg(short, long, default_value = "source.txt")]
    source: PathBuf,

    #[arg(long, value_enum, default_value_t = Stage::Parse)]
    stage: Stage,

    /// Print the canonical collection of LR(0) item sets
    #[arg(long)]
    states: bool,

    /// Print the action and goto tables
    #[arg(long)]
    tables: bool,
}

fn run_parse(args: &AppArgs, tokens: &[Token]) -> Result<()> {
    let text = fs::read_to_string(&args.grammar)
        .wrap_err_with(|| format!("Could not open the grammar file {:?}", args.grammar))?;
    let grammar = Grammar::load(&text)?;

    let findings = check_correctness(&grammar)?;
    if !findings.unreachable.is_empty() {
        eprintln!("Found some dead code {:?}", findings.unreachable);
    }

    let automaton = Automaton::build(&grammar);
    if args.states {
        println!("{}", automaton.display(&grammar));
    }

    let tables = Tables::build(&grammar, &automaton);
    for conflict in tables.get_conflicts() {
        eprintln!("{conflict}");
    }
    if args.tables {
        println!("{tables}");
    }

    let end = Token::end();
    let input: Vec<&str> = tokens
        .iter()
        .chain(std::iter::once(&end))
        .map(|token| token.value.as_str())
        .collect();

    let parser = Parser::new(&grammar, &tables);
    match parser.parse(&input) {
        Ok(trace) => {
            for line in parser.describe(&trace) {
                println!("{line}");
            }
            println!("Input parsed successfully!");
            Ok(())
        }
        Err(rejection) => {
            for line in parser.describe(&rejection.trace) {
                println!("{line}");
            }
            Err(rejection).wrap_err("Parsing failed")
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = AppArgs::parse();

    let source = fs::read_to_string(&args.source)
        .wrap_err_with(|| format!("Could not open the source file {:?}", args.source))?;
    let tokens = tokenize(&source);
    let values: Vec<&str> = tokens.iter().map(|token| token.value.as_str()).collect();

    let wants = |stage: Stage| args.stage == stage || args.stage == Stage::All;

    if wants(Stage::Lex) {
        for token in &tokens {
            println!("{token}");
        }
    }

    if wants(Stage::Parse) {
        run_parse(&args, &tokens)?;
    }

    if wants(Stage::Ast) {
        print!("{}", Ast::build(&values)?);
    }

    if wants(Stage::Quads) {
        print!("{}", quad::generate(&Ast::build(&values)?));
    }

    if wants(Stage::Optimize) {
        print!("{}", quad::optimize(&Ast::build(&values)?));
    }

    if wants(Stage::Target) {
        let quadruples = quad::generate(&Ast::build(&values)?);
        println!("Target Code:");
        for (index, instruction) in target::generate(&quadruples.code).iter().enumerate() {
            println!("{index}: {instruction}");
        }
    }

    Ok(())
}
