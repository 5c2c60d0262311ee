use std::collections::{HashSet, VecDeque};

use eyre::{Report, Result};

use crate::grammar::Grammar;

#[derive(Debug)]
pub enum CheckError {
    UndefinedSymbolError { production: usize, symbol: String },
    IncompleteGrammarError(String),
    NonProductiveError(Vec<String>),
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedSymbolError { production, symbol } => write!(
                f,
                "Error: Undefined symbol {symbol:?} used in production {production}"
            ),
            Self::IncompleteGrammarError(non_terminal) => write!(
                f,
                "Error: Incomplete grammar found, cannot find any productions for {non_terminal}"
            ),
            Self::NonProductiveError(non_terminals) => {
                write!(f, "Error: Non productive cycle {:?} detected!", non_terminals)
            }
        }
    }
}

impl std::error::Error for CheckError {}

// Findings that do not prevent building the automaton.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Findings {
    pub unreachable: Vec<String>,
}

// Every right hand symbol must be declared as a terminal or a nonterminal
fn check_symbols(grammar: &Grammar) -> Result<()> {
    for (index, production) in grammar.get_productions().iter().enumerate() {
        for symbol in production.get_rights() {
            if !grammar.is_terminal(symbol) && !grammar.is_non_terminal(symbol) {
                let err = Report::new(CheckError::UndefinedSymbolError {
                    production: index,
                    symbol: symbol.clone(),
                });
                return Err(err);
            }
        }
    }

    Ok(())
}

// Check if every nonterminal used on a right hand side has atleast one production
fn check_completeness(grammar: &Grammar) -> Result<()> {
    for production in grammar.get_productions() {
        for symbol in production.get_rights() {
            if grammar.is_non_terminal(symbol) && grammar.alternatives_of(symbol).is_empty() {
                let err = Report::new(CheckError::IncompleteGrammarError(symbol.clone()));
                return Err(err);
            }
        }
    }

    Ok(())
}

fn check_reachability(grammar: &Grammar) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    queue.push_back(grammar.get_start_production().get_left());

    while let Some(symbol) = queue.pop_front() {
        if !visited.insert(symbol) {
            continue;
        }

        for &index in grammar.alternatives_of(symbol) {
            let Some(production) = grammar.get_production(index) else {
                continue;
            };
            queue.extend(
                production
                    .get_rights()
                    .iter()
                    .map(String::as_str)
                    .filter(|right| grammar.is_non_terminal(right)),
            );
        }
    }

    grammar
        .get_non_terminals()
        .filter(|non_terminal| !visited.contains(non_terminal))
        .map(str::to_string)
        .collect()
}

fn check_productivity(grammar: &Grammar) -> Result<()> {
    let mut productive: HashSet<&str> = HashSet::new();

    loop {
        let num_productive = productive.len();

        for production in grammar.get_productions() {
            let left = production.get_left();
            if productive.contains(left) {
                continue;
            }

            // A production is productive once all of its nonterminals are
            let all_productive = production
                .get_rights()
                .iter()
                .all(|right| !grammar.is_non_terminal(right) || productive.contains(right.as_str()));

            if all_productive {
                productive.insert(left);
            }
        }

        if num_productive == productive.len() {
            break;
        }
    }

    let non_productive: Vec<String> = grammar
        .get_non_terminals()
        .filter(|non_terminal| {
            !grammar.alternatives_of(non_terminal).is_empty() && !productive.contains(non_terminal)
        })
        .map(str::to_string)
        .collect();

    if !non_productive.is_empty() {
        let err = Report::new(CheckError::NonProductiveError(non_productive));
        return Err(err);
    }

    Ok(())
}

// Semantic checks that `Grammar::load` does not perform.
pub fn check_correctness(grammar: &Grammar) -> Result<Findings> {
    check_symbols(grammar)?;
    check_completeness(grammar)?;
    check_productivity(grammar)?;

    Ok(Findings {
        unreachable: check_reachability(grammar),
    })
}
