use std::fmt;

use eyre::{Report, Result};
use indexmap::{IndexMap, IndexSet};

// Marks the end of the input in both the grammar tables and the token stream.
pub const END_MARKER: &str = "$";

const ARROW: &str = "->";

#[derive(Debug)]
pub enum GrammarError {
    FormatError { line: usize, content: String },
    MissingSymbolLine(&'static str),
    EmptyGrammar,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatError { line, content } => write!(
                f,
                "Error: Malformed production on line {line}, expected `LHS -> r1 r2 ...` but found {content:?}"
            ),
            Self::MissingSymbolLine(kind) => {
                write!(f, "Error: Grammar text is missing the {kind} symbol line")
            }
            Self::EmptyGrammar => write!(f, "Error: Grammar text contains no productions"),
        }
    }
}

impl std::error::Error for GrammarError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    left: String,
    rights: Vec<String>,
}

impl Production {
    pub fn new(left: impl Into<String>, rights: Vec<String>) -> Self {
        Production {
            left: left.into(),
            rights,
        }
    }

    pub fn get_left(&self) -> &str {
        &self.left
    }

    pub fn get_rights(&self) -> &[String] {
        &self.rights
    }

    pub fn len(&self) -> usize {
        self.rights.len()
    }

    fn mentions(&self, symbol: &str) -> bool {
        self.rights.iter().any(|right| right == symbol)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {ARROW}", self.left)?;
        for right in &self.rights {
            write!(f, " {right}")?;
        }
        Ok(())
    }
}

// A context free grammar whose production 0 is always the augmented start
// production `S' -> S`.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: IndexSet<String>,
    non_terminals: IndexSet<String>,
    productions: Vec<Production>,
    // left symbol -> indices of its structurally distinct productions
    alternatives: IndexMap<String, Vec<usize>>,
}

impl Grammar {
    pub fn new(
        terminals: impl IntoIterator<Item = String>,
        non_terminals: impl IntoIterator<Item = String>,
        mut productions: Vec<Production>,
    ) -> Result<Self> {
        if productions.is_empty() {
            return Err(Report::new(GrammarError::EmptyGrammar));
        }

        let terminals: IndexSet<String> = terminals.into_iter().collect();
        let mut non_terminals: IndexSet<String> = non_terminals.into_iter().collect();

        if !is_augmented(&productions) {
            let start = productions[0].left.clone();
            let mut augmented = format!("{start}'");
            while non_terminals.contains(&augmented)
                || terminals.contains(&augmented)
                || productions.iter().any(|p| p.left == augmented || p.mentions(&augmented))
            {
                augmented.push('\'');
            }
            productions.insert(0, Production::new(augmented.clone(), vec![start]));
            non_terminals.shift_insert(0, augmented);
        }

        for production in &productions {
            non_terminals.insert(production.left.clone());
        }

        let mut alternatives: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (index, production) in productions.iter().enumerate() {
            let seen = productions[..index].contains(production);
            let entry = alternatives.entry(production.left.clone()).or_default();
            if !seen {
                entry.push(index);
            }
        }

        Ok(Grammar {
            terminals,
            non_terminals,
            productions,
            alternatives,
        })
    }

    // Parses the plain text grammar format: a line of nonterminals, a line of
    // terminals, then one `LHS -> r1 r2 ... rn` production per line.
    pub fn load(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate();

        let non_terminals = match lines.next() {
            Some((_, line)) => split_symbols(line),
            None => return Err(Report::new(GrammarError::MissingSymbolLine("nonterminal"))),
        };

        let terminals = match lines.next() {
            Some((_, line)) => split_symbols(line),
            None => return Err(Report::new(GrammarError::MissingSymbolLine("terminal"))),
        };

        let mut productions = Vec::new();

        for (line_number, line) in lines {
            if line.trim().is_empty() {
                continue;
            }

            let Some((left, rights)) = line.split_once(ARROW) else {
                return Err(Report::new(GrammarError::FormatError {
                    line: line_number + 1,
                    content: line.to_string(),
                }));
            };

            let left = left.trim();
            if left.is_empty() {
                return Err(Report::new(GrammarError::FormatError {
                    line: line_number + 1,
                    content: line.to_string(),
                }));
            }

            let rights = rights.split_whitespace().map(str::to_string).collect();
            productions.push(Production::new(left, rights));
        }

        Grammar::new(terminals, non_terminals, productions)
    }

    pub fn get_terminals(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(String::as_str)
    }

    pub fn get_non_terminals(&self) -> impl Iterator<Item = &str> {
        self.non_terminals.iter().map(String::as_str)
    }

    // Terminals in declaration order followed by nonterminals in declaration
    // order. This is the exploration order of the automaton builder.
    pub fn get_symbols(&self) -> impl Iterator<Item = &str> {
        self.get_terminals().chain(self.get_non_terminals())
    }

    pub fn get_productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn get_production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    pub fn get_start_production(&self) -> &Production {
        &self.productions[0]
    }

    // Indices of the structurally distinct productions of `left`.
    pub fn alternatives_of(&self, left: &str) -> &[usize] {
        self.alternatives
            .get(left)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.contains(symbol)
    }

    pub fn is_non_terminal(&self, symbol: &str) -> bool {
        self.non_terminals.contains(symbol)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let non_terminals: Vec<&str> = self.get_non_terminals().collect();
        let terminals: Vec<&str> = self.get_terminals().collect();
        writeln!(f, "Non-Terminals: {}", non_terminals.join(" "))?;
        writeln!(f, "Terminals: {}", terminals.join(" "))?;
        writeln!(f, "Productions:")?;
        for (index, production) in self.productions.iter().enumerate() {
            writeln!(f, "{index:>4} {production}")?;
        }
        Ok(())
    }
}

fn split_symbols(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty())
        .map(str::to_string)
        .collect()
}

// The first production is already `S' -> S` when its left side is defined
// exactly once, by a single symbol, and never used on any right side.
fn is_augmented(productions: &[Production]) -> bool {
    let first = &productions[0];
    first.rights.len() == 1
        && first.rights[0] != first.left
        && productions.iter().filter(|p| p.left == first.left).count() == 1
        && !productions.iter().any(|p| p.mentions(&first.left))
}
