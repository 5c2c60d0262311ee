use std::fmt;

use indexmap::{IndexMap, map::Entry};

use crate::{
    automaton::Automaton,
    grammar::{END_MARKER, Grammar},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(state) => write!(f, "shift to state {state}"),
            Self::Reduce(rule) => write!(f, "reduce by rule {rule}"),
            Self::Accept => write!(f, "accept"),
        }
    }
}

// Two actions competed for one cell of the action table. The action that was
// written first is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub symbol: String,
    pub kept: Action,
    pub rejected: Action,
}

impl Conflict {
    pub fn is_shift_reduce(&self) -> bool {
        matches!(
            (self.kept, self.rejected),
            (Action::Shift(_), Action::Reduce(_)) | (Action::Reduce(_), Action::Shift(_))
        )
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.kept, self.rejected) {
            (Action::Reduce(_), Action::Reduce(_)) => "reduce/reduce",
            _ if self.is_shift_reduce() => "shift/reduce",
            _ => "action",
        };
        write!(
            f,
            "Warning: {kind} conflict in state {} on {:?}, kept {} over {}",
            self.state, self.symbol, self.kept, self.rejected
        )
    }
}

// Action and Goto tables of an LR(0) automaton. Immutable once built.
#[derive(Debug, Clone)]
pub struct Tables {
    action: Vec<IndexMap<String, Action>>,
    goto: Vec<IndexMap<String, usize>>,
    conflicts: Vec<Conflict>,
}

impl Tables {
    pub fn build(grammar: &Grammar, automaton: &Automaton) -> Self {
        let mut tables = Tables {
            action: vec![IndexMap::new(); automaton.len()],
            goto: vec![IndexMap::new(); automaton.len()],
            conflicts: Vec::new(),
        };

        for (state, items) in automaton.get_states().enumerate() {
            // A symbol declared on both lines gets a shift and a goto entry
            for (symbol, target) in automaton.get_transitions(state) {
                if grammar.is_terminal(symbol) {
                    tables.record(state, symbol, Action::Shift(target));
                }
                if grammar.is_non_terminal(symbol) {
                    tables.goto[state].insert(symbol.to_string(), target);
                }
            }

            for item in items.iter().filter(|item| item.is_complete(grammar)) {
                // Items always point at the first structurally equal production.
                let rule = item.get_production();

                if rule == 0 {
                    tables.record(state, END_MARKER, Action::Accept);
                    continue;
                }

                for terminal in grammar.get_terminals() {
                    tables.record(state, terminal, Action::Reduce(rule));
                }
                tables.record(state, END_MARKER, Action::Reduce(rule));
            }
        }

        tables
    }

    fn record(&mut self, state: usize, symbol: &str, action: Action) {
        match self.action[state].entry(symbol.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(action);
            }
            Entry::Occupied(entry) => {
                let kept = *entry.get();
                if kept != action {
                    self.conflicts.push(Conflict {
                        state,
                        symbol: symbol.to_string(),
                        kept,
                        rejected: action,
                    });
                }
            }
        }
    }

    pub fn action(&self, state: usize, symbol: &str) -> Option<Action> {
        self.action.get(state)?.get(symbol).copied()
    }

    pub fn goto(&self, state: usize, non_terminal: &str) -> Option<usize> {
        self.goto.get(state)?.get(non_terminal).copied()
    }

    pub fn get_conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

}

impl fmt::Display for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Action Table:")?;
        for (state, row) in self.action.iter().enumerate() {
            for (symbol, action) in row {
                writeln!(f, "state {state} -> input {symbol} : {action}")?;
            }
        }
        writeln!(f, "Goto Table:")?;
        for (state, row) in self.goto.iter().enumerate() {
            for (symbol, target) in row {
                writeln!(f, "state {state} -> nonTerminal {symbol} : {target}")?;
            }
        }
        Ok(())
    }
}
