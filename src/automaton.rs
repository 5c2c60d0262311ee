use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::{
    grammar::Grammar,
    item::{Item, ItemSet, closure, go},
};

// The canonical collection of LR(0) item sets together with the transitions
// discovered while building it.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: IndexSet<ItemSet>,
    // state -> symbol -> target state
    transitions: Vec<IndexMap<String, usize>>,
}

impl Automaton {
    pub fn build(grammar: &Grammar) -> Self {
        let mut states = IndexSet::new();
        let mut transitions = Vec::new();

        let start: ItemSet = [Item::start()].into_iter().collect();
        states.insert(closure(grammar, &start));

        // Every new state is appended, so walking the set in index order is a
        // breadth first traversal.
        let mut finished = 0;

        while finished < states.len() {
            let mut edges = IndexMap::new();

            for symbol in grammar.get_symbols() {
                let target = go(grammar, &states[finished], symbol);
                if target.is_empty() {
                    continue;
                }

                let (index, _) = states.insert_full(target);
                edges.insert(symbol.to_string(), index);
            }

            transitions.push(edges);
            finished += 1;
        }

        Automaton {
            states,
            transitions,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn get_states(&self) -> impl Iterator<Item = &ItemSet> {
        self.states.iter()
    }

    pub fn get_transitions(&self, state: usize) -> impl Iterator<Item = (&str, usize)> {
        self.transitions
            .get(state)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(symbol, &target)| (symbol.as_str(), target)))
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> AutomatonDisplay<'a> {
        AutomatonDisplay {
            automaton: self,
            grammar,
        }
    }
}

pub struct AutomatonDisplay<'a> {
    automaton: &'a Automaton,
    grammar: &'a Grammar,
}

impl fmt::Display for AutomatonDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Canonical Collection:")?;
        for (index, state) in self.automaton.get_states().enumerate() {
            writeln!(f, "State {index}:")?;
            write!(f, "{}", state.display(self.grammar))?;
            for (symbol, target) in self.automaton.get_transitions(index) {
                writeln!(f, "  -- {symbol} --> {target}")?;
            }
        }
        Ok(())
    }
}
