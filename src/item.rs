use std::{
    collections::{BTreeSet, VecDeque},
    fmt,
};

use crate::grammar::Grammar;

// An LR(0) item: a production index and how much of its right side has been
// matched. Items order by production index, then dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    production: usize,
    dot: usize,
}

impl Item {
    pub fn new(production: usize, dot: usize) -> Self {
        Item { production, dot }
    }

    pub fn start() -> Self {
        Item::new(0, 0)
    }

    pub fn get_production(&self) -> usize {
        self.production
    }

    // The symbol right after the dot, if any.
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g str> {
        grammar
            .get_production(self.production)?
            .get_rights()
            .get(self.dot)
            .map(String::as_str)
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        grammar
            .get_production(self.production)
            .is_some_and(|production| self.dot >= production.len())
    }

    fn advance(&self) -> Self {
        Item::new(self.production, self.dot + 1)
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> ItemDisplay<'a> {
        ItemDisplay {
            item: self,
            grammar,
        }
    }
}

pub struct ItemDisplay<'a> {
    item: &'a Item,
    grammar: &'a Grammar,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(production) = self.grammar.get_production(self.item.production) else {
            return write!(f, "<unknown production {}>", self.item.production);
        };

        write!(f, "{} ->", production.get_left())?;
        for (position, right) in production.get_rights().iter().enumerate() {
            if position == self.item.dot {
                write!(f, " .")?;
            }
            write!(f, " {right}")?;
        }
        if self.item.dot >= production.len() {
            write!(f, " .")?;
        }
        Ok(())
    }
}

// A set of items compared structurally, independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemSet {
    items: BTreeSet<Item>,
}

impl ItemSet {
    pub fn insert(&mut self, item: Item) -> bool {
        self.items.insert(item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> ItemSetDisplay<'a> {
        ItemSetDisplay { set: self, grammar }
    }
}

impl FromIterator<Item> for ItemSet {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        ItemSet {
            items: iter.into_iter().collect(),
        }
    }
}

pub struct ItemSetDisplay<'a> {
    set: &'a ItemSet,
    grammar: &'a Grammar,
}

impl fmt::Display for ItemSetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.set.iter() {
            writeln!(f, "  {}", item.display(self.grammar))?;
        }
        Ok(())
    }
}

// Expands `set` with every item reachable through a dot sitting in front of a
// nonterminal, until nothing new can be added.
pub fn closure(grammar: &Grammar, set: &ItemSet) -> ItemSet {
    let mut closed = set.clone();
    let mut pending: VecDeque<Item> = set.iter().copied().collect();

    while let Some(item) = pending.pop_front() {
        let Some(symbol) = item.next_symbol(grammar) else {
            continue;
        };

        if !grammar.is_non_terminal(symbol) {
            continue;
        }

        for &production in grammar.alternatives_of(symbol) {
            let new_item = Item::new(production, 0);
            if closed.insert(new_item) {
                pending.push_back(new_item);
            }
        }
    }

    closed
}

// The closed set of items obtained by moving the dot over `symbol`. An empty
// result means there is no transition on `symbol`.
pub fn go(grammar: &Grammar, set: &ItemSet, symbol: &str) -> ItemSet {
    let kernel: ItemSet = set
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Item::advance)
        .collect();

    if kernel.is_empty() {
        return kernel;
    }

    closure(grammar, &kernel)
}

#[cfg(test)]
mod item_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn boolean() -> Grammar {
        Grammar::load(include_str!("../grammars/boolean.txt")).unwrap()
    }

    fn start_state(grammar: &Grammar) -> ItemSet {
        closure(grammar, &[Item::start()].into_iter().collect::<ItemSet>())
    }

    #[test]
    fn test_closure_of_start_item() {
        let grammar = boolean();
        let state = start_state(&grammar);

        // S' -> . E, the three E alternatives and the eight F alternatives
        assert_eq!(state.items.len(), 12);
        assert!(state.iter().all(|item| item.dot == 0));
        assert!(state.items.contains(&Item::new(5, 0)));
        assert!(state.items.contains(&Item::new(11, 0)));
    }

    #[test]
    fn test_closure_is_idempotent() {
        let grammar = boolean();
        let once = start_state(&grammar);
        let twice = closure(&grammar, &once);
        assert_eq!(once, twice);

        let kernel: ItemSet = [Item::new(5, 1)].into_iter().collect();
        let once = closure(&grammar, &kernel);
        assert_eq!(closure(&grammar, &once), once);
    }

    #[test]
    fn test_closure_is_order_independent() {
        let grammar = boolean();
        let forward: ItemSet = [Item::new(1, 2), Item::new(5, 1), Item::new(4, 1)]
            .into_iter()
            .collect();
        let mut backward = ItemSet::default();
        backward.insert(Item::new(4, 1));
        backward.insert(Item::new(5, 1));
        backward.insert(Item::new(1, 2));

        assert_eq!(closure(&grammar, &forward), closure(&grammar, &backward));
    }

    #[test]
    fn test_closure_leaves_terminal_items_alone() {
        let grammar = boolean();
        let kernel: ItemSet = [Item::new(1, 1)].into_iter().collect();
        assert_eq!(closure(&grammar, &kernel), kernel);
    }

    #[test]
    fn test_go_over_multi_character_literal() {
        let grammar = boolean();
        let state = start_state(&grammar);

        let target = go(&grammar, &state, "true");
        let expected: ItemSet = [Item::new(10, 1)].into_iter().collect();
        assert_eq!(target, expected);
        assert!(target.iter().all(|item| item.is_complete(&grammar)));

        // a prefix of a literal is a different symbol
        assert!(go(&grammar, &state, "t").is_empty());
    }

    #[test]
    fn test_go_over_non_terminal() {
        let grammar = boolean();
        let state = start_state(&grammar);

        let target = go(&grammar, &state, "E");
        let expected: ItemSet = [Item::new(0, 1), Item::new(1, 1), Item::new(2, 1)]
            .into_iter()
            .collect();
        assert_eq!(target, expected);
    }

    #[test]
    fn test_go_without_transition_is_empty() {
        let grammar = boolean();
        let state = start_state(&grammar);
        assert!(go(&grammar, &state, ")").is_empty());
        assert!(go(&grammar, &state, "V").is_empty());
    }

    #[test]
    fn test_item_display() {
        let grammar = boolean();
        assert_eq!(Item::new(1, 1).display(&grammar).to_string(), "E -> E . V F");
        assert_eq!(Item::new(5, 3).display(&grammar).to_string(), "F -> ( E ) .");
        assert_eq!(Item::start().display(&grammar).to_string(), "S' -> . E");
    }
}
