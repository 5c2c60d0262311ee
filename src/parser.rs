use std::fmt;

use crate::{
    grammar::Grammar,
    table::{Action, Tables},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Syntax { state: usize, token: String },
    MissingGoto { state: usize, non_terminal: String },
    UnexpectedEnd { state: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { state, token } => {
                write!(f, "Error: No action found for state {state} and input {token:?}")
            }
            Self::MissingGoto {
                state,
                non_terminal,
            } => write!(
                f,
                "Error: No goto entry for state {state} and nonterminal {non_terminal:?}"
            ),
            Self::UnexpectedEnd { state } => {
                write!(f, "Error: Input ended unexpectedly in state {state}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Shift(usize),
    Reduce(usize),
    Accept,
}

pub type Trace = Vec<Step>;

// A parse that stopped before reaching accept, with the steps taken and the
// symbols recognized so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub trace: Trace,
    pub symbols: Vec<String>,
    pub error: ParseError,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} steps", self.error, self.trace.len())
    }
}

impl std::error::Error for Rejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// Table driven shift-reduce recognizer. Holds only shared references, every
// call to `Parser::parse` owns its own stacks.
pub struct Parser<'a> {
    grammar: &'a Grammar,
    tables: &'a Tables,
}

impl<'a> Parser<'a> {
    pub fn new(grammar: &'a Grammar, tables: &'a Tables) -> Self {
        Parser { grammar, tables }
    }

    // Runs the automaton over `input`, which must end with the `$` marker.
    pub fn parse<S: AsRef<str>>(&self, input: &[S]) -> Result<Trace, Rejection> {
        let mut states: Vec<usize> = vec![0];
        let mut symbols: Vec<String> = Vec::new();
        let mut trace = Trace::new();
        let mut cursor = 0;

        loop {
            let state = *states.last().unwrap_or(&0);

            let Some(token): Option<&str> = input.get(cursor).map(|token| token.as_ref()) else {
                return Err(Rejection {
                    trace,
                    symbols,
                    error: ParseError::UnexpectedEnd { state },
                });
            };

            let Some(action) = self.tables.action(state, token) else {
                return Err(Rejection {
                    trace,
                    symbols,
                    error: ParseError::Syntax {
                        state,
                        token: token.to_string(),
                    },
                });
            };

            match action {
                Action::Shift(target) => {
                    states.push(target);
                    symbols.push(token.to_string());
                    cursor += 1;
                    trace.push(Step::Shift(target));
                }
                Action::Reduce(rule) => {
                    let Some(production) = self.grammar.get_production(rule) else {
                        return Err(Rejection {
                            trace,
                            symbols,
                            error: ParseError::Syntax {
                                state,
                                token: token.to_string(),
                            },
                        });
                    };

                    let length = production.len();
                    states.truncate(states.len().saturating_sub(length).max(1));
                    symbols.truncate(symbols.len().saturating_sub(length));

                    let top = *states.last().unwrap_or(&0);
                    let left = production.get_left();
                    let Some(target) = self.tables.goto(top, left) else {
                        return Err(Rejection {
                            trace,
                            symbols,
                            error: ParseError::MissingGoto {
                                state: top,
                                non_terminal: left.to_string(),
                            },
                        });
                    };

                    states.push(target);
                    symbols.push(left.to_string());
                    trace.push(Step::Reduce(rule));
                }
                Action::Accept => {
                    trace.push(Step::Accept);
                    return Ok(trace);
                }
            }
        }
    }

    // Renders a trace the way the driver prints it, one step per line.
    pub fn describe(&self, trace: &[Step]) -> Vec<String> {
        trace
            .iter()
            .map(|step| match step {
                Step::Shift(state) => format!("SHIFT to state {state}"),
                Step::Reduce(rule) => match self.grammar.get_production(*rule) {
                    Some(production) => format!("REDUCE by rule {rule} ({production})"),
                    None => format!("REDUCE by rule {rule}"),
                },
                Step::Accept => "ACCEPT".to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;
    use crate::{automaton::Automaton, grammar::END_MARKER, lexer};
    use pretty_assertions::assert_eq;

    struct Fixture {
        grammar: Grammar,
        tables: Tables,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let grammar = Grammar::load(text).unwrap();
            let automaton = Automaton::build(&grammar);
            let tables = Tables::build(&grammar, &automaton);
            Fixture { grammar, tables }
        }

        fn boolean() -> Self {
            Fixture::new(include_str!("../grammars/boolean.txt"))
        }

        fn parse(&self, source: &str) -> Result<Trace, Rejection> {
            let mut input: Vec<String> = lexer::tokenize(source)
                .into_iter()
                .map(|token| token.value)
                .collect();
            input.push(END_MARKER.to_string());
            Parser::new(&self.grammar, &self.tables).parse(&input)
        }
    }

    fn shifts(trace: &[Step]) -> usize {
        trace
            .iter()
            .filter(|step| matches!(step, Step::Shift(_)))
            .count()
    }

    #[test]
    fn test_union_is_accepted() {
        let fixture = Fixture::boolean();
        let result = fixture.parse("a V b");
        assert!(result.is_ok(), "Expected ok result but got {:?}", result);

        let trace = result.unwrap();
        assert_eq!(
            trace,
            vec![
                Step::Shift(3),
                Step::Reduce(6),
                Step::Reduce(3),
                Step::Shift(13),
                Step::Shift(4),
                Step::Reduce(7),
                Step::Reduce(1),
                Step::Accept,
            ]
        );
        assert_eq!(shifts(&trace), 3);
    }

    #[test]
    fn test_not_binds_to_next_operand() {
        let fixture = Fixture::boolean();
        let trace = fixture.parse("a ^ -b").unwrap();

        assert_eq!(
            trace,
            vec![
                Step::Shift(3),
                Step::Reduce(6),
                Step::Reduce(3),
                Step::Shift(14),
                Step::Shift(1),
                Step::Shift(4),
                Step::Reduce(7),
                Step::Reduce(4),
                Step::Reduce(2),
                Step::Accept,
            ]
        );
    }

    #[test]
    fn test_nested_parentheses() {
        let fixture = Fixture::boolean();
        let result = fixture.parse("(a V b) ^ c");
        assert!(result.is_ok(), "Expected ok result but got {:?}", result);

        let trace = result.unwrap();
        assert_eq!(shifts(&trace), 7);
        assert_eq!(trace.first(), Some(&Step::Shift(2)));
        assert!(trace.contains(&Step::Reduce(5)));
        assert_eq!(trace.last(), Some(&Step::Accept));
    }

    #[test]
    fn test_boolean_literals() {
        let fixture = Fixture::boolean();
        let trace = fixture.parse("true ^ false").unwrap();

        assert_eq!(
            trace,
            vec![
                Step::Shift(7),
                Step::Reduce(10),
                Step::Reduce(3),
                Step::Shift(14),
                Step::Shift(8),
                Step::Reduce(11),
                Step::Reduce(2),
                Step::Accept,
            ]
        );
    }

    #[test]
    fn test_normalized_operators_are_accepted() {
        let fixture = Fixture::boolean();
        assert!(fixture.parse("(a || b) && !c").is_ok());
        assert!(fixture.parse("--a").is_ok());
    }

    #[test]
    fn test_missing_close_paren_is_rejected() {
        let fixture = Fixture::boolean();
        let rejection = fixture.parse("(a V b").unwrap_err();

        assert_eq!(
            rejection.error,
            ParseError::Syntax {
                state: 12,
                token: END_MARKER.to_string(),
            }
        );
        assert_eq!(shifts(&rejection.trace), 4);
        assert_eq!(rejection.trace.last(), Some(&Step::Reduce(1)));
        assert_eq!(rejection.symbols, vec!["(".to_string(), "E".to_string()]);
    }

    #[test]
    fn test_rejections_leave_tables_usable() {
        let fixture = Fixture::boolean();

        assert!(fixture.parse("a V").is_err());
        assert!(fixture.parse("a b").is_err());
        assert!(fixture.parse("").is_err());
        assert!(fixture.parse("a & b").is_err());
        assert!(fixture.parse("a V b").is_ok());
    }

    #[test]
    fn test_missing_end_marker() {
        let fixture = Fixture::boolean();
        let parser = Parser::new(&fixture.grammar, &fixture.tables);
        let rejection = parser.parse(&["a", "V", "b"]).unwrap_err();

        assert_eq!(rejection.error, ParseError::UnexpectedEnd { state: 4 });
    }

    #[test]
    fn test_conflicting_grammar_prefers_shift() {
        let fixture = Fixture::new(include_str!("../grammars/shift_reduce.txt"));
        let parser = Parser::new(&fixture.grammar, &fixture.tables);
        let trace = parser.parse(&["a", "+", "a", "$"]).unwrap();

        assert_eq!(
            trace,
            vec![
                Step::Shift(1),
                Step::Shift(3),
                Step::Shift(1),
                Step::Reduce(1),
                Step::Reduce(2),
                Step::Accept,
            ]
        );
    }

    #[test]
    fn test_right_recursion() {
        let fixture = Fixture::new("S',L\na,b\nS' -> L\nL -> a L\nL -> b\n");
        let parser = Parser::new(&fixture.grammar, &fixture.tables);

        assert!(parser.parse(&["a", "a", "b", "$"]).is_ok());
        assert!(parser.parse(&["b", "$"]).is_ok());
        assert!(parser.parse(&["a", "$"]).is_err());
    }

    #[test]
    fn test_empty_production_reduces_without_popping() {
        let fixture = Fixture::new("S',A\na\nS' -> A\nA ->\nA -> a A\n");
        let parser = Parser::new(&fixture.grammar, &fixture.tables);

        assert_eq!(
            parser.parse(&["a", "$"]).unwrap(),
            vec![
                Step::Shift(1),
                Step::Reduce(1),
                Step::Reduce(2),
                Step::Accept,
            ]
        );
        assert_eq!(
            parser.parse(&["$"]).unwrap(),
            vec![Step::Reduce(1), Step::Accept]
        );
    }

    #[test]
    fn test_goto_loop_pushes_repeated_state() {
        let fixture = Fixture::new("S',L,N\na\nS' -> L\nL -> N L\nL ->\nN -> a\n");
        let parser = Parser::new(&fixture.grammar, &fixture.tables);

        // N from state 3 leads back to state 3
        assert_eq!(fixture.tables.goto(3, "N"), Some(3));
        assert_eq!(
            parser.parse(&["a", "a", "$"]).unwrap(),
            vec![
                Step::Shift(1),
                Step::Reduce(3),
                Step::Shift(1),
                Step::Reduce(3),
                Step::Reduce(2),
                Step::Reduce(1),
                Step::Reduce(1),
                Step::Accept,
            ]
        );
    }

    #[test]
    fn test_left_symbol_on_terminal_line() {
        let fixture = Fixture::new("S',E\na,E\nS' -> E\nE -> a\n");
        let parser = Parser::new(&fixture.grammar, &fixture.tables);

        let result = parser.parse(&["a", "$"]);
        assert!(result.is_ok(), "Expected ok result but got {:?}", result);
        assert_eq!(
            result.unwrap(),
            vec![Step::Shift(1), Step::Reduce(1), Step::Accept]
        );
    }

    #[test]
    fn test_describe() {
        let fixture = Fixture::boolean();
        let parser = Parser::new(&fixture.grammar, &fixture.tables);
        let lines = parser.describe(&[Step::Shift(3), Step::Reduce(6), Step::Accept]);

        assert_eq!(
            lines,
            vec![
                "SHIFT to state 3".to_string(),
                "REDUCE by rule 6 (F -> a)".to_string(),
                "ACCEPT".to_string(),
            ]
        );
    }
}
