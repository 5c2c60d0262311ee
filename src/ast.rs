use std::fmt;

use eyre::{Report, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum AstError {
    ExpectedOperand(usize),
    ExpectedCloseParen(usize),
    UnexpectedToken(usize, String),
}

impl fmt::Display for AstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedOperand(position) => {
                write!(f, "Error: Expected an operand at token {position}")
            }
            Self::ExpectedCloseParen(position) => {
                write!(f, "Error: Expected ')' at token {position}")
            }
            Self::UnexpectedToken(position, token) => {
                write!(f, "Error: Unexpected token {token:?} at position {position}")
            }
        }
    }
}

impl std::error::Error for AstError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Operator,
    Constant,
    Variable,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => write!(f, "operator"),
            Self::Constant => write!(f, "constant"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub value: String,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

// Expression tree stored in an arena. Operators are `V`, `^` (binary) and
// `!` (unary, operand on the left).
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    // Builds the tree from token literals. Binary operators are left
    // associative and share one precedence level.
    pub fn build<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let tokens: Vec<&str> = tokens.iter().map(|token| token.as_ref()).collect();
        let mut builder = Builder {
            tokens: &tokens,
            position: 0,
            ast: Ast::default(),
        };

        let root = builder.expression()?;
        if let Some(token) = builder.peek() {
            return Err(Report::new(AstError::UnexpectedToken(
                builder.position,
                token.to_string(),
            )));
        }

        let mut ast = builder.ast;
        ast.root = Some(root);
        Ok(ast)
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn push(
        &mut self,
        kind: NodeKind,
        value: &str,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) -> NodeId {
        self.nodes.push(Node {
            kind,
            value: value.to_string(),
            left,
            right,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        prefix: &str,
        is_left: bool,
    ) -> fmt::Result {
        let node = self.get(id);
        let branch = if is_left { "├── " } else { "└── " };
        writeln!(f, "{prefix}{branch}{}: {}", node.kind, node.value)?;

        let prefix = format!("{prefix}{}", if is_left { "│   " } else { "    " });
        if let Some(left) = node.left {
            self.write_node(f, left, &prefix, node.right.is_some())?;
        }
        if let Some(right) = node.right {
            self.write_node(f, right, &prefix, false)?;
        }
        Ok(())
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.write_node(f, root, "", true),
            None => Ok(()),
        }
    }
}

struct Builder<'t> {
    tokens: &'t [&'t str],
    position: usize,
    ast: Ast,
}

impl<'t> Builder<'t> {
    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<&'t str> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<NodeId> {
        let mut left = self.primary()?;

        while let Some(op) = self.peek() {
            if op != "V" && op != "^" {
                break;
            }
            self.position += 1;
            let right = self.primary()?;
            left = self.ast.push(NodeKind::Operator, op, Some(left), Some(right));
        }

        Ok(left)
    }

    fn primary(&mut self) -> Result<NodeId> {
        let position = self.position;
        let Some(token) = self.next() else {
            return Err(Report::new(AstError::ExpectedOperand(position)));
        };

        match token {
            "(" => {
                let node = self.expression()?;
                if self.next() != Some(")") {
                    return Err(Report::new(AstError::ExpectedCloseParen(self.position)));
                }
                Ok(node)
            }
            "-" => {
                let operand = self.primary()?;
                Ok(self.ast.push(NodeKind::Operator, "!", Some(operand), None))
            }
            "true" | "false" => Ok(self.ast.push(NodeKind::Constant, token, None, None)),
            "V" | "^" | ")" => Err(Report::new(AstError::ExpectedOperand(position))),
            _ => Ok(self.ast.push(NodeKind::Variable, token, None, None)),
        }
    }
}
