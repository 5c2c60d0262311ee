use std::fmt;

use crate::ast::{Ast, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadruple {
    pub op: String,
    pub arg1: String,
    pub arg2: String,
    pub result: String,
}

impl Quadruple {
    pub fn new(
        op: impl Into<String>,
        arg1: impl Into<String>,
        arg2: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Quadruple {
            op: op.into(),
            arg1: arg1.into(),
            arg2: arg2.into(),
            result: result.into(),
        }
    }
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.op, self.arg1, self.arg2, self.result
        )
    }
}

// Intermediate code of one expression: the emitted quadruples and the operand
// holding the final value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quadruples {
    pub code: Vec<Quadruple>,
    pub result: String,
}

impl fmt::Display for Quadruples {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, quadruple) in self.code.iter().enumerate() {
            writeln!(f, "{index}: {quadruple}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Constant(bool),
    Name(String),
}

impl Operand {
    fn into_name(self) -> String {
        match self {
            Self::Constant(value) => value.to_string(),
            Self::Name(name) => name,
        }
    }
}

pub fn generate(ast: &Ast) -> Quadruples {
    Generator::new(ast, false).run()
}

// Same as `generate`, but operators applied only to constants are evaluated
// at compile time instead of emitted.
pub fn optimize(ast: &Ast) -> Quadruples {
    Generator::new(ast, true).run()
}

struct Generator<'a> {
    ast: &'a Ast,
    fold: bool,
    code: Vec<Quadruple>,
    temporaries: usize,
}

impl<'a> Generator<'a> {
    fn new(ast: &'a Ast, fold: bool) -> Self {
        Generator {
            ast,
            fold,
            code: Vec::new(),
            temporaries: 0,
        }
    }

    fn run(mut self) -> Quadruples {
        let result = match self.ast.get_root() {
            Some(root) => self.visit(root).into_name(),
            None => String::new(),
        };
        Quadruples {
            code: self.code,
            result,
        }
    }

    fn temporary(&mut self) -> String {
        self.temporaries += 1;
        format!("t{}", self.temporaries)
    }

    fn visit(&mut self, id: NodeId) -> Operand {
        let ast = self.ast;
        let node = ast.get(id);

        match node.kind {
            NodeKind::Constant => Operand::Constant(node.value == "true"),
            NodeKind::Variable => Operand::Name(node.value.clone()),
            NodeKind::Operator => {
                let left = node.left.map(|left| self.visit(left));
                let right = node.right.map(|right| self.visit(right));

                if self.fold {
                    if let Some(value) = evaluate(&node.value, left.as_ref(), right.as_ref()) {
                        return Operand::Constant(value);
                    }
                }

                let result = self.temporary();
                self.code.push(Quadruple::new(
                    node.value.clone(),
                    left.map(Operand::into_name).unwrap_or_default(),
                    right.map(Operand::into_name).unwrap_or_default(),
                    result.clone(),
                ));
                Operand::Name(result)
            }
        }
    }
}

fn evaluate(op: &str, left: Option<&Operand>, right: Option<&Operand>) -> Option<bool> {
    match (op, left, right) {
        ("!", Some(Operand::Constant(value)), None) => Some(!value),
        ("V", Some(Operand::Constant(l)), Some(Operand::Constant(r))) => Some(*l || *r),
        ("^", Some(Operand::Constant(l)), Some(Operand::Constant(r))) => Some(*l && *r),
        _ => None,
    }
}
