use indexmap::IndexMap;

use crate::quad::Quadruple;

// Lowers quadruples to a register machine listing. Every name gets a register
// on first use; each constant operand is loaded into a fresh register.
pub fn generate(code: &[Quadruple]) -> Vec<String> {
    let mut allocator = Registers::default();
    let mut listing = Vec::new();

    for quadruple in code {
        let instruction = match quadruple.op.as_str() {
            "!" => "NOT",
            "V" => "OR",
            "^" => "AND",
            _ => continue,
        };

        let result = allocator.named(&quadruple.result);
        let arg1 = allocator.operand(&quadruple.arg1, &mut listing);

        if instruction == "NOT" {
            listing.push(format!("NOT {arg1}, {result}"));
        } else {
            let arg2 = allocator.operand(&quadruple.arg2, &mut listing);
            listing.push(format!("{instruction} {arg1}, {arg2}, {result}"));
        }
    }

    listing
}

#[derive(Default)]
struct Registers {
    assigned: IndexMap<String, String>,
    next: usize,
}

impl Registers {
    fn fresh(&mut self) -> String {
        let register = format!("R{}", self.next);
        self.next += 1;
        register
    }

    fn named(&mut self, name: &str) -> String {
        if let Some(register) = self.assigned.get(name) {
            return register.clone();
        }
        let register = self.fresh();
        self.assigned.insert(name.to_string(), register.clone());
        register
    }

    fn operand(&mut self, operand: &str, listing: &mut Vec<String>) -> String {
        let immediate = match operand {
            "true" => "#1",
            "false" => "#0",
            _ => return self.named(operand),
        };
        let register = self.fresh();
        listing.push(format!("MOV {register}, {immediate}"));
        register
    }
}
