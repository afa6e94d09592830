//! Legalización de operandos simbólicos.
//!
//! Reemplaza cada [`Operand::Pseudo`] por una ranura concreta del
//! marco de pila y fija el tamaño final del marco. Las ranuras se
//! asignan en orden de primera aparición. La asignación es estable
//! dentro de una función (un mismo nombre siempre recibe la misma
//! ranura) y completamente independiente entre funciones: los estados
//! del legalizador no se comparten, por lo cual una misma ranura en
//! dos funciones refiere a memoria distinta una vez instalado el
//! puntero de marco de cada una.

use std::collections::HashMap;

use super::{Function, Instruction, Operand, Program};
use crate::lex::Identifier;

impl Program {
    pub fn legalize(&mut self) {
        for function in &mut self.functions {
            function.legalize();
        }
    }
}

impl Function {
    fn legalize(&mut self) {
        let mut slots = HashMap::new();

        for instruction in &mut self.body {
            legalize_instruction(instruction, &mut slots);
        }

        self.frame = slots.len() as i32;
    }
}

fn legalize_instruction(instruction: &mut Instruction, slots: &mut HashMap<Identifier, i32>) {
    use Instruction::*;

    match instruction {
        Load { dest, src } => {
            assign(dest, slots);
            assign(src, slots);
        }

        Push(operand) => assign(operand, slots),

        Neg { dest, src } | Complement { dest, src } => {
            assign(dest, slots);
            assign(src, slots);
        }

        Add { dest, src1, src2 }
        | Sub { dest, src1, src2 }
        | Mul { dest, src1, src2 }
        | Div { dest, src1, src2 }
        | Mod { dest, src1, src2 }
        | And { dest, src1, src2 } => {
            assign(dest, slots);
            assign(src1, slots);
            assign(src2, slots);
        }

        Cmp { src1, src2 } => {
            assign(src1, slots);
            assign(src2, slots);
        }

        Call(_) | DeallocateStack(_) | Return | Jump(_) | JumpZero(_) | JumpLess(_)
        | JumpGreater(_) | Label(_) => (),
    }
}

fn assign(operand: &mut Operand, slots: &mut HashMap<Identifier, i32>) {
    if let Operand::Pseudo(name) = operand {
        let next = slots.len() as i32;
        let slot = *slots.entry(name.clone()).or_insert(next);

        *operand = Operand::Stack(slot);
    }
}
