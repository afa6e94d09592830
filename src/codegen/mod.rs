//! Generación de código para la Mentat.
//!
//! La selección de instrucciones traduce cada instrucción de IR a una
//! o más instrucciones del objetivo. La restricción central de la
//! máquina es que solamente el acumulador A direcciona memoria: no
//! existe una carga de memoria hacia B, por lo cual todo operando debe
//! escenificarse a través de A y de los registros auxiliares antes de
//! ejecutar una operación de ALU. Ese protocolo de escenificación vive
//! en [`emit`]; aquí se decide la secuencia de instrucciones y la
//! expansión por operador.
//!
//! Los operandos simbólicos ([`Operand::Pseudo`]) sobreviven hasta
//! [`legalize`], donde se les asigna una ranura concreta del marco de
//! pila.

pub mod emit;
pub mod legalize;

use std::fmt::{self, Display};

use crate::{ir, lex::Identifier, names::NameGenerator};

/// Distancia entre el puntero de marco y el primer parámetro.
///
/// El marco de una función deja en `fp + 1` el puntero de marco del
/// llamador y en `fp + 2` la dirección de retorno; los parámetros
/// comienzan en `fp + 3`, en orden ascendente porque el llamador los
/// empuja en orden inverso.
const PARAMETER_BASE: i32 = 3;

#[derive(Debug)]
pub struct Program {
    pub functions: Vec<Function>,
}

#[derive(Debug)]
pub struct Function {
    pub name: Identifier,
    /// Ranuras de pila que reserva el prólogo. Lo calcula el
    /// legalizador; antes de esa fase es cero.
    pub frame: i32,
    pub body: Vec<Instruction>,
}

/// Registro de hardware visible para el compilador.
///
/// La máquina tiene dieciséis registros de propósito general, pero el
/// compilador solo nombra los que participan en sus convenciones:
/// `%r0` lleva valores de retorno, `%r12` y `%r13` son auxiliares de
/// escenificación, `%r14` escenifica empujes a la pila y `%r15` es el
/// puntero de marco.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Register {
    R0,
    R12,
    R13,
    R14,
    R15,
}

impl Display for Register {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::R0 => "%r0",
            Register::R12 => "%r12",
            Register::R13 => "%r13",
            Register::R14 => "%r14",
            Register::R15 => "%r15",
        };

        fmt.write_str(name)
    }
}

/// Operando de una instrucción del objetivo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Immediate(i32),

    Register(Register),

    /// Ranura del marco de pila. Un desplazamiento positivo `k` es la
    /// ranura local en `fp - k`; uno negativo refiere a `fp + |k|`,
    /// territorio del llamador (parámetros y estado guardado).
    Stack(i32),

    /// Temporal simbólico, presente solo antes de la legalización.
    Pseudo(Identifier),
}

impl Display for Operand {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate(value) => write!(fmt, "Imm({})", value),
            Operand::Register(register) => write!(fmt, "Reg({})", register),
            Operand::Stack(offset) => write!(fmt, "Stack({})", offset),
            Operand::Pseudo(name) => write!(fmt, "Pseudo({})", name),
        }
    }
}

#[derive(Debug)]
pub enum Instruction {
    Load { dest: Operand, src: Operand },
    Push(Operand),
    Call(Identifier),
    DeallocateStack(i32),
    Return,

    Neg { dest: Operand, src: Operand },
    Complement { dest: Operand, src: Operand },

    Add { dest: Operand, src1: Operand, src2: Operand },
    Sub { dest: Operand, src1: Operand, src2: Operand },
    Mul { dest: Operand, src1: Operand, src2: Operand },
    Div { dest: Operand, src1: Operand, src2: Operand },
    Mod { dest: Operand, src1: Operand, src2: Operand },
    And { dest: Operand, src1: Operand, src2: Operand },

    /// Comparación de banderas; no tiene operando destino.
    Cmp { src1: Operand, src2: Operand },

    Jump(String),
    JumpZero(String),
    JumpLess(String),
    JumpGreater(String),
    Label(String),
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match self {
            Load { dest, src } => write!(fmt, "Load({}, {})", dest, src),
            Push(operand) => write!(fmt, "Push({})", operand),
            Call(target) => write!(fmt, "Call({})", target),
            DeallocateStack(size) => write!(fmt, "DeallocateStack({})", size),
            Return => write!(fmt, "Return()"),
            Neg { dest, src } => write!(fmt, "Neg({}, {})", dest, src),
            Complement { dest, src } => write!(fmt, "Not({}, {})", dest, src),
            Add { dest, src1, src2 } => write!(fmt, "Add({}, {}, {})", dest, src1, src2),
            Sub { dest, src1, src2 } => write!(fmt, "Sub({}, {}, {})", dest, src1, src2),
            Mul { dest, src1, src2 } => write!(fmt, "Mul({}, {}, {})", dest, src1, src2),
            Div { dest, src1, src2 } => write!(fmt, "Div({}, {}, {})", dest, src1, src2),
            Mod { dest, src1, src2 } => write!(fmt, "Mod({}, {}, {})", dest, src1, src2),
            And { dest, src1, src2 } => write!(fmt, "BitAnd({}, {}, {})", dest, src1, src2),
            Cmp { src1, src2 } => write!(fmt, "Cmp({}, {})", src1, src2),
            Jump(target) => write!(fmt, "Jump({})", target),
            JumpZero(target) => write!(fmt, "JumpZero({})", target),
            JumpLess(target) => write!(fmt, "JumpLesser({})", target),
            JumpGreater(target) => write!(fmt, "JumpGreater({})", target),
            Label(name) => write!(fmt, "Label({})", name),
        }
    }
}

impl ir::Program {
    /// Selecciona instrucciones del objetivo para cada función.
    pub fn select(&self, names: &mut NameGenerator) -> Program {
        let functions = self
            .functions
            .iter()
            .map(|function| select_function(function, names))
            .collect();

        Program { functions }
    }
}

fn select_function(function: &ir::Function, names: &mut NameGenerator) -> Function {
    let mut body = Vec::new();

    // Los parámetros se copian del territorio del llamador a
    // pseudo-registros propios, de forma que el legalizador los trate
    // como a cualquier otro temporal
    for (index, parameter) in function.parameters.iter().enumerate() {
        body.push(Instruction::Load {
            dest: Operand::Pseudo(parameter.clone()),
            src: Operand::Stack(-(PARAMETER_BASE + index as i32)),
        });
    }

    for instruction in &function.body {
        select_instruction(instruction, &mut body, names);
    }

    Function {
        name: function.name.clone(),
        frame: 0,
        body,
    }
}

fn select_instruction(
    instruction: &ir::Instruction,
    body: &mut Vec<Instruction>,
    names: &mut NameGenerator,
) {
    use ir::Instruction as Ir;

    match instruction {
        Ir::Load { dest, src } => body.push(Instruction::Load {
            dest: operand(dest),
            src: operand(src),
        }),

        Ir::Jump(target) => body.push(Instruction::Jump(target.clone())),

        Ir::JumpIfZero { condition, target } => {
            body.push(Instruction::Cmp {
                src1: operand(condition),
                src2: Operand::Immediate(0),
            });
            body.push(Instruction::JumpZero(target.clone()));
        }

        // No hay salto condicional por no-cero; se invierte un `jz`
        // sobre un salto incondicional
        Ir::JumpIfNotZero { condition, target } => {
            let fall_through = names.label();

            body.push(Instruction::Cmp {
                src1: operand(condition),
                src2: Operand::Immediate(0),
            });
            body.push(Instruction::JumpZero(fall_through.clone()));
            body.push(Instruction::Jump(target.clone()));
            body.push(Instruction::Label(fall_through));
        }

        Ir::Label(name) => body.push(Instruction::Label(name.clone())),

        Ir::Return(value) => {
            body.push(Instruction::Load {
                dest: Operand::Register(Register::R0),
                src: operand(value),
            });
            body.push(Instruction::Return);
        }

        Ir::Call {
            target,
            output,
            arguments,
        } => {
            // Los argumentos se empujan en orden inverso para que el
            // llamado los lea en desplazamientos ascendentes desde su
            // puntero de marco
            for argument in arguments.iter().rev() {
                body.push(Instruction::Push(operand(argument)));
            }

            body.push(Instruction::Call(target.clone()));

            if !arguments.is_empty() {
                body.push(Instruction::DeallocateStack(arguments.len() as i32));
            }

            body.push(Instruction::Load {
                dest: operand(output),
                src: Operand::Register(Register::R0),
            });
        }

        Ir::Neg { dest, src } => body.push(Instruction::Neg {
            dest: operand(dest),
            src: operand(src),
        }),

        Ir::Complement { dest, src } => body.push(Instruction::Complement {
            dest: operand(dest),
            src: operand(src),
        }),

        Ir::Add { dest, src1, src2 } => body.push(Instruction::Add {
            dest: operand(dest),
            src1: operand(src1),
            src2: operand(src2),
        }),

        Ir::Sub { dest, src1, src2 } => body.push(Instruction::Sub {
            dest: operand(dest),
            src1: operand(src1),
            src2: operand(src2),
        }),

        Ir::Mul { dest, src1, src2 } => body.push(Instruction::Mul {
            dest: operand(dest),
            src1: operand(src1),
            src2: operand(src2),
        }),

        Ir::Div { dest, src1, src2 } => body.push(Instruction::Div {
            dest: operand(dest),
            src1: operand(src1),
            src2: operand(src2),
        }),

        Ir::Mod { dest, src1, src2 } => body.push(Instruction::Mod {
            dest: operand(dest),
            src1: operand(src1),
            src2: operand(src2),
        }),

        Ir::BitAnd { dest, src1, src2 } => body.push(Instruction::And {
            dest: operand(dest),
            src1: operand(src1),
            src2: operand(src2),
        }),

        Ir::Equal { dest, src1, src2 } => {
            comparison(body, names, dest, src1, src2, Instruction::JumpZero, 1)
        }

        Ir::NotEqual { dest, src1, src2 } => {
            comparison(body, names, dest, src1, src2, Instruction::JumpZero, 0)
        }

        Ir::Less { dest, src1, src2 } => {
            comparison(body, names, dest, src1, src2, Instruction::JumpLess, 1)
        }

        Ir::GreaterEqual { dest, src1, src2 } => {
            comparison(body, names, dest, src1, src2, Instruction::JumpLess, 0)
        }

        Ir::Greater { dest, src1, src2 } => {
            comparison(body, names, dest, src1, src2, Instruction::JumpGreater, 1)
        }

        Ir::LessEqual { dest, src1, src2 } => {
            comparison(body, names, dest, src1, src2, Instruction::JumpGreater, 0)
        }
    }
}

/// Expansión compartida de los operadores relacionales.
///
/// `Cmp` actualiza banderas y un salto condicional decide entre cargar
/// `taken` (si el salto se toma) o su complemento en el destino.
fn comparison(
    body: &mut Vec<Instruction>,
    names: &mut NameGenerator,
    dest: &ir::Operand,
    src1: &ir::Operand,
    src2: &ir::Operand,
    jump: fn(String) -> Instruction,
    taken: i32,
) {
    let target = names.label();
    let end = names.label();

    body.push(Instruction::Cmp {
        src1: operand(src1),
        src2: operand(src2),
    });
    body.push(jump(target.clone()));
    body.push(Instruction::Load {
        dest: operand(dest),
        src: Operand::Immediate(1 - taken),
    });
    body.push(Instruction::Jump(end.clone()));
    body.push(Instruction::Label(target));
    body.push(Instruction::Load {
        dest: operand(dest),
        src: Operand::Immediate(taken),
    });
    body.push(Instruction::Label(end));
}

fn operand(operand: &ir::Operand) -> Operand {
    match operand {
        ir::Operand::Constant(value) => Operand::Immediate(*value),
        ir::Operand::Var(name) => Operand::Pseudo(name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;
    use crate::source::Source;

    pub(crate) fn select(text: &str) -> Program {
        let source = Source::new("test.c", text);
        let tokens = Lexer::new(source.origin(), source.chars())
            .try_exhaustive()
            .expect("lexer failure in codegen test");

        let mut program =
            crate::parse::parse(source.origin(), tokens.iter()).expect("parser failure");

        let mut names = NameGenerator::new();
        program
            .resolve_identifiers(&mut names)
            .and_then(|()| program.label_loops(&mut names))
            .and_then(|()| program.check_types())
            .expect("semantic failure in codegen test");

        program.lower(&mut names).select(&mut names)
    }

    fn function<'a>(program: &'a Program, name: &str) -> &'a Function {
        program
            .functions
            .iter()
            .find(|function| function.name.as_ref() == name)
            .unwrap()
    }

    #[test]
    fn calls_push_arguments_in_reverse_and_deallocate() {
        let program = select(
            "int f(int a, int b) { return a + b; } int main() { return f(1, 2); }",
        );
        let body = &function(&program, "main").body;

        let pushes: Vec<_> = body
            .iter()
            .filter_map(|i| match i {
                Instruction::Push(Operand::Immediate(value)) => Some(*value),
                _ => None,
            })
            .collect();

        assert_eq!(pushes, vec![2, 1]);

        let call = body
            .iter()
            .position(|i| matches!(i, Instruction::Call(name) if name.as_ref() == "f"))
            .unwrap();

        assert!(matches!(body[call + 1], Instruction::DeallocateStack(2)));
        assert!(matches!(
            &body[call + 2],
            Instruction::Load {
                src: Operand::Register(Register::R0),
                ..
            }
        ));
    }

    #[test]
    fn parameters_are_copied_in_from_the_caller_frame() {
        let program = select(
            "int f(int a, int b) { return a + b; } int main() { return f(1, 2); }",
        );
        let body = &function(&program, "f").body;

        assert!(matches!(
            &body[0],
            Instruction::Load {
                src: Operand::Stack(-3),
                dest: Operand::Pseudo(_),
            }
        ));
        assert!(matches!(
            &body[1],
            Instruction::Load {
                src: Operand::Stack(-4),
                dest: Operand::Pseudo(_),
            }
        ));
    }

    #[test]
    fn returns_travel_through_r0() {
        let program = select("int main() { return 3; }");
        let body = &function(&program, "main").body;

        assert!(matches!(
            &body[0],
            Instruction::Load {
                dest: Operand::Register(Register::R0),
                src: Operand::Immediate(3),
            }
        ));
        assert!(matches!(body[1], Instruction::Return));
    }

    #[test]
    fn jump_if_not_zero_inverts_a_jz() {
        let program = select("int main() { do ; while (1); return 0; }");
        let body = &function(&program, "main").body;

        let jz = body
            .iter()
            .position(|i| matches!(i, Instruction::JumpZero(_)))
            .unwrap();

        // jz sobre la etiqueta de caída, jmp al destino real, y la
        // etiqueta de caída inmediatamente después
        let fall_through = match &body[jz] {
            Instruction::JumpZero(target) => target.clone(),
            other => panic!("expected jz, found {:?}", other),
        };

        assert!(matches!(&body[jz + 1], Instruction::Jump(target) if target.starts_with("start_do.")));
        assert!(matches!(&body[jz + 2], Instruction::Label(name) if *name == fall_through));
    }

    #[test]
    fn equality_loads_zero_or_one() {
        let program = select("int main() { return 1 == 2; }");
        let body = &function(&program, "main").body;

        let cmp = body
            .iter()
            .position(|i| matches!(i, Instruction::Cmp { .. }))
            .unwrap();

        assert!(matches!(&body[cmp + 1], Instruction::JumpZero(_)));
        assert!(matches!(
            &body[cmp + 2],
            Instruction::Load {
                src: Operand::Immediate(0),
                ..
            }
        ));
        assert!(matches!(&body[cmp + 3], Instruction::Jump(_)));
        assert!(matches!(&body[cmp + 4], Instruction::Label(_)));
        assert!(matches!(
            &body[cmp + 5],
            Instruction::Load {
                src: Operand::Immediate(1),
                ..
            }
        ));
        assert!(matches!(&body[cmp + 6], Instruction::Label(_)));
    }

    #[test]
    fn less_than_jumps_on_jl() {
        let program = select("int main() { return 1 < 2; }");
        let body = &function(&program, "main").body;

        let cmp = body
            .iter()
            .position(|i| matches!(i, Instruction::Cmp { .. }))
            .unwrap();

        assert!(matches!(&body[cmp + 1], Instruction::JumpLess(_)));
        assert!(matches!(
            &body[cmp + 5],
            Instruction::Load {
                src: Operand::Immediate(1),
                ..
            }
        ));
    }

    #[test]
    fn calls_without_arguments_skip_the_deallocation() {
        let program = select("int f() { return 1; } int main() { return f(); }");
        let body = &function(&program, "main").body;

        assert!(!body
            .iter()
            .any(|i| matches!(i, Instruction::DeallocateStack(_))));
    }
}
