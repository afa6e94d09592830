//! Representación intermedia.
//!
//! El IR es una lista plana de instrucciones de tres direcciones por
//! función, sin anidamiento. Los operandos son constantes o variables
//! con nombre; cada temporal es introducido por exactamente una
//! instrucción que lo define. El descenso desde el AST ocurre en
//! postorden: los operandos de una operación se materializan antes
//! que la operación misma.
//!
//! Decisiones de descenso relevantes:
//!
//! - `&&` y `||` cortocircuitan: el operando derecho se desciende
//!   después del salto condicional, por lo cual sus efectos no se
//!   ejecutan si el izquierdo ya decidió el resultado.
//! - Los operadores relacionales tienen cada uno su propia
//!   instrucción, de forma que la selección escoja la polaridad de
//!   salto correcta.
//! - `!x` equivale a `x == 0`. Los prefijos `++x`/`--x` actualizan la
//!   variable y producen su valor nuevo; los postfijos copian el valor
//!   viejo a un temporal y producen ese temporal.
//! - Toda función termina con un `Return(Constant(0))` implícito por
//!   si el control cae del final del cuerpo.

use crate::{
    lex::Identifier,
    names::NameGenerator,
    parse::{self, BinOp, BlockItem, ForInit, PostfixOp, UnaryOp},
};

#[derive(Debug)]
pub struct Program {
    pub functions: Vec<Function>,
}

#[derive(Debug)]
pub struct Function {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Vec<Instruction>,
}

/// Operando de una instrucción de tres direcciones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Constant(i32),
    Var(Identifier),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Instruction {
    Load { dest: Operand, src: Operand },
    Jump(String),
    JumpIfZero { condition: Operand, target: String },
    JumpIfNotZero { condition: Operand, target: String },
    Label(String),
    Return(Operand),

    Call {
        target: Identifier,
        output: Operand,
        arguments: Vec<Operand>,
    },

    Neg { dest: Operand, src: Operand },
    Complement { dest: Operand, src: Operand },

    Add { dest: Operand, src1: Operand, src2: Operand },
    Sub { dest: Operand, src1: Operand, src2: Operand },
    Mul { dest: Operand, src1: Operand, src2: Operand },
    Div { dest: Operand, src1: Operand, src2: Operand },
    Mod { dest: Operand, src1: Operand, src2: Operand },
    BitAnd { dest: Operand, src1: Operand, src2: Operand },

    Equal { dest: Operand, src1: Operand, src2: Operand },
    NotEqual { dest: Operand, src1: Operand, src2: Operand },
    Less { dest: Operand, src1: Operand, src2: Operand },
    LessEqual { dest: Operand, src1: Operand, src2: Operand },
    Greater { dest: Operand, src1: Operand, src2: Operand },
    GreaterEqual { dest: Operand, src1: Operand, src2: Operand },
}

impl parse::Program {
    /// Desciende el AST ya analizado a IR.
    ///
    /// Las declaraciones sin cuerpo no producen función alguna: las
    /// llamadas que las referencien se emiten contra el símbolo
    /// externo, el cual debe resolverse en la imagen de ejecución.
    pub fn lower(&self, names: &mut NameGenerator) -> Program {
        let functions = self
            .declarations
            .iter()
            .filter_map(|declaration| {
                let body = declaration.body.as_ref()?;

                let mut lowerer = Lowerer {
                    names: &mut *names,
                    body: Vec::new(),
                };

                for item in &body.items {
                    lowerer.block_item(item);
                }

                // Retorno implícito por si el control cae del final
                lowerer
                    .body
                    .push(Instruction::Return(Operand::Constant(0)));

                let parameters = declaration
                    .parameters
                    .iter()
                    .map(|parameter| {
                        match &parameter.name {
                            Some(name) => name.as_ref().clone(),
                            None => unreachable!("unnamed parameter survived semantic analysis"),
                        }
                    })
                    .collect();

                Some(Function {
                    name: declaration.name.as_ref().clone(),
                    parameters,
                    body: lowerer.body,
                })
            })
            .collect();

        Program { functions }
    }
}

struct Lowerer<'a> {
    names: &'a mut NameGenerator,
    body: Vec<Instruction>,
}

impl Lowerer<'_> {
    fn block_item(&mut self, item: &BlockItem) {
        match item {
            BlockItem::Variable(declaration) => {
                // Sin inicializador no se emite nada; la ranura la
                // materializa el legalizador
                if let Some(init) = &declaration.init {
                    let value = self.expr(init.as_ref());
                    self.body.push(Instruction::Load {
                        dest: Operand::Var(declaration.name.as_ref().clone()),
                        src: value,
                    });
                }
            }

            BlockItem::Function(_) => (),
            BlockItem::Statement(statement) => self.statement(statement),
        }
    }

    fn statement(&mut self, statement: &parse::Statement) {
        use parse::Statement::*;

        match statement {
            Return(value) => {
                let value = self.expr(value.as_ref());
                self.body.push(Instruction::Return(value));
            }

            Expression(value) => {
                self.expr(value.as_ref());
            }

            If {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.expr(condition.as_ref());

                match otherwise {
                    Some(otherwise) => {
                        let else_label = self.names.label();
                        let end_label = self.names.label();

                        self.body.push(Instruction::JumpIfZero {
                            condition,
                            target: else_label.clone(),
                        });

                        self.statement(then);
                        self.body.push(Instruction::Jump(end_label.clone()));
                        self.body.push(Instruction::Label(else_label));
                        self.statement(otherwise);
                        self.body.push(Instruction::Label(end_label));
                    }

                    None => {
                        let end_label = self.names.label();

                        self.body.push(Instruction::JumpIfZero {
                            condition,
                            target: end_label.clone(),
                        });

                        self.statement(then);
                        self.body.push(Instruction::Label(end_label));
                    }
                }
            }

            Compound(block) => {
                for item in &block.items {
                    self.block_item(item);
                }
            }

            For {
                init,
                condition,
                post,
                body,
                label,
            } => {
                let label = loop_label(label);

                match init {
                    Some(ForInit::Declaration(declaration)) => {
                        if let Some(init) = &declaration.init {
                            let value = self.expr(init.as_ref());
                            self.body.push(Instruction::Load {
                                dest: Operand::Var(declaration.name.as_ref().clone()),
                                src: value,
                            });
                        }
                    }

                    Some(ForInit::Expression(init)) => {
                        self.expr(init.as_ref());
                    }

                    None => (),
                }

                // El ciclo evalúa la condición en start_, ejecuta el
                // paso post en continue_ y sale por break_
                self.body.push(Instruction::Label(format!("start_{}", label)));

                if let Some(condition) = condition {
                    let condition = self.expr(condition.as_ref());
                    self.body.push(Instruction::JumpIfZero {
                        condition,
                        target: format!("break_{}", label),
                    });
                }

                self.statement(body);
                self.body
                    .push(Instruction::Label(format!("continue_{}", label)));

                if let Some(post) = post {
                    self.expr(post.as_ref());
                }

                self.body
                    .push(Instruction::Jump(format!("start_{}", label)));
                self.body
                    .push(Instruction::Label(format!("break_{}", label)));
            }

            While {
                condition,
                body,
                label,
            } => {
                let label = loop_label(label);

                // La condición se evalúa en continue_, inmediatamente
                // después de start_
                self.body.push(Instruction::Label(format!("start_{}", label)));
                self.body
                    .push(Instruction::Label(format!("continue_{}", label)));

                let condition = self.expr(condition.as_ref());
                self.body.push(Instruction::JumpIfZero {
                    condition,
                    target: format!("break_{}", label),
                });

                self.statement(body);
                self.body
                    .push(Instruction::Jump(format!("start_{}", label)));
                self.body
                    .push(Instruction::Label(format!("break_{}", label)));
            }

            DoWhile {
                body,
                condition,
                label,
            } => {
                let label = loop_label(label);

                // El cuerpo se ejecuta primero; la condición en
                // continue_ salta de regreso a start_ si no es cero
                self.body.push(Instruction::Label(format!("start_{}", label)));
                self.statement(body);
                self.body
                    .push(Instruction::Label(format!("continue_{}", label)));

                let condition = self.expr(condition.as_ref());
                self.body.push(Instruction::JumpIfNotZero {
                    condition,
                    target: format!("start_{}", label),
                });

                self.body
                    .push(Instruction::Label(format!("break_{}", label)));
            }

            Break { label, .. } => {
                self.body
                    .push(Instruction::Jump(format!("break_{}", loop_label(label))));
            }

            Continue { label, .. } => {
                self.body
                    .push(Instruction::Jump(format!("continue_{}", loop_label(label))));
            }

            Null => (),
        }
    }

    fn expr(&mut self, expr: &parse::Expr) -> Operand {
        use parse::Expr::*;

        match expr {
            Constant(value) => Operand::Constant(*value),
            Variable(name) => Operand::Var(name.clone()),

            Assignment(target, value) => {
                let target = self.expr(target.as_ref().as_ref());
                let value = self.expr(value.as_ref().as_ref());

                self.body.push(Instruction::Load {
                    dest: target,
                    src: value.clone(),
                });

                // Una asignación produce el valor asignado
                value
            }

            Unary(operator, inner) => {
                let src = self.expr(inner.as_ref().as_ref());

                match operator {
                    UnaryOp::Negate => {
                        let dest = Operand::Var(self.names.temp());
                        self.body.push(Instruction::Neg {
                            dest: dest.clone(),
                            src,
                        });
                        dest
                    }

                    UnaryOp::Complement => {
                        let dest = Operand::Var(self.names.temp());
                        self.body.push(Instruction::Complement {
                            dest: dest.clone(),
                            src,
                        });
                        dest
                    }

                    // `!x` equivale a `x == 0`
                    UnaryOp::Not => {
                        let dest = Operand::Var(self.names.temp());
                        self.body.push(Instruction::Equal {
                            dest: dest.clone(),
                            src1: src,
                            src2: Operand::Constant(0),
                        });
                        dest
                    }

                    UnaryOp::Increment => {
                        self.body.push(Instruction::Add {
                            dest: src.clone(),
                            src1: src.clone(),
                            src2: Operand::Constant(1),
                        });
                        src
                    }

                    UnaryOp::Decrement => {
                        self.body.push(Instruction::Sub {
                            dest: src.clone(),
                            src1: src.clone(),
                            src2: Operand::Constant(1),
                        });
                        src
                    }
                }
            }

            Postfix(operator, inner) => {
                let src = self.expr(inner.as_ref().as_ref());

                // El valor viejo se preserva en un temporal antes de
                // actualizar la variable
                let old = Operand::Var(self.names.temp());
                self.body.push(Instruction::Load {
                    dest: old.clone(),
                    src: src.clone(),
                });

                let instruction = match operator {
                    PostfixOp::Increment => Instruction::Add {
                        dest: src.clone(),
                        src1: src,
                        src2: Operand::Constant(1),
                    },

                    PostfixOp::Decrement => Instruction::Sub {
                        dest: src.clone(),
                        src1: src,
                        src2: Operand::Constant(1),
                    },
                };

                self.body.push(instruction);
                old
            }

            Binary(BinOp::LogicAnd, first, second) => {
                let fail_label = self.names.label();
                let end_label = self.names.label();

                let src1 = self.expr(first.as_ref().as_ref());
                self.body.push(Instruction::JumpIfZero {
                    condition: src1,
                    target: fail_label.clone(),
                });

                // El operando derecho solo se evalúa si el izquierdo
                // no decidió ya el resultado
                let src2 = self.expr(second.as_ref().as_ref());
                self.body.push(Instruction::JumpIfZero {
                    condition: src2,
                    target: fail_label.clone(),
                });

                let dest = Operand::Var(self.names.temp());
                self.body.push(Instruction::Load {
                    dest: dest.clone(),
                    src: Operand::Constant(1),
                });
                self.body.push(Instruction::Jump(end_label.clone()));
                self.body.push(Instruction::Label(fail_label));
                self.body.push(Instruction::Load {
                    dest: dest.clone(),
                    src: Operand::Constant(0),
                });
                self.body.push(Instruction::Label(end_label));

                dest
            }

            Binary(BinOp::LogicOr, first, second) => {
                let success_label = self.names.label();
                let end_label = self.names.label();

                let src1 = self.expr(first.as_ref().as_ref());
                self.body.push(Instruction::JumpIfNotZero {
                    condition: src1,
                    target: success_label.clone(),
                });

                let src2 = self.expr(second.as_ref().as_ref());
                self.body.push(Instruction::JumpIfNotZero {
                    condition: src2,
                    target: success_label.clone(),
                });

                let dest = Operand::Var(self.names.temp());
                self.body.push(Instruction::Load {
                    dest: dest.clone(),
                    src: Operand::Constant(0),
                });
                self.body.push(Instruction::Jump(end_label.clone()));
                self.body.push(Instruction::Label(success_label));
                self.body.push(Instruction::Load {
                    dest: dest.clone(),
                    src: Operand::Constant(1),
                });
                self.body.push(Instruction::Label(end_label));

                dest
            }

            Binary(operator, first, second) => {
                let src1 = self.expr(first.as_ref().as_ref());
                let src2 = self.expr(second.as_ref().as_ref());
                let dest = Operand::Var(self.names.temp());

                let instruction = binary_instruction(*operator, dest.clone(), src1, src2);
                self.body.push(instruction);

                dest
            }

            Ternary {
                condition,
                true_value,
                false_value,
            } => {
                let condition = self.expr(condition.as_ref().as_ref());

                let result = Operand::Var(self.names.temp());
                let false_label = self.names.label();
                let end_label = self.names.label();

                self.body.push(Instruction::JumpIfZero {
                    condition,
                    target: false_label.clone(),
                });

                let true_value = self.expr(true_value.as_ref().as_ref());
                self.body.push(Instruction::Load {
                    dest: result.clone(),
                    src: true_value,
                });
                self.body.push(Instruction::Jump(end_label.clone()));
                self.body.push(Instruction::Label(false_label));

                let false_value = self.expr(false_value.as_ref().as_ref());
                self.body.push(Instruction::Load {
                    dest: result.clone(),
                    src: false_value,
                });
                self.body.push(Instruction::Label(end_label));

                result
            }

            Call { callee, arguments } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| self.expr(argument.as_ref()))
                    .collect();

                let output = Operand::Var(self.names.temp());
                self.body.push(Instruction::Call {
                    target: callee.as_ref().clone(),
                    output: output.clone(),
                    arguments,
                });

                output
            }
        }
    }
}

fn binary_instruction(
    operator: BinOp,
    dest: Operand,
    src1: Operand,
    src2: Operand,
) -> Instruction {
    match operator {
        BinOp::Add => Instruction::Add { dest, src1, src2 },
        BinOp::Sub => Instruction::Sub { dest, src1, src2 },
        BinOp::Mul => Instruction::Mul { dest, src1, src2 },
        BinOp::Div => Instruction::Div { dest, src1, src2 },
        BinOp::Mod => Instruction::Mod { dest, src1, src2 },
        BinOp::BitAnd => Instruction::BitAnd { dest, src1, src2 },
        BinOp::Equal => Instruction::Equal { dest, src1, src2 },
        BinOp::NotEqual => Instruction::NotEqual { dest, src1, src2 },
        BinOp::Less => Instruction::Less { dest, src1, src2 },
        BinOp::LessOrEqual => Instruction::LessEqual { dest, src1, src2 },
        BinOp::Greater => Instruction::Greater { dest, src1, src2 },
        BinOp::GreaterOrEqual => Instruction::GreaterEqual { dest, src1, src2 },

        BinOp::LogicAnd | BinOp::LogicOr => {
            unreachable!("short-circuit operators lower to branches")
        }
    }
}

fn loop_label(label: &Option<String>) -> &str {
    match label {
        Some(label) => label,
        None => unreachable!("loop control statement was not labeled"),
    }
}
