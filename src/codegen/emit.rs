//! Emisión del listado final.
//!
//! Cada instrucción se serializa en un esquema de tres columnas:
//! mnemónico con su operando, relleno a columna fija, y un comentario
//! opcional precedido por `;`. Antes de cada expansión se emite una
//! línea `;;` con la forma de árbol de la instrucción, lo cual vuelve
//! el listado legible sin el fuente a mano. Las etiquetas no llevan
//! sangría.
//!
//! El protocolo de escenificación de operandos vive aquí: leer una
//! ranura de pila exige calcular su dirección efectiva en A y
//! desreferenciarla con `ldmaa`, y como B no direcciona memoria, toda
//! carga hacia B pasa primero por A con `%r12`/`%r13` de por medio.

use std::io::{self, Write};

use super::{Function, Instruction, Operand, Program, Register};

/// Dirección inicial del puntero de pila.
const STACK_INIT: u16 = 0xfffe;

impl Program {
    /// Serializa el programa completo.
    ///
    /// El listado siempre comienza inicializando el puntero de pila y
    /// saltando a `main`, y termina con `hlt`.
    pub fn emit<W: Write>(&self, output: &mut W) -> io::Result<()> {
        com!(output, "program")?;
        emitc!(output, "lds {:#06x}", STACK_INIT; "initialize the stack pointer")?;
        emitc!(output, "ldrs {}", Register::R15; "initialize the frame pointer")?;
        emitc!(output, "jmp main"; "transfer control to the entry point (not a call)")?;
        writeln!(output)?;

        for function in &self.functions {
            function.emit(output)?;
        }

        emitc!(output, "hlt"; "halt at the end of the program")
    }
}

impl Function {
    fn emit<W: Write>(&self, output: &mut W) -> io::Result<()> {
        label!(output, self.name)?;

        com!(output, "function prologue")?;
        emitc!(output, "pushr {}", Register::R15; "save the caller's frame pointer")?;
        emitc!(output, "pushr2 {}", Register::R15; "second half of the push")?;
        emitc!(output, "ldrs {}", Register::R15; "the new frame begins at the stack pointer")?;
        writeln!(output)?;

        com!(output, "AllocateStack({})", self.frame)?;
        emit!(output, "ldas")?;
        emitc!(output, "ldbi {}", self.frame; "slots reserved for locals")?;
        emit!(output, "sub")?;
        emit!(output, "ldsa")?;
        writeln!(output)?;

        for instruction in &self.body {
            instruction.emit(output)?;
        }

        Ok(())
    }
}

impl Instruction {
    fn emit<W: Write>(&self, output: &mut W) -> io::Result<()> {
        use Instruction::*;

        com!(output, "{}", self)?;
        match self {
            Load { dest, src } => {
                load_a(output, src)?;
                store_a(output, dest)?;
            }

            Push(operand) => {
                load_a(output, operand)?;
                emitc!(output, "ldra {}", Register::R14; "stage the value to be pushed")?;
                emit!(output, "pushr {}", Register::R14)?;
                emit!(output, "pushr2 {}", Register::R14)?;
            }

            Call(target) => {
                emitc!(output, "subr {}", target; "function call")?;
                emitc!(output, "subr2 {}", target; "second half of the call")?;
            }

            DeallocateStack(size) => {
                emit!(output, "ldas")?;
                emitc!(output, "ldbi {}", size; "slots occupied by arguments")?;
                emit!(output, "add")?;
                emit!(output, "ldsa")?;
            }

            Return => {
                com!(output, "function epilogue")?;
                emitc!(output, "ldsr {}", Register::R15; "rewind the stack pointer to the frame base")?;
                emitc!(output, "popr {}", Register::R15; "restore the caller's frame pointer")?;
                emitc!(output, "popr2 {}", Register::R15; "second half of the pop")?;
                emit!(output, "ret")?;
                emit!(output, "ret2")?;
            }

            Neg { dest, src } => {
                load_b(output, src)?;
                emitc!(output, "ldai 0"; "negation is a subtraction from zero")?;
                emit!(output, "sub")?;
                store_a(output, dest)?;
            }

            Complement { dest, src } => {
                load_b(output, src)?;
                emitc!(output, "ldai 0xffff"; "subtracting from all ones inverts every bit")?;
                emit!(output, "sub")?;
                store_a(output, dest)?;
            }

            Add { dest, src1, src2 } => alu(output, "add", dest, src1, src2)?,
            Sub { dest, src1, src2 } => alu(output, "sub", dest, src1, src2)?,
            Mul { dest, src1, src2 } => alu(output, "mul", dest, src1, src2)?,
            Div { dest, src1, src2 } => alu(output, "div", dest, src1, src2)?,
            Mod { dest, src1, src2 } => alu(output, "mod", dest, src1, src2)?,
            And { dest, src1, src2 } => alu(output, "and", dest, src1, src2)?,

            Cmp { src1, src2 } => {
                load_a(output, src1)?;
                load_b(output, src2)?;
                emit!(output, "cmp")?;
            }

            Jump(target) => emit!(output, "jmp {}", target)?,
            JumpZero(target) => emitc!(output, "jz {}", target; "jump if zero")?,
            JumpLess(target) => emitc!(output, "jl {}", target; "jump if lesser")?,
            JumpGreater(target) => emitc!(output, "jg {}", target; "jump if greater")?,

            Label(name) => label!(output, name)?,
        }

        writeln!(output)
    }
}

/// Operación de ALU: A recibe el operando izquierdo, B el derecho, el
/// resultado queda en A y de ahí va al destino.
fn alu<W: Write>(
    output: &mut W,
    mnemonic: &str,
    dest: &Operand,
    src1: &Operand,
    src2: &Operand,
) -> io::Result<()> {
    load_a(output, src1)?;
    load_b(output, src2)?;
    emit!(output, "{}", mnemonic)?;
    store_a(output, dest)
}

/// Carga un operando en el acumulador A.
fn load_a<W: Write>(output: &mut W, operand: &Operand) -> io::Result<()> {
    match operand {
        Operand::Immediate(value) => emitc!(output, "ldai {}", value; "immediate"),
        Operand::Register(register) => emit!(output, "ldar {}", register),

        Operand::Stack(offset) => {
            stack_address(output, *offset)?;
            emitc!(output, "ldmaa"; "dereference the slot address in A")
        }

        Operand::Pseudo(name) => unreachable!("pseudo-register {} reached emission", name),
    }
}

/// Carga un operando en el acumulador B.
///
/// No hay carga de memoria hacia B, así que una ranura de pila pasa
/// primero por A; el contenido original de A se preserva en `%r12`.
fn load_b<W: Write>(output: &mut W, operand: &Operand) -> io::Result<()> {
    match operand {
        Operand::Immediate(value) => emitc!(output, "ldbi {}", value; "immediate"),
        Operand::Register(register) => emit!(output, "ldbr {}", register),

        Operand::Stack(offset) => {
            emitc!(output, "ldra {}", Register::R12; "preserve A across the fetch")?;
            stack_address(output, *offset)?;
            emitc!(output, "ldmaa"; "dereference the slot address in A")?;
            emitc!(output, "ldra {}", Register::R13; "auxiliary")?;
            emitc!(output, "ldbr {}", Register::R13; "transfer the value into B")?;
            emitc!(output, "ldar {}", Register::R12; "restore the original A")
        }

        Operand::Pseudo(name) => unreachable!("pseudo-register {} reached emission", name),
    }
}

/// Escribe el acumulador A en un operando.
fn store_a<W: Write>(output: &mut W, operand: &Operand) -> io::Result<()> {
    match operand {
        Operand::Register(register) => emit!(output, "ldra {}", register),

        Operand::Stack(offset) => {
            emitc!(output, "ldra {}", Register::R12; "preserve A across the store")?;
            emitc!(output, "ldrb {}", Register::R13; "preserve B across the store")?;
            stack_address(output, *offset)?;
            emitc!(output, "ldmra {}", Register::R12; "store the value into the slot")?;
            emitc!(output, "ldar {}", Register::R12; "restore A")?;
            emitc!(output, "ldbr {}", Register::R13; "restore B")
        }

        Operand::Immediate(_) | Operand::Pseudo(_) => {
            unreachable!("bad store destination {}", operand)
        }
    }
}

/// Calcula en A la dirección efectiva de una ranura de pila.
fn stack_address<W: Write>(output: &mut W, offset: i32) -> io::Result<()> {
    emitc!(output, "ldar {}", Register::R15; "start from the frame pointer")?;

    if offset == 0 {
        return com!(output, "offset 0, the address is the frame pointer itself");
    }

    emitc!(output, "ldbi {}", offset.abs(); "slot offset")?;
    if offset > 0 {
        emitc!(output, "sub"; "locals grow downward from the frame pointer")
    } else {
        emitc!(output, "add"; "caller territory sits above the frame pointer")
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::select;

    fn listing(text: &str) -> String {
        let mut program = select(text);
        program.legalize();

        let mut buffer = Vec::new();
        program.emit(&mut buffer).unwrap();

        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn programs_start_with_the_runtime_header() {
        let listing = listing("int main() { return 0; }");

        let header: Vec<_> = listing.lines().take(4).collect();
        assert!(header[0].contains(";; program"));
        assert!(header[1].contains("lds 0xfffe"));
        assert!(header[2].contains("ldrs %r15"));
        assert!(header[3].contains("jmp main"));

        assert!(listing.trim_end().ends_with("; halt at the end of the program"));
    }

    #[test]
    fn labels_are_not_indented() {
        let listing = listing("int main() { while (1) break; return 0; }");

        assert!(listing.lines().any(|line| line == "main:"));
        assert!(listing
            .lines()
            .any(|line| line.starts_with("start_while.") && line.ends_with(':')));
    }

    #[test]
    fn instructions_are_indented_and_commented() {
        let listing = listing("int main() { return 2; }");

        for line in listing.lines() {
            if line.is_empty() || line.ends_with(':') {
                continue;
            }

            assert!(line.starts_with('\t'), "unindented line: {:?}", line);
        }

        assert!(listing.contains("ldai 2"));
        assert!(listing.contains("; immediate"));
        assert!(listing.contains(";; Load(Reg(%r0), Imm(2))"));
    }

    #[test]
    fn slot_zero_skips_the_address_arithmetic() {
        let listing = listing("int main() { int x = 7; return x; }");

        // La primera ranura está en el puntero de marco mismo; no se
        // emite aritmética de desplazamiento para ella
        assert!(listing.contains("offset 0"));
        assert!(listing.contains("ldmra %r12"));
        assert!(listing.contains("ldmaa"));
    }

    #[test]
    fn memory_to_b_transfers_go_through_a() {
        let listing = listing("int main() { int x = 1; int y = 2; return x + y; }");

        // El protocolo de escenificación usa los auxiliares %r12/%r13
        assert!(listing.contains("ldra %r12"));
        assert!(listing.contains("ldbr %r13"));
    }

    #[test]
    fn every_function_emits_prologue_and_epilogue() {
        let listing = listing("int f() { return 1; } int main() { return f(); }");

        assert_eq!(listing.matches("pushr %r15").count(), 2);
        assert_eq!(listing.matches("ldsr %r15").count(), 4);
        assert!(listing.contains("subr f"));
        assert!(listing.contains("ret2"));
    }
}
