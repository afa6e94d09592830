//! Generación de nombres únicos.
//!
//! Una misma instancia de [`NameGenerator`] atraviesa toda la
//! compilación, de manera que variables resueltas, temporales y
//! etiquetas jamás colisionen entre sí dentro del programa emitido.
//! Los contadores nunca se reinician a media compilación; dos
//! corridas sobre el mismo fuente producen salidas idénticas.

use crate::lex::Identifier;

#[derive(Default)]
pub struct NameGenerator {
    temps: u32,
    labels: u32,
    variables: u32,
    loops: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        NameGenerator::default()
    }

    /// Acuña un nombre de temporal: `tmp0`, `tmp1`, ...
    pub fn temp(&mut self) -> Identifier {
        let next = self.temps;
        self.temps += 1;

        Identifier::from(format!("tmp{}", next))
    }

    /// Acuña una etiqueta de salto: `label0`, `label1`, ...
    pub fn label(&mut self) -> String {
        let next = self.labels;
        self.labels += 1;

        format!("label{}", next)
    }

    /// Renombra una variable a su forma única: `x` se vuelve `x.0`.
    pub fn variable(&mut self, original: &Identifier) -> Identifier {
        let next = self.variables;
        self.variables += 1;

        Identifier::from(format!("{}.{}", original, next))
    }

    /// Acuña la etiqueta de un ciclo a partir de su clase: `while.0`.
    pub fn loop_label(&mut self, kind: &str) -> String {
        let next = self.loops;
        self.loops += 1;

        format!("{}.{}", kind, next)
    }
}
