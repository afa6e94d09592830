//! Compilador de un subconjunto de C para la computadora Mentat.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente.
//! Este archivo se somete primero a análisis léxico en [`lex`], de
//! lo cual se obtiene un flujo de tokens. El flujo de tokens se
//! dispone en un AST por medio de análisis sintáctico en [`parse`].
//! El árbol sintáctico es procesado por análisis semántico en
//! [`semantic`] (resolución de identificadores, etiquetado de ciclos
//! y verificación de tipos), de lo cual eventualmente se genera una
//! representación intermedia descrita en [`ir`], con lo cual concluyen
//! las fases delanteras del compilador.
//!
//! # Back end
//! En esta sección el compilador deja de ser agnóstico al sistema
//! objetivo. La Mentat es una máquina de dos acumuladores (A y B)
//! en donde solamente A es capaz de direccionar memoria, por lo cual
//! toda operación debe escenificar sus operandos a través de estos
//! dos registros. La selección de instrucciones ocurre en [`codegen`],
//! la asignación de ranuras de pila a registros simbólicos en
//! [`codegen::legalize`] y la emisión del listado final en
//! [`codegen::emit`]. No existe toolchain de ensamblado para la
//! Mentat: el producto del compilador es el propio listado.

#[macro_use]
mod macros;

pub mod codegen;
pub mod error;
pub mod ir;
pub mod lex;
pub mod names;
pub mod parse;
pub mod semantic;
pub mod source;
