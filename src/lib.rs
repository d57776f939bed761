//! Compilador para el lenguaje hydro.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente, descrito
//! por [`source`]. Este archivo se somete primero a análisis léxico en
//! [`lex`], de lo cual se obtiene una secuencia de tokens. La secuencia
//! se dispone en un AST por medio de análisis sintáctico en [`parse`].
//! El lenguaje admite una única forma de sentencia, `exit <entero>;`,
//! por lo que el AST consiste a lo sumo de una sentencia.
//!
//! # Back end
//! El AST se traduce directamente a ensamblador x86-64 en sintaxis NASM
//! por medio de [`target`]. El ensamblado y enlazado se delegan a `nasm`
//! y `ld` en [`link`].
//!
//! Ninguna fase termina el proceso por su cuenta: todas retornan errores
//! ubicados que [`error::Diagnostics`] sabe mostrar.

#[macro_use]
mod macros;

pub mod error;
pub mod lex;
pub mod link;
pub mod parse;
pub mod source;

mod arch;
mod codegen;

/// Emisión de código.
///
/// Este módulo reexporta suficientes ítems internos relacionados a
/// generación de código para traducir un AST a ensamblador.
pub mod target {
    pub use crate::codegen::{emit, generate};
}
