//! Detalles específicos para cada arquitectura objetivo.
//!
//! Este módulo expone la interfaz de emisión que implementa cada
//! arquitectura en su propio submódulo. La traducción del árbol
//! sintáctico a estas operaciones ocurre en `codegen`.

use crate::lex::Literal;
use std::io;

mod x86_64;

pub use x86_64::Emitter as X86_64;

/// Emisión de código ensamblador para un programa.
///
/// Los tipos que implementan este trait traducen las operaciones
/// primitivas del lenguaje a instrucciones de la arquitectura objetivo.
pub trait Emitter {
    /// Declara y coloca el punto de entrada del programa.
    fn entry(&mut self) -> io::Result<()>;

    /// Termina el proceso con un código de salida.
    ///
    /// El literal se emite tal cual, como operando inmediato.
    fn exit(&mut self, status: &Literal) -> io::Result<()>;
}
