use crate::lex::Literal;

use std::{
    fmt,
    io::{self, Write},
};

/// Símbolo de entrada que espera `ld` por omisión.
const ENTRY: &str = "_start";

/// Número de llamada al sistema `exit` en Linux x86-64.
const SYS_EXIT: u32 = 60;

#[derive(Copy, Clone)]
pub enum Reg {
    Rax,
    Rdi,
    Rsi,
    Rdx,
    R10,
    R8,
    R9,
}

impl Reg {
    /* La ABI de llamadas al sistema coloca el número de llamada en %rax y
     * hasta 6 argumentos en %rdi, %rsi, %rdx, %r10, %r8 y %r9.
     */
    const MAX_ARGS: usize = 6;

    fn syscall_arguments() -> impl Iterator<Item = Reg> {
        use Reg::*;

        std::iter::successors(Some(Rdi), |last| match last {
            Rdi => Some(Rsi),
            Rsi => Some(Rdx),
            Rdx => Some(R10),
            R10 => Some(R8),
            R8 => Some(R9),
            _ => None,
        })
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Reg::*;

        let name = match self {
            Rax => "rax",
            Rdi => "rdi",
            Rsi => "rsi",
            Rdx => "rdx",
            R10 => "r10",
            R8 => "r8",
            R9 => "r9",
        };

        formatter.write_str(name)
    }
}

/// Emisor de ensamblador x86-64 en sintaxis NASM para Linux.
pub struct Emitter<'a, W> {
    output: &'a mut W,
}

impl<'a, W: Write> Emitter<'a, W> {
    pub fn new(output: &'a mut W) -> Self {
        Emitter { output }
    }

    fn syscall(&mut self, number: u32, arguments: &[&dyn fmt::Display]) -> io::Result<()> {
        debug_assert!(arguments.len() <= Reg::MAX_ARGS);

        emit!(self, "mov", "{}, {}", Reg::Rax, number)?;
        for (argument, register) in arguments.iter().zip(Reg::syscall_arguments()) {
            emit!(self, "mov", "{}, {}", register, argument)?;
        }

        emit!(self, "syscall")
    }
}

impl<W: Write> super::Emitter for Emitter<'_, W> {
    fn entry(&mut self) -> io::Result<()> {
        writeln!(self.output, "global {}", ENTRY)?;
        writeln!(self.output, "{}:", ENTRY)
    }

    fn exit(&mut self, status: &Literal) -> io::Result<()> {
        self.syscall(SYS_EXIT, &[status])
    }
}
