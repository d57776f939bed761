//! Generación de código.
//!
//! Recorre el árbol sintáctico y delega cada sentencia a un
//! [`Emitter`] de la arquitectura objetivo. Nuevas sentencias se
//! incorporan aquí como nuevas reglas de traducción, sin afectar
//! al lexer ni al parser.

use crate::{
    arch::{Emitter, X86_64},
    parse::{Ast, Expr, Statement},
};

use std::io::{self, Write};

/// Emite el programa completo como ensamblador x86-64 (NASM).
pub fn emit<W: Write>(ast: &Ast, output: &mut W) -> io::Result<()> {
    let mut emitter = X86_64::new(output);
    emitter.entry()?;

    match ast.statement().val() {
        Statement::Exit(expr) => {
            let Expr::Integer(status) = expr.val();
            emitter.exit(status.val())?;
        }
    }

    Ok(())
}

/// Genera el ensamblador como texto.
pub fn generate(ast: &Ast) -> io::Result<String> {
    let mut buffer = Vec::new();
    emit(ast, &mut buffer)?;

    let text = String::from_utf8(buffer)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    log::debug!("Generated {} bytes of assembly", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex, parse, source::Source};

    fn compile(text: &str) -> String {
        let source = Source::new("test.hy", text);
        let tokens = lex::tokenize(&source).unwrap();
        let ast = parse::parse(&tokens).unwrap().unwrap();

        generate(&ast).unwrap()
    }

    #[test]
    fn exit_program() {
        assert_eq!(
            compile("exit 42;"),
            "global _start\n_start:\n    mov rax, 60\n    mov rdi, 42\n    syscall\n"
        );
    }

    #[test]
    fn exit_zero() {
        assert!(compile("exit 0;").contains("mov rdi, 0\n"));
    }

    #[test]
    fn literal_is_emitted_verbatim() {
        for digits in ["0", "007", "255", "256", "18446744073709551615", "123456789012345678901234567890"] {
            let asm = compile(&format!("exit {};", digits));
            assert!(asm.contains(&format!("    mov rdi, {}\n", digits)), "{}", asm);
        }
    }

    #[test]
    fn only_last_statement_is_emitted() {
        let asm = compile("exit 1; exit 2;");
        assert!(asm.contains("mov rdi, 2\n"));
        assert!(!asm.contains("mov rdi, 1\n"));
        assert_eq!(asm.matches("syscall").count(), 1);
    }
}
