//! Análisis sintáctico.
//!
//! El parser recorre la secuencia de tokens de principio a fin. Cada
//! palabra clave `exit` inicia una sentencia que debe continuar con una
//! constante entera y un `;`. Si el programa contiene varias sentencias,
//! prevalece la última. Cualquier otro token que aparezca fuera de una
//! sentencia se ignora.
//!
//! Un programa sin sentencias no es un error sintáctico: [`parse()`]
//! retorna `None` y le corresponde al llamador decidir qué hacer.

use std::slice;
use thiserror::Error;

use crate::{
    lex::{Keyword, Literal, Token},
    source::{Located, Location},
};

/// Árbol sintáctico de un programa completo.
#[derive(Debug)]
pub struct Ast(Located<Statement>);

impl Ast {
    /// Obtiene la sentencia que determina el comportamiento del programa.
    pub fn statement(&self) -> &Located<Statement> {
        &self.0
    }
}

#[derive(Debug)]
pub enum Statement {
    /// `exit <expr>;`
    Exit(Located<Expr>),
}

#[derive(Debug)]
pub enum Expr {
    Integer(Located<Literal>),
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Invalid expression, expected an integer literal")]
    ExpectedExpr,

    #[error("Expected token {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected token {0}, none was found instead")]
    MissingToken(Token),
}

/// Construye el árbol sintáctico a partir de una secuencia de tokens.
pub fn parse(tokens: &[Located<Token>]) -> Result<Option<Ast>, Located<ParserError>> {
    let last_known = match tokens.first() {
        Some(first) => first.location().clone(),
        None => return Ok(None),
    };

    let mut parser = Parser {
        tokens: tokens.iter(),
        last_known,
    };

    let ast = parser.program()?;
    match &ast {
        Some(ast) => log::debug!("Parsed {:?}", ast),
        None => log::debug!("No statements found among {} tokens", tokens.len()),
    }

    Ok(ast)
}

struct Parser<'a> {
    tokens: slice::Iter<'a, Located<Token>>,
    last_known: Location,
}

type Parse<T> = Result<T, Located<ParserError>>;

impl<'a> Parser<'a> {
    fn program(&mut self) -> Parse<Option<Ast>> {
        let mut ast = None;
        while let Some(token) = self.next() {
            match token.val() {
                Token::Keyword(Keyword::Exit) => {
                    let statement = self.exit(token.location().clone())?;
                    ast = Some(Ast(statement));
                }

                other => log::trace!("Skipping stray {} at {}", other, token.location()),
            }
        }

        Ok(ast)
    }

    fn exit(&mut self, start: Location) -> Parse<Located<Statement>> {
        let expr = self.expr()?;
        self.expect(Token::Semicolon)?;

        let location = Location::span(start, &self.last_known);
        Ok(Located::at(Statement::Exit(expr), location))
    }

    fn expr(&mut self) -> Parse<Located<Expr>> {
        let token = match self.next() {
            Some(token) => token,
            None => return self.fail(ParserError::ExpectedExpr),
        };

        match token.val() {
            Token::IntLiteral(literal) => {
                let location = token.location().clone();
                let literal = Located::at(literal.clone(), location.clone());

                Ok(Located::at(Expr::Integer(literal), location))
            }

            _ => self.fail(ParserError::ExpectedExpr),
        }
    }

    fn expect(&mut self, token: Token) -> Parse<()> {
        match self.next() {
            Some(found) if *found.val() == token => Ok(()),
            Some(found) => self.fail(ParserError::UnexpectedToken(token, found.val().clone())),
            None => self.fail(ParserError::MissingToken(token)),
        }
    }

    fn next(&mut self) -> Option<&'a Located<Token>> {
        let token = self.tokens.next()?;
        self.last_known = token.location().clone();

        Some(token)
    }

    fn fail<T>(&self, error: ParserError) -> Parse<T> {
        Err(Located::at(error, self.last_known.clone()))
    }
}
