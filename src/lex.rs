//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone el contenido completo
//! de un [`Source`] en unidades léxicas denominadas tokens. Los espacios
//! en blanco se descartan durante esta operación. Cada token emitido está
//! asociado a una ubicación en el código fuente original, lo cual permite
//! rastrear errores tanto en los mismos como en constructos de fases
//! posteriores.
//!
//! # Contenido de un token
//! Puntuación y palabras clave se identifican por el hecho de lo que son y
//! no incluyen lexemas. Las constantes enteras, por el contrario, preservan
//! su lexema exacto como texto. No se resuelven a valores numéricos en esta
//! fase, por lo que no existe límite de rango.
//!
//! # Reglas importantes del lenguaje
//! - Un término comienza con una letra ASCII y continúa con letras o dígitos.
//! - El único término válido es la palabra clave `exit`. No hay identificadores.
//! - El lenguaje distingue mayúsculas de minúsculas.
//!
//! # Errores
//! El primer error léxico detiene el análisis. No hay recuperación.

use crate::source::{Chars, Located, Location, Source};
use std::{
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::FromStr,
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// Un término que no corresponde a ninguna palabra clave.
    #[error("Unknown word `{0}`, expected keyword `exit`")]
    UnknownWord(String),
}

/// Texto de una constante entera.
///
/// Siempre consiste de uno o más dígitos decimales.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(Rc<str>);

impl Display for Literal {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en el programa fuente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Palabra clave.
    Keyword(Keyword),

    /// Literal de entero.
    IntLiteral(Literal),

    /// `;`
    Semicolon,
}

impl Token {
    /// Texto que corresponde a este token en el código fuente.
    pub fn lexeme(&self) -> &str {
        match self {
            Token::Keyword(keyword) => keyword.name(),
            Token::IntLiteral(literal) => &literal.0,
            Token::Semicolon => ";",
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(_) => write!(fmt, "keyword `{}`", self.lexeme()),
            Token::IntLiteral(_) => write!(fmt, "literal `{}`", self.lexeme()),
            Token::Semicolon => fmt.write_str("`;`"),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Exit,
}

const KEYWORDS: &[(&str, Keyword)] = &[("exit", Keyword::Exit)];

impl Keyword {
    /// Escritura de la palabra clave en código fuente.
    pub fn name(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|&&(_, keyword)| keyword == self)
            .map(|&(name, _)| name)
            .unwrap_or_default()
    }
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Descompone un archivo completo en tokens.
///
/// Se detiene en el primer error léxico.
pub fn tokenize(source: &Rc<Source>) -> Result<Vec<Located<Token>>, Located<LexerError>> {
    let tokens = Lexer::new(source).collect::<Result<Vec<_>, _>>()?;
    log::debug!("{}: scanned {} tokens", source.name(), tokens.len());

    Ok(tokens)
}

/// Cursor de análisis léxico sobre un [`Source`].
///
/// Como iterador, emite tokens hasta encontrar el fin de la entrada o
/// un error. Luego de un error no se emite nada más.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Crea un lexer posicionado al inicio del origen.
    pub fn new(source: &'a Rc<Source>) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            failed: false,
        }
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<Located<Token>>, Located<LexerError>> {
        // Los espacios en blanco nunca forman parte de un token
        let (first, start) = loop {
            match self.chars.next() {
                None => return Ok(None),
                Some((c, _)) if c.is_ascii_whitespace() => continue,
                Some(next) => break next,
            }
        };

        let mut end = start.clone();
        let token = match first {
            ';' => Token::Semicolon,

            // Constantes enteras, se preserva el texto de los dígitos
            c if c.is_ascii_digit() => {
                let digits = self.take_while(c, &mut end, |c| c.is_ascii_digit());
                Token::IntLiteral(Literal(digits.into()))
            }

            // Palabras clave
            c if c.is_ascii_alphabetic() => {
                let word = self.take_while(c, &mut end, |c| c.is_ascii_alphanumeric());
                match Keyword::from_str(&word) {
                    Ok(keyword) => Token::Keyword(keyword),
                    Err(()) => {
                        let location = Location::span(start, &end);
                        return Err(Located::at(LexerError::UnknownWord(word), location));
                    }
                }
            }

            c => return Err(Located::at(LexerError::BadChar(c), start)),
        };

        Ok(Some(Located::at(token, Location::span(start, &end))))
    }

    /// Acumula una secuencia máxima de caracteres que cumplen con `accept`,
    /// a partir de un primer carácter ya consumido.
    fn take_while<F>(&mut self, first: char, end: &mut Location, accept: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut buffer = String::from(first);
        while let Some((c, location)) = self.chars.next_if(|&(c, _)| accept(c)) {
            buffer.push(c);
            *end = location;
        }

        buffer
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.lex() {
            Ok(token) => token.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}
