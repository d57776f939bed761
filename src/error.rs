//! Reporte de errores.
//!
//! Cualquier fase del compilador puede fallar con un error ubicado en el
//! código fuente. [`Diagnostics`] da formato a ese error junto a la línea
//! original y un subrayado del rango exacto que lo provocó.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn error(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

/// Un error fatal listo para mostrarse.
pub struct Diagnostics {
    kind: &'static str,
    error: Box<dyn 'static + LocatedError>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            kind: "error",
            error: Box::new(error),
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, error } = self;

        writeln!(fmt, "{}: {}", kind, error.error())?;

        let location = error.location();
        writeln!(fmt, " --> {}", location)?;

        let (start, end) = (location.start(), location.end());
        let digits = end.line().to_string().len();
        writeln!(fmt, "{:digits$} |", "", digits = digits)?;

        for line_number in start.line()..=end.line() {
            let line = location.source().excerpt(line_number).unwrap_or_default();
            writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)?;
        }

        let (from, to) = (start.column(), end.column() - 1);
        let min = from.min(to);
        let max = from.max(to);

        let skip = (min - 1) as usize;
        let highlight = (max - min + 1) as usize;

        writeln!(
            fmt,
            "{:digits$} | {:skip$}{:^<highlight$}",
            "",
            "",
            "",
            digits = digits,
            skip = skip,
            highlight = highlight
        )?;

        writeln!(fmt)?;
        writeln!(fmt, "Build failed")
    }
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn error(&self) -> &dyn Error {
        self.val()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex, parse, source::Source};

    #[test]
    fn lexical_error_report() {
        let source = Source::new("test.hy", "exit 1 # 2;");
        let error = lex::tokenize(&source).unwrap_err();

        let report = Diagnostics::from(error).kind("Lexical error").to_string();
        assert_eq!(
            report,
            "Lexical error: Bad character '#' in input stream\n \
             --> test.hy:1:8\n  \
             |\n\
             1 | exit 1 # 2;\n  \
             |        ^\n\
             \n\
             Build failed\n"
        );
    }

    #[test]
    fn highlight_covers_token() {
        let source = Source::new("test.hy", "exit 1;\n  exit hello;");
        let error = lex::tokenize(&source).unwrap_err();

        let report = Diagnostics::from(error).to_string();
        assert!(report.starts_with("error: Unknown word `hello`"));
        assert!(report.contains(" --> test.hy:[2:8-2:12]\n"));
        assert!(report.contains("2 |   exit hello;\n"));
        assert!(report.contains("  |        ^^^^^\n"));
    }

    #[test]
    fn highlight_with_tabs() {
        let source = Source::new("test.hy", "\texit 1 # 2;");
        let error = lex::tokenize(&source).unwrap_err();

        let report = Diagnostics::from(error).to_string();
        assert!(report.contains(" --> test.hy:1:12\n"));
        assert!(report.contains("1 |     exit 1 # 2;\n"));

        let caret = report.lines().find(|line| line.ends_with('^')).unwrap();
        let excerpt = report.lines().find(|line| line.starts_with("1 |")).unwrap();
        assert_eq!(caret.find('^'), excerpt.find('#'));
    }

    #[test]
    fn syntax_error_report() {
        let source = Source::new("test.hy", "exit;");
        let tokens = lex::tokenize(&source).unwrap();
        let error = parse::parse(&tokens).unwrap_err();

        let report = Diagnostics::from(error).kind("Syntax error").to_string();
        assert!(report.starts_with("Syntax error: Invalid expression"));
        assert!(report.contains(" --> test.hy:1:5\n"));
    }
}
