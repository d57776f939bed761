//! Rastreo de ubicaciones originales en código fuente.
//!
//! Tanto los tokens como los nodos del árbol sintáctico llevan cuenta
//! del rango de posiciones que ocupan en el archivo original. Esto
//! permite que un error de cualquier fase señale con exactitud el
//! punto del código fuente que lo provocó.

use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Range,
    rc::Rc,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }
}

/// Un archivo de código fuente, leído por completo antes del análisis.
pub struct Source {
    name: String,
    text: String,
}

impl Source {
    /// Construye un origen a partir de su nombre y su contenido.
    pub fn new<N, T>(name: N, text: T) -> Rc<Self>
    where
        N: Into<String>,
        T: Into<String>,
    {
        Rc::new(Source {
            name: name.into(),
            text: text.into(),
        })
    }

    /// Nombre del origen, usualmente una ruta.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Obtiene una línea por número, comenzando en 1.
    pub fn line(&self, number: u32) -> Option<&str> {
        let index = (number as usize).checked_sub(1)?;
        self.text.lines().nth(index)
    }

    /// Obtiene una línea con tabuladores expandidos a espacios, de forma
    /// que cada carácter ocupe la columna que indica su [`Location`].
    pub fn excerpt(&self, number: u32) -> Option<String> {
        let line = self.line(number)?;

        let mut excerpt = String::with_capacity(line.len());
        let mut position = Position::default();
        for c in line.chars() {
            if c == '\t' {
                let next = position.tab();
                let width = (next.column - position.column) as usize;
                excerpt.extend(std::iter::repeat(' ').take(width));
                position = next;
            } else {
                excerpt.push(c);
                position = position.advance();
            }
        }

        Some(excerpt)
    }

    /// Ubicación del primer carácter.
    pub fn start(self: &Rc<Self>) -> Location {
        Location {
            from: Rc::clone(self),
            position: Position::default()..Position::default().advance(),
        }
    }

    /// Recorre el contenido carácter por carácter junto a la ubicación
    /// de cada uno.
    pub fn chars(self: &Rc<Self>) -> Chars<'_> {
        Chars {
            source: self,
            chars: self.text.chars(),
            next: Position::default(),
        }
    }
}

/// Iterador de caracteres con ubicación, ver [`Source::chars()`].
pub struct Chars<'a> {
    source: &'a Rc<Source>,
    chars: std::str::Chars<'a>,
    next: Position,
}

impl Iterator for Chars<'_> {
    type Item = (char, Location);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;

        let here = self.next;
        self.next = match c {
            '\n' => here.newline(),
            '\t' => here.tab(),
            _ => here.advance(),
        };

        let location = Location {
            from: Rc::clone(self.source),
            position: here..here.advance(),
        };

        Some((c, location))
    }
}

/// Una ubicación está conformada por un origen y un rango de posiciones.
///
/// El fin del rango es exclusivo.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<Position>,
}

impl Location {
    /// Unifica un rango de ubicaciones. Se asume el mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    /// Obtiene el origen.
    pub fn source(&self) -> &Source {
        &self.from
    }

    /// Obtiene la posición de inicio.
    pub fn start(&self) -> Position {
        self.position.start
    }

    /// Obtiene la posición de fin.
    pub fn end(&self) -> Position {
        self.position.end
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:", self.from.name)?;

        let Range { start, end } = self.position;
        if end == start.advance() {
            // Solo se señala una columna en específico
            write!(formatter, "{}", start)
        } else {
            write!(formatter, "[{}-{}]", start, end.back())
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Una posición línea-columna en un archivo.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// Obtiene el número de línea.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Incrementa el número de columna.
    pub fn advance(self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Decrementa el número de columna.
    pub fn back(self) -> Position {
        Position {
            line: self.line,
            column: self.column - 1,
        }
    }

    /// Ajusta la posición a la siguiente columna de tabulador.
    pub fn tab(self) -> Position {
        let column = 1 + ((self.column - 1) / TAB_STOP + 1) * TAB_STOP;
        Position {
            line: self.line,
            column,
        }
    }

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}
