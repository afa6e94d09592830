//! Rastreo de ubicaciones originales en código fuente.
//!
//! Los distintos objetos internos que el compilador construye
//! deben llevar cuenta de posiciones o rangos de ubicaciones en
//! el código fuente original, lo cual permite determinar un punto
//! exacto o aproximado en donde ocurre un error de abstracción
//! arbitraria. El archivo fuente se lee una única vez y sus líneas
//! quedan retenidas en un [`Source`] que sobrevive a todas las
//! fases, de manera que los diagnósticos puedan citar la línea
//! ofensora.

use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Range,
    rc::Rc,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un flujo de entrada, carácter por carácter.
pub trait InputStream: Iterator<Item = (char, Location)> {}

impl<I: Iterator<Item = (char, Location)>> InputStream for I {}

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

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Location, T) {
        (self.location, self.value)
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }

    /// Transforma el valor con la misma ubicación.
    pub fn map<U, F>(self, map: F) -> Located<U>
    where
        F: FnOnce(T) -> U,
    {
        Located {
            value: map(self.value),
            location: self.location,
        }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T> AsMut<T> for Located<T> {
    fn as_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Una ubicación está conformada por un origen y un rango de posiciones.
#[derive(Clone)]
pub struct Location {
    from: Source,
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

    /// Obtiene el origen de esta ubicación.
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
        write!(formatter, "{}:", self.from.name())?;

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
#[derive(Copy, Clone, Eq, PartialEq)]
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

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
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

/// Nombre de origen e histórico interior de líneas.
///
/// Clonar un `Source` es barato: todas las copias comparten el mismo
/// almacén de líneas.
#[derive(Clone)]
pub struct Source(Rc<Inner>);

struct Inner {
    name: String,
    lines: Vec<String>,
}

impl Source {
    /// Retiene el contenido de un archivo fuente, línea por línea.
    pub fn new<S: Into<String>>(name: S, text: &str) -> Self {
        Source(Rc::new(Inner {
            name: name.into(),
            lines: text.lines().map(String::from).collect(),
        }))
    }

    /// Obtiene el nombre con el que se identifica a este origen.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Obtiene una línea a partir de su número (1-based).
    pub fn line(&self, number: u32) -> Option<&str> {
        self.0.lines.get(number as usize - 1).map(String::as_str)
    }

    /// Ubicación del primer carácter del origen.
    pub fn origin(&self) -> Location {
        Location {
            from: self.clone(),
            position: Position::default()..Position::default().advance(),
        }
    }

    /// Itera carácter por carácter, asociando a cada uno su ubicación.
    ///
    /// Cada línea retenida se emite seguida de un `'\n'`, incluyendo
    /// a la última. El lexer consume este flujo directamente.
    pub fn chars(&self) -> Chars<'_> {
        Chars {
            source: self,
            lines: self.0.lines.iter(),
            current: None,
            position: Position::default(),
        }
    }
}

/// Iterador de [`Source::chars()`].
pub struct Chars<'a> {
    source: &'a Source,
    lines: std::slice::Iter<'a, String>,
    current: Option<std::str::Chars<'a>>,
    position: Position,
}

impl Iterator for Chars<'_> {
    type Item = (char, Location);

    fn next(&mut self) -> Option<Self::Item> {
        let c = loop {
            match &mut self.current {
                Some(chars) => match chars.next() {
                    Some(c) => break c,
                    None => {
                        self.current = None;
                        break '\n';
                    }
                },

                None => {
                    self.current = Some(self.lines.next()?.chars());
                }
            }
        };

        let here = self.position;
        self.position = match c {
            '\n' => here.newline(),
            '\t' => here.tab(),
            _ => here.advance(),
        };

        let location = Location {
            from: self.source.clone(),
            position: here..here.advance(),
        };

        Some((c, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_lines_and_columns() {
        let source = Source::new("test.c", "ab\nc");
        let chars: Vec<_> = source.chars().collect();

        let spots: Vec<_> = chars
            .iter()
            .map(|(c, location)| (*c, location.start().line(), location.start().column()))
            .collect();

        assert_eq!(
            spots,
            vec![
                ('a', 1, 1),
                ('b', 1, 2),
                ('\n', 1, 3),
                ('c', 2, 1),
                ('\n', 2, 2),
            ]
        );
    }

    #[test]
    fn tabs_jump_to_the_next_stop() {
        let source = Source::new("test.c", "\tx");
        let chars: Vec<_> = source.chars().collect();

        assert_eq!(chars[1].0, 'x');
        assert_eq!(chars[1].1.start().column(), 5);
    }

    #[test]
    fn lines_are_retained_for_diagnostics() {
        let source = Source::new("test.c", "int main() {\n}\n");
        assert_eq!(source.line(1), Some("int main() {"));
        assert_eq!(source.line(2), Some("}"));
        assert_eq!(source.line(3), None);
    }

    #[test]
    fn spans_merge_into_ranges() {
        let source = Source::new("test.c", "abc");
        let chars: Vec<_> = source.chars().collect();

        let span = Location::span(chars[0].1.clone(), &chars[2].1);
        assert_eq!(span.start().column(), 1);
        assert_eq!(span.end().column(), 4);
        assert_eq!(format!("{}", span), "test.c:[1:1-1:3]");
    }
}
