//! Presentación de diagnósticos.
//!
//! Toda falla de compilación se reporta como un único diagnóstico
//! con el formato `archivo:línea:columna`, la línea ofensora y un
//! subrayado `^~~~` que abarca al token en cuestión. El compilador
//! no intenta recuperarse: el primer error detiene la compilación.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

pub struct Diagnostics {
    kind: &'static str,
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            errors: Default::default(),
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            errors: vec![Box::new(error)],
            ..Default::default()
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, errors } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", kind, error.source())?;

            let location = error.location();
            writeln!(fmt, " --> {}", location)?;

            let digits = location.end().line().to_string().chars().count();
            writeln!(fmt, "{:digits$} |", "", digits = digits)?;

            for line_number in location.start().line()..=location.end().line() {
                if let Some(line) = location.source().line(line_number) {
                    writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)?;
                }
            }

            let (from, to) = (
                location.start().column(),
                location.end().column().saturating_sub(1),
            );
            let min = from.min(to).max(1);
            let max = from.max(to);

            let skip = (min - 1) as usize;
            let tildes = (max - min) as usize;

            writeln!(
                fmt,
                "{:digits$} | {:skip$}^{:~<tildes$}",
                "",
                "",
                "",
                digits = digits,
                skip = skip,
                tildes = tildes
            )?;

            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Build failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.as_ref()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::LexerError;
    use crate::source::Source;

    #[test]
    fn diagnostics_cite_the_offending_line() {
        let source = Source::new("test.c", "int main() { return 0 @ }");
        let location = source.chars().nth(22).unwrap().1;

        let error = Located::at(LexerError::BadChar('@'), location);
        let rendered = Diagnostics::from(error).to_string();

        assert!(rendered.contains("test.c:1:23"));
        assert!(rendered.contains("int main() { return 0 @ }"));
        assert!(rendered.contains('^'));
        assert!(rendered.contains("Build failed with 1 error"));
    }
}
