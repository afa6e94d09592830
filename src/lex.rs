//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco y los comentarios de línea `//` se descartan durante esta
//! operación. Cada token emitido esta asociado a una ubicación en el código
//! fuente original, lo cual permite rastrear errores en tanto los mismos como
//! constructos más elevados de fases posteriores.
//!
//! # Contenido de un token
//! Este lexer no produce lexemas para casos donde no son necesarios o terminan
//! siendo más complicados. Por ejemplo, operadores, puntuación y palabras clave
//! se identifican por el hecho de lo que son y no incluyen lexemas. Por su parte,
//! los identificadores sí incluyen su lexema original. Las constantes literales
//! se resuelven a sus valores en vez de preservar sus lexemas.
//!
//! # Clases de token
//! Cada token pertenece a una o más clases representadas con un conjunto
//! de banderas [`TokenClass`]. Un mismo token puede cumplir varios roles:
//! `-` es tanto unario como binario, y `++`/`--` funcionan como prefijo
//! y como postfijo. El parser consulta estas clases para decidir entre
//! producciones sin enumerar tokens individuales.
//!
//! # Errores
//! El primer error léxico aborta la compilación. No hay recuperación:
//! las fases posteriores requieren un flujo íntegro de tokens.

use crate::source::{InputStream, Located, Location};
use std::{
    fmt::{self, Display},
    rc::Rc,
    str::FromStr,
};

use bitflags::bitflags;
use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// Se esperaba un carácter específico en esta posición.
    #[error("Expected {0:?}")]
    Expected(char),

    /// Una constante entera se encuentra fuera de rango.
    #[error("Integer literal overflow, valid range is [0, {}]", i32::MAX)]
    IntOverflow,
}

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<str>);

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier(Rc::from(name))
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmt)
    }
}

bitflags! {
    /// Clases a las que puede pertenecer un token.
    ///
    /// Las clases no son excluyentes entre sí y por eso se combinan
    /// con OR: el parser pregunta por intersecciones en vez de casos
    /// exactos.
    pub struct TokenClass: u32 {
        const IDENT   = 0b1;
        const TYPE    = 0b1 << 1;
        const NUMBER  = 0b1 << 2;
        const SYMBOL  = 0b1 << 3;
        const UNARY   = 0b1 << 4;
        const BINARY  = 0b1 << 5;
        const CONTROL = 0b1 << 6;
        const TERNARY = 0b1 << 7;
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en el programa fuente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Palabra clave.
    Keyword(Keyword),

    /// Literal de entero.
    IntLiteral(i32),

    /// `=`
    Assign,

    /// `;`
    Semicolon,

    /// `:`
    Colon,

    /// `,`
    Comma,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Star,

    /// `/`
    Slash,

    /// `%`
    Percent,

    /// `&`
    Ampersand,

    /// `&&`
    LogicAnd,

    /// `||`
    LogicOr,

    /// `==`
    Equals,

    /// `!=`
    NotEquals,

    /// `<`
    Less,

    /// `<=`
    LessOrEqual,

    /// `>`
    Greater,

    /// `>=`
    GreaterOrEqual,

    /// `~`
    Tilde,

    /// `!`
    Bang,

    /// `++`
    Increment,

    /// `--`
    Decrement,

    /// `?`
    Question,
}

impl Token {
    /// Clases a las que pertenece este token.
    pub fn classes(&self) -> TokenClass {
        use Token::*;

        match self {
            Id(_) => TokenClass::IDENT,
            Keyword(self::Keyword::Int) => TokenClass::TYPE,
            Keyword(_) => TokenClass::CONTROL,
            IntLiteral(_) => TokenClass::NUMBER,

            Semicolon | Colon | Comma | OpenParen | CloseParen | OpenCurly | CloseCurly => {
                TokenClass::SYMBOL
            }

            Assign | Plus | Star | Slash | Percent | Ampersand | LogicAnd | LogicOr | Equals
            | NotEquals | Less | LessOrEqual | Greater | GreaterOrEqual => TokenClass::BINARY,

            Minus | Increment | Decrement => TokenClass::UNARY | TokenClass::BINARY,
            Tilde | Bang => TokenClass::UNARY,
            Question => TokenClass::TERNARY,
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Id(id) => write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            IntLiteral(integer) => write!(fmt, "literal `{}`", integer),
            Assign => fmt.write_str("`=`"),
            Semicolon => fmt.write_str("`;`"),
            Colon => fmt.write_str("`:`"),
            Comma => fmt.write_str("`,`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            OpenCurly => fmt.write_str("`{`"),
            CloseCurly => fmt.write_str("`}`"),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Star => fmt.write_str("`*`"),
            Slash => fmt.write_str("`/`"),
            Percent => fmt.write_str("`%`"),
            Ampersand => fmt.write_str("`&`"),
            LogicAnd => fmt.write_str("`&&`"),
            LogicOr => fmt.write_str("`||`"),
            Equals => fmt.write_str("`==`"),
            NotEquals => fmt.write_str("`!=`"),
            Less => fmt.write_str("`<`"),
            LessOrEqual => fmt.write_str("`<=`"),
            Greater => fmt.write_str("`>`"),
            GreaterOrEqual => fmt.write_str("`>=`"),
            Tilde => fmt.write_str("`~`"),
            Bang => fmt.write_str("`!`"),
            Increment => fmt.write_str("`++`"),
            Decrement => fmt.write_str("`--`"),
            Question => fmt.write_str("`?`"),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Int,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Keyword::*;

        let string = match self {
            Int => "int",
            Return => "return",
            If => "if",
            Else => "else",
            For => "for",
            While => "while",
            Do => "do",
            Break => "break",
            Continue => "continue",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use Keyword::*;

        match string {
            "int" => Ok(Int),
            "return" => Ok(Return),
            "if" => Ok(If),
            "else" => Ok(Else),
            "for" => Ok(For),
            "while" => Ok(While),
            "do" => Ok(Do),
            "break" => Ok(Break),
            "continue" => Ok(Continue),
            _ => Err(()),
        }
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un lexer puede encontrarse en uno de diversos estados. La
/// salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el flujo de entrada.
pub struct Lexer<S: Iterator> {
    source: std::iter::Peekable<S>,
    state: State,
    start: Location,
    last: Location,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de completitud; siempre emite el token incluido,
    /// consume la entrada actual y pasa a [`State::Start`].
    Complete(Token),

    /// Se encontró `/`.
    ///
    /// Puede seguir otro `/` para entrar en un comentario; de lo
    /// contrario se trata del operador de división.
    Division,

    /// Comentario de línea.
    ///
    /// Este estado vuelve a [`State::Start`] al encontrar `'\n'`.
    Comment,

    /// Se encontró el primer carácter de un operador que puede
    /// extenderse con un segundo: `& | = ! < > + -`.
    Operator(char),

    /// Constante entera.
    ///
    /// Este estado incluirá dígitos en el token mientras que
    /// el siguiente carácter sea un dígito.
    Integer(i32),

    /// Término que puede ser un identificador o una palabra clave.
    Word(String),
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(origin: Location, source: S) -> Self {
        let last = origin.clone();
        Lexer {
            source: source.peekable(),
            state: State::Start,
            start: origin,
            last,
        }
    }

    /// Reduce la entrada a una secuencia conocida de tokens o
    /// al primer error léxico encontrado.
    pub fn try_exhaustive(mut self) -> Result<Vec<Located<Token>>, Located<LexerError>> {
        let mut tokens = Vec::new();

        while let Some(result) = self.next() {
            tokens.push(result?);
        }

        Ok(tokens)
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<Token>, Located<LexerError>> {
        use {State::*, Token::*};

        let token = loop {
            let next_char = self.source.peek().map(|(c, _)| *c);
            let ahead = match self.source.peek() {
                Some((_, location)) => location.clone(),
                None => self.last.clone(),
            };

            // La posición de origen se mueve junto a la posición
            // siguiente siempre que no se haya encontrado una
            // frontera de token
            if let Start = self.state {
                self.start = ahead.clone();
            }

            // Switch table principal, determina cambios de estado
            // y de salida del lexer a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (&mut self.state, next_char) {
                (Start, None) => return Ok(None),

                // Tokens triviales
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some(':')) => self.state = Complete(Colon),
                (Start, Some(',')) => self.state = Complete(Comma),
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),
                (Start, Some('{')) => self.state = Complete(OpenCurly),
                (Start, Some('}')) => self.state = Complete(CloseCurly),
                (Start, Some('*')) => self.state = Complete(Star),
                (Start, Some('%')) => self.state = Complete(Percent),
                (Start, Some('~')) => self.state = Complete(Tilde),
                (Start, Some('?')) => self.state = Complete(Question),
                (Start, Some('/')) => self.state = Division,

                // Operadores que pueden tener un segundo carácter
                (Start, Some(c)) if matches!(c, '&' | '|' | '=' | '!' | '<' | '>' | '+' | '-') => {
                    self.state = Operator(c);
                }

                // Identificadores y palabras clave
                (Start, Some(c)) if c.is_ascii_alphabetic() || c == '_' => {
                    self.state = Word(c.to_string());
                }

                // Inicio de una constante numérica. No se consume
                // el dígito, ya que esta lógica ya está implementada
                // en el respectivo caso para un estado de constante
                // entera para el cual el siguiente carácter es un
                // dígito. Por tanto, la constante es inicialmente cero.
                (Start, Some(c)) if c.is_ascii_digit() => {
                    self.state = Integer(0);
                    continue;
                }

                // Espacios en blanco y caracteres inesperados
                (Start, Some(c)) if c.is_ascii_whitespace() => (),
                (Start, Some(c)) => break Err(Located::at(LexerError::BadChar(c), ahead)),

                // Emisión retardada de tokens cualesquiera
                (Complete(value), _) => break Ok(std::mem::replace(value, Semicolon)),

                // `/` seguido de otro `/` inicia un comentario
                (Division, Some('/')) => self.state = Comment,
                (Division, _) => break Ok(Token::Slash),

                // Los comentarios descartan la línea donde ocurren
                (Comment, Some('\n')) => self.state = Start,
                (Comment, Some(_)) => (),
                (Comment, None) => self.state = Start,

                // Extensión o terminación de operadores de dos caracteres
                (Operator(first), c) => match (*first, c) {
                    ('&', Some('&')) => self.state = Complete(LogicAnd),
                    ('&', _) => break Ok(Ampersand),
                    ('|', Some('|')) => self.state = Complete(LogicOr),
                    ('|', _) => break Err(Located::at(LexerError::Expected('|'), ahead)),
                    ('=', Some('=')) => self.state = Complete(Equals),
                    ('=', _) => break Ok(Assign),
                    ('!', Some('=')) => self.state = Complete(NotEquals),
                    ('!', _) => break Ok(Bang),
                    ('<', Some('=')) => self.state = Complete(LessOrEqual),
                    ('<', _) => break Ok(Less),
                    ('>', Some('=')) => self.state = Complete(GreaterOrEqual),
                    ('>', _) => break Ok(Greater),
                    ('+', Some('+')) => self.state = Complete(Increment),
                    ('+', _) => break Ok(Plus),
                    ('-', Some('-')) => self.state = Complete(Decrement),
                    ('-', _) => break Ok(Minus),
                    _ => unreachable!("lexer accepted a bad operator head"),
                },

                // Acumulación dígito por dígito de constantes enteras
                (Integer(accumulated), Some(digit)) if digit.is_ascii_digit() => {
                    let digit = digit.to_digit(10).unwrap() as i32;

                    match accumulated
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit))
                    {
                        Some(result) => *accumulated = result,
                        None => break Err(Located::at(LexerError::IntOverflow, ahead)),
                    }
                }

                // Si sigue algo que no es un dígito, la constante ha terminado
                (Integer(integer), _) => break Ok(IntLiteral(*integer)),

                // Extensión de términos
                (Word(word), Some(c)) if is_word_char(c) => {
                    word.push(c);
                }

                // Si sigue algo que no puede formar parte del término, ha terminado
                (Word(word), _) => {
                    if let Ok(keyword) = self::Keyword::from_str(word) {
                        break Ok(Keyword(keyword));
                    } else {
                        break Ok(Id(Identifier::from(std::mem::take(word))));
                    }
                }
            }

            // Si no hubo `continue`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some((_, location)) = self.source.next() {
                self.last = location;
            }
        };

        token.map(Some)
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lex() {
            Ok(None) => None,
            Ok(Some(token)) => {
                self.state = State::Start;

                let location = Location::span(self.start.clone(), &self.last);
                Some(Ok(Located::at(token, location)))
            }

            Err(error) => Some(Err(error)),
        }
    }
}

/// Determina si un carácter puede pertenecer a un término.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn lex(text: &str) -> Result<Vec<Token>, LexerError> {
        let source = Source::new("test.c", text);
        let lexer = Lexer::new(source.origin(), source.chars());

        match lexer.try_exhaustive() {
            Ok(tokens) => Ok(tokens.into_iter().map(Located::into_inner).collect()),
            Err(error) => Err(error.into_inner()),
        }
    }

    #[test]
    fn lexes_a_minimal_program() {
        use Token::*;

        let tokens = lex("int main() { return 0; }").unwrap();
        assert_eq!(
            tokens,
            vec![
                Keyword(self::Keyword::Int),
                Id(Identifier::from("main")),
                OpenParen,
                CloseParen,
                OpenCurly,
                Keyword(self::Keyword::Return),
                IntLiteral(0),
                Semicolon,
                CloseCurly,
            ]
        );
    }

    #[test]
    fn distinguishes_one_and_two_character_operators() {
        use Token::*;

        let tokens = lex("& && = == ! != < <= > >= + ++ - --").unwrap();
        assert_eq!(
            tokens,
            vec![
                Ampersand, LogicAnd, Assign, Equals, Bang, NotEquals, Less, LessOrEqual, Greater,
                GreaterOrEqual, Plus, Increment, Minus, Decrement,
            ]
        );
    }

    #[test]
    fn comments_are_discarded() {
        use Token::*;

        let tokens = lex("a // b c d\n/ e").unwrap();
        assert_eq!(
            tokens,
            vec![
                Id(Identifier::from("a")),
                Slash,
                Id(Identifier::from("e")),
            ]
        );
    }

    #[test]
    fn lone_pipe_is_an_error() {
        assert!(matches!(lex("a | b"), Err(LexerError::Expected('|'))));
    }

    #[test]
    fn literal_overflow_is_detected() {
        assert!(matches!(lex("2147483647").as_deref(), Ok([Token::IntLiteral(2147483647)])));
        assert!(matches!(lex("2147483648"), Err(LexerError::IntOverflow)));
    }

    #[test]
    fn keywords_are_not_identifiers() {
        use Token::*;

        let tokens = lex("do doit").unwrap();
        assert_eq!(
            tokens,
            vec![Keyword(self::Keyword::Do), Id(Identifier::from("doit"))]
        );
    }

    #[test]
    fn token_classes_overlap_for_dual_roles() {
        assert_eq!(
            Token::Minus.classes(),
            TokenClass::UNARY | TokenClass::BINARY
        );
        assert_eq!(
            Token::Increment.classes(),
            TokenClass::UNARY | TokenClass::BINARY
        );
        assert!(Token::Question.classes().contains(TokenClass::TERNARY));
        assert!(Token::Keyword(Keyword::Int).classes().contains(TokenClass::TYPE));
    }

    #[test]
    fn tokens_carry_their_spans() {
        let source = Source::new("test.c", "int abc;");
        let tokens = Lexer::new(source.origin(), source.chars())
            .try_exhaustive()
            .unwrap();

        let abc = &tokens[1];
        assert_eq!(abc.location().start().column(), 5);
        assert_eq!(abc.location().end().column(), 8);
    }
}
