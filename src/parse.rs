//! Análisis sintáctico.
//!
//! El parser consume el flujo de tokens y construye un AST. Las
//! expresiones se analizan por ascenso de precedencia sobre la tabla
//! de [`precedence`]; el resto de la gramática es descenso recursivo.
//! Solamente se aceptan declaraciones de función en el nivel superior
//! del programa (el objetivo no tiene segmento de datos para
//! globales); dentro de un bloque una función puede declararse pero
//! no definirse.

use std::{iter::Peekable, marker::PhantomData};
use thiserror::Error;

use crate::{
    lex::{Identifier, Keyword, Token, TokenClass},
    source::{Located, Location},
};

/// Raíz del árbol sintáctico.
#[derive(Debug)]
pub struct Program {
    pub declarations: Vec<FunctionDeclaration>,
    pub eof: Location,
}

#[derive(Debug)]
pub struct FunctionDeclaration {
    pub name: Located<Identifier>,
    pub parameters: Vec<Parameter>,
    pub body: Option<Block>,
}

/// Parámetro formal. El nombre puede omitirse en una declaración
/// sin cuerpo.
#[derive(Debug)]
pub struct Parameter {
    pub name: Option<Located<Identifier>>,
}

#[derive(Debug)]
pub struct Block {
    pub items: Vec<BlockItem>,
}

#[derive(Debug)]
pub enum BlockItem {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Statement(Statement),
}

#[derive(Debug)]
pub struct VariableDeclaration {
    pub name: Located<Identifier>,
    pub init: Option<Located<Expr>>,
}

#[derive(Debug)]
pub enum Statement {
    Return(Located<Expr>),
    Expression(Located<Expr>),

    If {
        condition: Located<Expr>,
        then: Box<Statement>,
        otherwise: Option<Box<Statement>>,
    },

    Compound(Block),

    For {
        init: Option<ForInit>,
        condition: Option<Located<Expr>>,
        post: Option<Located<Expr>>,
        body: Box<Statement>,
        label: Option<String>,
    },

    While {
        condition: Located<Expr>,
        body: Box<Statement>,
        label: Option<String>,
    },

    DoWhile {
        body: Box<Statement>,
        condition: Located<Expr>,
        label: Option<String>,
    },

    Break {
        label: Option<String>,
        location: Location,
    },

    Continue {
        label: Option<String>,
        location: Location,
    },

    /// La sentencia nula `;`.
    Null,
}

/// Inicializador de un ciclo `for`.
#[derive(Debug)]
pub enum ForInit {
    Declaration(VariableDeclaration),
    Expression(Located<Expr>),
}

#[derive(Debug)]
pub enum Expr {
    Constant(i32),
    Variable(Identifier),
    Assignment(Box<Located<Expr>>, Box<Located<Expr>>),
    Unary(UnaryOp, Box<Located<Expr>>),
    Postfix(PostfixOp, Box<Located<Expr>>),
    Binary(BinOp, Box<Located<Expr>>, Box<Located<Expr>>),

    Ternary {
        condition: Box<Located<Expr>>,
        true_value: Box<Located<Expr>>,
        false_value: Box<Located<Expr>>,
    },

    Call {
        callee: Located<Identifier>,
        arguments: Vec<Located<Expr>>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Complement,
    Not,
    Increment,
    Decrement,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    LogicAnd,
    LogicOr,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected token {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected token {0}, none was found instead")]
    MissingToken(Token),

    #[error("Expected identifier")]
    ExpectedId,

    #[error("Expected a type specifier")]
    ExpectedType,

    #[error("Expected an expression")]
    ExpectedExpr,

    #[error("Abrupt end of program")]
    UnexpectedEof,
}

pub trait TokenStream<'a>: Iterator<Item = &'a Located<Token>> + Clone {}

impl<'a, I: Iterator<Item = &'a Located<Token>> + Clone> TokenStream<'a> for I {}

/// Tabla de precedencias del lenguaje.
///
/// Los operadores postfijos `++`/`--` no aparecen aquí: ligan más
/// fuerte que cualquier operador binario y se consumen al construir
/// un factor.
fn precedence(token: &Token) -> Option<u32> {
    use Token::*;

    Some(match token {
        Assign => 1,
        Question => 3,
        LogicOr => 5,
        LogicAnd => 10,
        Ampersand => 20,
        Equals | NotEquals => 30,
        Less | LessOrEqual | Greater | GreaterOrEqual => 35,
        Plus | Minus => 45,
        Star | Slash | Percent => 50,
        _ => return None,
    })
}

pub fn parse<'a>(
    origin: Location,
    tokens: impl TokenStream<'a>,
) -> Result<Program, Located<ParserError>> {
    let mut parser = Parser {
        tokens: tokens.peekable(),
        last_known: origin,
        lifetime_hack: PhantomData,
    };

    parser.program().map_err(Failure::coerce)
}

#[derive(Clone)]
struct Parser<'a, I: TokenStream<'a>> {
    tokens: Peekable<I>,
    last_known: Location,
    lifetime_hack: PhantomData<&'a ()>,
}

enum Failure {
    Weak(Located<ParserError>),
    Strict(Located<ParserError>),
}

impl Failure {
    fn weak(self) -> Self {
        Failure::Weak(self.coerce())
    }

    fn coerce(self) -> Located<ParserError> {
        match self {
            Failure::Weak(error) => error,
            Failure::Strict(error) => error,
        }
    }
}

type Parse<T> = Result<T, Failure>;

impl<'a, I: TokenStream<'a>> Parser<'a, I> {
    fn program(&mut self) -> Parse<Program> {
        let mut declarations = Vec::new();
        while self.tokens.peek().is_some() {
            declarations.push(self.function(true)?);
        }

        Ok(Program {
            declarations,
            eof: self.last_known.clone(),
        })
    }

    fn function(&mut self, allow_definition: bool) -> Parse<FunctionDeclaration> {
        self.type_specifier()?;
        let name = self.id()?;

        self.expect(Token::OpenParen)?;
        let parameters = match self.attempt(|s| s.expect(Token::CloseParen).map_err(Failure::weak))
        {
            Ok(()) => Vec::new(),
            Err(Failure::Weak(_)) => {
                let parameters = self.comma_separated(Parser::parameter, false)?;
                self.expect(Token::CloseParen)?;
                parameters
            }

            Err(error) => return Err(error),
        };

        let body = match self.attempt(|s| s.expect(Token::Semicolon).map_err(Failure::weak)) {
            Ok(()) => None,
            Err(Failure::Weak(error)) => {
                // Una definición solo se admite en el nivel superior
                if allow_definition {
                    Some(self.block()?)
                } else {
                    return Err(Failure::Strict(error));
                }
            }

            Err(error) => return Err(error),
        };

        Ok(FunctionDeclaration {
            name,
            parameters,
            body,
        })
    }

    fn parameter(&mut self) -> Parse<Parameter> {
        self.type_specifier()?;
        let name = self.optional(|s| s.id().map_err(Failure::weak))?;

        Ok(Parameter { name })
    }

    fn block(&mut self) -> Parse<Block> {
        self.expect(Token::OpenCurly)?;

        let mut items = Vec::new();
        loop {
            match self.attempt(|s| s.expect(Token::CloseCurly).map_err(Failure::weak)) {
                Ok(()) => break Ok(Block { items }),
                Err(Failure::Weak(_)) => items.push(self.block_item()?),
                Err(error) => break Err(error),
            }
        }
    }

    fn block_item(&mut self) -> Parse<BlockItem> {
        let first = self.lookahead(|s| s.next())?;
        if !first.as_ref().classes().contains(TokenClass::TYPE) {
            return Ok(BlockItem::Statement(self.statement()?));
        }

        // El tercer token distingue `int f(...)` de `int x ...`
        let third = self.lookahead(|s| {
            s.next()?;
            s.next()?;
            s.next()
        });

        match third {
            Ok(token) if *token.as_ref() == Token::OpenParen => {
                Ok(BlockItem::Function(self.function(false)?))
            }

            _ => Ok(BlockItem::Variable(self.variable_declaration()?)),
        }
    }

    fn variable_declaration(&mut self) -> Parse<VariableDeclaration> {
        self.type_specifier()?;
        let name = self.id()?;

        let init = match self.attempt(|s| s.expect(Token::Assign).map_err(Failure::weak)) {
            Ok(()) => Some(self.expr(0)?),
            Err(Failure::Weak(_)) => None,
            Err(error) => return Err(error),
        };

        self.expect(Token::Semicolon)?;

        Ok(VariableDeclaration { name, init })
    }

    fn statement(&mut self) -> Parse<Statement> {
        match self.lookahead(|s| s.next().map(Located::into_inner))? {
            Token::Keyword(Keyword::Return) => {
                self.keyword(Keyword::Return)?;
                let value = self.expr(0)?;
                self.expect(Token::Semicolon)?;

                Ok(Statement::Return(value))
            }

            Token::Keyword(Keyword::If) => self.if_statement(),
            Token::Keyword(Keyword::For) => self.for_statement(),
            Token::Keyword(Keyword::While) => self.while_statement(),
            Token::Keyword(Keyword::Do) => self.do_while_statement(),

            Token::Keyword(Keyword::Break) => {
                let (location, _) = self.next()?.split();
                self.expect(Token::Semicolon)?;

                Ok(Statement::Break {
                    label: None,
                    location,
                })
            }

            Token::Keyword(Keyword::Continue) => {
                let (location, _) = self.next()?.split();
                self.expect(Token::Semicolon)?;

                Ok(Statement::Continue {
                    label: None,
                    location,
                })
            }

            Token::OpenCurly => Ok(Statement::Compound(self.block()?)),

            Token::Semicolon => {
                self.next()?;
                Ok(Statement::Null)
            }

            _ => {
                let value = self.expr(0)?;
                self.expect(Token::Semicolon)?;

                Ok(Statement::Expression(value))
            }
        }
    }

    fn if_statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::If)?;

        self.expect(Token::OpenParen)?;
        let condition = self.expr(0)?;
        self.expect(Token::CloseParen)?;

        let then = Box::new(self.statement()?);

        let otherwise = match self.attempt(|s| s.keyword(Keyword::Else).map_err(Failure::weak)) {
            Ok(()) => Some(Box::new(self.statement()?)),
            Err(Failure::Weak(_)) => None,
            Err(error) => return Err(error),
        };

        Ok(Statement::If {
            condition,
            then,
            otherwise,
        })
    }

    fn while_statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::While)?;

        self.expect(Token::OpenParen)?;
        let condition = self.expr(0)?;
        self.expect(Token::CloseParen)?;

        let body = Box::new(self.statement()?);

        Ok(Statement::While {
            condition,
            body,
            label: None,
        })
    }

    fn do_while_statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::Do)?;
        let body = Box::new(self.statement()?);

        self.keyword(Keyword::While)?;
        self.expect(Token::OpenParen)?;
        let condition = self.expr(0)?;
        self.expect(Token::CloseParen)?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::DoWhile {
            body,
            condition,
            label: None,
        })
    }

    fn for_statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::For)?;
        self.expect(Token::OpenParen)?;

        let init = match self.lookahead(|s| s.next().map(Located::into_inner))? {
            token if token.classes().contains(TokenClass::TYPE) => {
                Some(ForInit::Declaration(self.variable_declaration()?))
            }

            Token::Semicolon => {
                self.next()?;
                None
            }

            _ => {
                let init = self.expr(0)?;
                self.expect(Token::Semicolon)?;
                Some(ForInit::Expression(init))
            }
        };

        let condition = match self.lookahead(|s| s.next().map(Located::into_inner))? {
            Token::Semicolon => {
                self.next()?;
                None
            }

            _ => {
                let condition = self.expr(0)?;
                self.expect(Token::Semicolon)?;
                Some(condition)
            }
        };

        let post = match self.lookahead(|s| s.next().map(Located::into_inner))? {
            Token::CloseParen => {
                self.next()?;
                None
            }

            _ => {
                let post = self.expr(0)?;
                self.expect(Token::CloseParen)?;
                Some(post)
            }
        };

        let body = Box::new(self.statement()?);

        Ok(Statement::For {
            init,
            condition,
            post,
            body,
            label: None,
        })
    }

    fn expr(&mut self, min_precedence: u32) -> Parse<Located<Expr>> {
        let mut left = self.factor()?;

        loop {
            let next = match self.tokens.peek() {
                Some(token) => (*token).clone(),
                None => break,
            };

            let token = next.as_ref();
            if !token
                .classes()
                .intersects(TokenClass::BINARY | TokenClass::TERNARY)
            {
                break;
            }

            let level = match precedence(token) {
                Some(level) if level >= min_precedence => level,
                _ => break,
            };

            self.next()?;
            left = match token {
                // La asignación es asociativa a la derecha
                Token::Assign => {
                    let right = self.expr(level)?;
                    let location = Location::span(left.location().clone(), right.location());

                    Located::at(
                        Expr::Assignment(Box::new(left), Box::new(right)),
                        location,
                    )
                }

                Token::Question => {
                    let true_value = self.expr(0)?;
                    self.expect(Token::Colon)?;
                    let false_value = self.expr(level)?;

                    let location = Location::span(left.location().clone(), false_value.location());
                    Located::at(
                        Expr::Ternary {
                            condition: Box::new(left),
                            true_value: Box::new(true_value),
                            false_value: Box::new(false_value),
                        },
                        location,
                    )
                }

                operator => {
                    let operator = match binary_op(operator) {
                        Some(operator) => operator,
                        None => unreachable!("operator {} has a precedence but no lowering", operator),
                    };

                    let right = self.expr(level + 1)?;
                    let location = Location::span(left.location().clone(), right.location());

                    Located::at(
                        Expr::Binary(operator, Box::new(left), Box::new(right)),
                        location,
                    )
                }
            };
        }

        Ok(left)
    }

    fn factor(&mut self) -> Parse<Located<Expr>> {
        let (location, token) = self.next()?.split();

        let mut result = match token {
            Token::IntLiteral(value) => Located::at(Expr::Constant(value), location),

            Token::OpenParen => {
                let inner = self.expr(0)?;
                self.expect(Token::CloseParen)?;

                let location = Location::span(location, &self.last_known);
                Located::at(inner.into_inner(), location)
            }

            Token::Id(id) => {
                match self.attempt(|s| s.expect(Token::OpenParen).map_err(Failure::weak)) {
                    Ok(()) => {
                        let arguments = match self
                            .attempt(|s| s.expect(Token::CloseParen).map_err(Failure::weak))
                        {
                            Ok(()) => Vec::new(),
                            Err(Failure::Weak(_)) => {
                                let arguments = self.comma_separated(|s| s.expr(0), false)?;
                                self.expect(Token::CloseParen)?;
                                arguments
                            }

                            Err(error) => return Err(error),
                        };

                        let span = Location::span(location.clone(), &self.last_known);
                        Located::at(
                            Expr::Call {
                                callee: Located::at(id, location),
                                arguments,
                            },
                            span,
                        )
                    }

                    Err(Failure::Weak(_)) => Located::at(Expr::Variable(id), location),
                    Err(error) => return Err(error),
                }
            }

            token if token.classes().contains(TokenClass::UNARY) => {
                let operator = match token {
                    Token::Minus => UnaryOp::Negate,
                    Token::Tilde => UnaryOp::Complement,
                    Token::Bang => UnaryOp::Not,
                    Token::Increment => UnaryOp::Increment,
                    Token::Decrement => UnaryOp::Decrement,
                    _ => unreachable!("token {} is not a unary operator", token),
                };

                // Un operador unario prefijo liga a una expresión completa
                let inner = self.expr(0)?;
                let span = Location::span(location, inner.location());

                Located::at(Expr::Unary(operator, Box::new(inner)), span)
            }

            _ => return self.fail(ParserError::ExpectedExpr),
        };

        // Los operadores postfijos ligan más fuerte que cualquier binario
        loop {
            let operator = match self.lookahead(|s| s.next().map(Located::into_inner)) {
                Ok(Token::Increment) => PostfixOp::Increment,
                Ok(Token::Decrement) => PostfixOp::Decrement,
                _ => break,
            };

            let (op_location, _) = self.next()?.split();
            let span = Location::span(result.location().clone(), &op_location);

            result = Located::at(Expr::Postfix(operator, Box::new(result)), span);
        }

        Ok(result)
    }

    fn optional<T, F>(&mut self, rule: F) -> Parse<Option<T>>
    where
        F: FnOnce(&mut Self) -> Parse<T>,
    {
        match self.attempt(rule) {
            Err(Failure::Weak(_)) => Ok(None),
            result => Ok(Some(result?)),
        }
    }

    fn attempt<T, F>(&mut self, rule: F) -> Parse<T>
    where
        F: FnOnce(&mut Self) -> Parse<T>,
    {
        let mut fork = self.clone();

        let result = rule(&mut fork);
        if result.is_ok() {
            *self = fork;
        }

        result
    }

    fn lookahead<T, F>(&mut self, rule: F) -> Parse<T>
    where
        F: FnOnce(&mut Self) -> Parse<T>,
    {
        rule(&mut self.clone())
    }

    fn comma_separated<T, F>(&mut self, mut rule: F, allow_empty: bool) -> Parse<Vec<T>>
    where
        F: FnMut(&mut Self) -> Parse<T>,
    {
        let mut items = match self.attempt(|s| rule(s)) {
            Err(Failure::Weak(_)) if allow_empty => return Ok(Vec::new()),
            item => vec![item.map_err(|error| Failure::Strict(error.coerce()))?],
        };

        loop {
            match self.attempt(|s| s.expect(Token::Comma).map_err(Failure::weak)) {
                Err(Failure::Weak(_)) => break Ok(items),
                result => {
                    result?;
                    items.push(rule(self).map_err(|error| Failure::Strict(error.coerce()))?);
                }
            }
        }
    }

    fn type_specifier(&mut self) -> Parse<()> {
        let token = self.next()?;
        if token.as_ref().classes().contains(TokenClass::TYPE) {
            Ok(())
        } else {
            self.fail(ParserError::ExpectedType)
        }
    }

    fn id(&mut self) -> Parse<Located<Identifier>> {
        let (location, token) = self.next()?.split();
        match token {
            Token::Id(id) => Ok(Located::at(id, location)),
            _ => self.fail(ParserError::ExpectedId),
        }
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(Token::Keyword(keyword))
    }

    fn expect(&mut self, token: Token) -> Parse<()> {
        match self.next().map(Located::into_inner) {
            Ok(found) if found == token => Ok(()),
            Ok(found) => self.fail(ParserError::UnexpectedToken(token, found)),
            Err(_) => self.fail(ParserError::MissingToken(token)),
        }
    }

    fn next(&mut self) -> Parse<Located<Token>> {
        match self.tokens.next() {
            Some(token) => {
                self.last_known = token.location().clone();
                Ok(token.clone())
            }

            None => self.fail(ParserError::UnexpectedEof),
        }
    }

    fn fail<T>(&self, error: ParserError) -> Parse<T> {
        Err(Failure::Strict(Located::at(error, self.last_known.clone())))
    }
}

fn binary_op(token: &Token) -> Option<BinOp> {
    use Token::*;

    Some(match token {
        Plus => BinOp::Add,
        Minus => BinOp::Sub,
        Star => BinOp::Mul,
        Slash => BinOp::Div,
        Percent => BinOp::Mod,
        Ampersand => BinOp::BitAnd,
        LogicAnd => BinOp::LogicAnd,
        LogicOr => BinOp::LogicOr,
        Equals => BinOp::Equal,
        NotEquals => BinOp::NotEqual,
        Less => BinOp::Less,
        LessOrEqual => BinOp::LessOrEqual,
        Greater => BinOp::Greater,
        GreaterOrEqual => BinOp::GreaterOrEqual,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;
    use crate::source::Source;

    fn parse_str(text: &str) -> Result<Program, ParserError> {
        let source = Source::new("test.c", text);
        let tokens = Lexer::new(source.origin(), source.chars())
            .try_exhaustive()
            .expect("lexer failure in parser test");

        parse(source.origin(), tokens.iter()).map_err(Located::into_inner)
    }

    fn main_body(program: &Program) -> &[BlockItem] {
        &program.declarations[0].body.as_ref().unwrap().items
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse_str("int main() { return 2 + 3 * 4; }").unwrap();

        let returned = match &main_body(&program)[0] {
            BlockItem::Statement(Statement::Return(value)) => value.as_ref(),
            other => panic!("expected a return statement, found {:?}", other),
        };

        match returned {
            Expr::Binary(BinOp::Add, left, right) => {
                assert!(matches!(left.as_ref().as_ref(), Expr::Constant(2)));
                assert!(matches!(
                    right.as_ref().as_ref(),
                    Expr::Binary(BinOp::Mul, _, _)
                ));
            }

            other => panic!("expected addition at the root, found {:?}", other),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse_str("int main() { a = b = 1; }").unwrap();

        let value = match &main_body(&program)[0] {
            BlockItem::Statement(Statement::Expression(value)) => value.as_ref(),
            other => panic!("expected an expression statement, found {:?}", other),
        };

        match value {
            Expr::Assignment(_, right) => {
                assert!(matches!(right.as_ref().as_ref(), Expr::Assignment(_, _)));
            }

            other => panic!("expected an assignment, found {:?}", other),
        }
    }

    #[test]
    fn postfix_binds_tighter_than_binary_operators() {
        let program = parse_str("int main() { return a + b++; }").unwrap();

        let returned = match &main_body(&program)[0] {
            BlockItem::Statement(Statement::Return(value)) => value.as_ref(),
            other => panic!("expected a return statement, found {:?}", other),
        };

        match returned {
            Expr::Binary(BinOp::Add, _, right) => {
                assert!(matches!(
                    right.as_ref().as_ref(),
                    Expr::Postfix(PostfixOp::Increment, _)
                ));
            }

            other => panic!("expected addition at the root, found {:?}", other),
        }
    }

    #[test]
    fn calls_take_comma_separated_arguments() {
        let program = parse_str("int main() { return f(1, 2 + 3); }").unwrap();

        let returned = match &main_body(&program)[0] {
            BlockItem::Statement(Statement::Return(value)) => value.as_ref(),
            other => panic!("expected a return statement, found {:?}", other),
        };

        match returned {
            Expr::Call { callee, arguments } => {
                assert_eq!(callee.as_ref().as_ref(), "f");
                assert_eq!(arguments.len(), 2);
            }

            other => panic!("expected a call, found {:?}", other),
        }
    }

    #[test]
    fn function_declarations_may_omit_parameter_names() {
        let program = parse_str("int f(int, int b); int main() { return 0; }").unwrap();

        let f = &program.declarations[0];
        assert!(f.body.is_none());
        assert_eq!(f.parameters.len(), 2);
        assert!(f.parameters[0].name.is_none());
        assert!(f.parameters[1].name.is_some());
    }

    #[test]
    fn for_loops_accept_a_declaration_initializer() {
        let program = parse_str("int main() { for (int i = 0; i < 3; i++) ; }").unwrap();

        match &main_body(&program)[0] {
            BlockItem::Statement(Statement::For {
                init: Some(ForInit::Declaration(init)),
                condition: Some(_),
                post: Some(_),
                ..
            }) => {
                assert_eq!(init.name.as_ref().as_ref(), "i");
            }

            other => panic!("expected a for loop, found {:?}", other),
        }
    }

    #[test]
    fn for_loop_headers_may_be_empty() {
        let program = parse_str("int main() { for (;;) break; }").unwrap();

        assert!(matches!(
            &main_body(&program)[0],
            BlockItem::Statement(Statement::For {
                init: None,
                condition: None,
                post: None,
                ..
            })
        ));
    }

    #[test]
    fn nested_function_definitions_are_rejected() {
        let result = parse_str("int main() { int f(int a) { return a; } }");
        assert!(matches!(result, Err(ParserError::UnexpectedToken(..))));
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let result = parse_str("int main() { return 0 }");
        assert!(matches!(result, Err(ParserError::UnexpectedToken(..))));
    }

    #[test]
    fn null_statements_are_allowed() {
        let program = parse_str("int main() { ;; return 0; }").unwrap();
        assert!(matches!(
            main_body(&program)[0],
            BlockItem::Statement(Statement::Null)
        ));
    }
}
