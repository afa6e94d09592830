//! Análisis semántico.
//!
//! Tres recorridos secuenciales y totales sobre el AST, cada uno de
//! los cuales anota el árbol en el lugar:
//!
//! 1. **Resolución de identificadores**: cada declaración de variable
//!    acuña un nombre único global (`x` se vuelve `x.0`) y cada uso se
//!    reescribe al nombre resuelto. Las funciones conservan su nombre
//!    original por tener linkage externo.
//! 2. **Etiquetado de ciclos**: cada `for`/`while`/`do-while` acuña
//!    una etiqueta única que `break`/`continue` heredan del ciclo
//!    envolvente más interno.
//! 3. **Verificación de tipos**: valida firmas, aridad de llamadas y
//!    confusiones entre funciones y variables. En este subconjunto
//!    del lenguaje toda expresión tiene tipo `int`; el sistema de
//!    tipos existe para atrapar errores de firma, no para soportar
//!    múltiples tipos de valor.
//!
//! Cualquier violación aborta la compilación con el primer error.

use thiserror::Error;

use std::collections::HashMap;

use crate::{
    lex::Identifier,
    names::NameGenerator,
    parse::{
        Block, BlockItem, Expr, ForInit, FunctionDeclaration, Parameter, Program, Statement,
        VariableDeclaration,
    },
    source::{Located, Location},
};

pub type Semantic<T> = Result<T, Located<SemanticError>>;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Redeclaration of `{0}`")]
    Redeclaration(Identifier),

    #[error("`{0}` is not declared")]
    Undeclared(Identifier),

    #[error("Invalid lvalue")]
    InvalidLvalue,

    #[error("`break` outside of a loop")]
    BreakOutsideLoop,

    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,

    #[error("Redefinition of function `{0}`")]
    Redefinition(Identifier),

    #[error("Declaration of `{0}` is incompatible with a previous declaration")]
    IncompatibleRedeclaration(Identifier),

    #[error("`{0}` takes {1} arguments, {2} were given")]
    BadArity(Identifier, usize, usize),

    #[error("`{0}` is not a function")]
    NotAFunction(Identifier),

    #[error("Function `{0}` is used as a variable")]
    ExpectedVariable(Identifier),

    #[error("Parameter names are required in a function definition")]
    UnnamedParameter,

    #[error("Entrypoint not found, define `int main()`")]
    NoMain,
}

/// Tipo de un símbolo.
///
/// Toda expresión del lenguaje evalúa a `Int`. Las funciones no son
/// valores; su tipo registra la firma para validar llamadas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Function { parameters: Vec<Type> },
}

impl Program {
    /// Resuelve todos los identificadores del programa a nombres únicos.
    pub fn resolve_identifiers(&mut self, names: &mut NameGenerator) -> Semantic<()> {
        let mut scope = Scope::default();
        let mut resolver = Resolver { names };

        for declaration in &mut self.declarations {
            resolver.function(declaration, &mut scope)?;
        }

        Ok(())
    }

    /// Asigna una etiqueta única a cada ciclo y la propaga a los
    /// `break`/`continue` que envuelve.
    pub fn label_loops(&mut self, names: &mut NameGenerator) -> Semantic<()> {
        for declaration in &mut self.declarations {
            if let Some(body) = &mut declaration.body {
                for item in &mut body.items {
                    if let BlockItem::Statement(statement) = item {
                        label_statement(statement, None, names)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Verifica firmas de función, aridad de llamadas y usos de
    /// símbolos.
    pub fn check_types(&self) -> Semantic<()> {
        let mut checker = TypeChecker {
            symbols: HashMap::new(),
        };

        for declaration in &self.declarations {
            checker.function(declaration)?;
        }

        let main = checker.symbols.get(&Identifier::from("main"));
        match main {
            Some(symbol) if symbol.defined => Ok(()),
            _ => Err(Located::at(SemanticError::NoMain, self.eof.clone())),
        }
    }
}

/// Registro de resolución para un identificador visible.
#[derive(Clone)]
struct Binding {
    resolved: Identifier,
    declared_here: bool,
    external: bool,
}

/// Mapeo de nombres visibles en un ámbito léxico.
#[derive(Default)]
struct Scope {
    bindings: HashMap<Identifier, Binding>,
}

impl Scope {
    /// Deriva el ámbito de un bloque interior.
    ///
    /// Las entradas se copian con `declared_here` en falso, de forma
    /// que el bloque interior pueda sombrear sin conflicto.
    fn child(&self) -> Scope {
        let bindings = self
            .bindings
            .iter()
            .map(|(name, binding)| {
                let binding = Binding {
                    declared_here: false,
                    ..binding.clone()
                };

                (name.clone(), binding)
            })
            .collect();

        Scope { bindings }
    }

    fn lookup(&self, name: &Located<Identifier>) -> Semantic<&Binding> {
        self.bindings.get(name.as_ref()).ok_or_else(|| {
            Located::at(
                SemanticError::Undeclared(name.as_ref().clone()),
                name.location().clone(),
            )
        })
    }
}

struct Resolver<'a> {
    names: &'a mut NameGenerator,
}

impl Resolver<'_> {
    fn function(
        &mut self,
        declaration: &mut FunctionDeclaration,
        scope: &mut Scope,
    ) -> Semantic<()> {
        self.declare_function(&declaration.name, scope)?;

        if let Some(body) = &mut declaration.body {
            let mut parameters = scope.child();
            for parameter in &mut declaration.parameters {
                self.declare_parameter(parameter, &declaration.name, &mut parameters)?;
            }

            // El bloque superior de la función comparte el ámbito de
            // los parámetros en vez de anidar uno nuevo
            for item in &mut body.items {
                self.block_item(item, &mut parameters)?;
            }
        }

        Ok(())
    }

    fn declare_function(&mut self, name: &Located<Identifier>, scope: &mut Scope) -> Semantic<()> {
        if let Some(binding) = scope.bindings.get(name.as_ref()) {
            // Una función puede declararse varias veces, pero no
            // chocar con una variable del mismo ámbito
            if binding.declared_here && !binding.external {
                return Err(Located::at(
                    SemanticError::Redeclaration(name.as_ref().clone()),
                    name.location().clone(),
                ));
            }
        }

        scope.bindings.insert(
            name.as_ref().clone(),
            Binding {
                resolved: name.as_ref().clone(),
                declared_here: true,
                external: true,
            },
        );

        Ok(())
    }

    fn declare_parameter(
        &mut self,
        parameter: &mut Parameter,
        function: &Located<Identifier>,
        scope: &mut Scope,
    ) -> Semantic<()> {
        let name = match &mut parameter.name {
            Some(name) => name,
            None => {
                return Err(Located::at(
                    SemanticError::UnnamedParameter,
                    function.location().clone(),
                ))
            }
        };

        self.declare_variable(name, scope)
    }

    fn declare_variable(&mut self, name: &mut Located<Identifier>, scope: &mut Scope) -> Semantic<()> {
        if let Some(binding) = scope.bindings.get(name.as_ref()) {
            if binding.declared_here {
                return Err(Located::at(
                    SemanticError::Redeclaration(name.as_ref().clone()),
                    name.location().clone(),
                ));
            }
        }

        let resolved = self.names.variable(name.as_ref());
        scope.bindings.insert(
            name.as_ref().clone(),
            Binding {
                resolved: resolved.clone(),
                declared_here: true,
                external: false,
            },
        );

        *name = Located::at(resolved, name.location().clone());
        Ok(())
    }

    fn block_item(&mut self, item: &mut BlockItem, scope: &mut Scope) -> Semantic<()> {
        match item {
            BlockItem::Variable(declaration) => self.variable(declaration, scope),
            BlockItem::Function(declaration) => self.function(declaration, scope),
            BlockItem::Statement(statement) => self.statement(statement, scope),
        }
    }

    fn variable(
        &mut self,
        declaration: &mut VariableDeclaration,
        scope: &mut Scope,
    ) -> Semantic<()> {
        // La variable es visible dentro de su propio inicializador
        self.declare_variable(&mut declaration.name, scope)?;

        if let Some(init) = &mut declaration.init {
            self.expr(init, scope)?;
        }

        Ok(())
    }

    fn statement(&mut self, statement: &mut Statement, scope: &mut Scope) -> Semantic<()> {
        match statement {
            Statement::Return(value) | Statement::Expression(value) => self.expr(value, scope),

            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                self.expr(condition, scope)?;
                self.statement(then, scope)?;

                if let Some(otherwise) = otherwise {
                    self.statement(otherwise, scope)?;
                }

                Ok(())
            }

            Statement::Compound(block) => {
                let mut inner = scope.child();
                self.block(block, &mut inner)
            }

            Statement::For {
                init,
                condition,
                post,
                body,
                ..
            } => {
                // El inicializador vive en su propio ámbito, un nivel
                // más adentro que el del padre
                let mut header = scope.child();

                match init {
                    Some(ForInit::Declaration(declaration)) => {
                        self.variable(declaration, &mut header)?
                    }
                    Some(ForInit::Expression(init)) => self.expr(init, &mut header)?,
                    None => (),
                }

                if let Some(condition) = condition {
                    self.expr(condition, &mut header)?;
                }

                if let Some(post) = post {
                    self.expr(post, &mut header)?;
                }

                self.statement(body, &mut header)
            }

            Statement::While {
                condition, body, ..
            } => {
                self.expr(condition, scope)?;
                self.statement(body, scope)
            }

            Statement::DoWhile {
                body, condition, ..
            } => {
                self.statement(body, scope)?;
                self.expr(condition, scope)
            }

            Statement::Break { .. } | Statement::Continue { .. } | Statement::Null => Ok(()),
        }
    }

    fn block(&mut self, block: &mut Block, scope: &mut Scope) -> Semantic<()> {
        for item in &mut block.items {
            self.block_item(item, scope)?;
        }

        Ok(())
    }

    fn expr(&mut self, expr: &mut Located<Expr>, scope: &mut Scope) -> Semantic<()> {
        let location = expr.location().clone();

        match expr.as_mut() {
            Expr::Constant(_) => Ok(()),

            Expr::Variable(name) => {
                let bound = Located::at(name.clone(), location);
                *name = scope.lookup(&bound)?.resolved.clone();

                Ok(())
            }

            Expr::Assignment(target, value) => {
                if !matches!(target.as_ref().as_ref(), Expr::Variable(_)) {
                    return Err(Located::at(
                        SemanticError::InvalidLvalue,
                        target.location().clone(),
                    ));
                }

                self.expr(value, scope)?;
                self.expr(target, scope)
            }

            Expr::Unary(operator, inner) => {
                use crate::parse::UnaryOp::{Decrement, Increment};

                if matches!(operator, Increment | Decrement)
                    && !matches!(inner.as_ref().as_ref(), Expr::Variable(_))
                {
                    return Err(Located::at(
                        SemanticError::InvalidLvalue,
                        inner.location().clone(),
                    ));
                }

                self.expr(inner, scope)
            }

            Expr::Postfix(_, inner) => {
                if !matches!(inner.as_ref().as_ref(), Expr::Variable(_)) {
                    return Err(Located::at(
                        SemanticError::InvalidLvalue,
                        inner.location().clone(),
                    ));
                }

                self.expr(inner, scope)
            }

            Expr::Binary(_, left, right) => {
                self.expr(left, scope)?;
                self.expr(right, scope)
            }

            Expr::Ternary {
                condition,
                true_value,
                false_value,
            } => {
                self.expr(condition, scope)?;
                self.expr(true_value, scope)?;
                self.expr(false_value, scope)
            }

            Expr::Call { callee, arguments } => {
                let resolved = scope.lookup(callee)?.resolved.clone();
                *callee = Located::at(resolved, callee.location().clone());

                for argument in arguments {
                    self.expr(argument, scope)?;
                }

                Ok(())
            }
        }
    }
}

fn label_statement(
    statement: &mut Statement,
    enclosing: Option<&str>,
    names: &mut NameGenerator,
) -> Semantic<()> {
    match statement {
        Statement::If {
            then, otherwise, ..
        } => {
            label_statement(then, enclosing, names)?;
            if let Some(otherwise) = otherwise {
                label_statement(otherwise, enclosing, names)?;
            }

            Ok(())
        }

        Statement::Compound(block) => {
            for item in &mut block.items {
                if let BlockItem::Statement(statement) = item {
                    label_statement(statement, enclosing, names)?;
                }
            }

            Ok(())
        }

        Statement::For { body, label, .. } => {
            let minted = names.loop_label("for");
            *label = Some(minted.clone());

            label_statement(body, Some(&minted), names)
        }

        Statement::While { body, label, .. } => {
            let minted = names.loop_label("while");
            *label = Some(minted.clone());

            label_statement(body, Some(&minted), names)
        }

        Statement::DoWhile { body, label, .. } => {
            let minted = names.loop_label("do");
            *label = Some(minted.clone());

            label_statement(body, Some(&minted), names)
        }

        Statement::Break { label, location } => match enclosing {
            Some(enclosing) => {
                *label = Some(enclosing.to_owned());
                Ok(())
            }

            None => Err(Located::at(
                SemanticError::BreakOutsideLoop,
                location.clone(),
            )),
        },

        Statement::Continue { label, location } => match enclosing {
            Some(enclosing) => {
                *label = Some(enclosing.to_owned());
                Ok(())
            }

            None => Err(Located::at(
                SemanticError::ContinueOutsideLoop,
                location.clone(),
            )),
        },

        Statement::Return(_) | Statement::Expression(_) | Statement::Null => Ok(()),
    }
}

/// Símbolo registrado durante la verificación de tipos.
struct Symbol {
    typ: Type,
    defined: bool,
}

struct TypeChecker {
    symbols: HashMap<Identifier, Symbol>,
}

impl TypeChecker {
    fn function(&mut self, declaration: &FunctionDeclaration) -> Semantic<()> {
        let name = &declaration.name;
        let typ = Type::Function {
            parameters: vec![Type::Int; declaration.parameters.len()],
        };

        match self.symbols.get_mut(name.as_ref()) {
            None => {
                self.symbols.insert(
                    name.as_ref().clone(),
                    Symbol {
                        typ,
                        defined: declaration.body.is_some(),
                    },
                );
            }

            Some(symbol) => {
                // El tipo de un símbolo no puede cambiar entre
                // redeclaraciones
                if symbol.typ != typ {
                    return Err(Located::at(
                        SemanticError::IncompatibleRedeclaration(name.as_ref().clone()),
                        name.location().clone(),
                    ));
                }

                if symbol.defined && declaration.body.is_some() {
                    return Err(Located::at(
                        SemanticError::Redefinition(name.as_ref().clone()),
                        name.location().clone(),
                    ));
                }

                symbol.defined = symbol.defined || declaration.body.is_some();
            }
        }

        if let Some(body) = &declaration.body {
            for parameter in &declaration.parameters {
                if let Some(name) = &parameter.name {
                    self.symbols.insert(
                        name.as_ref().clone(),
                        Symbol {
                            typ: Type::Int,
                            defined: false,
                        },
                    );
                }
            }

            self.block(body)?;
        }

        Ok(())
    }

    fn block(&mut self, block: &Block) -> Semantic<()> {
        for item in &block.items {
            match item {
                BlockItem::Variable(declaration) => self.variable(declaration)?,
                BlockItem::Function(declaration) => self.function(declaration)?,
                BlockItem::Statement(statement) => self.statement(statement)?,
            }
        }

        Ok(())
    }

    fn variable(&mut self, declaration: &VariableDeclaration) -> Semantic<()> {
        self.symbols.insert(
            declaration.name.as_ref().clone(),
            Symbol {
                typ: Type::Int,
                defined: false,
            },
        );

        if let Some(init) = &declaration.init {
            self.expr(init)?;
        }

        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> Semantic<()> {
        match statement {
            Statement::Return(value) | Statement::Expression(value) => {
                self.expr(value)?;
                Ok(())
            }

            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                self.expr(condition)?;
                self.statement(then)?;

                if let Some(otherwise) = otherwise {
                    self.statement(otherwise)?;
                }

                Ok(())
            }

            Statement::Compound(block) => self.block(block),

            Statement::For {
                init,
                condition,
                post,
                body,
                ..
            } => {
                match init {
                    Some(ForInit::Declaration(declaration)) => self.variable(declaration)?,
                    Some(ForInit::Expression(init)) => {
                        self.expr(init)?;
                    }
                    None => (),
                }

                if let Some(condition) = condition {
                    self.expr(condition)?;
                }

                if let Some(post) = post {
                    self.expr(post)?;
                }

                self.statement(body)
            }

            Statement::While {
                condition, body, ..
            } => {
                self.expr(condition)?;
                self.statement(body)
            }

            Statement::DoWhile {
                body, condition, ..
            } => {
                self.statement(body)?;
                self.expr(condition)?;
                Ok(())
            }

            Statement::Break { .. } | Statement::Continue { .. } | Statement::Null => Ok(()),
        }
    }

    fn expr(&mut self, expr: &Located<Expr>) -> Semantic<Type> {
        match expr.as_ref() {
            Expr::Constant(_) => Ok(Type::Int),

            Expr::Variable(name) => {
                let symbol = self.lookup(name, expr.location())?;
                match &symbol.typ {
                    Type::Int => Ok(Type::Int),
                    Type::Function { .. } => Err(Located::at(
                        SemanticError::ExpectedVariable(name.clone()),
                        expr.location().clone(),
                    )),
                }
            }

            Expr::Assignment(target, value) => {
                self.expr(target)?;
                self.expr(value)
            }

            Expr::Unary(_, inner) | Expr::Postfix(_, inner) => self.expr(inner),

            Expr::Binary(_, left, right) => {
                self.expr(left)?;
                self.expr(right)
            }

            Expr::Ternary {
                condition,
                true_value,
                false_value,
            } => {
                self.expr(condition)?;
                self.expr(true_value)?;
                self.expr(false_value)
            }

            Expr::Call { callee, arguments } => {
                let symbol = self.lookup(callee.as_ref(), callee.location())?;
                let parameters = match &symbol.typ {
                    Type::Function { parameters } => parameters.len(),
                    Type::Int => {
                        return Err(Located::at(
                            SemanticError::NotAFunction(callee.as_ref().clone()),
                            callee.location().clone(),
                        ))
                    }
                };

                if parameters != arguments.len() {
                    return Err(Located::at(
                        SemanticError::BadArity(
                            callee.as_ref().clone(),
                            parameters,
                            arguments.len(),
                        ),
                        callee.location().clone(),
                    ));
                }

                for argument in arguments {
                    self.expr(argument)?;
                }

                Ok(Type::Int)
            }
        }
    }

    fn lookup(&self, name: &Identifier, location: &Location) -> Semantic<&Symbol> {
        self.symbols.get(name).ok_or_else(|| {
            Located::at(SemanticError::Undeclared(name.clone()), location.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;
    use crate::source::Source;

    fn analyze(text: &str) -> Result<Program, SemanticError> {
        let source = Source::new("test.c", text);
        let tokens = Lexer::new(source.origin(), source.chars())
            .try_exhaustive()
            .expect("lexer failure in semantic test");

        let mut program =
            crate::parse::parse(source.origin(), tokens.iter()).expect("parser failure");

        let mut names = NameGenerator::new();
        program
            .resolve_identifiers(&mut names)
            .and_then(|()| program.label_loops(&mut names))
            .and_then(|()| program.check_types())
            .map(|()| program)
            .map_err(Located::into_inner)
    }

    fn main_body(program: &Program) -> &[BlockItem] {
        let main = program
            .declarations
            .iter()
            .find(|declaration| declaration.name.as_ref().as_ref() == "main")
            .unwrap();

        &main.body.as_ref().unwrap().items
    }

    #[test]
    fn inner_blocks_shadow_without_aliasing() {
        let program = analyze("int main() { int x = 5; { int x = 6; } return x; }").unwrap();
        let items = main_body(&program);

        let outer = match &items[0] {
            BlockItem::Variable(declaration) => declaration.name.as_ref().clone(),
            other => panic!("expected a declaration, found {:?}", other),
        };

        let inner = match &items[1] {
            BlockItem::Statement(Statement::Compound(block)) => match &block.items[0] {
                BlockItem::Variable(declaration) => declaration.name.as_ref().clone(),
                other => panic!("expected a declaration, found {:?}", other),
            },
            other => panic!("expected a compound statement, found {:?}", other),
        };

        let returned = match &items[2] {
            BlockItem::Statement(Statement::Return(value)) => match value.as_ref() {
                Expr::Variable(name) => name.clone(),
                other => panic!("expected a variable, found {:?}", other),
            },
            other => panic!("expected a return statement, found {:?}", other),
        };

        assert_ne!(outer, inner);
        assert_eq!(outer, returned);
    }

    #[test]
    fn redeclaration_in_the_same_scope_fails() {
        let result = analyze("int main() { int x; int x; return 0; }");
        assert!(matches!(result, Err(SemanticError::Redeclaration(_))));
    }

    #[test]
    fn function_bodies_share_the_parameter_scope() {
        let result = analyze("int f(int a) { int a; return 0; } int main() { return 0; }");
        assert!(matches!(result, Err(SemanticError::Redeclaration(_))));
    }

    #[test]
    fn parameters_may_be_shadowed_one_scope_in() {
        let result = analyze("int f(int a) { { int a; } return a; } int main() { return 0; }");
        assert!(result.is_ok());
    }

    #[test]
    fn undeclared_variables_are_rejected() {
        let result = analyze("int main() { return x; }");
        assert!(matches!(result, Err(SemanticError::Undeclared(_))));
    }

    #[test]
    fn assignment_requires_a_variable_target() {
        let result = analyze("int main() { 1 = 2; return 0; }");
        assert!(matches!(result, Err(SemanticError::InvalidLvalue)));
    }

    #[test]
    fn postfix_operators_require_a_variable_operand() {
        let result = analyze("int main() { return (1 + 2)++; }");
        assert!(matches!(result, Err(SemanticError::InvalidLvalue)));
    }

    #[test]
    fn break_outside_of_a_loop_is_rejected() {
        let result = analyze("int main() { break; }");
        assert!(matches!(result, Err(SemanticError::BreakOutsideLoop)));
    }

    #[test]
    fn continue_outside_of_a_loop_is_rejected() {
        let result = analyze("int main() { if (1) continue; return 0; }");
        assert!(matches!(result, Err(SemanticError::ContinueOutsideLoop)));
    }

    #[test]
    fn breaks_inherit_the_innermost_loop_label() {
        let program =
            analyze("int main() { while (1) { for (;;) break; break; } return 0; }").unwrap();

        let (while_label, items) = match &main_body(&program)[0] {
            BlockItem::Statement(Statement::While { label, body, .. }) => match body.as_ref() {
                Statement::Compound(block) => (label.clone().unwrap(), &block.items),
                other => panic!("expected a compound body, found {:?}", other),
            },
            other => panic!("expected a while loop, found {:?}", other),
        };

        let (for_label, inner_break) = match &items[0] {
            BlockItem::Statement(Statement::For { label, body, .. }) => match body.as_ref() {
                Statement::Break { label: inherited, .. } => {
                    (label.clone().unwrap(), inherited.clone().unwrap())
                }
                other => panic!("expected a break, found {:?}", other),
            },
            other => panic!("expected a for loop, found {:?}", other),
        };

        let outer_break = match &items[1] {
            BlockItem::Statement(Statement::Break { label, .. }) => label.clone().unwrap(),
            other => panic!("expected a break, found {:?}", other),
        };

        assert_eq!(while_label, "while.0");
        assert_eq!(for_label, "for.1");
        assert_eq!(inner_break, for_label);
        assert_eq!(outer_break, while_label);
    }

    #[test]
    fn signatures_must_agree_across_redeclarations() {
        let result = analyze("int f(int); int f(int, int); int main() { return 0; }");
        assert!(matches!(
            result,
            Err(SemanticError::IncompatibleRedeclaration(_))
        ));
    }

    #[test]
    fn compatible_redeclarations_are_allowed() {
        let result = analyze("int f(int); int f(int a) { return a; } int main() { return f(1); }");
        assert!(result.is_ok());
    }

    #[test]
    fn functions_cannot_be_defined_twice() {
        let result = analyze("int f() { return 0; } int f() { return 1; } int main() { return 0; }");
        assert!(matches!(result, Err(SemanticError::Redefinition(_))));
    }

    #[test]
    fn calls_validate_arity() {
        let result = analyze("int f(int a); int main() { return f(); }");
        assert!(matches!(result, Err(SemanticError::BadArity(_, 1, 0))));
    }

    #[test]
    fn only_functions_can_be_called() {
        let result = analyze("int main() { int x; return x(); }");
        assert!(matches!(result, Err(SemanticError::NotAFunction(_))));
    }

    #[test]
    fn functions_are_not_values() {
        let result = analyze("int f(); int main() { return f + 1; }");
        assert!(matches!(result, Err(SemanticError::ExpectedVariable(_))));
    }

    #[test]
    fn definitions_require_named_parameters() {
        let result = analyze("int f(int) { return 0; } int main() { return 0; }");
        assert!(matches!(result, Err(SemanticError::UnnamedParameter)));
    }

    #[test]
    fn a_defined_main_is_required() {
        assert!(matches!(
            analyze("int f() { return 0; }"),
            Err(SemanticError::NoMain)
        ));
        assert!(matches!(analyze("int main();"), Err(SemanticError::NoMain)));
    }

    #[test]
    fn for_initializers_live_in_their_own_scope() {
        let result = analyze("int main() { int i = 9; for (int i = 0; i < 1; i++) ; return i; }");
        assert!(result.is_ok());
    }
}
