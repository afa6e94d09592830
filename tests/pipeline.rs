//! Escenarios de extremo a extremo sobre la pipeline completa,
//! desde texto fuente hasta el listado final.

use mcc::{
    error::Diagnostics,
    lex::Lexer,
    names::NameGenerator,
    parse,
    semantic::SemanticError,
    source::{Located, Source},
};

fn compile(text: &str) -> Result<String, Located<SemanticError>> {
    let source = Source::new("test.c", text);
    let tokens = Lexer::new(source.origin(), source.chars())
        .try_exhaustive()
        .expect("unexpected lexer failure");

    let mut program =
        parse::parse(source.origin(), tokens.iter()).expect("unexpected parser failure");

    let mut names = NameGenerator::new();
    program
        .resolve_identifiers(&mut names)
        .and_then(|()| program.label_loops(&mut names))
        .and_then(|()| program.check_types())?;

    let mut assembly = program.lower(&mut names).select(&mut names);
    assembly.legalize();

    let mut buffer = Vec::new();
    assembly
        .emit(&mut buffer)
        .expect("in-memory emission cannot fail");

    Ok(String::from_utf8(buffer).expect("listing is valid UTF-8"))
}

#[test]
fn constant_arithmetic_reaches_the_return_path() {
    let listing = compile("int main() { return 2 + 3 * 4; }").unwrap();

    // La multiplicación alimenta a la suma, y esta al valor de
    // retorno en %r0
    let mul = listing.find("\tmul\n").expect("missing mul");
    let add = listing.find("\tadd\n").expect("missing add");
    let r0 = listing.find("ldra %r0").expect("missing return move");

    assert!(mul < add);
    assert!(add < r0);
}

#[test]
fn calls_push_reversed_and_clean_up_two_slots() {
    let listing = compile("int f(int a, int b) { return a + b; } int main() { return f(1, 2); }")
        .unwrap();

    let push_2 = listing.find(";; Push(Imm(2))").expect("missing push of 2");
    let push_1 = listing.find(";; Push(Imm(1))").expect("missing push of 1");
    let call = listing.find("subr f").expect("missing call");
    let cleanup = listing
        .find(";; DeallocateStack(2)")
        .expect("missing stack cleanup");
    let result = listing
        .find("Reg(%r0))")
        .expect("missing copy of the return register");

    assert!(push_2 < push_1);
    assert!(push_1 < call);
    assert!(call < cleanup);
    assert!(cleanup < result);
}

#[test]
fn while_loops_emit_each_label_once_with_the_test_at_continue() {
    let listing = compile("int main() { int x = 0; while (x < 3) { x = x + 1; } return x; }")
        .unwrap();

    let labels: Vec<_> = listing
        .lines()
        .filter(|line| line.ends_with(':') && !line.starts_with('\t'))
        .collect();

    for expected in &["start_while.0:", "continue_while.0:", "break_while.0:"] {
        assert_eq!(
            labels.iter().filter(|label| *label == expected).count(),
            1,
            "label {} must appear exactly once",
            expected
        );
    }

    // La condición (un Cmp) sigue inmediatamente a continue_
    let continue_at = listing.find("continue_while.0:").unwrap();
    let cmp = listing[continue_at..].find(";; Cmp").unwrap();
    let other = listing[continue_at..].find(";; Load").unwrap();
    assert!(cmp < other);
}

#[test]
fn uninitialized_reads_are_not_rejected() {
    // Leer una variable sin inicializar es válido; la ranura solo
    // existe a partir del legalizador
    let result = compile("int main() { int x; x = x + 1; return x; }");
    assert!(result.is_ok());
}

#[test]
fn shadowed_declarations_do_not_alias() {
    let result = compile("int main() { int x = 5; { int x = 6; } return x; }");
    assert!(result.is_ok());
}

#[test]
fn redeclaration_reports_the_second_position() {
    let error = compile("int main() {\n    int x;\n    int x;\n    return 0;\n}").unwrap_err();

    assert!(matches!(error.as_ref(), SemanticError::Redeclaration(_)));
    assert_eq!(error.location().start().line(), 3);

    let rendered = Diagnostics::from(error).to_string();
    assert!(rendered.contains("test.c:3"));
    assert!(rendered.contains("int x;"));
    assert!(rendered.contains('^'));
}

#[test]
fn compilation_is_deterministic() {
    let source = "int pow2(int n) {\n\
                  \tint r = 1;\n\
                  \tfor (int i = 0; i < n; i++) r = r * 2;\n\
                  \treturn r;\n\
                  }\n\
                  int main() { return pow2(8); }";

    let first = compile(source).unwrap();
    let second = compile(source).unwrap();

    assert_eq!(first, second);
}

#[test]
fn short_circuit_skips_the_right_operand() {
    let listing = compile(
        "int touch(int x) { return x; } int main() { return 0 && touch(1); }",
    )
    .unwrap();

    // El salto que omite al operando derecho antecede a su llamada
    let main_at = listing.find("main:").unwrap();
    let skip = listing[main_at..].find("jz").unwrap();
    let call = listing[main_at..].find("subr touch").unwrap();

    assert!(skip < call);
}

#[test]
fn ternary_selects_between_both_arms() {
    let result = compile("int main() { int x = 1; return x ? 10 : 20; }");
    assert!(result.is_ok());
}

#[test]
fn the_listing_halts_at_the_end() {
    let listing = compile("int main() { return 0; }").unwrap();
    assert!(listing.trim_end().ends_with("; halt at the end of the program"));
}
