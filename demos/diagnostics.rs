//! Demonstrate diagnostics for invalid devcmd input.

use devcmd_rs::{ParseOptions, SourceFile};

fn main() {
    let input = "\
def PORT = 8080
server: echo ready ∞;
build: {
\tmake
\tmake install
}
def PORT = 9090;
watch api: go run ./api;
deploy: @ship(prod) { make release }
";
    let source = SourceFile::new("commands.cli", input);
    let options = ParseOptions::new().known_decorators(["retry", "timeout", "parallel"]);
    let result = devcmd_rs::parse(&source, &options);

    for diagnostic in &result.diagnostics {
        let span = diagnostic.span;
        println!(
            "{}:{}:{}: {}[{}]: {}",
            source.name(),
            span.start_line,
            span.start_col,
            diagnostic.severity,
            diagnostic.code,
            diagnostic.message
        );
        for note in &diagnostic.notes {
            println!("  note at {}: {}", note.span, note.message);
        }
    }

    println!(
        "\n{} error(s), {} warning(s); {} definition(s) recovered",
        result.errors().count(),
        result.warnings().count(),
        result.program.definitions().count()
    );
}
