//! Parse a devcmd file and re-format it.

fn main() {
    let input = "\
def PORT = 8080;
server:   go run ./cmd/server --port $(PORT)  ;
watch server: air;
stop server: pkill -f air;
build: { go vet ./...; go build ./... }
";

    let program = devcmd_rs::parse_str(input)
        .into_result()
        .expect("parse failed");

    println!("Variables:");
    for var in program.variables() {
        println!("  {} = {}", var.name, var.value.to_shell_string());
    }
    println!("Commands:");
    for cmd in program.commands() {
        println!("  {}{} (line {})", prefix(cmd.modifier), cmd.name, cmd.span.start_line);
    }

    let output = devcmd_rs::format(&program);
    println!("\nFormatted output:\n{output}");
}

fn prefix(modifier: devcmd_rs::Modifier) -> String {
    match modifier {
        devcmd_rs::Modifier::None => String::new(),
        other => format!("{other} "),
    }
}
