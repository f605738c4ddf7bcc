//! Build a devcmd program using the builder API.

use devcmd_rs::{
    BlockBody, CommandBody, CommandDef, CommandText, DecoratedBody, Decorator, Program,
    SimpleCommand, VariableDef,
};

fn main() {
    let program = Program::new()
        .with_variable(VariableDef::new("IMAGE", "registry.local/app"))
        .with_variable(VariableDef::new("TAG", "latest"))
        .with_blank_line()
        .with_command(CommandDef::new(
            "image",
            SimpleCommand::new(CommandText::literal("docker build -t ").var("IMAGE").text(":").var("TAG"))
                .continuation(".")
                .into(),
        ))
        .with_command(CommandDef::new(
            "release",
            CommandBody::decorated(
                DecoratedBody::new(Decorator::block("retry").arg("3")).body(CommandBody::block(
                    BlockBody::new()
                        .plain("make test")
                        .decorated(
                            DecoratedBody::new(Decorator::block("parallel")).body(
                                CommandBody::block(
                                    BlockBody::new()
                                        .plain(CommandText::literal("docker push ").var("IMAGE"))
                                        .plain("git push --tags"),
                                ),
                            ),
                        ),
                )),
            ),
        ))
        .with_command(CommandDef::watch("release", CommandBody::simple("make watch")));

    print!("{}", devcmd_rs::format(&program));
}
