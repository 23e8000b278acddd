use clap::{arg, crate_version, ArgAction, Command, ValueHint};

const CONFIG_HELP: &str = "JSON with cooperative limits,
e.g., `{\"expansion\": {\"maxPasses\": 16}, \"budget\": {\"parsePasses\": 256}}`";
const IN_HELP: &str = "if the program is piped, omit `--file` option";

pub fn build_cli() -> Command {
    let long_help = "ropkit is always invoked with exactly one of several subcommands.
The subcommands are generally designed to function as nodes in a pipeline.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
compile a payload:      `ropkit compile -f payload.rop`
compile with libraries: `ropkit compile -f payload.rop -l gadgets.rop -l strings.rop`
one block as raw bytes: `ropkit compile -f payload.rop -b stage1 -t bin > stage1.bin`
check a pipeline node:  `cat payload.rop | ropkit check -l gadgets.rop | ropkit compile`";
    let fmt_types = ["json", "hex", "bin"];
    let shells = ["bash", "elv", "fish", "ps1", "zsh"];

    let mut main_cmd = Command::new("ropkit")
        .about("Compiles ROP payload sources into hex byte-code.")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("compile")
            .arg(
                arg!(-f --file <PATH> "program to compile")
                    .value_hint(ValueHint::FilePath)
                    .required(false),
            )
            .arg(
                arg!(-l --lib <PATH> "library module, may be repeated")
                    .value_hint(ValueHint::FilePath)
                    .action(ArgAction::Append)
                    .required(false),
            )
            .arg(arg!(-b --block <NAME> "restrict output to one block").required(false))
            .arg(
                arg!(-t --type <TYPE> "output format")
                    .value_parser(fmt_types)
                    .required(false)
                    .default_value("json"),
            )
            .arg(arg!(-c --config <JSON> "compiler settings").required(false))
            .visible_alias("asm")
            .about("compile a program to hex byte-code")
            .after_help(CONFIG_HELP.to_string() + "\n\n" + IN_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("check")
            .arg(
                arg!(-f --file <PATH> "program to check")
                    .value_hint(ValueHint::FilePath)
                    .required(false),
            )
            .arg(
                arg!(-l --lib <PATH> "library module, may be repeated")
                    .value_hint(ValueHint::FilePath)
                    .action(ArgAction::Append)
                    .required(false),
            )
            .arg(arg!(-c --config <JSON> "compiler settings").required(false))
            .about("run the full pipeline and report diagnostics only")
            .after_help(IN_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(
                arg!(-s --shell <SHELL> "shell to target")
                    .value_parser(shells)
                    .required(true),
            )
            .about("write completions script to stdout"),
    );
    return main_cmd;
}
