//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("zen")
        .about("Inspect and run Zen binary entity files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(dump_command())
        .subcommand(exec_command())
}

/// Disassemble an entity file.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Disassemble a binary entity file")
        .after_help(
            r#"EXAMPLES:
  zen dump Main.feb
  zen dump Main.feb --color always | less -R"#,
        )
        .arg(entity_path_arg())
        .arg(color_arg())
}

/// Load entity files and invoke one function.
pub fn exec_command() -> Command {
    Command::new("exec")
        .about("Run a function from loaded entity files")
        .after_help(
            r#"EXAMPLES:
  zen exec Main.feb -c Main                   # Main.main()
  zen exec Main.feb Point.feb -c Main -f run  # several entities
  zen exec Main.feb -c Main -f fact -a 10     # JSON arguments
  zen exec Main.feb -c Main --trace           # print executed code"#,
        )
        .arg(entity_paths_arg())
        .arg(class_arg())
        .arg(function_arg())
        .arg(argument_arg())
        .arg(compact_arg())
        .arg(trace_arg())
        .arg(fuel_arg())
        .arg(max_depth_arg())
        .arg(color_arg())
}
