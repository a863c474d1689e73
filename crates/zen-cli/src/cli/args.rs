//! Argument builders shared by the subcommands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Single entity file (positional).
pub fn entity_path_arg() -> Arg {
    Arg::new("entity_path")
        .value_name("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Binary entity file (.feb)")
}

/// Entity files to load (positional, one or more).
pub fn entity_paths_arg() -> Arg {
    Arg::new("entity_paths")
        .value_name("FILES")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
        .help("Binary entity files to load (.feb)")
}

/// Class holding the function to run (-c/--class).
pub fn class_arg() -> Arg {
    Arg::new("class")
        .short('c')
        .long("class")
        .value_name("CLASS")
        .required(true)
        .help("Fully qualified class name, e.g. app/Main")
}

/// Function to run (-f/--function).
pub fn function_arg() -> Arg {
    Arg::new("function")
        .short('f')
        .long("function")
        .value_name("NAME")
        .default_value("main")
        .help("Function to invoke")
}

/// JSON argument passed to the function (-a/--arg, repeatable).
pub fn argument_arg() -> Arg {
    Arg::new("arguments")
        .short('a')
        .long("arg")
        .value_name("JSON")
        .action(ArgAction::Append)
        .help("Argument as JSON (repeat for each parameter)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Print the result as compact JSON")
}

/// Print executed instructions (--trace).
pub fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .action(ArgAction::SetTrue)
        .help("Print calls and instructions as they execute")
}

/// Execution fuel limit (--fuel).
pub fn fuel_arg() -> Arg {
    Arg::new("fuel")
        .long("fuel")
        .value_name("N")
        .value_parser(value_parser!(u64))
        .help("Stop after N executed instructions")
}

/// Call depth limit (--max-depth).
pub fn max_depth_arg() -> Arg {
    Arg::new("max_depth")
        .long("max-depth")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Maximum call depth (default: 1024)")
}
