//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::dump::DumpArgs;
use crate::commands::exec::ExecArgs;

pub struct DumpParams {
    pub entity_path: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            entity_path: m
                .get_one::<PathBuf>("entity_path")
                .cloned()
                .unwrap_or_default(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            entity_path: p.entity_path,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ExecParams {
    pub entity_paths: Vec<PathBuf>,
    pub class: String,
    pub function: String,
    pub arguments: Vec<String>,
    pub compact: bool,
    pub trace: bool,
    pub fuel: Option<u64>,
    pub max_depth: Option<u32>,
    pub color: ColorChoice,
}

impl ExecParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            entity_paths: m
                .get_many::<PathBuf>("entity_paths")
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            class: m.get_one::<String>("class").cloned().unwrap_or_default(),
            function: m
                .get_one::<String>("function")
                .cloned()
                .unwrap_or_else(|| "main".to_string()),
            arguments: m
                .get_many::<String>("arguments")
                .map(|args| args.cloned().collect())
                .unwrap_or_default(),
            compact: m.get_flag("compact"),
            trace: m.get_flag("trace"),
            fuel: m.get_one::<u64>("fuel").copied(),
            max_depth: m.get_one::<u32>("max_depth").copied(),
            color: parse_color(m),
        }
    }
}

impl From<ExecParams> for ExecArgs {
    fn from(p: ExecParams) -> Self {
        Self {
            entity_paths: p.entity_paths,
            class: p.class,
            function: p.function,
            arguments: p.arguments,
            compact: p.compact,
            trace: p.trace,
            fuel: p.fuel,
            max_depth: p.max_depth,
            color: p.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
