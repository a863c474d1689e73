//! Run one function from a set of entity files.

use std::path::PathBuf;

use serde_json::Value as Json;
use zen_core::Colors;
use zen_vm::{Limits, Output, PrintTracer, VirtualMachine};

use super::error::CommandError;
use super::loader::load_machine;

pub struct ExecArgs {
    pub entity_paths: Vec<PathBuf>,
    pub class: String,
    pub function: String,
    pub arguments: Vec<String>,
    pub compact: bool,
    pub trace: bool,
    pub fuel: Option<u64>,
    pub max_depth: Option<u32>,
    pub color: bool,
}

impl ExecArgs {
    pub fn limits(&self) -> Limits {
        let mut limits = Limits::new();
        if let Some(depth) = self.max_depth {
            limits = limits.recursion_limit(depth);
        }
        if let Some(fuel) = self.fuel {
            limits = limits.exec_fuel(fuel);
        }
        limits
    }
}

pub fn run(args: ExecArgs) {
    let colors = Colors::new(args.color);
    let execution = execute(&args, colors).unwrap_or_else(|e| fail(e));
    for line in &execution.trace {
        println!("{line}");
    }
    if args.trace {
        println!("{}---{}", colors.dim, colors.reset);
    }
    match execution.result {
        Ok(text) => println!("{text}"),
        Err(e) => fail(e),
    }
}

fn fail(e: CommandError) -> ! {
    eprintln!("error: {e}");
    std::process::exit(e.exit_code())
}

/// What `exec` prints: trace lines, then the rendered result or the error
/// that stopped execution.
pub struct Execution {
    pub trace: Vec<String>,
    pub result: Result<String, CommandError>,
}

/// Load, convert arguments and run. Only load and argument failures are
/// returned as `Err`.
pub fn execute(args: &ExecArgs, colors: Colors) -> Result<Execution, CommandError> {
    let vm = load_machine(&args.entity_paths, args.limits())?;
    let arguments = parse_arguments(&args.arguments)?;
    let (result, trace) = invoke(&vm, args, arguments, colors);
    Ok(Execution {
        trace,
        result: result.and_then(|output| render(&output, args.compact, colors)),
    })
}

fn invoke(
    vm: &VirtualMachine,
    args: &ExecArgs,
    arguments: Vec<Output>,
    colors: Colors,
) -> (Result<Output, CommandError>, Vec<String>) {
    if !args.trace {
        let result = vm.invoke(&args.class, &args.function, arguments);
        return (result.map_err(CommandError::from), Vec::new());
    }
    let tracer = PrintTracer::new(colors);
    let (result, tracer) = vm.invoke_traced(&args.class, &args.function, arguments, tracer);
    (result.map_err(CommandError::from), tracer.into_lines())
}

pub fn parse_arguments(texts: &[String]) -> Result<Vec<Output>, CommandError> {
    texts
        .iter()
        .map(|text| {
            serde_json::from_str::<Json>(text)
                .map(from_json)
                .map_err(|source| CommandError::Argument {
                    text: text.clone(),
                    source,
                })
        })
        .collect()
}

/// JSON to VM input. Booleans become `0`/`1`, integers take the narrowest
/// of int and long, objects become string-keyed maps.
pub fn from_json(json: Json) -> Output {
    match json {
        Json::Null => Output::Null,
        Json::Bool(b) => Output::Int(i32::from(b)),
        Json::Number(n) => match n.as_i64() {
            Some(v) => i32::try_from(v).map_or(Output::Long(v), Output::Int),
            None => Output::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(text) => Output::String(text),
        Json::Array(elements) => Output::Array(elements.into_iter().map(from_json).collect()),
        Json::Object(entries) => Output::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Output::String(k), from_json(v)))
                .collect(),
        ),
    }
}

pub fn render(output: &Output, compact: bool, colors: Colors) -> Result<String, CommandError> {
    if compact {
        return serde_json::to_string(output).map_err(CommandError::Serialize);
    }
    Ok(output.format(true, colors))
}
