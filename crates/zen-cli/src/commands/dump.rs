use std::path::{Path, PathBuf};

use zen_bytecode::dump;
use zen_core::Colors;

use super::error::CommandError;
use super::loader::load_entity;

pub struct DumpArgs {
    pub entity_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    match render(&args.entity_path, Colors::new(args.color)) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

pub fn render(path: &Path, colors: Colors) -> Result<String, CommandError> {
    let file = load_entity(path)?;
    Ok(dump(&file, colors))
}
