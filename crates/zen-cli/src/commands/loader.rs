//! Reading entity files from disk.

use std::fs;
use std::path::Path;

use tracing::debug;
use zen_bytecode::EntityFile;
use zen_vm::{Limits, VirtualMachine};

use super::error::CommandError;

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, CommandError> {
    fs::read(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_entity(path: &Path) -> Result<EntityFile, CommandError> {
    let bytes = read_bytes(path)?;
    EntityFile::from_bytes(&bytes).map_err(|source| CommandError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// A machine with every file in `paths` loaded, in order.
pub fn load_machine(paths: &[impl AsRef<Path>], limits: Limits) -> Result<VirtualMachine, CommandError> {
    let mut builder = VirtualMachine::builder().limits(limits);
    for path in paths {
        let path = path.as_ref();
        let file = load_entity(path)?;
        debug!(path = %path.display(), class = file.name().unwrap_or("?"), "loading entity");
        builder = builder.load(&file).map_err(|source| CommandError::Load {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(builder.build())
}
