//! Generation settings.

use std::path::{Path, PathBuf};

/// Where [`crate::compile_to_file`] writes when no path is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "output.feb";

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Output file.
    pub(crate) output_path: PathBuf,
    /// Source file name recorded in a `vm/SourceFile` entity attribute.
    pub(crate) source_file: Option<String>,
    /// Written verbatim into the header.
    pub(crate) stream_flags: u16,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            source_file: None,
            stream_flags: 0,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output file path.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Record the source file name in the entity.
    pub fn source_file(mut self, name: impl Into<String>) -> Self {
        self.source_file = Some(name.into());
        self
    }

    pub fn stream_flags(mut self, flags: u16) -> Self {
        self.stream_flags = flags;
        self
    }

    pub fn get_output_path(&self) -> &Path {
        &self.output_path
    }
}
