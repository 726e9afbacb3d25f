//! Error types for the parts of the simulator that can fail on bad user
//! input, as opposed to the datapath itself, which never raises (see
//! hazard/forwarding/control, which signal failure as zeroed control
//! bundles instead of `Result`s).

use std::path::PathBuf;

/// A failure loading `imem.txt`/`dmem.txt` into a memory image.
#[derive(Debug, thiserror::Error)]
pub enum MemoryLoadError {
    #[error("could not read memory image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: expected 8 binary digits, found {content:?}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },
}
