//! Engine error kinds.
//!
//! Every recoverable failure degrades the view instead of aborting it: a
//! missing source file leaves an assembly-only view, a failed disassembly
//! leaves a source-only view. Nothing here terminates the process.

use thiserror::Error;

/// Errors reported by the engine's rebuild operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The source file could not be read (missing, unreadable, or over the
    /// size cap). The view stays usable with assembly only.
    #[error("cannot read source file {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// The capture holds no machine code for the requested symbol.
    #[error("no machine code captured for symbol {0:#x}")]
    SymbolBytesMissing(u64),

    /// The capture's architecture tag is not one the engine can decode.
    #[error("unknown cpu architecture")]
    UnknownArchitecture,

    /// The disassembler rejected the architecture/mode combination.
    #[error("disassembler rejected architecture/mode: {0}")]
    DecoderOpenFailure(String),
}
