//! symscope: source/assembly correlation engine for a sampling profiler's
//! symbol inspection view.
//!
//! Given a captured symbol (code bytes, architecture tag, address-to-line
//! map) the engine produces three correlated views: a tokenized source
//! listing, a disassembled instruction listing with jump arrows and
//! per-instruction cycle metadata, and hotness statistics aggregated per
//! source line and per instruction from the capture's sample histogram.
//!
//! The engine is a library. The immediate-mode renderer, the capture store,
//! and the source-path policy are consumed through the narrow interfaces in
//! [`capture`]; the output is the stable render model in [`view::model`].
//!
//! ```no_run
//! use symscope::capture::{CaptureStore, IdentityPolicy};
//! use symscope::SymbolView;
//!
//! fn inspect(store: &dyn CaptureStore, base: u64) {
//!     let mut view = SymbolView::new();
//!     view.open_symbol(None, 0, base, base, store, &IdentityPolicy);
//!     let stats = view.gather_ip_stats(store);
//!     for i in 0..view.asm().len() {
//!         let line = view.asm_line_model(i, &stats, store).unwrap();
//!         println!("{}{} {}", line.addr_text, line.mnemonic, line.operands);
//!     }
//! }
//! ```

pub mod capture;
pub mod disasm;
pub mod error;
pub mod source;
pub mod stats;
pub mod syntax;
pub mod uarch;
pub mod view;

pub use error::EngineError;
pub use view::{DisplayMode, SymbolView};
