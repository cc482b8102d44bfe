//! Symbol view state: the selection/correlation controller.
//!
//! `SymbolView` holds everything one inspection pane needs: the loaded
//! source, the decoded assembly, and the cursor state that ties them
//! together. Selections are kept as plain value sets (addresses, line
//! numbers); both panes resolve them through the capture store's
//! address-to-line map, which breaks the cyclic source-clicks-asm /
//! asm-clicks-source dependency.

pub mod model;

use std::collections::BTreeSet;

use crate::capture::{CaptureStore, CpuArch, StringIdx, ViewPolicy};
use crate::disasm::{self, AsmLine, Disassembly, JumpTable};
use crate::error::EngineError;
use crate::source::{Line, SourceText};
use crate::stats::IpStats;
use crate::uarch;

/// Which panes the renderer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    Source,
    #[default]
    Asm,
    Mixed,
}

/// One symbol inspection view. Single-threaded; every operation runs to
/// completion on the caller's thread.
pub struct SymbolView {
    file: Option<String>,
    file_string_idx: StringIdx,
    source: Option<SourceText>,

    base_addr: u64,
    sym_addr: u64,
    code_len: u32,
    cpu_arch: CpuArch,
    disasm: Option<Disassembly>,

    display_mode: DisplayMode,
    target_line: u32,
    selected_line: u32,
    target_addr: u64,
    selected_addresses: BTreeSet<u64>,
    selected_addresses_hover: BTreeSet<u64>,
    highlight_addr: u64,
    hovered_line: u32,
    hovered_source: StringIdx,

    /// Print addresses as `+offset` from the symbol base.
    pub asm_relative: bool,
    /// Show raw machine-code bytes.
    pub asm_bytes: bool,
    /// Show per-instruction source location chips.
    pub asm_show_source_location: bool,
    /// Restrict hotness to the selected inline frame instead of the whole
    /// function.
    pub inline_stats: bool,
    /// Show jump arrows.
    pub show_jumps: bool,
    /// Show instruction latency bars.
    pub show_latency: bool,

    sel_micro_arch: usize,
    idx_micro_arch: usize,
}

impl Default for SymbolView {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolView {
    pub fn new() -> Self {
        let mut view = Self {
            file: None,
            file_string_idx: StringIdx::default(),
            source: None,
            base_addr: 0,
            sym_addr: 0,
            code_len: 0,
            cpu_arch: CpuArch::Unknown,
            disasm: None,
            display_mode: DisplayMode::default(),
            target_line: 0,
            selected_line: 0,
            target_addr: 0,
            selected_addresses: BTreeSet::new(),
            selected_addresses_hover: BTreeSet::new(),
            highlight_addr: 0,
            hovered_line: 0,
            hovered_source: StringIdx::default(),
            asm_relative: false,
            asm_bytes: false,
            asm_show_source_location: true,
            inline_stats: true,
            show_jumps: true,
            show_latency: false,
            sel_micro_arch: 0,
            idx_micro_arch: 0,
        };
        view.select_micro_architecture("ZEN2");
        view
    }

    /// Open a plain source file with no symbol attached.
    pub fn open_source(
        &mut self,
        file_name: &str,
        line: u32,
        policy: &dyn ViewPolicy,
    ) -> Result<(), EngineError> {
        self.target_line = line;
        self.selected_line = line;
        self.target_addr = 0;
        self.base_addr = 0;
        self.sym_addr = 0;
        self.code_len = 0;
        self.disasm = None;
        self.selected_addresses.clear();
        self.parse_source(Some(file_name), None, policy)?;
        self.display_mode = DisplayMode::Source;
        Ok(())
    }

    /// Open a symbol: decode its code, load its source if available, and
    /// land the cursor on `line` / `sym_addr`. `sym_addr` may be an inline
    /// frame inside the function at `base_addr`; decoding always covers the
    /// whole function.
    pub fn open_symbol(
        &mut self,
        file_name: Option<&str>,
        line: u32,
        base_addr: u64,
        sym_addr: u64,
        store: &dyn CaptureStore,
        policy: &dyn ViewPolicy,
    ) {
        self.target_line = line;
        self.target_addr = sym_addr;
        self.base_addr = base_addr;
        self.sym_addr = sym_addr;
        self.selected_addresses.clear();
        self.selected_addresses.insert(sym_addr);

        if let Err(e) = self.parse_source(file_name, Some(store), policy) {
            log::warn!("symbol {sym_addr:#x}: {e}");
        }
        if let Err(e) = self.disassemble(base_addr, store) {
            log::debug!("symbol {sym_addr:#x}: {e}");
        }
        self.select_line(line, Some(store), true, Some(sym_addr));

        self.display_mode = if self.source.is_some() {
            if self.asm().is_empty() {
                DisplayMode::Source
            } else {
                DisplayMode::Mixed
            }
        } else {
            DisplayMode::Asm
        };
    }

    /// Load and tokenize `file_name`, replacing the current source iff the
    /// name differs. An empty or missing name clears the source pane.
    pub fn parse_source(
        &mut self,
        file_name: Option<&str>,
        store: Option<&dyn CaptureStore>,
        policy: &dyn ViewPolicy,
    ) -> Result<(), EngineError> {
        let file_name = file_name.filter(|f| !f.is_empty());
        if self.file.as_deref() == file_name {
            return Ok(());
        }
        self.file = file_name.map(str::to_string);
        self.file_string_idx = file_name
            .and_then(|f| store.and_then(|s| s.find_string_idx(f)))
            .unwrap_or_default();
        self.source = None;
        let Some(name) = file_name else {
            return Ok(());
        };
        let resolved = policy.source_substitution(name);
        match SourceText::load(&resolved) {
            Ok(text) => {
                self.source = Some(text);
                Ok(())
            }
            Err(e) => {
                // retryable: a later parse_source with the same name re-reads
                self.file = None;
                self.file_string_idx = StringIdx::default();
                log::warn!("{e}");
                Err(e)
            }
        }
    }

    /// Decode the function at `sym_addr` and rebuild the jump graph. On any
    /// failure the assembly pane is left empty and the view stays usable.
    pub fn disassemble(
        &mut self,
        sym_addr: u64,
        store: &dyn CaptureStore,
    ) -> Result<(), EngineError> {
        self.disasm = None;
        self.code_len = 0;
        self.cpu_arch = store.cpu_arch();
        if sym_addr == 0 {
            return Err(EngineError::SymbolBytesMissing(0));
        }
        if self.cpu_arch == CpuArch::Unknown {
            return Err(EngineError::UnknownArchitecture);
        }
        let code = store
            .symbol_code(sym_addr)
            .ok_or(EngineError::SymbolBytesMissing(sym_addr))?;
        let decoded = disasm::disassemble(self.cpu_arch, code, sym_addr, store)?;
        self.code_len = decoded.code_len;
        self.disasm = Some(decoded);
        Ok(())
    }

    /// Select a source line and propagate to the assembly pane: recompute
    /// the selected address set and, when `change_asm`, the scroll target
    /// (`target_addr` if given, else the line's first in-range address).
    pub fn select_line(
        &mut self,
        line: u32,
        store: Option<&dyn CaptureStore>,
        change_asm: bool,
        target_addr: Option<u64>,
    ) {
        self.selected_line = line;
        if self.sym_addr == 0 {
            return;
        }
        let Some(store) = store else { return };
        self.select_asm_lines(self.file_string_idx, line, store, change_asm, target_addr);
    }

    fn select_asm_lines(
        &mut self,
        file: StringIdx,
        line: u32,
        store: &dyn CaptureStore,
        change_asm: bool,
        target_addr: Option<u64>,
    ) {
        self.selected_addresses.clear();
        let Some(addresses) = store.addresses_for_location(file, line) else {
            return;
        };
        let base = self.base_addr;
        let end = base + self.code_len as u64;
        let in_range = move |a: &u64| *a >= base && *a < end;
        if change_asm {
            if let Some(target) = target_addr.filter(|t| *t != 0) {
                self.target_addr = target;
            } else if let Some(first) = addresses.iter().copied().find(in_range) {
                self.target_addr = first;
            }
        }
        for addr in addresses.iter().copied().filter(in_range) {
            self.selected_addresses.insert(addr);
        }
    }

    /// Hover a source line: rebuild the hover address set and remember the
    /// hovered location. Cleared again by `begin_frame`.
    pub fn hover_source_line(&mut self, file: StringIdx, line: u32, store: &dyn CaptureStore) {
        self.selected_addresses_hover.clear();
        self.hovered_source = file;
        self.hovered_line = line;
        let base = self.base_addr;
        let end = base + self.code_len as u64;
        if let Some(addresses) = store.addresses_for_location(file, line) {
            for addr in addresses.iter().copied().filter(|a| *a >= base && *a < end) {
                self.selected_addresses_hover.insert(addr);
            }
        }
    }

    /// Click the source-location chip of an assembly line. Loads the file
    /// when it differs from the current one and is valid; otherwise only
    /// mirrors the selection into the assembly pane.
    pub fn click_asm_source_location(
        &mut self,
        file: StringIdx,
        line: u32,
        store: &dyn CaptureStore,
        policy: &dyn ViewPolicy,
    ) -> Result<(), EngineError> {
        let file_name = store.string(file).to_string();
        if self.file.as_deref() == Some(file_name.as_str()) {
            self.select_line(line, Some(store), false, None);
            self.display_mode = DisplayMode::Mixed;
        } else if policy.source_file_valid(&file_name, store.capture_time()) {
            self.parse_source(Some(&file_name), Some(store), policy)?;
            self.target_line = line;
            self.select_line(line, Some(store), false, None);
            self.display_mode = DisplayMode::Mixed;
        } else {
            self.select_asm_lines(file, line, store, false, None);
        }
        Ok(())
    }

    /// Click an intra-symbol jump arrow or `-> [sym+offset]` annotation:
    /// scroll to and select the target.
    pub fn click_jump_target(&mut self, target: u64) {
        self.target_addr = target;
        self.selected_addresses.clear();
        self.selected_addresses.insert(target);
    }

    /// Target of an out-of-symbol branch at `source`, for the caller to
    /// open a new symbol view with. Returns and indirect branches sit in
    /// the out-set without a followable target.
    pub fn out_jump_target(&self, source: u64) -> Option<u64> {
        self.disasm
            .as_ref()?
            .jump_out
            .get(&source)
            .copied()
            .filter(|target| *target != 0)
    }

    /// Follow an out-of-symbol branch target: resolve its symbol and reopen
    /// this view there. Returns false when the capture knows nothing usable
    /// about the target.
    pub fn follow_out_jump(
        &mut self,
        target: u64,
        store: &dyn CaptureStore,
        policy: &dyn ViewPolicy,
    ) -> bool {
        let Some(sym) = store.symbol_data(target) else {
            return false;
        };
        let mut line = sym.line;
        let mut file = if line == 0 {
            None
        } else {
            Some(store.string(sym.file).to_string())
        };
        if let Some(name) = &file {
            if !policy.source_file_valid(name, store.capture_time()) {
                file = None;
                line = 0;
            }
        }
        if line > 0 || sym.size > 0 {
            self.open_symbol(file.as_deref(), line, target, target, store, policy);
            true
        } else {
            false
        }
    }

    /// Flag an address for transient highlight (hovering a jump annotation).
    pub fn highlight(&mut self, addr: u64) {
        self.highlight_addr = addr;
    }

    /// Per-frame decay of transient state. Call before feeding this frame's
    /// hover events.
    pub fn begin_frame(&mut self) {
        self.highlight_addr = 0;
        self.hovered_line = 0;
        self.hovered_source = StringIdx::default();
        self.selected_addresses_hover.clear();
    }

    /// One-shot scroll target in source-line space; cleared on consume.
    pub fn take_target_line(&mut self) -> Option<u32> {
        let line = std::mem::take(&mut self.target_line);
        (line != 0).then_some(line)
    }

    /// One-shot scroll target in address space; cleared on consume.
    pub fn take_target_addr(&mut self) -> Option<u64> {
        let addr = std::mem::take(&mut self.target_addr);
        (addr != 0).then_some(addr)
    }

    /// Aggregate sample hotness for the current view: the selected inline
    /// frame only, or the whole function with every inline frame folded in
    /// (then per-line percentages share the assembly denominator).
    pub fn gather_ip_stats(&self, store: &dyn CaptureStore) -> IpStats {
        let mut stats = IpStats::default();
        let file = self.file.as_deref();
        if self.inline_stats {
            stats.gather(self.sym_addr, file, store);
        } else {
            stats.gather(self.base_addr, file, store);
            let sym_end = self.base_addr + self.code_len as u64;
            for &inline_addr in store.inline_symbol_list(self.base_addr, self.code_len as u64) {
                if inline_addr >= sym_end {
                    break;
                }
                stats.gather(inline_addr, file, store);
            }
            stats.total_src = stats.total_asm;
        }
        stats
    }

    /// Switch the micro-architecture used for variant lookups. Unknown
    /// monikers keep the current selection.
    pub fn select_micro_architecture(&mut self, moniker: &str) {
        match (uarch::ux_index(moniker), uarch::data_index(moniker)) {
            (Some(ux), Some(data)) => {
                self.sel_micro_arch = ux;
                self.idx_micro_arch = data;
            }
            _ => log::warn!("unknown micro-architecture moniker {moniker:?}"),
        }
    }

    /// Micro-arch variant for the instruction at `index`, when the
    /// architecture has tables and the op is known.
    pub fn variant_for_line(&self, index: usize) -> Option<&'static uarch::AsmVar> {
        if !matches!(self.cpu_arch, CpuArch::X86 | CpuArch::X64) {
            return None;
        }
        let line = &self.disasm.as_ref()?.lines[index];
        uarch::select_variant(&uarch::MICRO_ARCHS[self.idx_micro_arch], line)
    }

    /// Instruction addresses attributed to a line of the current file,
    /// restricted to the symbol's code range.
    pub fn addresses_for_line(&self, line: u32, store: &dyn CaptureStore) -> Vec<u64> {
        store
            .addresses_for_location(self.file_string_idx, line)
            .map(|addrs| {
                addrs
                    .iter()
                    .copied()
                    .filter(|a| self.in_code_range(*a))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn in_code_range(&self, addr: u64) -> bool {
        addr >= self.base_addr && addr < self.base_addr + self.code_len as u64
    }

    // Render-side accessors.

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn file_string_idx(&self) -> StringIdx {
        self.file_string_idx
    }

    pub fn source(&self) -> Option<&SourceText> {
        self.source.as_ref()
    }

    pub fn source_lines(&self) -> &[Line] {
        self.source.as_ref().map(|s| s.lines()).unwrap_or(&[])
    }

    pub fn asm(&self) -> &[AsmLine] {
        self.disasm.as_ref().map(|d| d.lines.as_slice()).unwrap_or(&[])
    }

    pub fn disassembly(&self) -> Option<&Disassembly> {
        self.disasm.as_ref()
    }

    pub fn jump_table(&self) -> Option<&JumpTable> {
        self.disasm.as_ref().map(|d| &d.jumps)
    }

    pub fn max_jump_level(&self) -> u16 {
        self.disasm.as_ref().map_or(0, |d| d.max_jump_level)
    }

    pub fn base_addr(&self) -> u64 {
        self.base_addr
    }

    pub fn sym_addr(&self) -> u64 {
        self.sym_addr
    }

    pub fn code_len(&self) -> u32 {
        self.code_len
    }

    pub fn cpu_arch(&self) -> CpuArch {
        self.cpu_arch
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn selected_line(&self) -> u32 {
        self.selected_line
    }

    pub fn selected_addresses(&self) -> &BTreeSet<u64> {
        &self.selected_addresses
    }

    pub fn selected_addresses_hover(&self) -> &BTreeSet<u64> {
        &self.selected_addresses_hover
    }

    pub fn highlight_addr(&self) -> u64 {
        self.highlight_addr
    }

    pub fn hovered_line(&self) -> u32 {
        self.hovered_line
    }

    pub fn hovered_source(&self) -> StringIdx {
        self.hovered_source
    }

    pub fn selected_micro_arch(&self) -> &'static uarch::MicroArchUx {
        &uarch::MICRO_ARCH_UX[self.sel_micro_arch]
    }
}
