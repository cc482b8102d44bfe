//! End-to-end symbol view tests against an in-memory capture store.
//!
//! The x64 byte patterns are decoded by the real Capstone backend; the
//! store and the source policy are fixtures.

use std::collections::HashMap;
use std::io::Write;

use symscope::capture::{
    CaptureStore, CpuArch, SourceLocation, StringIdx, SymbolData, SymbolStats, ViewPolicy,
};
use symscope::view::model::{self, InlineFunctions};
use symscope::{DisplayMode, SymbolView};

/// je +1; nop; ret
///
/// Three instructions at 0x1000/0x1002/0x1003; the branch targets the ret.
const JE_NOP_RET: &[u8] = &[0x74, 0x01, 0x90, 0xC3];

/// xor eax, eax; lea rax, [rip+0x10]; jne 0xffe (out of symbol); ret
const LEA_RIP: &[u8] = &[
    0x31, 0xC0, // xor eax, eax
    0x48, 0x8D, 0x05, 0x10, 0x00, 0x00, 0x00, // lea rax, [rip+0x10]
    0x75, 0xF3, // jne 0xffe (before the symbol)
    0xC3, // ret
];

#[derive(Default)]
struct MockStore {
    arch: CpuArch,
    code: HashMap<u64, Vec<u8>>,
    symbols: HashMap<u64, SymbolData>,
    inline: HashMap<u64, Vec<u64>>,
    locations: HashMap<u64, SourceLocation>,
    line_addrs: HashMap<(StringIdx, u32), Vec<u64>>,
    ips: HashMap<u64, Vec<(u64, u32)>>,
    frames: HashMap<u64, SourceLocation>,
    strings: Vec<String>,
    stats: HashMap<u64, SymbolStats>,
}

impl MockStore {
    fn new(arch: CpuArch) -> Self {
        Self {
            arch,
            strings: vec![String::new()],
            ..Default::default()
        }
    }

    fn intern(&mut self, s: &str) -> StringIdx {
        if let Some(pos) = self.strings.iter().position(|v| v == s) {
            return StringIdx(pos as u32);
        }
        self.strings.push(s.to_string());
        StringIdx(self.strings.len() as u32 - 1)
    }
}

impl CaptureStore for MockStore {
    fn symbol_code(&self, addr: u64) -> Option<&[u8]> {
        self.code.get(&addr).map(Vec::as_slice)
    }

    fn symbol_data(&self, addr: u64) -> Option<SymbolData> {
        self.symbols.get(&addr).copied()
    }

    fn symbol_for_address(&self, addr: u64) -> Option<(u64, u32)> {
        self.symbols
            .iter()
            .find(|(base, sym)| addr >= **base && addr < **base + sym.size)
            .map(|(base, _)| (*base, (addr - base) as u32))
    }

    fn inline_symbol_list(&self, base_addr: u64, _code_len: u64) -> &[u64] {
        self.inline.get(&base_addr).map(Vec::as_slice).unwrap_or(&[])
    }

    fn location_for_address(&self, addr: u64) -> Option<SourceLocation> {
        self.locations.get(&addr).copied()
    }

    fn addresses_for_location(&self, file: StringIdx, line: u32) -> Option<&[u64]> {
        self.line_addrs.get(&(file, line)).map(Vec::as_slice)
    }

    fn symbol_instruction_pointers(&self, addr: u64) -> Option<&[(u64, u32)]> {
        self.ips.get(&addr).map(Vec::as_slice)
    }

    fn callstack_frame(&self, ip: u64) -> Option<SourceLocation> {
        self.frames.get(&ip).copied()
    }

    fn canonical_pointer(&self, ip: u64) -> u64 {
        ip
    }

    fn string(&self, idx: StringIdx) -> &str {
        &self.strings[idx.0 as usize]
    }

    fn find_string_idx(&self, s: &str) -> Option<StringIdx> {
        self.strings
            .iter()
            .position(|v| v == s)
            .map(|p| StringIdx(p as u32))
    }

    fn symbol_stats(&self) -> &HashMap<u64, SymbolStats> {
        &self.stats
    }

    fn cpu_arch(&self) -> CpuArch {
        self.arch
    }

    fn sampling_period(&self) -> u64 {
        10_000
    }

    fn capture_time(&self) -> u64 {
        1_700_000_000_000_000_000
    }
}

/// Policy with no substitution that trusts every path.
struct TrustingPolicy;

impl ViewPolicy for TrustingPolicy {
    fn source_substitution(&self, path: &str) -> String {
        path.to_string()
    }

    fn source_file_valid(&self, path: &str, _capture_time: u64) -> bool {
        std::path::Path::new(path).is_file()
    }
}

fn open_asm_only(store: &MockStore, base: u64) -> SymbolView {
    let mut view = SymbolView::new();
    view.open_symbol(None, 0, base, base, store, &TrustingPolicy);
    view
}

#[test]
fn conditional_jump_forward() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, JE_NOP_RET.to_vec());
    let view = open_asm_only(&store, 0x1000);

    let asm = view.asm();
    let addrs: Vec<u64> = asm.iter().map(|l| l.addr).collect();
    let sizes: Vec<u8> = asm.iter().map(|l| l.size).collect();
    assert_eq!(addrs, [0x1000, 0x1002, 0x1003]);
    assert_eq!(sizes, [2, 1, 1]);
    assert_eq!(asm[0].jump_addr, 0x1003);

    let jumps = view.jump_table().unwrap();
    assert_eq!(jumps.len(), 1);
    let entry = &jumps[&0x1003];
    assert_eq!((entry.min, entry.max, entry.level), (0x1000, 0x1003, 0));
    assert_eq!(entry.sources, [0x1000]);
    assert_eq!(view.max_jump_level(), 0);
    assert_eq!(view.display_mode(), DisplayMode::Asm);
    // the ret leaves the symbol with no immediate target
    assert!(view.disassembly().unwrap().jump_out.contains_key(&0x1003));
    Ok(())
}

#[test]
fn ret_and_indirect_branches_land_in_the_out_set() {
    let mut store = MockStore::new(CpuArch::X64);
    // jmp rax; ret
    store.code.insert(0x1000, vec![0xFF, 0xE0, 0xC3]);
    let view = open_asm_only(&store, 0x1000);

    let jmp = &view.asm()[0];
    let ret = &view.asm()[1];
    assert_eq!((jmp.jump_addr, ret.jump_addr), (0, 0));
    let out = &view.disassembly().unwrap().jump_out;
    assert!(out.contains_key(&jmp.addr));
    assert!(out.contains_key(&ret.addr));
    // nothing followable: neither has a resolvable target
    assert_eq!(view.out_jump_target(jmp.addr), None);
    assert_eq!(view.out_jump_target(ret.addr), None);
    assert!(view.jump_table().unwrap().is_empty());
}

#[test]
fn undecodable_bytes_decode_to_an_empty_listing() {
    let mut store = MockStore::new(CpuArch::X64);
    // ff /7 is not a valid encoding; capstone decodes nothing
    store.code.insert(0x1000, vec![0xFF, 0xFF]);
    let mut view = SymbolView::new();
    assert!(view.disassemble(0x1000, &store).is_ok());
    assert!(view.asm().is_empty());
    assert_eq!(view.code_len(), 2);
    assert!(view.jump_table().unwrap().is_empty());
}

#[test]
fn decode_is_idempotent() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, JE_NOP_RET.to_vec());
    let mut view = open_asm_only(&store, 0x1000);
    let first: Vec<_> = view.asm().to_vec();
    let jumps_first = view.jump_table().unwrap().clone();
    view.disassemble(0x1000, &store).unwrap();
    assert_eq!(view.asm(), first.as_slice());
    assert_eq!(view.jump_table().unwrap(), &jumps_first);
}

#[test]
fn instruction_ranges_are_disjoint_and_cover_a_prefix() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, LEA_RIP.to_vec());
    let view = open_asm_only(&store, 0x1000);
    let mut cursor = 0x1000u64;
    for line in view.asm() {
        assert!(line.size > 0 && line.size <= 16);
        assert_eq!(line.addr, cursor);
        cursor += line.size as u64;
    }
    assert!(cursor <= 0x1000 + view.code_len() as u64);
}

#[test]
fn branch_out_of_symbol_lands_in_the_out_set() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, LEA_RIP.to_vec());
    let view = open_asm_only(&store, 0x1000);

    // jne at 0x1009 targets 0xff6, before the symbol
    let jne = view.asm().iter().find(|l| l.mnemonic == "jne").unwrap();
    assert_eq!(jne.jump_addr, 0);
    let target = view.out_jump_target(jne.addr).unwrap();
    assert!(target < 0x1000);
    assert!(view.jump_table().unwrap().is_empty());
}

#[test]
fn branch_to_exact_symbol_end_is_out_of_symbol() {
    let mut store = MockStore::new(CpuArch::X64);
    // nop; jmp 0x1003: the target is base+len, one past the last byte
    store.code.insert(0x1000, vec![0x90, 0xEB, 0x00]);
    let view = open_asm_only(&store, 0x1000);
    let jmp = view.asm().iter().find(|l| l.mnemonic == "jmp").unwrap();
    assert_eq!(jmp.jump_addr, 0);
    assert_eq!(view.out_jump_target(jmp.addr), Some(0x1003));
    assert!(view.jump_table().unwrap().is_empty());
}

#[test]
fn single_instruction_symbol_has_no_jump_lanes() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, vec![0xC3]);
    let view = open_asm_only(&store, 0x1000);
    assert_eq!(view.asm().len(), 1);
    assert!(view.jump_table().unwrap().is_empty());
    assert_eq!(view.max_jump_level(), 0);
}

#[test]
fn rip_relative_lea_classifies_as_rd() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, LEA_RIP.to_vec());
    let view = open_asm_only(&store, 0x1000);

    let (idx, lea) = view
        .asm()
        .iter()
        .enumerate()
        .find(|(_, l)| l.mnemonic == "lea")
        .unwrap();
    assert_eq!(lea.lea, symscope::disasm::LeaKind::Rd);
    // resolves through the LEA_RD table entry
    let var = view.variant_for_line(idx).unwrap();
    assert_eq!(var.min_lat, 1);
    assert_eq!(model::describe_operands(var), "Reg64, AGen");
}

#[test]
fn zero_length_code_fails_disassembly() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, Vec::new());
    let mut view = SymbolView::new();
    assert!(view.disassemble(0x1000, &store).is_err());
    assert!(view.asm().is_empty());
}

#[test]
fn unknown_architecture_fails_disassembly() {
    let mut store = MockStore::new(CpuArch::Unknown);
    store.code.insert(0x1000, JE_NOP_RET.to_vec());
    let mut view = SymbolView::new();
    assert!(view.disassemble(0x1000, &store).is_err());
}

#[test]
fn missing_bytes_fall_back_to_source_only() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join("symscope_fallback");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("fallback.c");
    let mut f = std::fs::File::create(&path)?;
    writeln!(f, "int main() {{ return 0; }}")?;
    let path = path.to_string_lossy().to_string();

    let mut store = MockStore::new(CpuArch::X64);
    store.intern(&path);
    let mut view = SymbolView::new();
    view.open_symbol(Some(&path), 1, 0x1000, 0x1000, &store, &TrustingPolicy);
    assert_eq!(view.display_mode(), DisplayMode::Source);
    assert!(view.asm().is_empty());
    assert!(!view.source_lines().is_empty());
    Ok(())
}

#[test]
fn hotness_aggregation_totals() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, JE_NOP_RET.to_vec());
    store
        .ips
        .insert(0x1000, vec![(0x1000, 3), (0x1003, 1)]);
    let view = open_asm_only(&store, 0x1000);
    let stats = view.gather_ip_stats(&store);

    assert_eq!(stats.total_asm, 4);
    assert_eq!(stats.max_asm, 3);
    let hot = view.asm_line_model(0, &stats, &store).unwrap().hotness.unwrap();
    assert_eq!(hot.percent, 75.0);
    assert_eq!(model::format_percentage(hot.percent), " 75.00%");
    // hottest bin sits at parity: red plus full green
    assert_eq!(hot.color, 0xFF00FFFF);
}

#[test]
fn selection_propagates_from_source_to_asm() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join("symscope_select");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("select.c");
    let mut f = std::fs::File::create(&path)?;
    for i in 1..=50 {
        writeln!(f, "// line {i}")?;
    }
    let path = path.to_string_lossy().to_string();

    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, JE_NOP_RET.to_vec());
    let file = store.intern(&path);
    // line 42 maps to one in-range and one out-of-range address
    store.line_addrs.insert((file, 42), vec![0x1003, 0x1050]);

    let mut view = SymbolView::new();
    view.open_symbol(Some(&path), 1, 0x1000, 0x1000, &store, &TrustingPolicy);
    assert_eq!(view.display_mode(), DisplayMode::Mixed);

    view.select_line(42, Some(&store), true, None);
    assert_eq!(view.selected_line(), 42);
    let selected: Vec<u64> = view.selected_addresses().iter().copied().collect();
    assert_eq!(selected, [0x1003]);
    assert_eq!(view.take_target_addr(), Some(0x1003));
    assert_eq!(view.take_target_addr(), None);

    // reselecting is a no-op on selection state
    view.select_line(42, Some(&store), false, None);
    let again: Vec<u64> = view.selected_addresses().iter().copied().collect();
    assert_eq!(again, selected);
    Ok(())
}

#[test]
fn hover_state_decays_per_frame() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, JE_NOP_RET.to_vec());
    let file = store.intern("virtual.c");
    store.line_addrs.insert((file, 7), vec![0x1002]);

    let mut view = open_asm_only(&store, 0x1000);
    view.hover_source_line(file, 7, &store);
    assert!(view.selected_addresses_hover().contains(&0x1002));
    assert_eq!(view.hovered_line(), 7);
    view.begin_frame();
    assert!(view.selected_addresses_hover().is_empty());
    assert_eq!(view.hovered_line(), 0);
}

#[test]
fn whole_function_mode_shares_the_denominator() {
    let mut store = MockStore::new(CpuArch::X64);
    let code = vec![0x90u8; 0x40];
    store.code.insert(0x1000, code);
    store.inline.insert(0x1000, vec![0x1010, 0x1020]);
    store.ips.insert(0x1000, vec![(0x1000, 2)]);
    store.ips.insert(0x1010, vec![(0x1010, 5)]);
    store.ips.insert(0x1020, vec![(0x1021, 1)]);

    let mut view = open_asm_only(&store, 0x1000);
    view.inline_stats = false;
    let stats = view.gather_ip_stats(&store);
    assert_eq!(stats.total_asm, 8);
    assert_eq!(stats.total_src, stats.total_asm);

    view.inline_stats = true;
    let exclusive = view.gather_ip_stats(&store);
    assert_eq!(exclusive.total_asm, 2);
}

#[test]
fn inline_selector_sorts_hottest_first() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, vec![0x90u8; 0x40]);
    store.inline.insert(0x1000, vec![0x1010, 0x1020]);
    let outer = store.intern("outer");
    let hot = store.intern("hot_inline");
    let cold = store.intern("cold_inline");
    for (addr, name) in [(0x1000u64, outer), (0x1010, hot), (0x1020, cold)] {
        store.symbols.insert(
            addr,
            SymbolData { name, file: StringIdx(0), line: 0, size: 0x10, is_inline: addr != 0x1000 },
        );
    }
    store.stats.insert(0x1010, SymbolStats { excl: 9, incl: 9 });
    store.stats.insert(0x1020, SymbolStats { excl: 1, incl: 1 });

    let view = open_asm_only(&store, 0x1000);
    let InlineFunctions { entries, total_samples } =
        view.inline_function_model(&store).unwrap();
    assert_eq!(total_samples, 10);
    let order: Vec<u64> = entries.iter().map(|e| e.addr).collect();
    assert_eq!(order, [0x1010, 0x1020, 0x1000]);
}

#[test]
fn out_jump_annotation_names_the_target_symbol() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, LEA_RIP.to_vec());
    let callee = store.intern("helper");
    store.symbols.insert(
        0xff0,
        SymbolData { name: callee, file: StringIdx(0), line: 0, size: 0x10, is_inline: false },
    );
    let view = open_asm_only(&store, 0x1000);
    let stats = view.gather_ip_stats(&store);

    let jne_index = view.asm().iter().position(|l| l.mnemonic == "jne").unwrap();
    let line = view.asm_line_model(jne_index, &stats, &store).unwrap();
    assert!(line.jump_out);
    let target = line.target.unwrap();
    assert!(!target.within_symbol);
    assert_eq!(target.label, "[helper+14]");
}

#[test]
fn asm_model_columns_are_padded() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, LEA_RIP.to_vec());
    let mut view = open_asm_only(&store, 0x1000);
    view.asm_bytes = true;
    let stats = view.gather_ip_stats(&store);

    let width = view.max_addr_digits();
    let mnemonic_width = view.disassembly().unwrap().max_mnemonic_len;
    for i in 0..view.asm().len() {
        let line = view.asm_line_model(i, &stats, &store).unwrap();
        assert_eq!(line.addr_text.len(), width);
        assert_eq!(line.mnemonic.len(), mnemonic_width);
        let bytes = line.bytes_hex.unwrap();
        assert_eq!(bytes, model::hex_bytes(
            &LEA_RIP[(line.addr - 0x1000) as usize..][..view.asm()[i].size as usize],
        ));
    }

    view.asm_relative = true;
    let first = view.asm_line_model(0, &stats, &store).unwrap();
    assert!(first.addr_text.starts_with("+0"));
}

#[test]
fn reopening_the_same_source_is_stable() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join("symscope_reopen");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("reopen.c");
    std::fs::write(&path, "int f() { return 1; }\n")?;
    let path = path.to_string_lossy().to_string();

    let store = MockStore::new(CpuArch::X64);
    let mut view = SymbolView::new();
    view.open_source(&path, 1, &TrustingPolicy)?;
    let before: Vec<(u32, u32)> = view.source_lines().iter().map(|l| (l.begin, l.end)).collect();
    view.parse_source(Some(&path), Some(&store), &TrustingPolicy)?;
    let after: Vec<(u32, u32)> = view.source_lines().iter().map(|l| (l.begin, l.end)).collect();
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn micro_arch_selection_changes_variant_numbers() {
    let mut store = MockStore::new(CpuArch::X64);
    store.code.insert(0x1000, LEA_RIP.to_vec());
    let mut view = open_asm_only(&store, 0x1000);
    let lea_index = view.asm().iter().position(|l| l.mnemonic == "lea").unwrap();

    view.select_micro_architecture("ZEN2");
    let zen = view.variant_for_line(lea_index).unwrap();
    view.select_micro_architecture("CON");
    let core2 = view.variant_for_line(lea_index).unwrap();
    assert!(core2.throughput > zen.throughput);
    assert_eq!(view.selected_micro_arch().moniker, "CON");

    // unknown monikers keep the current selection
    view.select_micro_architecture("NOPE");
    assert_eq!(view.selected_micro_arch().moniker, "CON");
}
