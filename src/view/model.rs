//! Render model production.
//!
//! Everything the renderer draws is packaged here as plain values: gutter
//! cells, padded text columns, arrow lanes, scrollbar minimap buckets. The
//! renderer owns layout and input; the model owns content.

use std::collections::BTreeMap;

use crate::capture::{CaptureStore, SourceLocation, StringIdx, ViewPolicy};
use crate::disasm::OpKind;
use crate::source::Line;
use crate::stats::{hotness_color, IpStats};
use crate::syntax::Token;
use crate::uarch::AsmVar;
use crate::view::SymbolView;

/// Color of a minimap bucket or line with no samples.
const COLD_COLOR: u32 = 0x22FF_FFFF;

/// Hotness gutter cell of one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHotness {
    pub count: u32,
    /// Share of the view's total samples, 0-100.
    pub percent: f32,
    /// Heat color relative to the hottest bin.
    pub color: u32,
}

/// One source line ready to draw.
#[derive(Debug)]
pub struct SourceLineModel<'a> {
    /// 1-based line number.
    pub number: u32,
    pub text: &'a [u8],
    /// Token offsets are absolute into the source buffer; subtract
    /// `line_begin` for offsets into `text`.
    pub tokens: &'a [Token],
    pub line_begin: u32,
    pub hotness: Option<LineHotness>,
    /// Count of in-symbol instructions attributed to this line (the `@N`
    /// gutter); 0 when no assembly is shown.
    pub asm_match: u32,
    pub selected: bool,
    pub hovered: bool,
}

/// Source location chip on an assembly line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceChip {
    pub file: StringIdx,
    pub line: u32,
    pub color: u32,
    /// `file:line`, ellipsized from the left when too long.
    pub text: String,
}

/// Latency bar bounds in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBar {
    pub min: i32,
    pub max: i32,
}

/// Trailing `-> [sym+offset]` annotation of a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetAnnotation {
    pub label: String,
    pub addr: u64,
    /// Target stays inside the current symbol (click selects instead of
    /// opening a new view).
    pub within_symbol: bool,
}

/// One assembly line ready to draw.
#[derive(Debug)]
pub struct AsmLineModel {
    pub addr: u64,
    /// Absolute hex or `+offset`, padded to the address column width.
    pub addr_text: String,
    pub location: Option<SourceChip>,
    pub bytes_hex: Option<String>,
    /// This instruction branches out of the symbol.
    pub jump_out: bool,
    /// Padded to the mnemonic column width.
    pub mnemonic: String,
    pub operands: String,
    pub latency: Option<LatencyBar>,
    pub target: Option<TargetAnnotation>,
    pub hotness: Option<LineHotness>,
    pub selected: bool,
    pub hovered: bool,
    pub highlighted: bool,
}

/// One colored bucket on the scrollbar minimap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimapSpan {
    /// 0-based line index the bucket starts at.
    pub first_line: u32,
    pub color: u32,
}

/// One entry of the source-file selector.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub file: StringIdx,
    /// First line of the file referenced by the decoded range.
    pub first_line: u32,
    pub samples: u32,
    pub color: u32,
    pub valid: bool,
}

/// One entry of the inline-frame selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineFunctionEntry {
    pub addr: u64,
    pub name: StringIdx,
    pub samples: u32,
}

/// Inline-frame selector content, sorted hottest first.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFunctions {
    pub entries: Vec<InlineFunctionEntry>,
    pub total_samples: u32,
}

/// Hover payload of a jump arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpTooltip {
    pub target: u64,
    pub offset: u64,
    pub location: Option<SourceChip>,
    pub range_bytes: u64,
    pub source_count: usize,
}

/// Uppercase space-separated hex dump of instruction bytes.
pub fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        use std::fmt::Write;
        write!(out, "{b:02X}").unwrap();
    }
    out
}

/// Deterministic per-file color: golden-angle hue stepping over the
/// interned index keeps nearby indices visually distinct.
pub fn file_color(idx: StringIdx) -> u32 {
    let hue = (idx.0 as f32 * 0.618_034).fract();
    hsv_to_abgr(hue, 0.6, 0.85)
}

fn hsv_to_abgr(h: f32, s: f32, v: f32) -> u32 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match (i as i32) % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    0xFF00_0000
        | (((b * 255.0) as u32) << 16)
        | (((g * 255.0) as u32) << 8)
        | ((r * 255.0) as u32)
}

/// Right-aligned percentage cell, two decimals, seven characters.
pub fn format_percentage(val: f32) -> String {
    format!("{:>7}", format!("{val:.2}%"))
}

/// Human form of a variant's operand list, e.g. `Reg64, AGen`.
pub fn describe_operands(var: &AsmVar) -> String {
    let mut out = String::new();
    for (i, desc) in var.descs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let name = match desc.kind {
            OpKind::Imm => "Imm",
            OpKind::Reg => "Reg",
            OpKind::Mem => {
                if desc.width == 0 {
                    "AGen"
                } else {
                    "Mem"
                }
            }
            OpKind::Other => "?",
        };
        out.push_str(name);
        if desc.width != 0 && desc.kind != OpKind::Other {
            use std::fmt::Write;
            write!(out, "{}", desc.width).unwrap();
        }
    }
    out
}

/// Nanoseconds represented by `count` samples.
pub fn sample_time_ns(count: u32, store: &dyn CaptureStore) -> u64 {
    count as u64 * store.sampling_period()
}

impl SymbolView {
    /// Width of the address gutter in characters.
    pub fn max_addr_digits(&self) -> usize {
        format!("{:x}", self.base_addr() + self.code_len() as u64).len()
    }

    /// Model for the 1-based source line `number`, or `None` without source.
    pub fn source_line_model<'a>(
        &'a self,
        number: u32,
        stats: &IpStats,
        store: &dyn CaptureStore,
    ) -> Option<SourceLineModel<'a>> {
        let source = self.source()?;
        let line: &Line = source.lines().get(number as usize - 1)?;
        let count = stats.count_src.get(&number).copied().unwrap_or(0);
        let hotness = (stats.total_src != 0 && count != 0).then(|| LineHotness {
            count,
            percent: 100.0 * count as f32 / stats.total_src as f32,
            color: hotness_color(count, stats.max_src),
        });
        let asm_match = if self.asm().is_empty() {
            0
        } else {
            self.addresses_for_line(number, store).len() as u32
        };
        Some(SourceLineModel {
            number,
            text: &source.data()[line.begin as usize..line.end as usize],
            tokens: &line.tokens,
            line_begin: line.begin,
            hotness,
            asm_match,
            selected: number == self.selected_line(),
            hovered: self.file_string_idx() == self.hovered_source()
                && number == self.hovered_line(),
        })
    }

    /// Model for the assembly line at `index`.
    pub fn asm_line_model(
        &self,
        index: usize,
        stats: &IpStats,
        store: &dyn CaptureStore,
    ) -> Option<AsmLineModel> {
        let disasm = self.disassembly()?;
        let line = disasm.lines.get(index)?;
        let addr = line.addr;

        let addr_text = if self.asm_relative {
            format!("{:<width$}", format!("+{}", addr - self.base_addr()), width = self.max_addr_digits())
        } else {
            format!("{addr:<width$x}", width = self.max_addr_digits())
        };

        let location = if self.asm_show_source_location && !disasm.source_files.is_empty() {
            store
                .location_for_address(addr)
                .map(|loc| self.source_chip(loc, store))
        } else {
            None
        };

        let bytes_hex = if self.asm_bytes {
            store.symbol_code(self.base_addr()).map(|code| {
                let begin = (addr - self.base_addr()) as usize;
                hex_bytes(&code[begin..begin + line.size as usize])
            })
        } else {
            None
        };

        let variant = self.variant_for_line(index);
        let latency = if self.show_latency {
            variant
                .filter(|v| v.min_lat >= 0)
                .map(|v| LatencyBar { min: v.min_lat, max: v.max_lat })
        } else {
            None
        };

        let target_addr = if line.jump_addr != 0 {
            Some(line.jump_addr)
        } else {
            // returns and indirect branches carry the 0 sentinel
            disasm.jump_out.get(&addr).copied().filter(|t| *t != 0)
        };
        let target = target_addr.and_then(|t| self.target_annotation(t, store));

        let count = stats.count_asm.get(&addr).copied().unwrap_or(0);
        let hotness = (stats.total_asm != 0 && count != 0).then(|| LineHotness {
            count,
            percent: 100.0 * count as f32 / stats.total_asm as f32,
            color: hotness_color(count, stats.max_asm),
        });

        Some(AsmLineModel {
            addr,
            addr_text,
            location,
            bytes_hex,
            jump_out: disasm.jump_out.contains_key(&addr),
            mnemonic: format!("{:<width$}", line.mnemonic, width = disasm.max_mnemonic_len),
            operands: line.operands.clone(),
            latency,
            target,
            hotness,
            selected: self.selected_addresses().contains(&addr),
            hovered: self.selected_addresses_hover().contains(&addr),
            highlighted: addr == self.highlight_addr(),
        })
    }

    fn source_chip(&self, loc: SourceLocation, store: &dyn CaptureStore) -> SourceChip {
        let disasm = self.disassembly();
        let line_digits = disasm.map_or(1, |d| d.max_src_line_digits);
        let file_name = store.string(loc.file);
        let budget = 30usize.saturating_sub(line_digits);
        let text = if file_name.chars().count() < budget {
            format!("{file_name}:{}", loc.line)
        } else {
            let tail_len = 30 - 3 - 1 - line_digits;
            let chars: Vec<char> = file_name.chars().collect();
            let tail: String = chars[chars.len() - tail_len..].iter().collect();
            format!("...{tail}:{}", loc.line)
        };
        SourceChip {
            file: loc.file,
            line: loc.line,
            color: file_color(loc.file),
            text,
        }
    }

    fn target_annotation(&self, target: u64, store: &dyn CaptureStore) -> Option<TargetAnnotation> {
        let (lookup, offset) = store.symbol_for_address(target).unwrap_or((target, 0));
        let sym = store.symbol_data(lookup)?;
        Some(TargetAnnotation {
            label: format!("[{}+{offset}]", store.string(sym.name)),
            addr: target,
            within_symbol: lookup == self.base_addr(),
        })
    }

    /// Minimap buckets of the source pane. Lines without samples that still
    /// map into the symbol are included as cold spans.
    pub fn source_minimap(
        &self,
        stats: &IpStats,
        pixel_height: u32,
        store: &dyn CaptureStore,
    ) -> Vec<MinimapSpan> {
        let line_count = self.source_lines().len() as u32;
        if line_count == 0 || pixel_height == 0 {
            return Vec::new();
        }
        let mut ip_data: Vec<(u32, u32)> = stats
            .count_src
            .iter()
            .map(|(line, count)| (*line - 1, *count))
            .collect();
        for number in 1..=line_count {
            if !stats.count_src.contains_key(&number)
                && !self.addresses_for_line(number, store).is_empty()
            {
                ip_data.push((number - 1, 0));
            }
        }
        ip_data.sort_unstable();
        bucketize(&ip_data, line_count, pixel_height, stats.max_src, true)
    }

    /// Minimap buckets of the assembly pane.
    pub fn asm_minimap(&self, stats: &IpStats, pixel_height: u32) -> Vec<MinimapSpan> {
        let asm = self.asm();
        if asm.is_empty() || pixel_height == 0 {
            return Vec::new();
        }
        let mut ip_data: Vec<(u32, u32)> = asm
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                stats.count_asm.get(&line.addr).map(|count| (i as u32, *count))
            })
            .collect();
        ip_data.sort_unstable();
        bucketize(&ip_data, asm.len() as u32, pixel_height, stats.max_asm, false)
    }

    /// Assembly line indices of the current selection, for scrollbar marks.
    pub fn asm_selection_marks(&self) -> Vec<u32> {
        self.asm()
            .iter()
            .enumerate()
            .filter(|(_, line)| self.selected_addresses().contains(&line.addr))
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Assembly line indices of the hover selection.
    pub fn asm_hover_marks(&self) -> Vec<u32> {
        self.asm()
            .iter()
            .enumerate()
            .filter(|(_, line)| self.selected_addresses_hover().contains(&line.addr))
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Source-file selector: per-file sample totals over the decoded range,
    /// hottest first, ties by name.
    pub fn file_list_model(
        &self,
        stats: &IpStats,
        store: &dyn CaptureStore,
        policy: &dyn ViewPolicy,
    ) -> Vec<FileEntry> {
        let Some(disasm) = self.disassembly() else {
            return Vec::new();
        };
        let mut counts: BTreeMap<StringIdx, u32> = BTreeMap::new();
        for line in &disasm.lines {
            if let Some(loc) = store.location_for_address(line.addr) {
                let count = stats.count_asm.get(&line.addr).copied().unwrap_or(0);
                *counts.entry(loc.file).or_insert(0) += count;
            }
        }
        let mut entries: Vec<FileEntry> = counts
            .into_iter()
            .map(|(file, samples)| FileEntry {
                file,
                first_line: disasm.source_files.get(&file).copied().unwrap_or(0),
                samples,
                color: file_color(file),
                valid: policy.source_file_valid(store.string(file), store.capture_time()),
            })
            .collect();
        entries.sort_by(|l, r| {
            r.samples
                .cmp(&l.samples)
                .then_with(|| store.string(l.file).cmp(store.string(r.file)))
        });
        entries
    }

    /// Inline-frame selector: the base symbol plus every inline frame in
    /// range with its exclusive sample count, hottest first, ties by
    /// address. `None` when the symbol has no inline frames.
    pub fn inline_function_model(&self, store: &dyn CaptureStore) -> Option<InlineFunctions> {
        let inline_list = store.inline_symbol_list(self.base_addr(), self.code_len() as u64);
        if inline_list.is_empty() {
            return None;
        }
        let sym_end = self.base_addr() + self.code_len() as u64;
        let stats = store.symbol_stats();
        let mut total_samples = 0u32;
        let mut entries = Vec::with_capacity(inline_list.len() + 1);
        let mut push = |addr: u64, entries: &mut Vec<InlineFunctionEntry>| {
            let samples = stats.get(&addr).map_or(0, |s| s.excl);
            total_samples += samples;
            let name = store.symbol_data(addr).map_or(StringIdx::default(), |s| s.name);
            entries.push(InlineFunctionEntry { addr, name, samples });
        };
        push(self.base_addr(), &mut entries);
        for &addr in inline_list {
            if addr >= sym_end {
                break;
            }
            if addr != self.base_addr() {
                push(addr, &mut entries);
            }
        }
        entries.sort_by(|l, r| r.samples.cmp(&l.samples).then(l.addr.cmp(&r.addr)));
        Some(InlineFunctions { entries, total_samples })
    }

    /// Hover payload of the jump arrow targeting `target`.
    pub fn jump_tooltip(&self, target: u64, store: &dyn CaptureStore) -> Option<JumpTooltip> {
        let disasm = self.disassembly()?;
        let entry = disasm.jumps.get(&target)?;
        Some(JumpTooltip {
            target,
            offset: target - self.base_addr(),
            location: store
                .location_for_address(target)
                .map(|loc| self.source_chip(loc, store)),
            range_bytes: entry.max - entry.min,
            source_count: entry.sources.len(),
        })
    }

    /// Undecoded byte excerpt (at most 16 bytes) for the partial-decode
    /// warning tooltip.
    pub fn failure_bytes(&self, store: &dyn CaptureStore) -> Option<String> {
        let disasm = self.disassembly()?;
        let fail = disasm.disasm_fail? as usize;
        let code = store.symbol_code(self.base_addr())?;
        let end = (fail + 16).min(code.len());
        Some(hex_bytes(&code[fail..end]))
    }
}

/// Group sorted `(line index, count)` pairs into scrollbar buckets of
/// `len * 2 / pixel_height` lines and color each by its summed hotness.
fn bucketize(
    ip_data: &[(u32, u32)],
    len: u32,
    pixel_height: u32,
    max: u32,
    mark_cold: bool,
) -> Vec<MinimapSpan> {
    let step = len * 2 / pixel_height;
    let mut spans = Vec::new();
    let mut it = ip_data.iter().peekable();
    while let Some(&&(first_line, _)) = it.peek() {
        let mut sum = 0u32;
        while let Some(&&(line, count)) = it.peek() {
            if line > first_line + step {
                break;
            }
            sum += count;
            it.next();
        }
        let color = if sum == 0 && mark_cold {
            COLD_COLOR
        } else {
            hotness_color(sum, max)
        };
        spans.push(MinimapSpan { first_line, color });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_bytes_format() {
        assert_eq!(hex_bytes(&[0x48, 0x89, 0xE5]), "48 89 E5");
        assert_eq!(hex_bytes(&[]), "");
    }

    #[test]
    fn percentage_cell_is_right_aligned() {
        assert_eq!(format_percentage(75.0), " 75.00%");
        assert_eq!(format_percentage(100.0), "100.00%");
        assert_eq!(format_percentage(0.5), "  0.50%");
    }

    #[test]
    fn file_colors_are_opaque_and_stable() {
        let a = file_color(StringIdx(3));
        let b = file_color(StringIdx(3));
        let c = file_color(StringIdx(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a >> 24, 0xFF);
    }

    #[test]
    fn buckets_group_by_step() {
        // 100 lines over 50 pixels: step 4, so lines 0..=4 merge
        let data = [(0u32, 2u32), (3, 1), (10, 4)];
        let spans = bucketize(&data, 100, 50, 4, false);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].first_line, 0);
        assert_eq!(spans[0].color, hotness_color(3, 4));
        assert_eq!(spans[1].first_line, 10);
        assert_eq!(spans[1].color, hotness_color(4, 4));
    }

    #[test]
    fn cold_buckets_use_the_cold_color() {
        let data = [(5u32, 0u32)];
        let spans = bucketize(&data, 10, 100, 1, true);
        assert_eq!(spans, vec![MinimapSpan { first_line: 5, color: COLD_COLOR }]);
    }
}
