//! Hotness aggregation over the capture's sample-address histogram.
//!
//! Samples attributed to a symbol (or one of its inline frames) are folded
//! into two histograms at once: per source line of the currently loaded
//! file, and per canonical instruction address. Totals and maxima stay
//! consistent with their maps at every observation point.

use std::collections::HashMap;

use crate::capture::CaptureStore;

/// Sample histograms for one symbol view.
#[derive(Debug, Clone, Default)]
pub struct IpStats {
    /// Samples per 1-based source line of the loaded file.
    pub count_src: HashMap<u32, u32>,
    /// Samples per canonical instruction address.
    pub count_asm: HashMap<u64, u32>,
    pub total_src: u32,
    pub total_asm: u32,
    pub max_src: u32,
    pub max_asm: u32,
}

impl IpStats {
    /// Merge the samples attributed to the symbol or inline frame at `addr`.
    ///
    /// Source-line counts only accumulate for samples whose outermost
    /// callstack frame resolves to `current_file`.
    pub fn gather(&mut self, addr: u64, current_file: Option<&str>, store: &dyn CaptureStore) {
        let Some(ips) = store.symbol_instruction_pointers(addr) else {
            return;
        };
        for &(ip, count) in ips {
            if let Some(file) = current_file {
                if let Some(frame) = store.callstack_frame(ip) {
                    if store.string(frame.file) == file {
                        let bin = self.count_src.entry(frame.line).or_insert(0);
                        *bin += count;
                        self.max_src = self.max_src.max(*bin);
                        self.total_src += count;
                    }
                }
            }
            let canonical = store.canonical_pointer(ip);
            let bin = self.count_asm.entry(canonical).or_insert(0);
            *bin += count;
            self.max_asm = self.max_asm.max(*bin);
            self.total_asm += count;
        }
    }
}

/// Map a sample count to a heat color, packed `0xAABBGGRR`.
///
/// Dim red below half the hottest bin, through yellow at parity, washing to
/// white for bins above it (possible when bins merge in the minimap).
pub fn hotness_color(ip_sum: u32, ip_max: u32) -> u32 {
    let p = ip_sum as f32 / ip_max as f32;
    if p <= 0.5 {
        let a = ((p * 1.5 + 0.25) * 255.0) as u32;
        0x0000_00FF | (a << 24)
    } else if p <= 1.0 {
        let g = ((p - 0.5) * 511.0) as u32;
        0xFF00_00FF | (g << 8)
    } else if p <= 2.0 {
        let b = ((p - 1.0) * 255.0) as u32;
        0xFF00_FFFF | (b << 16)
    } else {
        0xFFFF_FFFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_maxima_track_the_maps() {
        let mut stats = IpStats::default();
        for (line, n) in [(10u32, 3u32), (11, 1), (10, 2)] {
            let bin = stats.count_src.entry(line).or_insert(0);
            *bin += n;
            stats.max_src = stats.max_src.max(*bin);
            stats.total_src += n;
        }
        assert_eq!(stats.total_src, stats.count_src.values().sum::<u32>());
        assert_eq!(stats.max_src, *stats.count_src.values().max().unwrap());
    }

    #[test]
    fn color_classes() {
        // hottest bin itself sits exactly at parity: red plus full green
        assert_eq!(hotness_color(3, 3), 0xFF00FFFF);
        // half of max: full-alpha red, no green yet
        assert_eq!(hotness_color(2, 4), 0xFF0000FF);
        // cold bins keep partial alpha
        assert_eq!(hotness_color(1, 100) >> 24, ((0.01f32 * 1.5 + 0.25) * 255.0) as u32);
        // merged bins above 2x max clamp to white
        assert_eq!(hotness_color(9, 4), 0xFFFFFFFF);
    }

    #[test]
    fn color_is_monotone_through_the_midrange() {
        let a = hotness_color(1, 4);
        let b = hotness_color(2, 4);
        let c = hotness_color(3, 4);
        let d = hotness_color(4, 4);
        assert!(a >> 24 <= b >> 24);
        assert!((b >> 8 & 0xFF) <= (c >> 8 & 0xFF));
        assert!((c >> 8 & 0xFF) <= (d >> 8 & 0xFF));
    }
}
