//! Jump table construction and arrow-lane assignment.
//!
//! Every intra-symbol branch target owns one `JumpData` spanning the target
//! and all of its sources. Lanes are packed shortest-interval-first so the
//! renderer can draw non-crossing arrow columns without graph coloring, and
//! the assignment is stable under recomputation.

use std::collections::BTreeMap;

/// Jump entries keyed by target address.
pub type JumpTable = BTreeMap<u64, JumpData>;

/// All branches sharing one target address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpData {
    /// Lowest address covered: `min(target, sources)`.
    pub min: u64,
    /// Highest address covered: `max(target, sources)`.
    pub max: u64,
    /// Arrow lane; entries at one level never overlap.
    pub level: u16,
    /// Branch source addresses, sorted ascending after lane assignment.
    pub sources: Vec<u64>,
}

/// Sort sources and assign lanes. Returns the highest level used.
///
/// Entries are placed shortest interval first (ties by target address), each
/// into the lowest level with no overlapping occupant. Under that order a
/// later interval can never be strictly contained in an already-placed one
/// at the same level; containment is asserted in debug builds and treated
/// as a plain overlap otherwise, pushing the entry to a wider level.
pub fn assign_lanes(table: &mut JumpTable) -> u16 {
    if table.is_empty() {
        return 0;
    }
    for entry in table.values_mut() {
        entry.sources.sort_unstable();
    }
    let mut order: Vec<(u64, u64)> = table
        .iter()
        .map(|(target, entry)| (*target, entry.max - entry.min))
        .collect();
    order.sort_by(|l, r| l.1.cmp(&r.1).then(l.0.cmp(&r.0)));

    let mut level_ranges: Vec<Vec<(u64, u64)>> = Vec::new();
    let mut max_level = 0u16;
    for (target, _) in order {
        let (min, max) = {
            let entry = &table[&target];
            (entry.min, entry.max)
        };
        let mut level = 0usize;
        loop {
            if level == level_ranges.len() {
                level_ranges.push(vec![(min, max)]);
                break;
            }
            let occupants = &mut level_ranges[level];
            let mut fits = true;
            for &(lo, hi) in occupants.iter() {
                debug_assert!(
                    !(min >= lo && max <= hi),
                    "jump interval [{min:#x}, {max:#x}] contained in [{lo:#x}, {hi:#x}] at level {level}"
                );
                if min <= hi && max >= lo {
                    fits = false;
                    break;
                }
            }
            if fits {
                occupants.push((min, max));
                break;
            }
            level += 1;
        }
        let entry = table.get_mut(&target).unwrap();
        entry.level = level as u16;
        max_level = max_level.max(level as u16);
    }
    max_level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(min: u64, max: u64, sources: Vec<u64>) -> JumpData {
        JumpData { min, max, level: 0, sources }
    }

    #[test]
    fn short_intervals_share_the_low_lane() {
        let mut table = JumpTable::new();
        table.insert(0, entry(0, 100, vec![100]));
        table.insert(10, entry(10, 20, vec![20]));
        table.insert(30, entry(30, 40, vec![40]));
        let max = assign_lanes(&mut table);
        assert_eq!(max, 1);
        assert_eq!(table[&10].level, 0);
        assert_eq!(table[&30].level, 0);
        assert_eq!(table[&0].level, 1);
    }

    #[test]
    fn empty_table_uses_no_lanes() {
        let mut table = JumpTable::new();
        assert_eq!(assign_lanes(&mut table), 0);
    }

    #[test]
    fn disjoint_intervals_all_fit_level_zero() {
        let mut table = JumpTable::new();
        table.insert(0, entry(0, 10, vec![10]));
        table.insert(20, entry(20, 30, vec![30]));
        table.insert(40, entry(40, 50, vec![50]));
        assert_eq!(assign_lanes(&mut table), 0);
        assert!(table.values().all(|e| e.level == 0));
    }

    #[test]
    fn sources_are_sorted() {
        let mut table = JumpTable::new();
        table.insert(5, entry(5, 90, vec![90, 7, 50]));
        assign_lanes(&mut table);
        assert_eq!(table[&5].sources, vec![7, 50, 90]);
    }

    #[test]
    fn same_level_intervals_never_overlap() {
        let mut table = JumpTable::new();
        let spans = [(0u64, 64u64), (8, 24), (16, 80), (32, 48), (56, 72), (4, 12)];
        for (i, (min, max)) in spans.iter().enumerate() {
            table.insert(i as u64 * 1000, entry(*min, *max, vec![*max]));
        }
        let max_level = assign_lanes(&mut table);
        let entries: Vec<&JumpData> = table.values().collect();
        for (i, a) in entries.iter().enumerate() {
            assert!(a.level <= max_level);
            for b in entries.iter().skip(i + 1) {
                if a.level == b.level {
                    assert!(a.max < b.min || b.max < a.min);
                }
            }
        }
    }

    #[test]
    fn assignment_is_stable_under_recomputation() {
        let mut table = JumpTable::new();
        table.insert(0x10, entry(0x10, 0x80, vec![0x80]));
        table.insert(0x20, entry(0x20, 0x40, vec![0x40]));
        assign_lanes(&mut table);
        let first: Vec<u16> = table.values().map(|e| e.level).collect();
        assign_lanes(&mut table);
        let second: Vec<u16> = table.values().map(|e| e.level).collect();
        assert_eq!(first, second);
    }
}
