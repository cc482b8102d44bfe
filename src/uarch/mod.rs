//! Micro-architecture variant selection.
//!
//! Maps a decoded instruction (mnemonic, LEA shape, operand kinds and
//! widths) to the best-matching variant of a per-micro-arch op table.
//! Operand kinds are authoritative; widths only score, so a variant defined
//! at a nearby width still matches when the decoder reports an unusual one.

pub mod tables;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::disasm::AsmLine;
pub use tables::{AsmOp, AsmVar, MicroArch, MicroArchUx, OpDesc};
pub use tables::{ISA_LIST, MICRO_ARCHS, MICRO_ARCH_UX, OPS_LIST, PORT_LIST};

/// Substituted op names for `LEA`, indexed by [`crate::disasm::LeaKind`].
pub static LEA_VARIANT_NAMES: [&str; 10] = [
    "LEA", "LEA_B", "LEA_BD", "LEA_BI", "LEA_BID", "LEA_D", "LEA_I", "LEA_ID", "LEA_R", "LEA_RD",
];

static OP_NAME_MAP: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    OPS_LIST
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i as u16))
        .collect()
});

/// Index into [`MICRO_ARCH_UX`] for a selector moniker.
pub fn ux_index(moniker: &str) -> Option<usize> {
    MICRO_ARCH_UX.iter().position(|u| u.moniker == moniker)
}

/// Index into [`MICRO_ARCHS`] for a selector moniker.
pub fn data_index(moniker: &str) -> Option<usize> {
    MICRO_ARCHS.iter().position(|m| m.moniker == moniker)
}

/// Pick the best variant of `line`'s op on `uarch`, or `None` when the
/// mnemonic is unknown there or no variant matches the operand kinds.
pub fn select_variant(uarch: &MicroArch, line: &AsmLine) -> Option<&'static AsmVar> {
    let mut name = line.mnemonic.to_ascii_uppercase();
    if name == "LEA" {
        name = LEA_VARIANT_NAMES[line.lea as usize].to_string();
    }
    let op_id = *OP_NAME_MAP.get(name.as_str())?;
    let ops = uarch.ops;
    let idx = ops.binary_search_by(|op| op.id.cmp(&op_id)).ok()?;
    let variants = ops[idx].variants;

    let mut best: Option<(usize, u32)> = None;
    for (i, var) in variants.iter().enumerate() {
        if var.descs.len() != line.params.len() {
            continue;
        }
        let mut penalty = 0u32;
        let mut kinds_match = true;
        for (desc, param) in var.descs.iter().zip(&line.params) {
            if desc.kind != param.kind {
                kinds_match = false;
                break;
            }
            if desc.width != param.width {
                penalty += 1;
            }
        }
        if kinds_match && best.map_or(true, |(_, b)| penalty < b) {
            best = Some((i, penalty));
        }
    }
    best.map(|(i, _)| &variants[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::{LeaKind, OpKind, OpParam};

    fn asm_line(mnemonic: &str, lea: LeaKind, params: Vec<OpParam>) -> AsmLine {
        AsmLine {
            addr: 0x1000,
            jump_addr: 0,
            mnemonic: mnemonic.to_string(),
            operands: String::new(),
            size: 4,
            lea,
            params,
        }
    }

    fn reg(width: u16) -> OpParam {
        OpParam { kind: OpKind::Reg, width }
    }

    fn zen2() -> &'static MicroArch {
        &MICRO_ARCHS[data_index("ZEN2").unwrap()]
    }

    #[test]
    fn tables_are_sorted_by_op_id() {
        for arch in MICRO_ARCHS {
            for pair in arch.ops.windows(2) {
                assert!(pair[0].id < pair[1].id, "{} op table out of order", arch.moniker);
            }
            for op in arch.ops {
                assert!((op.id as usize) < OPS_LIST.len());
            }
        }
    }

    #[test]
    fn ux_and_data_tables_agree() {
        assert_eq!(MICRO_ARCH_UX.len(), MICRO_ARCHS.len());
        for (ux, data) in MICRO_ARCH_UX.iter().zip(MICRO_ARCHS) {
            assert_eq!(ux.moniker, data.moniker);
        }
    }

    #[test]
    fn rip_relative_lea_uses_the_rd_table() {
        let line = asm_line(
            "lea",
            LeaKind::Rd,
            vec![reg(64), OpParam { kind: OpKind::Mem, width: 64 }],
        );
        let var = select_variant(zen2(), &line).unwrap();
        // the LEA_RD entry, not plain LEA: kinds match, width scores only
        assert_eq!(var.descs[1].width, 0);
        assert_eq!(var.min_lat, 1);
    }

    #[test]
    fn width_mismatch_prefers_the_closer_variant() {
        let line = asm_line("add", LeaKind::None, vec![reg(64), reg(64)]);
        let var = select_variant(zen2(), &line).unwrap();
        assert_eq!(var.descs[0].width, 64);
        let line = asm_line("add", LeaKind::None, vec![reg(16), reg(16)]);
        // no 16-bit variant: every candidate scores 2, the first wins
        let var = select_variant(zen2(), &line).unwrap();
        assert_eq!(var.descs[0].width, 32);
    }

    #[test]
    fn operand_kinds_are_authoritative() {
        let line = asm_line(
            "add",
            LeaKind::None,
            vec![reg(64), OpParam { kind: OpKind::Imm, width: 32 }],
        );
        let var = select_variant(zen2(), &line).unwrap();
        assert_eq!(var.descs[1].kind, OpKind::Imm);
    }

    #[test]
    fn unknown_mnemonic_has_no_variant() {
        let line = asm_line("vfmadd231ps", LeaKind::None, vec![reg(128), reg(128), reg(128)]);
        assert!(select_variant(zen2(), &line).is_none());
    }

    #[test]
    fn operand_count_must_match() {
        let line = asm_line("ret", LeaKind::None, vec![reg(64)]);
        assert!(select_variant(zen2(), &line).is_none());
    }
}
