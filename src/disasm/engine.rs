//! Disassembler driver using Capstone.
//!
//! Decodes a symbol's captured bytes with full operand detail, classifies
//! operands for micro-architecture variant matching, and accumulates the
//! intra-symbol jump table plus the out-of-symbol branch set.

use std::collections::BTreeMap;

use capstone::arch::arm::ArmOperandType;
use capstone::arch::arm64::Arm64OperandType;
use capstone::arch::x86::{X86Insn, X86OperandType, X86Reg};
use capstone::arch::ArchOperand;
use capstone::prelude::*;

use crate::capture::{CaptureStore, CpuArch, SourceLocation, StringIdx};
use crate::disasm::jumps::{assign_lanes, JumpData, JumpTable};
use crate::disasm::{AsmLine, LeaKind, OpKind, OpParam};
use crate::error::EngineError;

/// Everything produced by one `disassemble` call. Replaced atomically on the
/// view; render queries only ever observe a complete decode.
#[derive(Debug)]
pub struct Disassembly {
    pub lines: Vec<AsmLine>,
    pub jumps: JumpTable,
    /// Branches leaving the symbol: source address to target address, 0 for
    /// returns and indirect branches.
    pub jump_out: BTreeMap<u64, u64>,
    pub max_jump_level: u16,
    /// Byte offset where decoding stopped short of the symbol end, if it did.
    pub disasm_fail: Option<u32>,
    pub code_len: u32,
    /// Longest mnemonic plus two, for column padding.
    pub max_mnemonic_len: usize,
    /// Size in bytes of the longest instruction.
    pub max_asm_bytes: usize,
    /// Digit count of the highest source line seen, plus one.
    pub max_src_line_digits: usize,
    /// Source files referenced by the decoded range, with the first line
    /// seen per file.
    pub source_files: BTreeMap<StringIdx, u32>,
}

impl Disassembly {
    /// Index of the instruction at `addr`, if `addr` is a boundary.
    pub fn index_of(&self, addr: u64) -> Option<usize> {
        self.lines.binary_search_by(|l| l.addr.cmp(&addr)).ok()
    }
}

fn open_decoder(arch: CpuArch) -> Result<Capstone, EngineError> {
    let built = match arch {
        CpuArch::X86 => Capstone::new()
            .x86()
            .mode(capstone::arch::x86::ArchMode::Mode32)
            .detail(true)
            .build(),
        CpuArch::X64 => Capstone::new()
            .x86()
            .mode(capstone::arch::x86::ArchMode::Mode64)
            .detail(true)
            .build(),
        CpuArch::Arm32 => Capstone::new()
            .arm()
            .mode(capstone::arch::arm::ArchMode::Arm)
            .detail(true)
            .build(),
        CpuArch::Arm64 => Capstone::new()
            .arm64()
            .mode(capstone::arch::arm64::ArchMode::Arm)
            .detail(true)
            .build(),
        CpuArch::Unknown => return Err(EngineError::UnknownArchitecture),
    };
    built.map_err(|e| EngineError::DecoderOpenFailure(e.to_string()))
}

fn is_branch(detail: &InsnDetail) -> bool {
    detail.groups().iter().any(|g| {
        let g: u8 = g.0;
        g == capstone::InsnGroupType::CS_GRP_JUMP as u8
            || g == capstone::InsnGroupType::CS_GRP_CALL as u8
            || g == capstone::InsnGroupType::CS_GRP_RET as u8
    })
}

/// Immediate branch target, when the instruction's sole operand is an
/// immediate. Indirect branches and returns have none.
fn immediate_target(ops: &[ArchOperand]) -> u64 {
    if ops.len() != 1 {
        return 0;
    }
    match &ops[0] {
        ArchOperand::X86Operand(op) => match op.op_type {
            X86OperandType::Imm(imm) => imm as u64,
            _ => 0,
        },
        ArchOperand::ArmOperand(op) => match op.op_type {
            ArmOperandType::Imm(imm) => imm as i64 as u64,
            _ => 0,
        },
        ArchOperand::Arm64Operand(op) => match op.op_type {
            Arm64OperandType::Imm(imm) => imm as u64,
            _ => 0,
        },
        _ => 0,
    }
}

fn classify_params(ops: &[ArchOperand]) -> Vec<OpParam> {
    let mut params = Vec::with_capacity(ops.len());
    for op in ops {
        let param = match op {
            ArchOperand::X86Operand(x) => {
                let kind = match x.op_type {
                    X86OperandType::Imm(_) => OpKind::Imm,
                    X86OperandType::Reg(_) => OpKind::Reg,
                    X86OperandType::Mem(_) => OpKind::Mem,
                    _ => OpKind::Other,
                };
                OpParam { kind, width: x.size as u16 * 8 }
            }
            ArchOperand::ArmOperand(a) => {
                let kind = match a.op_type {
                    ArmOperandType::Imm(_) => OpKind::Imm,
                    ArmOperandType::Reg(_) => OpKind::Reg,
                    ArmOperandType::Mem(_) => OpKind::Mem,
                    _ => OpKind::Other,
                };
                OpParam { kind, width: 0 }
            }
            ArchOperand::Arm64Operand(a) => {
                let kind = match a.op_type {
                    Arm64OperandType::Imm(_) => OpKind::Imm,
                    Arm64OperandType::Reg(_) => OpKind::Reg,
                    Arm64OperandType::Mem(_) => OpKind::Mem,
                    _ => OpKind::Other,
                };
                OpParam { kind, width: 0 }
            }
            _ => OpParam { kind: OpKind::Other, width: 0 },
        };
        params.push(param);
    }
    params
}

/// Effective-address shape of an x86 `lea` second operand.
fn classify_lea(ops: &[ArchOperand]) -> LeaKind {
    let Some(ArchOperand::X86Operand(op)) = ops.get(1) else {
        return LeaKind::None;
    };
    let X86OperandType::Mem(mem) = op.op_type else {
        return LeaKind::None;
    };
    let has_index = mem.index().0 != 0;
    let has_disp = mem.disp() != 0;
    if mem.base().0 == 0 {
        if !has_index {
            LeaKind::D
        } else if has_disp {
            LeaKind::Id
        } else {
            LeaKind::I
        }
    } else if mem.base().0 as u32 == X86Reg::X86_REG_RIP as u32 {
        if has_disp {
            LeaKind::Rd
        } else {
            LeaKind::R
        }
    } else if !has_index {
        if has_disp {
            LeaKind::Bd
        } else {
            LeaKind::B
        }
    } else if has_disp {
        LeaKind::Bid
    } else {
        LeaKind::Bi
    }
}

/// Decode the symbol's bytes at `sym_addr`. The decoder session lives only
/// for this call; the result is self-contained.
pub fn disassemble(
    arch: CpuArch,
    code: &[u8],
    sym_addr: u64,
    store: &dyn CaptureStore,
) -> Result<Disassembly, EngineError> {
    if code.is_empty() {
        return Err(EngineError::SymbolBytesMissing(sym_addr));
    }
    let cs = open_decoder(arch)?;
    let insns = cs
        .disasm_all(code, sym_addr)
        .map_err(|e| EngineError::DecoderOpenFailure(e.to_string()))?;

    let len = code.len() as u64;
    let sym_end = sym_addr + len;
    let boundaries: Vec<u64> = insns.iter().map(|i| i.address()).collect();

    // undecodable bytes yield an empty listing, not a failure
    let disasm_fail = match insns.iter().last() {
        Some(last) if last.address() - sym_addr + (last.len() as u64) < len => {
            let stopped = (last.address() - sym_addr) as u32;
            log::warn!(
                "partial decode of symbol {sym_addr:#x}: stopped at offset {stopped} of {len}"
            );
            Some(stopped)
        }
        _ => None,
    };

    let mut lines = Vec::with_capacity(insns.len());
    let mut jumps = JumpTable::new();
    let mut jump_out = BTreeMap::new();
    let mut source_files = BTreeMap::new();
    let mut max_mnemonic = 0usize;
    let mut max_bytes = 0usize;
    let mut max_src_line = 0u32;

    for insn in insns.iter() {
        let detail = cs.insn_detail(&insn).ok();
        let ops = detail
            .as_ref()
            .map(|d| d.arch_detail().operands())
            .unwrap_or_default();

        let mut jump_addr = 0u64;
        if detail.as_ref().is_some_and(is_branch) {
            // a missing immediate target decodes as 0, out of every symbol
            let target = immediate_target(&ops);
            if target >= sym_addr && target < sym_end {
                if boundaries.binary_search(&target).is_ok() {
                    jump_addr = target;
                    let min = target.min(insn.address());
                    let max = target.max(insn.address());
                    jumps
                        .entry(target)
                        .and_modify(|e: &mut JumpData| {
                            if e.min > min {
                                e.min = min;
                            } else if e.max < max {
                                e.max = max;
                            }
                            e.sources.push(insn.address());
                        })
                        .or_insert_with(|| JumpData {
                            min,
                            max,
                            level: 0,
                            sources: vec![insn.address()],
                        });
                }
            } else {
                jump_out.insert(insn.address(), target);
            }
        }

        let params = classify_params(&ops);
        let lea = if matches!(arch, CpuArch::X86 | CpuArch::X64)
            && insn.id().0 == X86Insn::X86_INS_LEA as u32
        {
            classify_lea(&ops)
        } else {
            LeaKind::None
        };

        let mnemonic = insn.mnemonic().unwrap_or("").to_string();
        max_mnemonic = max_mnemonic.max(mnemonic.len());
        max_bytes = max_bytes.max(insn.len());

        if let Some(SourceLocation { file, line }) = store.location_for_address(insn.address()) {
            max_src_line = max_src_line.max(line);
            source_files.entry(file).or_insert(line);
        }

        lines.push(AsmLine {
            addr: insn.address(),
            jump_addr,
            mnemonic,
            operands: insn.op_str().unwrap_or("").to_string(),
            size: insn.len() as u8,
            lea,
            params,
        });
    }

    let max_jump_level = assign_lanes(&mut jumps);

    Ok(Disassembly {
        lines,
        jumps,
        jump_out,
        max_jump_level,
        disasm_fail,
        code_len: code.len() as u32,
        max_mnemonic_len: max_mnemonic + 2,
        max_asm_bytes: max_bytes,
        max_src_line_digits: decimal_digits(max_src_line) + 1,
        source_files,
    })
}

fn decimal_digits(mut v: u32) -> usize {
    let mut digits = 1;
    while v >= 10 {
        v /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_digit_widths() {
        assert_eq!(decimal_digits(0), 1);
        assert_eq!(decimal_digits(9), 1);
        assert_eq!(decimal_digits(10), 2);
        assert_eq!(decimal_digits(4321), 4);
    }
}
