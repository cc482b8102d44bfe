//! Static micro-architecture reference data.
//!
//! Cycle-level instruction metadata in the shape produced from uops.info
//! measurement dumps: per micro-architecture, an op array sorted by op id,
//! each op carrying its operand-typed variants. Close micro-architecture
//! generations that measure identically share an op array.

use crate::disasm::OpKind;

/// Display metadata for the micro-architecture selector.
pub struct MicroArchUx {
    pub uarch: &'static str,
    pub cpu_name: &'static str,
    pub moniker: &'static str,
}

/// One operand descriptor of a variant. Width 0 on a `Mem` operand means
/// address generation (no data access).
pub struct OpDesc {
    pub kind: OpKind,
    pub width: u16,
}

/// One concrete operand-typed realization of an op.
pub struct AsmVar {
    pub descs: &'static [OpDesc],
    /// Sustained cycles per instruction, lower is better.
    pub throughput: f32,
    /// Execution latency bounds in cycles; -1 when not measurable.
    pub min_lat: i32,
    pub max_lat: i32,
    /// True when the corresponding latency is an upper bound only.
    pub min_bound: bool,
    pub max_bound: bool,
    pub uops: f32,
    /// Index into [`PORT_LIST`], -1 when unknown.
    pub port: i32,
    /// Index into [`ISA_LIST`].
    pub isa_set: u16,
}

/// An op and its variants. `id` indexes [`OPS_LIST`].
pub struct AsmOp {
    pub id: u16,
    pub variants: &'static [AsmVar],
}

/// One micro-architecture's table; `ops` is sorted by `id`.
pub struct MicroArch {
    pub moniker: &'static str,
    pub ops: &'static [AsmOp],
}

pub static MICRO_ARCH_UX: [MicroArchUx; 16] = [
    MicroArchUx { uarch: "Conroe", cpu_name: "Core 2 Duo E6750", moniker: "CON" },
    MicroArchUx { uarch: "Wolfdale", cpu_name: "Core 2 Duo E8400", moniker: "WOL" },
    MicroArchUx { uarch: "Nehalem", cpu_name: "Core i5-750", moniker: "NHM" },
    MicroArchUx { uarch: "Westmere", cpu_name: "Core i5-650", moniker: "WSM" },
    MicroArchUx { uarch: "Sandy Bridge", cpu_name: "Core i7-2600", moniker: "SNB" },
    MicroArchUx { uarch: "Ivy Bridge", cpu_name: "Core i5-3470", moniker: "IVB" },
    MicroArchUx { uarch: "Haswell", cpu_name: "Xeon E3-1225 v3", moniker: "HSW" },
    MicroArchUx { uarch: "Broadwell", cpu_name: "Core i5-5200U", moniker: "BDW" },
    MicroArchUx { uarch: "Skylake", cpu_name: "Core i7-6500U", moniker: "SKL" },
    MicroArchUx { uarch: "Skylake-X", cpu_name: "Core i9-7900X", moniker: "SKX" },
    MicroArchUx { uarch: "Kaby Lake", cpu_name: "Core i7-7700", moniker: "KBL" },
    MicroArchUx { uarch: "Coffee Lake", cpu_name: "Core i7-8700K", moniker: "CFL" },
    MicroArchUx { uarch: "Cannon Lake", cpu_name: "Core i3-8121U", moniker: "CNL" },
    MicroArchUx { uarch: "Ice Lake", cpu_name: "Core i5-1035G1", moniker: "ICL" },
    MicroArchUx { uarch: "AMD Zen+", cpu_name: "Ryzen 5 2600", moniker: "ZEN+" },
    MicroArchUx { uarch: "AMD Zen 2", cpu_name: "Ryzen 7 3700X", moniker: "ZEN2" },
];

/// Known op names, sorted; an op id is an index into this list.
pub static OPS_LIST: &[&str] = &[
    "ADD", "AND", "CALL", "CMP", "DEC", "IMUL", "INC", "JE", "JMP", "JNE", "LEA", "LEA_B",
    "LEA_BD", "LEA_BI", "LEA_BID", "LEA_D", "LEA_I", "LEA_ID", "LEA_R", "LEA_RD", "MOV",
    "MOVSX", "MOVZX", "NEG", "NOP", "NOT", "OR", "POP", "PUSH", "RET", "SHL", "SHR", "SUB",
    "TEST", "XCHG", "XOR",
];

pub static ISA_LIST: &[&str] = &["I86", "I186", "I386", "I486", "PENTIUMPRO", "LONGMODE"];

pub static PORT_LIST: &[&str] = &[
    "1*p0156",
    "1*p06",
    "1*p15",
    "1*p1",
    "1*p23",
    "1*p0156+1*p23",
    "1*p237+1*p4",
    "1*p0156+1*p237+1*p4",
    "2*p0156",
    "1*p5",
];

const R8: OpDesc = OpDesc { kind: OpKind::Reg, width: 8 };
const R32: OpDesc = OpDesc { kind: OpKind::Reg, width: 32 };
const R64: OpDesc = OpDesc { kind: OpKind::Reg, width: 64 };
const I32: OpDesc = OpDesc { kind: OpKind::Imm, width: 32 };
const I64: OpDesc = OpDesc { kind: OpKind::Imm, width: 64 };
const M64: OpDesc = OpDesc { kind: OpKind::Mem, width: 64 };
const AGEN: OpDesc = OpDesc { kind: OpKind::Mem, width: 0 };

const fn v(
    descs: &'static [OpDesc],
    throughput: f32,
    min_lat: i32,
    max_lat: i32,
    uops: f32,
    port: i32,
    isa_set: u16,
) -> AsmVar {
    AsmVar {
        descs,
        throughput,
        min_lat,
        max_lat,
        min_bound: false,
        max_bound: false,
        uops,
        port,
        isa_set,
    }
}

/// Variant whose max latency is an upper bound (memory access involved).
const fn vb(
    descs: &'static [OpDesc],
    throughput: f32,
    min_lat: i32,
    max_lat: i32,
    uops: f32,
    port: i32,
    isa_set: u16,
) -> AsmVar {
    AsmVar {
        descs,
        throughput,
        min_lat,
        max_lat,
        min_bound: false,
        max_bound: true,
        uops,
        port,
        isa_set,
    }
}

static SKYLAKE_OPS: &[AsmOp] = &[
    AsmOp {
        id: 0, // ADD
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.5, 1, 6, 2.0, 5, 5),
        ],
    },
    AsmOp {
        id: 1, // AND
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp { id: 2, variants: &[v(&[I32], 2.0, -1, -1, 2.0, 7, 0)] }, // CALL
    AsmOp {
        id: 3, // CMP
        variants: &[
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.5, 1, 6, 2.0, 5, 5),
        ],
    },
    AsmOp { id: 4, variants: &[v(&[R64], 0.25, 1, 1, 1.0, 0, 5)] }, // DEC
    AsmOp {
        id: 5, // IMUL
        variants: &[
            v(&[R32, R32], 1.0, 3, 3, 1.0, 3, 2),
            v(&[R64, R64], 1.0, 3, 3, 1.0, 3, 5),
        ],
    },
    AsmOp { id: 6, variants: &[v(&[R64], 0.25, 1, 1, 1.0, 0, 5)] }, // INC
    AsmOp { id: 7, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] }, // JE
    AsmOp { id: 8, variants: &[v(&[I64], 1.0, -1, -1, 1.0, 1, 0)] }, // JMP
    AsmOp { id: 9, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] }, // JNE
    AsmOp { id: 10, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] }, // LEA
    AsmOp { id: 11, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] }, // LEA_B
    AsmOp { id: 12, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] }, // LEA_BD
    AsmOp { id: 13, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] }, // LEA_BI
    AsmOp { id: 14, variants: &[v(&[R64, AGEN], 1.0, 3, 3, 1.0, 3, 5)] }, // LEA_BID
    AsmOp { id: 15, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] }, // LEA_D
    AsmOp { id: 16, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] }, // LEA_I
    AsmOp { id: 17, variants: &[v(&[R64, AGEN], 1.0, 3, 3, 1.0, 3, 5)] }, // LEA_ID
    AsmOp { id: 18, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] }, // LEA_R
    AsmOp { id: 19, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] }, // LEA_RD
    AsmOp {
        id: 20, // MOV
        variants: &[
            v(&[R32, R32], 0.25, 0, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 0, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I64], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.5, 4, 9, 1.0, 4, 5),
            v(&[M64, R64], 1.0, -1, -1, 2.0, 6, 5),
        ],
    },
    AsmOp { id: 21, variants: &[v(&[R64, R8], 0.25, 1, 1, 1.0, 0, 5)] }, // MOVSX
    AsmOp { id: 22, variants: &[v(&[R64, R8], 0.25, 1, 1, 1.0, 0, 5)] }, // MOVZX
    AsmOp { id: 24, variants: &[v(&[], 0.25, 0, 0, 1.0, -1, 0)] },       // NOP
    AsmOp { id: 27, variants: &[v(&[R64], 0.5, -1, -1, 1.0, 5, 5)] },    // POP
    AsmOp { id: 28, variants: &[v(&[R64], 1.0, -1, -1, 1.0, 6, 5)] },    // PUSH
    AsmOp { id: 29, variants: &[v(&[], 1.0, -1, -1, 2.0, 8, 0)] },       // RET
    AsmOp {
        id: 32, // SUB
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp {
        id: 33, // TEST
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp {
        id: 35, // XOR
        variants: &[
            v(&[R32, R32], 0.25, 0, 0, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 0, 0, 1.0, 0, 5),
        ],
    },
];

static HASWELL_OPS: &[AsmOp] = &[
    AsmOp {
        id: 0,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.5, 1, 7, 2.0, 5, 5),
        ],
    },
    AsmOp {
        id: 1,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp { id: 2, variants: &[v(&[I32], 2.0, -1, -1, 2.0, 7, 0)] },
    AsmOp {
        id: 3,
        variants: &[
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp { id: 4, variants: &[v(&[R64], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp {
        id: 5,
        variants: &[
            v(&[R32, R32], 1.0, 4, 4, 1.0, 3, 2),
            v(&[R64, R64], 1.0, 3, 3, 1.0, 3, 5),
        ],
    },
    AsmOp { id: 6, variants: &[v(&[R64], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp { id: 7, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 8, variants: &[v(&[I64], 1.0, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 9, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 10, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 11, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 12, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 13, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 14, variants: &[v(&[R64, AGEN], 1.0, 3, 3, 1.0, 3, 5)] },
    AsmOp { id: 15, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 16, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 17, variants: &[v(&[R64, AGEN], 1.0, 3, 3, 1.0, 3, 5)] },
    AsmOp { id: 18, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 19, variants: &[v(&[R64, AGEN], 0.5, 1, 1, 1.0, 2, 5)] },
    AsmOp {
        id: 20,
        variants: &[
            v(&[R64, R64], 0.25, 0, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.5, 4, 10, 1.0, 4, 5),
            v(&[M64, R64], 1.0, -1, -1, 2.0, 6, 5),
        ],
    },
    AsmOp { id: 21, variants: &[v(&[R64, R8], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp { id: 22, variants: &[v(&[R64, R8], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp { id: 24, variants: &[v(&[], 0.25, 0, 0, 1.0, -1, 0)] },
    AsmOp { id: 27, variants: &[v(&[R64], 0.5, -1, -1, 1.0, 5, 5)] },
    AsmOp { id: 28, variants: &[v(&[R64], 1.0, -1, -1, 1.0, 6, 5)] },
    AsmOp { id: 29, variants: &[v(&[], 1.0, -1, -1, 2.0, 8, 0)] },
    AsmOp {
        id: 32,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp { id: 33, variants: &[v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp {
        id: 35,
        variants: &[
            v(&[R32, R32], 0.25, 0, 0, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 0, 0, 1.0, 0, 5),
        ],
    },
];

static CORE2_OPS: &[AsmOp] = &[
    AsmOp {
        id: 0,
        variants: &[
            v(&[R32, R32], 0.33, 1, 1, 1.0, 2, 0),
            v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5),
        ],
    },
    AsmOp { id: 1, variants: &[v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 2, variants: &[v(&[I32], 3.0, -1, -1, 3.0, 7, 0)] },
    AsmOp {
        id: 3,
        variants: &[
            v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5),
            v(&[R64, I32], 0.33, 1, 1, 1.0, 2, 5),
        ],
    },
    AsmOp { id: 4, variants: &[v(&[R64], 0.33, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 5, variants: &[v(&[R64, R64], 2.0, 5, 5, 1.0, 3, 5)] },
    AsmOp { id: 6, variants: &[v(&[R64], 0.33, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 7, variants: &[v(&[I64], 1.0, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 8, variants: &[v(&[I64], 1.0, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 9, variants: &[v(&[I64], 1.0, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 10, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 11, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 12, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 13, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 14, variants: &[v(&[R64, AGEN], 1.0, 2, 2, 1.0, 3, 5)] },
    AsmOp { id: 15, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 16, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 17, variants: &[v(&[R64, AGEN], 1.0, 2, 2, 1.0, 3, 5)] },
    AsmOp { id: 18, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp { id: 19, variants: &[v(&[R64, AGEN], 1.0, 1, 1, 1.0, 3, 5)] },
    AsmOp {
        id: 20,
        variants: &[
            v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5),
            vb(&[R64, M64], 1.0, 3, 12, 1.0, 4, 5),
            v(&[M64, R64], 1.0, -1, -1, 2.0, 6, 5),
        ],
    },
    AsmOp { id: 22, variants: &[v(&[R64, R8], 0.33, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 24, variants: &[v(&[], 0.33, 0, 0, 1.0, -1, 0)] },
    AsmOp { id: 27, variants: &[v(&[R64], 1.0, -1, -1, 1.0, 5, 5)] },
    AsmOp { id: 28, variants: &[v(&[R64], 1.0, -1, -1, 1.0, 6, 5)] },
    AsmOp { id: 29, variants: &[v(&[], 1.0, -1, -1, 3.0, 8, 0)] },
    AsmOp { id: 32, variants: &[v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 33, variants: &[v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 35, variants: &[v(&[R64, R64], 0.33, 1, 1, 1.0, 2, 5)] },
];

static ZEN2_OPS: &[AsmOp] = &[
    AsmOp {
        id: 0,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.33, 1, 5, 1.0, 5, 5),
        ],
    },
    AsmOp {
        id: 1,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp { id: 2, variants: &[v(&[I32], 1.0, -1, -1, 2.0, 7, 0)] },
    AsmOp {
        id: 3,
        variants: &[
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.33, 1, 5, 1.0, 5, 5),
        ],
    },
    AsmOp { id: 4, variants: &[v(&[R64], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp {
        id: 5,
        variants: &[
            v(&[R32, R32], 1.0, 3, 3, 1.0, 3, 2),
            v(&[R64, R64], 1.0, 3, 3, 1.0, 3, 5),
        ],
    },
    AsmOp { id: 6, variants: &[v(&[R64], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp { id: 7, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 8, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 9, variants: &[v(&[I64], 0.5, -1, -1, 1.0, 1, 0)] },
    AsmOp { id: 10, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 11, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 12, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 13, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 14, variants: &[v(&[R64, AGEN], 0.5, 2, 2, 1.0, 3, 5)] },
    AsmOp { id: 15, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 16, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 17, variants: &[v(&[R64, AGEN], 0.5, 2, 2, 1.0, 3, 5)] },
    AsmOp { id: 18, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp { id: 19, variants: &[v(&[R64, AGEN], 0.25, 1, 1, 1.0, 2, 5)] },
    AsmOp {
        id: 20,
        variants: &[
            v(&[R32, R32], 0.25, 0, 0, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 0, 0, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I64], 0.25, 1, 1, 1.0, 0, 5),
            vb(&[R64, M64], 0.33, 4, 8, 1.0, 4, 5),
            v(&[M64, R64], 1.0, -1, -1, 1.0, 6, 5),
        ],
    },
    AsmOp { id: 21, variants: &[v(&[R64, R8], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp { id: 22, variants: &[v(&[R64, R8], 0.25, 1, 1, 1.0, 0, 5)] },
    AsmOp { id: 24, variants: &[v(&[], 0.2, 0, 0, 1.0, -1, 0)] },
    AsmOp { id: 27, variants: &[v(&[R64], 0.5, -1, -1, 1.0, 5, 5)] },
    AsmOp { id: 28, variants: &[v(&[R64], 0.5, -1, -1, 1.0, 6, 5)] },
    AsmOp { id: 29, variants: &[v(&[], 0.5, -1, -1, 1.0, 8, 0)] },
    AsmOp {
        id: 32,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
            v(&[R64, I32], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp {
        id: 33,
        variants: &[
            v(&[R32, R32], 0.25, 1, 1, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 1, 1, 1.0, 0, 5),
        ],
    },
    AsmOp {
        id: 35,
        variants: &[
            v(&[R32, R32], 0.25, 0, 0, 1.0, 0, 0),
            v(&[R64, R64], 0.25, 0, 0, 1.0, 0, 5),
        ],
    },
];

/// Data tables keyed by moniker, in [`MICRO_ARCH_UX`] order.
pub static MICRO_ARCHS: &[MicroArch] = &[
    MicroArch { moniker: "CON", ops: CORE2_OPS },
    MicroArch { moniker: "WOL", ops: CORE2_OPS },
    MicroArch { moniker: "NHM", ops: CORE2_OPS },
    MicroArch { moniker: "WSM", ops: CORE2_OPS },
    MicroArch { moniker: "SNB", ops: HASWELL_OPS },
    MicroArch { moniker: "IVB", ops: HASWELL_OPS },
    MicroArch { moniker: "HSW", ops: HASWELL_OPS },
    MicroArch { moniker: "BDW", ops: HASWELL_OPS },
    MicroArch { moniker: "SKL", ops: SKYLAKE_OPS },
    MicroArch { moniker: "SKX", ops: SKYLAKE_OPS },
    MicroArch { moniker: "KBL", ops: SKYLAKE_OPS },
    MicroArch { moniker: "CFL", ops: SKYLAKE_OPS },
    MicroArch { moniker: "CNL", ops: SKYLAKE_OPS },
    MicroArch { moniker: "ICL", ops: SKYLAKE_OPS },
    MicroArch { moniker: "ZEN+", ops: ZEN2_OPS },
    MicroArch { moniker: "ZEN2", ops: ZEN2_OPS },
];
