//! Opcode constants for Bitcoin Cash script.
//!
//! Includes the re-enabled splice opcodes (`OP_CAT`, `OP_SPLIT`,
//! `OP_NUM2BIN`, `OP_BIN2NUM`) and `OP_CHECKDATASIG`/`OP_CHECKDATASIGVERIFY`
//! used by covenant scripts.

macro_rules! opcodes {
    ($($name:ident = $value:literal),* $(,)?) => {
        $(
            #[allow(missing_docs)]
            pub const $name: u8 = $value;
        )*

        const NAMED_OPCODES: &[(&str, u8)] = &[$((stringify!($name), $value)),*];
    };
}

opcodes! {
    OP_0 = 0x00,
    OP_PUSHDATA1 = 0x4c,
    OP_PUSHDATA2 = 0x4d,
    OP_PUSHDATA4 = 0x4e,
    OP_1NEGATE = 0x4f,
    OP_RESERVED = 0x50,
    OP_1 = 0x51,
    OP_2 = 0x52,
    OP_3 = 0x53,
    OP_4 = 0x54,
    OP_5 = 0x55,
    OP_6 = 0x56,
    OP_7 = 0x57,
    OP_8 = 0x58,
    OP_9 = 0x59,
    OP_10 = 0x5a,
    OP_11 = 0x5b,
    OP_12 = 0x5c,
    OP_13 = 0x5d,
    OP_14 = 0x5e,
    OP_15 = 0x5f,
    OP_16 = 0x60,
    OP_NOP = 0x61,
    OP_VER = 0x62,
    OP_IF = 0x63,
    OP_NOTIF = 0x64,
    OP_VERIF = 0x65,
    OP_VERNOTIF = 0x66,
    OP_ELSE = 0x67,
    OP_ENDIF = 0x68,
    OP_VERIFY = 0x69,
    OP_RETURN = 0x6a,
    OP_TOALTSTACK = 0x6b,
    OP_FROMALTSTACK = 0x6c,
    OP_2DROP = 0x6d,
    OP_2DUP = 0x6e,
    OP_3DUP = 0x6f,
    OP_2OVER = 0x70,
    OP_2ROT = 0x71,
    OP_2SWAP = 0x72,
    OP_IFDUP = 0x73,
    OP_DEPTH = 0x74,
    OP_DROP = 0x75,
    OP_DUP = 0x76,
    OP_NIP = 0x77,
    OP_OVER = 0x78,
    OP_PICK = 0x79,
    OP_ROLL = 0x7a,
    OP_ROT = 0x7b,
    OP_SWAP = 0x7c,
    OP_TUCK = 0x7d,
    OP_CAT = 0x7e,
    OP_SPLIT = 0x7f,
    OP_NUM2BIN = 0x80,
    OP_BIN2NUM = 0x81,
    OP_SIZE = 0x82,
    OP_INVERT = 0x83,
    OP_AND = 0x84,
    OP_OR = 0x85,
    OP_XOR = 0x86,
    OP_EQUAL = 0x87,
    OP_EQUALVERIFY = 0x88,
    OP_RESERVED1 = 0x89,
    OP_RESERVED2 = 0x8a,
    OP_1ADD = 0x8b,
    OP_1SUB = 0x8c,
    OP_2MUL = 0x8d,
    OP_2DIV = 0x8e,
    OP_NEGATE = 0x8f,
    OP_ABS = 0x90,
    OP_NOT = 0x91,
    OP_0NOTEQUAL = 0x92,
    OP_ADD = 0x93,
    OP_SUB = 0x94,
    OP_MUL = 0x95,
    OP_DIV = 0x96,
    OP_MOD = 0x97,
    OP_LSHIFT = 0x98,
    OP_RSHIFT = 0x99,
    OP_BOOLAND = 0x9a,
    OP_BOOLOR = 0x9b,
    OP_NUMEQUAL = 0x9c,
    OP_NUMEQUALVERIFY = 0x9d,
    OP_NUMNOTEQUAL = 0x9e,
    OP_LESSTHAN = 0x9f,
    OP_GREATERTHAN = 0xa0,
    OP_LESSTHANOREQUAL = 0xa1,
    OP_GREATERTHANOREQUAL = 0xa2,
    OP_MIN = 0xa3,
    OP_MAX = 0xa4,
    OP_WITHIN = 0xa5,
    OP_RIPEMD160 = 0xa6,
    OP_SHA1 = 0xa7,
    OP_SHA256 = 0xa8,
    OP_HASH160 = 0xa9,
    OP_HASH256 = 0xaa,
    OP_CODESEPARATOR = 0xab,
    OP_CHECKSIG = 0xac,
    OP_CHECKSIGVERIFY = 0xad,
    OP_CHECKMULTISIG = 0xae,
    OP_CHECKMULTISIGVERIFY = 0xaf,
    OP_NOP1 = 0xb0,
    OP_CHECKLOCKTIMEVERIFY = 0xb1,
    OP_CHECKSEQUENCEVERIFY = 0xb2,
    OP_NOP4 = 0xb3,
    OP_NOP5 = 0xb4,
    OP_NOP6 = 0xb5,
    OP_NOP7 = 0xb6,
    OP_NOP8 = 0xb7,
    OP_NOP9 = 0xb8,
    OP_NOP10 = 0xb9,
    OP_CHECKDATASIG = 0xba,
    OP_CHECKDATASIGVERIFY = 0xbb,
    OP_REVERSEBYTES = 0xbc,
}

/// Alias for `OP_0`.
pub const OP_FALSE: u8 = OP_0;
/// Alias for `OP_1`.
pub const OP_TRUE: u8 = OP_1;
/// Alias for `OP_CHECKLOCKTIMEVERIFY`.
pub const OP_NOP2: u8 = OP_CHECKLOCKTIMEVERIFY;
/// Alias for `OP_CHECKSEQUENCEVERIFY`.
pub const OP_NOP3: u8 = OP_CHECKSEQUENCEVERIFY;

/// Direct push of 1 byte.
pub const OP_DATA_1: u8 = 0x01;
/// Direct push of 8 bytes.
pub const OP_DATA_8: u8 = 0x08;
/// Direct push of 20 bytes (hash160 payloads).
pub const OP_DATA_20: u8 = 0x14;
/// Direct push of 32 bytes (token ids, hashes).
pub const OP_DATA_32: u8 = 0x20;
/// Direct push of 33 bytes (compressed public keys).
pub const OP_DATA_33: u8 = 0x21;
/// Largest direct push.
pub const OP_DATA_75: u8 = 0x4b;

const DATA_NAMES: [&str; 75] = [
    "OP_DATA_1", "OP_DATA_2", "OP_DATA_3", "OP_DATA_4", "OP_DATA_5", "OP_DATA_6",
    "OP_DATA_7", "OP_DATA_8", "OP_DATA_9", "OP_DATA_10", "OP_DATA_11", "OP_DATA_12",
    "OP_DATA_13", "OP_DATA_14", "OP_DATA_15", "OP_DATA_16", "OP_DATA_17", "OP_DATA_18",
    "OP_DATA_19", "OP_DATA_20", "OP_DATA_21", "OP_DATA_22", "OP_DATA_23", "OP_DATA_24",
    "OP_DATA_25", "OP_DATA_26", "OP_DATA_27", "OP_DATA_28", "OP_DATA_29", "OP_DATA_30",
    "OP_DATA_31", "OP_DATA_32", "OP_DATA_33", "OP_DATA_34", "OP_DATA_35", "OP_DATA_36",
    "OP_DATA_37", "OP_DATA_38", "OP_DATA_39", "OP_DATA_40", "OP_DATA_41", "OP_DATA_42",
    "OP_DATA_43", "OP_DATA_44", "OP_DATA_45", "OP_DATA_46", "OP_DATA_47", "OP_DATA_48",
    "OP_DATA_49", "OP_DATA_50", "OP_DATA_51", "OP_DATA_52", "OP_DATA_53", "OP_DATA_54",
    "OP_DATA_55", "OP_DATA_56", "OP_DATA_57", "OP_DATA_58", "OP_DATA_59", "OP_DATA_60",
    "OP_DATA_61", "OP_DATA_62", "OP_DATA_63", "OP_DATA_64", "OP_DATA_65", "OP_DATA_66",
    "OP_DATA_67", "OP_DATA_68", "OP_DATA_69", "OP_DATA_70", "OP_DATA_71", "OP_DATA_72",
    "OP_DATA_73", "OP_DATA_74", "OP_DATA_75",
];

const UNKNOWN_NAMES: [&str; 67] = [
    "OP_UNKNOWN189", "OP_UNKNOWN190", "OP_UNKNOWN191", "OP_UNKNOWN192", "OP_UNKNOWN193",
    "OP_UNKNOWN194", "OP_UNKNOWN195", "OP_UNKNOWN196", "OP_UNKNOWN197", "OP_UNKNOWN198",
    "OP_UNKNOWN199", "OP_UNKNOWN200", "OP_UNKNOWN201", "OP_UNKNOWN202", "OP_UNKNOWN203",
    "OP_UNKNOWN204", "OP_UNKNOWN205", "OP_UNKNOWN206", "OP_UNKNOWN207", "OP_UNKNOWN208",
    "OP_UNKNOWN209", "OP_UNKNOWN210", "OP_UNKNOWN211", "OP_UNKNOWN212", "OP_UNKNOWN213",
    "OP_UNKNOWN214", "OP_UNKNOWN215", "OP_UNKNOWN216", "OP_UNKNOWN217", "OP_UNKNOWN218",
    "OP_UNKNOWN219", "OP_UNKNOWN220", "OP_UNKNOWN221", "OP_UNKNOWN222", "OP_UNKNOWN223",
    "OP_UNKNOWN224", "OP_UNKNOWN225", "OP_UNKNOWN226", "OP_UNKNOWN227", "OP_UNKNOWN228",
    "OP_UNKNOWN229", "OP_UNKNOWN230", "OP_UNKNOWN231", "OP_UNKNOWN232", "OP_UNKNOWN233",
    "OP_UNKNOWN234", "OP_UNKNOWN235", "OP_UNKNOWN236", "OP_UNKNOWN237", "OP_UNKNOWN238",
    "OP_UNKNOWN239", "OP_UNKNOWN240", "OP_UNKNOWN241", "OP_UNKNOWN242", "OP_UNKNOWN243",
    "OP_UNKNOWN244", "OP_UNKNOWN245", "OP_UNKNOWN246", "OP_UNKNOWN247", "OP_UNKNOWN248",
    "OP_UNKNOWN249", "OP_UNKNOWN250", "OP_UNKNOWN251", "OP_UNKNOWN252", "OP_UNKNOWN253",
    "OP_UNKNOWN254", "OP_UNKNOWN255",
];

/// Return the canonical `OP_xxx` name for an opcode byte.
///
/// Direct pushes render as `OP_DATA_n`; unassigned bytes as `OP_UNKNOWNn`.
pub fn opcode_to_string(op: u8) -> &'static str {
    match op {
        0x01..=0x4b => DATA_NAMES[(op - 1) as usize],
        0xbd..=0xff => UNKNOWN_NAMES[(op - 0xbd) as usize],
        _ => NAMED_OPCODES
            .iter()
            .find(|(_, value)| *value == op)
            .map(|(name, _)| *name)
            .unwrap_or("OP_UNKNOWN"),
    }
}

/// Look up an opcode by its `OP_xxx` name. Aliases are accepted.
pub fn string_to_opcode(name: &str) -> Option<u8> {
    match name {
        "OP_FALSE" => Some(OP_FALSE),
        "OP_TRUE" => Some(OP_TRUE),
        "OP_NOP2" => Some(OP_NOP2),
        "OP_NOP3" => Some(OP_NOP3),
        _ => NAMED_OPCODES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| *value),
    }
}

/// Return `true` if `op` is `OP_0` or `OP_1`..`OP_16`.
pub fn is_small_int_op(op: u8) -> bool {
    op == OP_0 || (OP_1..=OP_16).contains(&op)
}

/// Opcode pushing the small integer `n` (0..=16), if one exists.
pub fn small_int_opcode(n: usize) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_1 + (n as u8) - 1),
        _ => None,
    }
}
