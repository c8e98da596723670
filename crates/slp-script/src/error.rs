/// Error types for script operations.
///
/// Covers parsing and push encoding failures, ASM conversion and
/// CashAddr/legacy address decoding.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Attempted to append a push opcode through `append_opcodes`.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// An ASM token was neither an opcode name nor valid hex.
    #[error("invalid opcode data: {0}")]
    InvalidOpcodeData(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// A push claims more bytes than the script holds.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds the largest encodable push.
    #[error("data too big")]
    DataTooBig,

    /// One part of a multi-push exceeds protocol limits.
    #[error("part too big '{0}'")]
    PartTooBig(usize),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address prefix, version or hash size not supported.
    #[error("address not supported: {0}")]
    UnsupportedAddress(String),

    /// CashAddr or Base58Check checksum does not match.
    #[error("checksum failed")]
    ChecksumFailed,

    /// Error from primitives crate.
    #[error(transparent)]
    Primitives(#[from] slp_primitives::PrimitivesError),
}
