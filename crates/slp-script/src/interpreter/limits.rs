//! Evaluation limits.

/// Resource limits enforced during evaluation.
///
/// Defaults follow Bitcoin Cash relay policy at the time the vault
/// covenant format was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum script length in bytes.
    pub max_script_size: usize,
    /// Maximum size of a single stack element.
    pub max_element_size: usize,
    /// Maximum non-push opcodes per script.
    pub max_ops: usize,
    /// Maximum combined depth of the data and alt stacks.
    pub max_stack_size: usize,
    /// Maximum byte length of a numeric operand.
    pub max_number_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_script_size: 10_000,
            max_element_size: 520,
            max_ops: 201,
            max_stack_size: 1_000,
            max_number_length: 4,
        }
    }
}
