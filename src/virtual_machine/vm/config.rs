use std::num::NonZeroU64;

/// What `IN` does when the I/O channel has no input left.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InputPolicy {
    /// Fault with [`VMError::InputExhausted`](crate::virtual_machine::errors::VMError::InputExhausted).
    #[default]
    Fault,
    /// Leave ip on the `IN` instruction and return
    /// [`Termination::AwaitingInput`](super::Termination::AwaitingInput).
    /// The host feeds the channel and calls `run` again; until it does, the
    /// program stays blocked.
    Suspend,
}

/// Host-side execution settings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VmConfig {
    /// Behaviour of `IN` on exhausted input.
    pub input_policy: InputPolicy,
    /// Maximum number of instructions executed per `run` call.
    pub step_limit: Option<NonZeroU64>,
    /// Emit one trace log line per executed instruction.
    pub trace: bool,
}

impl VmConfig {
    pub fn with_input_policy(mut self, policy: InputPolicy) -> Self {
        self.input_policy = policy;
        self
    }

    /// Sets the per-call step limit. A limit of 0 means no limit.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = NonZeroU64::new(limit);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
