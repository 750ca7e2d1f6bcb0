//! Core virtual machine implementation.
//!
//! The VM owns its [`AddressSpace`], [`Stack`] and instruction pointer and
//! runs a fetch-decode-execute loop over them. Handlers read raw operand
//! words and decide themselves which ones go through `resolve`, so a store
//! target is never resolved and a branch target is only resolved when the
//! branch is taken.

mod address_space;
mod config;
mod memory;
mod registers;
mod stack;

pub use address_space::AddressSpace;
pub use config::{InputPolicy, VmConfig};
pub use memory::Memory;
pub use stack::Stack;

use crate::utils::log::{self, Level};
use crate::virtual_machine::disasm::disassemble_at;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::io::IoChannel;
use crate::virtual_machine::isa::Instruction;
use crate::virtual_machine::operand::Register;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::{MAX_LITERAL, MEMORY_SIZE, WORD_MODULUS, Word};

/// Execution state of a VM.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VmState {
    /// Ready to execute the instruction at ip.
    Running,
    /// Stopped on an `IN` with no input under [`InputPolicy::Suspend`].
    AwaitingInput,
    /// Stopped by `HALT` or by `RET` on an empty stack.
    Halted,
    /// Stopped by a fault. ip points at the faulting instruction.
    Faulted(VMError),
}

/// Why a call to [`VM::run`] returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Termination {
    /// Normal termination. Terminal.
    Halted,
    /// Fatal fault. Terminal.
    Faulted(VMError),
    /// Input is needed; feed the channel and call `run` again.
    AwaitingInput,
    /// The per-call step limit was reached; `run` again to continue.
    StepLimitReached,
}

impl Termination {
    /// Returns whether the VM can never execute again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Termination::Halted | Termination::Faulted(_))
    }
}

/// Effect of one handler on control flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Control {
    /// Continue with the instruction after this one.
    Next,
    /// Continue at the given resolved target.
    Jump(Word),
    Halt,
    Suspend,
}

macro_rules! exec_vm {
    // Entry point
    (
        vm = $vm:ident,
        io = $io:ident,
        instr = $instr:ident,
        { $( $variant:ident => $handler:ident $args:tt ),* $(,)? }
    ) => {{
        match $instr {
            $(
                Instruction::$variant => exec_vm!(@call $vm, $io, $handler, $args),
            )*
        }
    }};

    // Handler that talks to the I/O channel (semicolon separator)
    (@call $vm:ident, $io:ident, $handler:ident, (io; $( $field:ident ),* $(,)? )) => {{
        $( let $field = $vm.fetch_operand()?; )*
        $vm.$handler($io, $( $field ),*)
    }};

    // Handler without I/O
    (@call $vm:ident, $io:ident, $handler:ident, ( $( $field:ident ),* $(,)? )) => {{
        $( let $field = $vm.fetch_operand()?; )*
        $vm.$handler($( $field ),*)
    }};
}

/// Bytecode virtual machine.
///
/// One VM is one logical thread of control; it is driven by exclusive
/// reference and shares nothing.
pub struct VM {
    /// Memory and registers.
    space: AddressSpace,
    /// Value and return-address stack.
    stack: Stack,
    /// Address of the instruction being executed.
    ip: Word,
    /// Next operand word to fetch while decoding the current instruction.
    cursor: usize,
    state: VmState,
    config: VmConfig,
    /// Instructions completed over the VM's lifetime.
    steps: u64,
}

impl VM {
    /// Creates a VM with `program` loaded at address 0 and default settings.
    pub fn new(program: &Program) -> Result<Self, VMError> {
        Self::with_config(program, VmConfig::default())
    }

    pub fn with_config(program: &Program, config: VmConfig) -> Result<Self, VMError> {
        Ok(Self {
            space: AddressSpace::new(program.words())?,
            stack: Stack::new(),
            ip: 0,
            cursor: 0,
            state: VmState::Running,
            config,
            steps: 0,
        })
    }

    /// Creates a VM directly from raw words.
    pub fn from_words(words: &[Word]) -> Result<Self, VMError> {
        Self::new(&Program::from_words(words.to_vec())?)
    }

    /// Runs until the program halts, faults, needs input, or uses up the
    /// configured step limit.
    ///
    /// Calling `run` on a halted or faulted VM returns the same termination
    /// again without executing anything.
    pub fn run<I: IoChannel>(&mut self, io: &mut I) -> Termination {
        match &self.state {
            VmState::Halted => return Termination::Halted,
            VmState::Faulted(err) => return Termination::Faulted(err.clone()),
            VmState::Running | VmState::AwaitingInput => self.state = VmState::Running,
        }

        let mut executed: u64 = 0;
        loop {
            if let Some(limit) = self.config.step_limit
                && executed >= limit.get()
            {
                return Termination::StepLimitReached;
            }

            match self.step(io) {
                Ok(Control::Next) | Ok(Control::Jump(_)) => executed += 1,
                Ok(Control::Halt) => {
                    self.state = VmState::Halted;
                    return Termination::Halted;
                }
                Ok(Control::Suspend) => {
                    self.state = VmState::AwaitingInput;
                    return Termination::AwaitingInput;
                }
                Err(err) => {
                    self.state = VmState::Faulted(err.clone());
                    return Termination::Faulted(err);
                }
            }
        }
    }

    /// Address of the next instruction, or of the faulting one.
    pub fn ip(&self) -> Word {
        self.ip
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn address_space(&self) -> &AddressSpace {
        &self.space
    }

    /// Mutable access for hosts that patch memory or registers between runs.
    pub fn address_space_mut(&mut self) -> &mut AddressSpace {
        &mut self.space
    }

    pub fn register(&self, reg: Register) -> Word {
        self.space.register(reg)
    }

    /// Number of instructions completed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Fetches, decodes and executes the instruction at ip, then moves ip.
    ///
    /// On error ip is left on the faulting instruction.
    fn step<I: IoChannel>(&mut self, io: &mut I) -> Result<Control, VMError> {
        let opcode = self.space.memory()[self.ip];
        let instruction = Instruction::try_from(opcode)?;
        if self.config.trace {
            log::log(Level::Trace, &self.trace_line());
        }

        self.cursor = self.ip as usize + 1;
        let control = self.exec(instruction, io)?;
        match control {
            Control::Next => self.set_ip(self.cursor)?,
            Control::Jump(target) => self.set_ip(target as usize)?,
            Control::Halt | Control::Suspend => {}
        }
        if control != Control::Suspend {
            self.steps += 1;
        }
        Ok(control)
    }

    /// Renders the instruction at ip as `"{ip:04x}: {disassembly}"`.
    pub fn trace_line(&self) -> String {
        let (text, _) = disassemble_at(self.space.memory().as_slice(), self.ip as usize);
        format!("{:04x}: {}", self.ip, text)
    }

    /// Moves ip to `target`, which must be a memory address.
    fn set_ip(&mut self, target: usize) -> Result<(), VMError> {
        if target >= MEMORY_SIZE {
            return Err(VMError::IpOutOfRange { target });
        }
        self.ip = target as Word;
        Ok(())
    }

    /// Reads the next operand word of the current instruction.
    fn fetch_operand(&mut self) -> Result<Word, VMError> {
        let addr = self.cursor;
        let word = self
            .space
            .memory()
            .get(addr)
            .ok_or(VMError::IpOutOfRange { target: addr })?;
        self.cursor += 1;
        Ok(word)
    }

    fn resolve(&self, value: Word) -> Result<Word, VMError> {
        self.space.resolve(value)
    }

    fn store(&mut self, addr: Word, value: Word) -> Result<(), VMError> {
        self.space.store(addr, value)
    }

    /// Executes a single decoded instruction.
    fn exec<I: IoChannel>(
        &mut self,
        instruction: Instruction,
        io: &mut I,
    ) -> Result<Control, VMError> {
        exec_vm! {
            vm = self,
            io = io,
            instr = instruction,
            {
                // Machine control
                Halt => op_halt(),
                Noop => op_noop(),
                // Data movement and stack
                Set => op_set(a, b),
                Push => op_push(a),
                Pop => op_pop(a),
                Rmem => op_rmem(a, b),
                Wmem => op_wmem(a, b),
                // Comparison and arithmetic
                Eq => op_eq(a, b, c),
                Gt => op_gt(a, b, c),
                Add => op_add(a, b, c),
                Mult => op_mult(a, b, c),
                Mod => op_mod(a, b, c),
                And => op_and(a, b, c),
                Or => op_or(a, b, c),
                Not => op_not(a, b),
                // Control flow
                Jmp => op_jmp(a),
                Jt => op_jt(a, b),
                Jf => op_jf(a, b),
                Call => op_call(a),
                Ret => op_ret(),
                // I/O
                Out => op_out(io; a),
                In => op_in(io; a),
            }
        }
    }

    fn op_halt(&mut self) -> Result<Control, VMError> {
        Ok(Control::Halt)
    }

    fn op_noop(&mut self) -> Result<Control, VMError> {
        Ok(Control::Next)
    }

    fn op_set(&mut self, dst: Word, src: Word) -> Result<Control, VMError> {
        let value = self.resolve(src)?;
        self.store(dst, value)?;
        Ok(Control::Next)
    }

    fn op_push(&mut self, src: Word) -> Result<Control, VMError> {
        let value = self.resolve(src)?;
        self.stack.push(value);
        Ok(Control::Next)
    }

    fn op_pop(&mut self, dst: Word) -> Result<Control, VMError> {
        let value = self.stack.pop().ok_or(VMError::StackUnderflow)?;
        self.store(dst, value)?;
        Ok(Control::Next)
    }

    fn op_rmem(&mut self, dst: Word, addr: Word) -> Result<Control, VMError> {
        let addr = self.resolve(addr)?;
        let value = self.space.read_memory(addr)?;
        self.store(dst, value)?;
        Ok(Control::Next)
    }

    fn op_wmem(&mut self, addr: Word, src: Word) -> Result<Control, VMError> {
        let addr = self.resolve(addr)?;
        let value = self.resolve(src)?;
        self.space.write_memory(addr, value)?;
        Ok(Control::Next)
    }

    /// Shared body of the three-operand instructions: `dst = f(b, c)`.
    fn binary(
        &mut self,
        dst: Word,
        a: Word,
        b: Word,
        f: impl FnOnce(Word, Word) -> Result<Word, VMError>,
    ) -> Result<Control, VMError> {
        let va = self.resolve(a)?;
        let vb = self.resolve(b)?;
        let value = f(va, vb)?;
        self.store(dst, value)?;
        Ok(Control::Next)
    }

    fn op_eq(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| Ok(Word::from(va == vb)))
    }

    fn op_gt(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| Ok(Word::from(va > vb)))
    }

    fn op_add(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| {
            Ok(((u32::from(va) + u32::from(vb)) % WORD_MODULUS) as Word)
        })
    }

    fn op_mult(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| {
            Ok(((u32::from(va) * u32::from(vb)) % WORD_MODULUS) as Word)
        })
    }

    fn op_mod(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| {
            va.checked_rem(vb).ok_or(VMError::DivideByZero)
        })
    }

    fn op_and(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| Ok(va & vb))
    }

    fn op_or(&mut self, dst: Word, a: Word, b: Word) -> Result<Control, VMError> {
        self.binary(dst, a, b, |va, vb| Ok(va | vb))
    }

    fn op_not(&mut self, dst: Word, src: Word) -> Result<Control, VMError> {
        // Masked so words above 15 bits loaded with RMEM still invert into range.
        let value = (self.resolve(src)? ^ MAX_LITERAL) & MAX_LITERAL;
        self.store(dst, value)?;
        Ok(Control::Next)
    }

    fn op_jmp(&mut self, target: Word) -> Result<Control, VMError> {
        Ok(Control::Jump(self.resolve(target)?))
    }

    fn op_jt(&mut self, cond: Word, target: Word) -> Result<Control, VMError> {
        if self.resolve(cond)? != 0 {
            Ok(Control::Jump(self.resolve(target)?))
        } else {
            Ok(Control::Next)
        }
    }

    fn op_jf(&mut self, cond: Word, target: Word) -> Result<Control, VMError> {
        if self.resolve(cond)? == 0 {
            Ok(Control::Jump(self.resolve(target)?))
        } else {
            Ok(Control::Next)
        }
    }

    fn op_call(&mut self, target: Word) -> Result<Control, VMError> {
        let target = self.resolve(target)?;
        // cursor is at most 32768 here, which still fits a word; RET to it faults.
        self.stack.push(self.cursor as Word);
        Ok(Control::Jump(target))
    }

    fn op_ret(&mut self) -> Result<Control, VMError> {
        match self.stack.pop() {
            Some(addr) => Ok(Control::Jump(addr)),
            None => Ok(Control::Halt),
        }
    }

    fn op_out<I: IoChannel>(&mut self, io: &mut I, src: Word) -> Result<Control, VMError> {
        io.write(self.resolve(src)?)?;
        Ok(Control::Next)
    }

    fn op_in<I: IoChannel>(&mut self, io: &mut I, dst: Word) -> Result<Control, VMError> {
        match io.read()? {
            Some(code) => {
                self.store(dst, code)?;
                Ok(Control::Next)
            }
            None => match self.config.input_policy {
                InputPolicy::Fault => Err(VMError::InputExhausted),
                InputPolicy::Suspend => Ok(Control::Suspend),
            },
        }
    }
}
