use crate::{
    error::VmError,
    value::{ObjectRef, StackValue},
};

/// An execution thread, as far as native code needs to know about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Thread {
    /// Never zero.
    pub id: u64,
}

/// The frame of one native invocation.
///
/// Locals hold the arguments, receiver first for instance methods, one slot
/// per declared parameter.
#[derive(Debug)]
pub struct Frame {
    locals: Vec<StackValue>,
    stack: Vec<StackValue>,
    /// Index of the invoke being executed.
    pc: usize,
    /// Where execution resumes once the invoke completes.
    next_pc: usize,
}

impl Frame {
    pub fn new(locals: Vec<StackValue>) -> Self {
        Self::at(locals, 0)
    }

    pub fn at(locals: Vec<StackValue>, pc: usize) -> Self {
        Self {
            locals,
            stack: vec![],
            pc,
            next_pc: pc + 1,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn next_pc(&self) -> usize {
        self.next_pc
    }

    /// Makes the invoke at `pc` execute again instead of completing.
    pub fn revert_next_pc(&mut self) {
        self.next_pc = self.pc;
    }

    pub fn is_reverted(&self) -> bool {
        self.next_pc == self.pc
    }

    /// Prepares the frame for another dispatch of the same invoke.
    pub(crate) fn restart(&mut self) {
        self.stack.clear();
        self.next_pc = self.pc + 1;
    }

    fn slot(&self, index: usize) -> Result<&StackValue, VmError> {
        self.locals.get(index).ok_or(VmError::SlotOutOfRange {
            index,
            length: self.locals.len(),
        })
    }

    pub fn get_ref(&self, index: usize) -> Result<&ObjectRef, VmError> {
        self.slot(index)?
            .as_object_ref()
            .ok_or(VmError::SlotTypeMismatch {
                index,
                expected: "reference",
            })
    }

    /// Slot 0 of an instance method.
    pub fn this(&self) -> Result<&ObjectRef, VmError> {
        self.get_ref(0)
    }

    pub fn push(&mut self, value: StackValue) {
        self.stack.push(value);
    }

    pub fn push_ref(&mut self, value: ObjectRef) {
        self.push(StackValue::Ref(value));
    }

    pub fn push_int(&mut self, value: i32) {
        self.push(StackValue::Int(value));
    }

    pub fn push_boolean(&mut self, value: bool) {
        self.push(StackValue::from(value));
    }

    pub fn stack(&self) -> &[StackValue] {
        &self.stack
    }

    pub fn pop(&mut self) -> Option<StackValue> {
        self.stack.pop()
    }
}
