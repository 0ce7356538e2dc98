//! Operand stack shared between a script and the contexts it switches into.

use nexus_core::Address;
use num_bigint::BigInt;

use crate::error::{VmError, VmResult};
use crate::vm_object::VmObject;

/// Bounded LIFO stack of [`VmObject`] values.
#[derive(Debug, Clone)]
pub struct OperandStack {
    items: Vec<VmObject>,
    max_size: usize,
}

impl OperandStack {
    pub fn new(max_size: usize) -> Self {
        Self {
            items: Vec::new(),
            max_size,
        }
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn push(&mut self, item: impl Into<VmObject>) -> VmResult<()> {
        if self.items.len() >= self.max_size {
            return Err(VmError::StackOverflow {
                limit: self.max_size,
            });
        }
        self.items.push(item.into());
        Ok(())
    }

    pub fn pop(&mut self) -> VmResult<VmObject> {
        self.items.pop().ok_or(VmError::underflow(1, 0))
    }

    /// Item `n` positions below the top.
    pub fn peek(&self, n: usize) -> VmResult<&VmObject> {
        if n >= self.items.len() {
            return Err(VmError::underflow(n + 1, self.items.len()));
        }
        Ok(&self.items[self.items.len() - 1 - n])
    }

    #[inline]
    pub fn top(&self) -> Option<&VmObject> {
        self.items.last()
    }

    pub fn swap(&mut self) -> VmResult<()> {
        let len = self.items.len();
        if len < 2 {
            return Err(VmError::underflow(2, len));
        }
        self.items.swap(len - 1, len - 2);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items from bottom to top.
    #[inline]
    pub fn items(&self) -> &[VmObject] {
        &self.items
    }

    pub fn pop_bool(&mut self) -> VmResult<bool> {
        Ok(self.pop()?.as_bool())
    }

    pub fn pop_number(&mut self) -> VmResult<BigInt> {
        self.pop()?.as_number()
    }

    pub fn pop_string(&mut self) -> VmResult<String> {
        self.pop()?.as_string()
    }

    pub fn pop_bytes(&mut self) -> VmResult<Vec<u8>> {
        self.pop()?.as_bytes()
    }

    pub fn pop_address(&mut self) -> VmResult<Address> {
        self.pop()?.as_address()
    }
}
