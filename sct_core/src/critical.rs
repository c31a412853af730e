//! Interrupt-free section guard.

use std::ops::{Deref, DerefMut};

use sct_traits::InterruptControl;

/// Holds interrupts disabled on the wrapped board until dropped.
///
/// Interrupts come back on every exit path, including unwinding.
pub struct InterruptFree<'a, B: InterruptControl + ?Sized> {
    board: &'a mut B,
}

impl<'a, B: InterruptControl + ?Sized> InterruptFree<'a, B> {
    pub fn enter(board: &'a mut B) -> Self {
        board.disable_interrupts();
        Self { board }
    }
}

impl<B: InterruptControl + ?Sized> Deref for InterruptFree<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.board
    }
}

impl<B: InterruptControl + ?Sized> DerefMut for InterruptFree<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.board
    }
}

impl<B: InterruptControl + ?Sized> Drop for InterruptFree<'_, B> {
    fn drop(&mut self) {
        self.board.enable_interrupts();
    }
}
