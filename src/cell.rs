//! Shared-ownership storage cells for segment feature bindings.
//!
//! A segment binds each terminal feature to a [`ValueCell`]. Two segments that
//! hold aliases of the same cell observe each other's writes; this is how deep
//! assimilation works. [`ValueCell::detached`] is the copying counterpart.
//!
//! Cells use `Rc<RefCell<_>>`: segments are processed single-threaded, and a
//! cell lives as long as the longest-lived segment that binds it.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::value::Value;

/// Aliasable storage for one feature value.
///
/// Not `Clone`; share storage with [`ValueCell::alias`].
#[derive(Default)]
pub struct ValueCell(Rc<RefCell<Option<Value>>>);

impl ValueCell {
    /// New, unshared cell.
    pub fn new(value: Option<Value>) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Current value.
    pub fn get(&self) -> Option<Value> {
        self.0.borrow().clone()
    }

    /// Overwrite the value; visible through every alias.
    pub fn set(&self, value: Option<Value>) {
        *self.0.borrow_mut() = value;
    }

    /// Another handle onto the same storage.
    pub fn alias(&self) -> Self {
        Self(Rc::clone(&self.0))
    }

    /// Independent cell holding a copy of the current value.
    pub fn detached(&self) -> Self {
        Self::new(self.get())
    }

    /// `true` if both handles point at the same storage.
    pub fn shares_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles on this storage.
    pub fn alias_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Debug for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("value", &*self.0.borrow())
            .field("aliases", &self.alias_count())
            .finish()
    }
}
