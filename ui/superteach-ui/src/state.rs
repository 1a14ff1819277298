//! Shared reactive state for the page.

use std::sync::Arc;

use superteach_core::{Notice, Starter};

/// Services behind the page, shared by every component.
pub type SharedStarter = Arc<Starter>;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// Toasts currently on screen, oldest first.
#[derive(Clone, Debug, Default)]
pub struct Toasts {
    next_id: u64,
    pub items: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, notice: Notice) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast { id, notice });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }
}
