use super::names::NameGenerator;

/// Scratch entry names for expression lowering.
///
/// Freed names are kept on a stack and handed out again before any new name is
/// generated. Callers claim and free in nested order; the pool only counts
/// outstanding claims and does not detect leaks or double frees.
#[derive(Debug)]
pub struct Registers {
    free: Vec<Box<str>>,
    outstanding: usize,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            free: Vec::with_capacity(16),
            outstanding: 0,
        }
    }

    pub fn claim(&mut self, names: &mut NameGenerator) -> Box<str> {
        self.outstanding += 1;
        self.free.pop().unwrap_or_else(|| names.next_name())
    }

    pub fn free(&mut self, name: Box<str>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.free.push(name);
    }

    /// Claims not yet freed.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Names waiting on the free stack.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}
