/// Monotonic sequence generator for event-log positions.
/// Sequence numbers start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    next: u64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next;
        self.next += 1;
        seq
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}
