use std::collections::{HashMap, VecDeque};

use serde_json::Value;

const DEFAULT_MESSAGES_CAP: usize = 10;

/// Scratchpad shared by every node cloned into one session. The engine never
/// interprets its contents; node bodies read and write it directly.
#[derive(Debug, Clone)]
pub struct SessionMemory {
    messages: VecDeque<Value>,
    messages_cap: usize,
    pub facts: Vec<Value>,
    pub data: HashMap<String, Value>,
}

impl SessionMemory {
    pub fn new(messages_cap: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(messages_cap),
            messages_cap,
            facts: Vec::new(),
            data: HashMap::new(),
        }
    }

    pub fn push_message(&mut self, message: Value) {
        if self.messages.len() == self.messages_cap {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn messages(&self) -> &VecDeque<Value> {
        &self.messages
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGES_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_evict_oldest_past_cap() {
        let mut memory = SessionMemory::new(2);
        memory.push_message(Value::from(1));
        memory.push_message(Value::from(2));
        memory.push_message(Value::from(3));
        let collected: Vec<_> = memory.messages().iter().cloned().collect();
        assert_eq!(collected, vec![Value::from(2), Value::from(3)]);
    }
}
