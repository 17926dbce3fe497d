// Snowflake-style id generator
//
// 64-bit id format: [timestamp_ms:42][node_id:10][sequence:12]
// Up to 1024 nodes and 4096 ids per millisecond per node. Ids from one generator are
// strictly increasing, which keeps id order consistent with creation order.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_MASK: u64 = (1 << 42) - 1;

#[derive(Debug, Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

#[derive(Debug)]
pub struct IdGenerator {
    node_id: u16,
    state: Mutex<GeneratorState>,
}

impl IdGenerator {
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id: node_id & ((1 << NODE_BITS) - 1),
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Generate the next unique id.
    pub fn next_id(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut now = current_millis();

        // Never step backwards, even if the wall clock does.
        if now < state.last_timestamp {
            now = state.last_timestamp;
        }

        if now == state.last_timestamp {
            state.sequence += 1;
            if state.sequence > MAX_SEQUENCE {
                // Sequence exhausted for this millisecond; borrow the next one.
                now = state.last_timestamp + 1;
                state.sequence = 0;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = now;

        (((now & TIMESTAMP_MASK) << (NODE_BITS + SEQUENCE_BITS))
            | ((self.node_id as u64) << SEQUENCE_BITS)
            | state.sequence) as i64
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_id_generation() {
        let generator = IdGenerator::new(123);

        let id1 = generator.next_id();
        let id2 = generator.next_id();
        let id3 = generator.next_id();

        assert!(id1 < id2 && id2 < id3);

        let node_of = |id: i64| (id as u64 >> SEQUENCE_BITS) & ((1 << NODE_BITS) - 1);
        assert_eq!(node_of(id1), 123);
        assert_eq!(node_of(id2), 123);
        assert_eq!(node_of(id3), 123);
    }

    #[test]
    fn test_timestamp_extraction() {
        let generator = IdGenerator::new(500);
        let before = current_millis();
        let id = generator.next_id();
        let ts = (id as u64) >> (NODE_BITS + SEQUENCE_BITS);
        assert!(ts >= before);
        assert!(ts <= current_millis() + 1);
    }

    #[test]
    fn test_uniqueness_across_threads() {
        let generator = Arc::new(IdGenerator::new(7));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..5000).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 20_000);
    }
}
