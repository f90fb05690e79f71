use std::sync::atomic::{AtomicU64, Ordering};

/// Source of synthetic record identifiers.
///
/// Contract: every value returned by one generator instance is positive and
/// distinct from every other value it has returned.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
}

/// Millisecond-timestamp seeded generator.
///
/// Ids start at the current Unix time in milliseconds and increase strictly,
/// so two calls in the same millisecond still get distinct ids.
#[derive(Debug)]
pub struct TimestampIdGenerator {
    last: AtomicU64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(1) as u64;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Deterministic generator counting up from a starting value.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start.max(1)),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_timestamp_ids_are_strictly_increasing() {
        let generator = TimestampIdGenerator::new();
        let ids: Vec<u64> = (0..1000).map(|_| generator.next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    }

    #[test]
    fn test_timestamp_ids_are_unique_across_threads() {
        let generator = std::sync::Arc::new(TimestampIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..250).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_sequential_ids() {
        let generator = SequentialIdGenerator::starting_at(0);
        assert_eq!(generator.next_id(), 1);
        assert_eq!(generator.next_id(), 2);
    }
}
