//! # Fixed-capacity circular buffer.
//!
//! [`RingBuffer`] holds pending records between arrival and batch formation.
//! It has no synchronization of its own: the events consumer task is its only owner.
//!
//! ## Rules
//! - `push` never overwrites: it returns `false` when full.
//! - `pop` and `drain` return records oldest-first.
//! - `drain` leaves the buffer empty with the same capacity.

/// Bounded FIFO store backed by a fixed slot array.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    /// Next slot to pop.
    head: usize,
    /// Next slot to push.
    tail: usize,
    size: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer. Capacity is clamped to a minimum of 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            size: 0,
        }
    }

    /// Appends `item` at the tail; returns `false` (and drops nothing) when full.
    pub fn push(&mut self, item: T) -> bool {
        if self.size == self.slots.len() {
            return false;
        }
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.size += 1;
        true
    }

    /// Removes and returns the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.size -= 1;
        item
    }

    /// Removes every item and returns them in insertion order.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.size);
        while let Some(item) = self.pop() {
            out.push(item);
        }
        self.head = 0;
        self.tail = 0;
        out
    }

    /// Returns the current occupancy.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` when the buffer holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_insertion_order() {
        let mut ring = RingBuffer::new(4);
        for i in 0..4 {
            assert!(ring.push(i));
        }
        assert_eq!(ring.drain(), vec![0, 1, 2, 3]);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
    }

    #[test]
    fn test_push_when_full_keeps_contents() {
        let mut ring = RingBuffer::new(2);
        assert!(ring.push("a"));
        assert!(ring.push("b"));
        assert!(!ring.push("c"));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.drain(), vec!["a", "b"]);
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let mut ring = RingBuffer::new(3);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        ring.push(4);
        ring.push(5);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.drain(), vec![3, 4, 5]);
    }

    #[test]
    fn test_pop_empty() {
        let mut ring: RingBuffer<u8> = RingBuffer::new(1);
        assert_eq!(ring.pop(), None);
        assert!(ring.drain().is_empty());
    }

    #[test]
    fn test_reusable_after_drain() {
        let mut ring = RingBuffer::new(2);
        ring.push(1);
        ring.push(2);
        ring.drain();
        assert!(ring.push(3));
        assert!(ring.push(4));
        assert!(!ring.push(5));
        assert_eq!(ring.drain(), vec![3, 4]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut ring = RingBuffer::new(0);
        assert_eq!(ring.capacity(), 1);
        assert!(ring.push('x'));
        assert!(!ring.push('y'));
    }
}
