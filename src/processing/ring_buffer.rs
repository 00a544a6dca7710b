// BUFFER COMPONENT ------------------------------------------------------------

/// Fixed-capacity circular buffer over a preallocated array.
///
/// `head` is the next write slot, `tail` the oldest element, `count` the
/// number of live elements. Invariants: `count <= capacity`, and once full
/// every push overwrites the oldest element (tail advances with head).
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Empty buffer. Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be non-zero");
        Self {
            buffer: vec![T::default(); capacity],
            capacity,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Full buffer with every slot holding `value`. Pushing into it
    /// overwrites slot 0, then 1, and so on.
    pub fn filled(capacity: usize, value: T) -> Self {
        let mut ring = Self::new(capacity);
        ring.fill(value);
        ring
    }

    /// Inserts at head. Returns the element evicted to make room, if the
    /// buffer was already full.
    pub fn push(&mut self, element: T) -> Option<T> {
        let evicted = if self.is_full() {
            let oldest = self.buffer[self.tail];
            self.tail = (self.tail + 1) % self.capacity; // Overwrite oldest if full
            Some(oldest)
        } else {
            self.count += 1;
            None
        };

        self.buffer[self.head] = element;
        self.head = (self.head + 1) % self.capacity;
        evicted
    }

    /// Removes and returns the oldest element.
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let element = self.buffer[self.tail];
        self.tail = (self.tail + 1) % self.capacity;
        self.count -= 1;
        Some(element)
    }

    /// Removes up to `max_count` elements, oldest first.
    pub fn drain(&mut self, max_count: usize) -> Vec<T> {
        let take = max_count.min(self.count);
        let mut drained = Vec::with_capacity(take);
        while drained.len() < take {
            match self.pop() {
                Some(element) => drained.push(element),
                None => break,
            }
        }
        drained
    }

    /// Removes elements oldest first into `dest` until it is full or the
    /// buffer is empty. Returns how many were copied.
    pub fn drain_into(&mut self, dest: &mut [T]) -> usize {
        let mut copied = 0;
        while copied < dest.len() {
            match self.pop() {
                Some(element) => {
                    dest[copied] = element;
                    copied += 1;
                }
                None => break,
            }
        }
        copied
    }

    /// Raw storage in slot order, regardless of which slot is oldest.
    pub fn slots(&self) -> &[T] {
        &self.buffer
    }

    /// Oldest-to-newest iteration over the live elements.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.count).map(move |i| self.buffer[(self.tail + i) % self.capacity])
    }

    /// Overwrites every slot with `value` and rewinds to slot 0, leaving the
    /// buffer full.
    pub fn fill(&mut self, value: T) {
        for slot in self.buffer.iter_mut() {
            *slot = value;
        }
        self.head = 0;
        self.tail = 0;
        self.count = self.capacity;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
