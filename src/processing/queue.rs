use super::measurement::Measurement;
use super::ring_buffer::RingBuffer;

/// Most recent measurements, oldest evicted first once `capacity` is reached.
pub struct MeasurementQueue {
    ring: RingBuffer<Measurement>,
}

impl MeasurementQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity),
        }
    }

    /// O(1). Returns the evicted record when the queue was already full.
    pub fn enqueue(&mut self, measurement: Measurement) -> Option<Measurement> {
        self.ring.push(measurement)
    }

    /// Removes up to `max_count` records, oldest first.
    pub fn drain(&mut self, max_count: usize) -> Vec<Measurement> {
        self.ring.drain(max_count)
    }

    pub fn drain_into(&mut self, dest: &mut [Measurement]) -> usize {
        self.ring.drain_into(dest)
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Measurement> + '_ {
        self.ring.iter()
    }
}
