use super::ring_buffer::RingBuffer;

/// Rolling mean over the last `window_size` accepted BPM values.
///
/// The window always holds exactly `window_size` slots and the mean is taken
/// over all of them, so after a reset the average climbs from zero as the
/// window refills.
pub struct BpmAverager {
    window: RingBuffer<f32>,
}

impl BpmAverager {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: RingBuffer::filled(window_size, 0.0),
        }
    }

    pub fn update(&mut self, new_bpm: f32) -> f32 {
        self.window.push(new_bpm);
        self.calculate_average()
    }

    pub fn reset(&mut self) {
        self.window.fill(0.0);
    }

    /// Window contents in slot order.
    pub fn window(&self) -> &[f32] {
        self.window.slots()
    }

    fn calculate_average(&self) -> f32 {
        let total: f32 = self.window.iter().sum();
        total / self.window.capacity() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_update_after_reset_is_quarter() {
        let mut averager = BpmAverager::new(4);
        averager.update(90.0);
        averager.reset();

        assert_eq!(averager.update(80.0), 20.0);
        assert_eq!(averager.window(), &[80.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_window_wraps_after_four_updates() {
        let mut averager = BpmAverager::new(4);
        let averages: Vec<f32> = [60.0, 70.0, 80.0, 90.0]
            .into_iter()
            .map(|bpm| averager.update(bpm))
            .collect();
        assert_eq!(averages, vec![15.0, 32.5, 52.5, 75.0]);

        // Fifth value replaces the first.
        assert_eq!(averager.update(100.0), 85.0);
        assert_eq!(averager.window(), &[100.0, 70.0, 80.0, 90.0]);
    }

    #[test]
    fn test_reset_zeroes_window_and_index() {
        let mut averager = BpmAverager::new(4);
        averager.update(70.0);
        averager.update(72.0);
        averager.reset();
        assert!(averager.window().iter().all(|&slot| slot == 0.0));

        // Writing restarts at slot 0.
        assert_eq!(averager.update(60.0), 15.0);
        assert_eq!(averager.window(), &[60.0, 0.0, 0.0, 0.0]);
    }
}
