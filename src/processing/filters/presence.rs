/// Decides whether tissue is against the sensor from a single IR reading.
///
/// No hysteresis: one reading at or below the threshold counts as absence.
#[derive(Debug, Clone, Copy)]
pub struct PresenceFilter {
    threshold_ir: i32,
}

impl PresenceFilter {
    pub fn new(threshold_ir: i32) -> Self {
        Self { threshold_ir }
    }

    pub fn is_present(&self, ir_value: i32) -> bool {
        ir_value > self.threshold_ir
    }
}
