/// Why a computed beat interval was not used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// BPM outside the physiological range (or not finite).
    OutOfRange { bpm: f32 },
    /// IR moved more than the jump threshold since the previous sample.
    IrJump { delta: i64 },
}

/// Physiological range and signal-stability checks for a computed BPM.
#[derive(Debug, Clone, Copy)]
pub struct PlausibilityFilter {
    min_valid_bpm: f32,
    max_valid_bpm: f32,
    ir_jump_threshold: i64,
}

impl PlausibilityFilter {
    pub fn new(min_valid_bpm: f32, max_valid_bpm: f32, ir_jump_threshold: i64) -> Self {
        Self {
            min_valid_bpm,
            max_valid_bpm,
            ir_jump_threshold,
        }
    }

    /// Accepts `bpm` only if it lies in `[min, max]` and the IR signal did
    /// not jump since `previous_ir`. With no previous reading the jump check
    /// passes.
    pub fn check(&self, bpm: f32, current_ir: i32, previous_ir: Option<i32>) -> Result<(), Rejection> {
        let bpm_ok = bpm.is_finite() && bpm >= self.min_valid_bpm && bpm <= self.max_valid_bpm;
        if !bpm_ok {
            return Err(Rejection::OutOfRange { bpm });
        }

        if let Some(previous) = previous_ir {
            let delta = (current_ir as i64 - previous as i64).abs();
            if delta > self.ir_jump_threshold {
                return Err(Rejection::IrJump { delta });
            }
        }

        Ok(())
    }

    pub fn is_valid(&self, bpm: f32, current_ir: i32, previous_ir: Option<i32>) -> bool {
        self.check(bpm, current_ir, previous_ir).is_ok()
    }
}
