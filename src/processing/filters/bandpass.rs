use super::FilterInstance;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FilterKind {
    High,
    Low,
}

// Biquad section, RBJ cookbook coefficients
#[derive(Debug, Clone)]
struct SecondOrderFilter {
    a: [f64; 3],
    b: [f64; 3],
    x: [f64; 2],
    y: [f64; 2],
}

impl SecondOrderFilter {
    fn new(f0: f64, fs: f64, kind: FilterKind) -> Self {
        let q = (2.0f64).sqrt() / 2.0; // Butterworth
        let omega = 2.0 * std::f64::consts::PI * f0 / fs;
        let alpha = f64::sin(omega) / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match kind {
            FilterKind::High => (
                (1.0 + f64::cos(omega)) / 2.0,
                -(1.0 + f64::cos(omega)),
                (1.0 + f64::cos(omega)) / 2.0,
                1.0 + alpha,
                -2.0 * f64::cos(omega),
                1.0 - alpha,
            ),
            FilterKind::Low => (
                (1.0 - f64::cos(omega)) / 2.0,
                1.0 - f64::cos(omega),
                (1.0 - f64::cos(omega)) / 2.0,
                1.0 + alpha,
                -2.0 * f64::cos(omega),
                1.0 - alpha,
            ),
        };

        SecondOrderFilter {
            a: [a0, a1, a2],
            b: [b0, b1, b2],
            x: [0.0, 0.0],
            y: [0.0, 0.0],
        }
    }

    fn calculate_output(&mut self, input: f64) -> f64 {
        let output = (self.b[0] / self.a[0]) * input
            + (self.b[1] / self.a[0]) * self.x[0]
            + (self.b[2] / self.a[0]) * self.x[1]
            - (self.a[1] / self.a[0]) * self.y[0]
            - (self.a[2] / self.a[0]) * self.y[1];

        self.x[1] = self.x[0];
        self.x[0] = input;
        self.y[1] = self.y[0];
        self.y[0] = output;

        output
    }

    /// Pretend `input` has been applied forever with a settled zero output.
    /// For a high-pass section this removes the start-up step response.
    fn prime(&mut self, input: f64) {
        self.x = [input, input];
        self.y = [0.0, 0.0];
    }

    fn clear(&mut self) {
        self.x = [0.0, 0.0];
        self.y = [0.0, 0.0];
    }
}

/// High-pass at `f_low` followed by low-pass at `f_high`.
///
/// The first sample primes the high-pass stage, so a raw IR baseline in the
/// hundreds of thousands does not ring through the output.
#[derive(Debug, Clone)]
pub struct BandPassFilter {
    high_pass: SecondOrderFilter,
    low_pass: SecondOrderFilter,
    primed: bool,
}

impl BandPassFilter {
    pub fn new(f_low: f64, f_high: f64, fs: f64) -> Self {
        BandPassFilter {
            high_pass: SecondOrderFilter::new(f_low, fs, FilterKind::High),
            low_pass: SecondOrderFilter::new(f_high, fs, FilterKind::Low),
            primed: false,
        }
    }
}

impl FilterInstance for BandPassFilter {
    fn filter_sample(&mut self, sample: f64) -> f64 {
        if !self.primed {
            self.high_pass.prime(sample);
            self.primed = true;
        }

        // Apply high-pass filter first
        let high_pass_output = self.high_pass.calculate_output(sample);
        // Apply low-pass filter to the output of the high-pass filter
        self.low_pass.calculate_output(high_pass_output)
    }

    fn reset(&mut self) {
        self.high_pass.clear();
        self.low_pass.clear();
        self.primed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input_produces_no_output() {
        let mut filter = BandPassFilter::new(0.5, 4.0, 100.0);
        for _ in 0..500 {
            let output = filter.filter_sample(150_000.0);
            assert!(output.abs() < 1e-6, "output {} should stay at zero", output);
        }
    }

    #[test]
    fn test_passband_sine_keeps_most_of_its_amplitude() {
        let fs = 100.0;
        let mut filter = BandPassFilter::new(0.5, 4.0, fs);
        let mut peak: f64 = 0.0;
        for i in 0..2000 {
            let t = i as f64 / fs;
            let sample = 150_000.0 + 200.0 * (2.0 * std::f64::consts::PI * 1.2 * t).sin();
            let output = filter.filter_sample(sample);
            if i > 1000 {
                peak = peak.max(output.abs());
            }
        }
        assert!(peak > 150.0 && peak < 220.0, "peak {}", peak);
    }

    #[test]
    fn test_reset_re_primes() {
        let mut filter = BandPassFilter::new(0.5, 4.0, 100.0);
        filter.filter_sample(150_000.0);
        filter.reset();
        assert!(filter.filter_sample(50_000.0).abs() < 1e-6);
    }
}
