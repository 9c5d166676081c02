//! Monitor configuration.
//!
//! ```rust
//! use pastel_core::options::{Interpolation, Options};
//!
//! let options = Options::default()
//!     .with_time_field("timestamp")
//!     .with_interpolation(Interpolation::Linear);
//!
//! assert_eq!(options.time_field(), "timestamp");
//! assert_eq!(options.interpolation(), Interpolation::Linear);
//! ```

use pastel_bdd::DEFAULT_BITS;

/// How numeric fields behave between two samples of a dense-time monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// A sample holds its value until the next sample.
    #[default]
    Constant,

    /// Numeric fields change linearly between consecutive samples.
    Linear,
}

/// Configuration shared by every network kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    time_field: String,
    interpolation: Interpolation,
    bits: u32,
    start: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            time_field: "time".to_string(),
            interpolation: Interpolation::Constant,
            bits: DEFAULT_BITS,
            start: 0.0,
        }
    }
}

impl Options {
    /// Name of the field holding the timestamp of dense-time events.
    pub fn with_time_field(mut self, name: impl Into<String>) -> Self {
        self.time_field = name.into();
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Number of boolean variables encoding each data variable. A variable can bind at most
    /// `2^bits` distinct values.
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Time at which dense-time monitors start. The first event may not be earlier.
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn time_field(&self) -> &str {
        &self.time_field
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn start(&self) -> f64 {
        self.start
    }
}
