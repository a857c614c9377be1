//! Decode-parameter set supplied by the surrounding document dictionary

use crate::error::{Error, Result};

/// Parameters for the Flate/LZW decode filters and the predictor pass.
///
/// Field meanings and defaults follow the PDF stream dictionary: a missing
/// entry means 1 (8 for bits per component).
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i32,
    /// Number of color components per sample
    pub colors: i32,
    /// Number of bits per color component
    pub bits_per_component: i32,
    /// Number of samples per row
    pub columns: i32,
    /// LZW early-change parameter (0 or 1)
    pub early_change: i32,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
            early_change: 1,
        }
    }
}

impl DecodeParams {
    /// Reject parameter sets a well-formed document dictionary cannot
    /// produce.
    pub fn validate(&self) -> Result<()> {
        if self.predictor < 1 {
            return Err(Error::argument(format!(
                "predictor must be positive, got {}",
                self.predictor
            )));
        }
        if self.colors < 1 {
            return Err(Error::argument(format!(
                "colors must be positive, got {}",
                self.colors
            )));
        }
        if self.bits_per_component < 1 {
            return Err(Error::argument(format!(
                "bits per component must be positive, got {}",
                self.bits_per_component
            )));
        }
        if self.columns < 1 {
            return Err(Error::argument(format!(
                "columns must be positive, got {}",
                self.columns
            )));
        }
        if self.early_change != 0 && self.early_change != 1 {
            return Err(Error::argument(format!(
                "early change must be 0 or 1, got {}",
                self.early_change
            )));
        }
        Ok(())
    }

    /// True when a predictor pass has to run after the base decode.
    pub fn wants_predictor(&self) -> bool {
        self.predictor > 1
    }
}
