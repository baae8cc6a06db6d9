use serde::{Deserialize, Serialize};

/// One radar detection in sensor-relative Cartesian coordinates.
///
/// Points arrive packed on the wire as four IEEE-754 little-endian `f32`
/// values in this exact order, 16 bytes per point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedPoint {
    /// Lateral offset in meters (positive right).
    pub x: f32,

    /// Forward distance in meters.
    pub y: f32,

    /// Height in meters (always 0.0 on 2D firmware).
    pub z: f32,

    /// Radial velocity in meters per second (negative approaching).
    pub velocity: f32,
}

impl DetectedPoint {
    /// Create a point from its wire-order components.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32, velocity: f32) -> Self {
        DetectedPoint { x, y, z, velocity }
    }
}

/// Heatmap matrix dimensions, derived from the chirp configuration.
///
/// The wire protocol does not carry these; they come from the external
/// configuration collaborator (see `mmwave-config`) and are required to
/// interpret a range-Doppler heatmap TLV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDims {
    /// Number of discretized distance buckets.
    pub range_bins: usize,

    /// Number of discretized velocity buckets.
    pub doppler_bins: usize,
}

impl HeatmapDims {
    /// Create heatmap dimensions.
    #[must_use]
    pub fn new(range_bins: usize, doppler_bins: usize) -> Self {
        HeatmapDims {
            range_bins,
            doppler_bins,
        }
    }

    /// Wire size of a heatmap payload with these dimensions (i16 cells).
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.range_bins * self.doppler_bins * 2
    }
}

/// Range-Doppler heatmap: signal power per (velocity, distance) bucket.
///
/// Stored row-major as `doppler_bins` rows of `range_bins` cells each. The
/// rows have already been circularly shifted by half the Doppler dimension,
/// so the zero-Doppler bin sits at the vertical center rather than at row 0
/// as it does on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeDopplerHeatmap {
    dims: HeatmapDims,
    cells: Vec<i16>,
}

impl RangeDopplerHeatmap {
    /// Build a heatmap from row-major, already-shifted cells.
    ///
    /// # Panics
    /// Panics if `cells.len()` does not match the dimensions; the decoder
    /// constructs this from a sized payload so the lengths always agree.
    #[must_use]
    pub fn from_cells(dims: HeatmapDims, cells: Vec<i16>) -> Self {
        assert_eq!(cells.len(), dims.range_bins * dims.doppler_bins);
        RangeDopplerHeatmap { dims, cells }
    }

    /// Matrix dimensions.
    #[must_use]
    pub fn dims(&self) -> HeatmapDims {
        self.dims
    }

    /// Cell value at (doppler row, range column).
    ///
    /// Returns `None` when either index is out of bounds.
    #[must_use]
    pub fn value(&self, doppler: usize, range: usize) -> Option<i16> {
        if doppler >= self.dims.doppler_bins || range >= self.dims.range_bins {
            return None;
        }
        Some(self.cells[doppler * self.dims.range_bins + range])
    }

    /// One Doppler row as a slice of range cells.
    #[must_use]
    pub fn row(&self, doppler: usize) -> Option<&[i16]> {
        if doppler >= self.dims.doppler_bins {
            return None;
        }
        let start = doppler * self.dims.range_bins;
        Some(&self.cells[start..start + self.dims.range_bins])
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[i16] {
        &self.cells
    }

    /// Range axis labels in meters for plotting, given the configured
    /// bin-index-to-meters factor.
    #[must_use]
    pub fn range_axis(&self, range_idx_to_meters: f64) -> Vec<f64> {
        (0..self.dims.range_bins)
            .map(|i| i as f64 * range_idx_to_meters)
            .collect()
    }

    /// Doppler axis labels in meters per second, centered on zero, given the
    /// configured Doppler resolution.
    #[must_use]
    pub fn doppler_axis(&self, doppler_resolution_mps: f64) -> Vec<f64> {
        let half = self.dims.doppler_bins as isize / 2;
        (-half..self.dims.doppler_bins as isize - half)
            .map(|i| i as f64 * doppler_resolution_mps)
            .collect()
    }
}

/// One fully decoded frame, detached from the stream buffer it came from.
///
/// This is the value handed to rendering/audio collaborators; it owns all
/// of its data and outlives the buffer region it was decoded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFrame {
    /// Monotonic frame counter assigned by the sensor.
    pub frame_number: u32,

    /// Subframe index for advanced-frame chirp configurations.
    pub sub_frame_number: u32,

    /// Detected point cloud; empty when nothing was detected.
    pub points: Vec<DetectedPoint>,

    /// Range-Doppler heatmap, present only when the firmware emits one and
    /// the decoder was configured with heatmap dimensions.
    pub heatmap: Option<RangeDopplerHeatmap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_heatmap() -> RangeDopplerHeatmap {
        // 2 doppler rows x 3 range columns
        RangeDopplerHeatmap::from_cells(HeatmapDims::new(3, 2), vec![1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn heatmap_indexing_is_row_major() {
        let hm = sample_heatmap();
        assert_eq!(hm.value(0, 0), Some(1));
        assert_eq!(hm.value(0, 2), Some(3));
        assert_eq!(hm.value(1, 0), Some(4));
        assert_eq!(hm.value(1, 2), Some(6));
        assert_eq!(hm.value(2, 0), None);
        assert_eq!(hm.value(0, 3), None);
    }

    #[test]
    fn heatmap_rows_are_contiguous() {
        let hm = sample_heatmap();
        assert_eq!(hm.row(0), Some([1, 2, 3].as_slice()));
        assert_eq!(hm.row(1), Some([4, 5, 6].as_slice()));
        assert_eq!(hm.row(2), None);
    }

    #[test]
    fn doppler_axis_is_centered_on_zero() {
        let hm = RangeDopplerHeatmap::from_cells(HeatmapDims::new(1, 4), vec![0; 4]);
        assert_eq!(hm.doppler_axis(0.5), vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn range_axis_scales_bin_indices() {
        let hm = sample_heatmap();
        assert_eq!(hm.range_axis(2.0), vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn heatmap_payload_len_counts_i16_cells() {
        assert_eq!(HeatmapDims::new(256, 16).payload_len(), 8192);
    }
}
