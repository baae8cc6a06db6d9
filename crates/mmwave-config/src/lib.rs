//! Chirp configuration parser for TI mmWave sensors.
//!
//! The sensor is configured by streaming a plain-text command file to its
//! CLI port before capture starts. The same file is the only source of the
//! parameters a consumer needs to interpret decoded frames: how many range
//! and Doppler bins a heatmap has, and the physical resolution of each bin.
//!
//! This crate parses that file into a [`RadarConfig`]. Sending the commands
//! to the device is the transport collaborator's job and out of scope here.
//!
//! # File Format
//!
//! One command per line, space-separated fields, `%` comment lines:
//!
//! ```text
//! % Chirp profile
//! profileCfg 0 77 429 7 57.14 0 0 70 1 256 5209 0 0 30
//! frameCfg 0 0 16 0 100 1 0
//! sensorStart
//! ```
//!
//! Only `profileCfg` and `frameCfg` contribute parameters; every other
//! command passes through unexamined.
//!
//! # Example
//!
//! ```
//! use mmwave_config::RadarConfig;
//!
//! let text = "\
//! profileCfg 0 77 429 7 57.14 0 0 70 1 256 5209 0 0 30
//! frameCfg 0 0 16 0 100 1 0
//! ";
//! let config = RadarConfig::from_str(text, 1, 1).unwrap();
//! assert_eq!(config.num_range_bins, 256);
//! assert_eq!(config.num_doppler_bins, 16);
//! ```

use mmwave_core::{Error, HeatmapDims, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Speed of light in meters per second, used by the resolution formulas.
const C_MPS: f64 = 3.0e8;

/// Radar parameters derived from the chirp configuration file.
///
/// Field semantics follow the TI mmWave demo: bins describe the dimensions
/// of the range-Doppler matrix, the `*_resolution` and `range_idx_to_meters`
/// factors convert bin indices to physical units, and the `max_*` values
/// bound what the configured chirp can unambiguously measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarConfig {
    /// Number of range bins (ADC sample count rounded up to a power of two).
    pub num_range_bins: usize,

    /// Number of Doppler bins (chirps per frame / TX antennas).
    pub num_doppler_bins: usize,

    /// Meters of distance represented by one range bin, relative to the raw
    /// ADC sample count.
    pub range_resolution_meters: f64,

    /// Meters of distance represented by one range bin index in the padded
    /// (power-of-two) range axis.
    pub range_idx_to_meters: f64,

    /// Meters per second represented by one Doppler bin.
    pub doppler_resolution_mps: f64,

    /// Maximum unambiguous range in meters.
    pub max_range: f64,

    /// Maximum unambiguous radial velocity in meters per second.
    pub max_velocity: f64,

    /// Frame period in milliseconds; the natural poll interval for the
    /// decoder loop.
    pub frame_periodicity_ms: f64,
}

impl RadarConfig {
    /// Parse a configuration file from disk.
    ///
    /// # Errors
    /// Returns `Error::Io` when the file cannot be read, otherwise the same
    /// errors as [`RadarConfig::from_str`].
    pub fn from_file(path: impl AsRef<Path>, num_rx_ant: usize, num_tx_ant: usize) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text, num_rx_ant, num_tx_ant)
    }

    /// Parse configuration text.
    ///
    /// `num_rx_ant` / `num_tx_ant` are the antenna counts the chirp design
    /// assumes; they are not recorded in the file itself. When several
    /// `profileCfg` or `frameCfg` lines are present the last one wins, which
    /// matches how the sensor applies repeated commands.
    ///
    /// # Errors
    /// Returns `Error::MissingConfig` when a required stanza is absent and
    /// `Error::Config` when a field cannot be parsed.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str, _num_rx_ant: usize, num_tx_ant: usize) -> Result<Self> {
        if num_tx_ant == 0 {
            return Err(Error::Config("num_tx_ant must be nonzero".into()));
        }

        let mut profile: Option<ProfileCfg> = None;
        let mut frame: Option<FrameCfg> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields[0] {
                "profileCfg" => profile = Some(ProfileCfg::parse(&fields)?),
                "frameCfg" => frame = Some(FrameCfg::parse(&fields)?),
                _ => {}
            }
        }

        let profile = profile.ok_or_else(|| Error::MissingConfig("profileCfg".into()))?;
        let frame = frame.ok_or_else(|| Error::MissingConfig("frameCfg".into()))?;

        let num_chirps_per_frame = (frame.chirp_end_idx - frame.chirp_start_idx + 1) * frame.num_loops;
        let num_doppler_bins = num_chirps_per_frame / num_tx_ant;
        if num_doppler_bins == 0 {
            return Err(Error::Config(format!(
                "frameCfg yields no Doppler bins ({num_chirps_per_frame} chirps / {num_tx_ant} TX)"
            )));
        }
        let num_range_bins = profile.num_adc_samples.next_power_of_two();

        let chirp_time_s = (profile.idle_time_us + profile.ramp_end_time_us) * 1e-6;
        let start_freq_hz = profile.start_freq_ghz * 1e9;

        Ok(RadarConfig {
            num_range_bins,
            num_doppler_bins,
            range_resolution_meters: (C_MPS * profile.dig_out_sample_rate_ksps * 1e3)
                / (2.0 * profile.freq_slope_mhz_us * 1e12 * profile.num_adc_samples as f64),
            range_idx_to_meters: (C_MPS * profile.dig_out_sample_rate_ksps * 1e3)
                / (2.0 * profile.freq_slope_mhz_us * 1e12 * num_range_bins as f64),
            doppler_resolution_mps: C_MPS
                / (2.0 * start_freq_hz * chirp_time_s * num_doppler_bins as f64 * num_tx_ant as f64),
            max_range: (300.0 * 0.9 * profile.dig_out_sample_rate_ksps)
                / (2.0 * profile.freq_slope_mhz_us * 1e3),
            max_velocity: C_MPS / (4.0 * start_freq_hz * chirp_time_s * num_tx_ant as f64),
            frame_periodicity_ms: frame.frame_periodicity_ms,
        })
    }

    /// Heatmap dimensions for the protocol decoder's frame format.
    #[must_use]
    pub fn heatmap_dims(&self) -> HeatmapDims {
        HeatmapDims::new(self.num_range_bins, self.num_doppler_bins)
    }
}

/// Raw `profileCfg` fields this crate consumes.
#[derive(Debug, Clone, Copy)]
struct ProfileCfg {
    start_freq_ghz: f64,
    idle_time_us: f64,
    ramp_end_time_us: f64,
    freq_slope_mhz_us: f64,
    num_adc_samples: usize,
    dig_out_sample_rate_ksps: f64,
}

impl ProfileCfg {
    fn parse(fields: &[&str]) -> Result<Self> {
        Ok(ProfileCfg {
            start_freq_ghz: float_field(fields, 2)?.trunc(),
            idle_time_us: float_field(fields, 3)?,
            ramp_end_time_us: float_field(fields, 5)?,
            freq_slope_mhz_us: float_field(fields, 8)?,
            num_adc_samples: int_field(fields, 10)?,
            dig_out_sample_rate_ksps: float_field(fields, 11)?,
        })
    }
}

/// Raw `frameCfg` fields this crate consumes.
#[derive(Debug, Clone, Copy)]
struct FrameCfg {
    chirp_start_idx: usize,
    chirp_end_idx: usize,
    num_loops: usize,
    frame_periodicity_ms: f64,
}

impl FrameCfg {
    fn parse(fields: &[&str]) -> Result<Self> {
        let cfg = FrameCfg {
            chirp_start_idx: int_field(fields, 1)?,
            chirp_end_idx: int_field(fields, 2)?,
            num_loops: int_field(fields, 3)?,
            frame_periodicity_ms: float_field(fields, 5)?,
        };
        if cfg.chirp_end_idx < cfg.chirp_start_idx {
            return Err(Error::Config(format!(
                "frameCfg chirp range inverted: {} > {}",
                cfg.chirp_start_idx, cfg.chirp_end_idx
            )));
        }
        Ok(cfg)
    }
}

fn raw_field<'a>(fields: &[&'a str], idx: usize) -> Result<&'a str> {
    fields.get(idx).copied().ok_or_else(|| {
        Error::Config(format!(
            "{} line too short: field {idx} missing",
            fields.first().copied().unwrap_or("config")
        ))
    })
}

fn float_field(fields: &[&str], idx: usize) -> Result<f64> {
    let raw = raw_field(fields, idx)?;
    raw.parse::<f64>()
        .map_err(|_| Error::Config(format!("{} field {idx}: invalid number {raw:?}", fields[0])))
}

fn int_field(fields: &[&str], idx: usize) -> Result<usize> {
    // The sensor tooling writes some integer fields as "256" and some as
    // "256.0"; accept both the way the reference parser did.
    let value = float_field(fields, idx)?;
    if value < 0.0 {
        return Err(Error::Config(format!(
            "{} field {idx}: expected non-negative integer, got {value}",
            fields[0]
        )));
    }
    Ok(value.trunc() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "\
% Radar configuration
sensorStop
flushCfg
profileCfg 0 77 429 7 57.14 0 0 70 1 200 5209 0 0 30
frameCfg 0 0 16 0 100 1 0
sensorStart
";

    #[test]
    fn parses_bins_from_sample() {
        let config = RadarConfig::from_str(SAMPLE, 1, 1).unwrap();
        // 200 ADC samples round up to 256 range bins.
        assert_eq!(config.num_range_bins, 256);
        // (0..=0) chirps * 16 loops / 1 TX antenna.
        assert_eq!(config.num_doppler_bins, 16);
        assert_eq!(config.frame_periodicity_ms, 100.0);
    }

    #[test]
    fn derived_resolutions_match_reference_formulas() {
        let config = RadarConfig::from_str(SAMPLE, 1, 1).unwrap();

        let expected_range_res = (3.0e8 * 5209.0 * 1e3) / (2.0 * 70.0 * 1e12 * 200.0);
        let expected_idx_to_m = (3.0e8 * 5209.0 * 1e3) / (2.0 * 70.0 * 1e12 * 256.0);
        let expected_doppler_res =
            3.0e8 / (2.0 * 77.0 * 1e9 * (429.0 + 57.14) * 1e-6 * 16.0 * 1.0);
        let expected_max_range = (300.0 * 0.9 * 5209.0) / (2.0 * 70.0 * 1e3);
        let expected_max_velocity = 3.0e8 / (4.0 * 77.0 * 1e9 * (429.0 + 57.14) * 1e-6 * 1.0);

        assert!((config.range_resolution_meters - expected_range_res).abs() < 1e-12);
        assert!((config.range_idx_to_meters - expected_idx_to_m).abs() < 1e-12);
        assert!((config.doppler_resolution_mps - expected_doppler_res).abs() < 1e-12);
        assert!((config.max_range - expected_max_range).abs() < 1e-9);
        assert!((config.max_velocity - expected_max_velocity).abs() < 1e-9);
    }

    #[test]
    fn heatmap_dims_bridge_to_protocol() {
        let config = RadarConfig::from_str(SAMPLE, 1, 1).unwrap();
        let dims = config.heatmap_dims();
        assert_eq!(dims.range_bins, 256);
        assert_eq!(dims.doppler_bins, 16);
        assert_eq!(dims.payload_len(), 256 * 16 * 2);
    }

    #[rstest]
    #[case("frameCfg 0 0 16 0 100 1 0\n", "profileCfg")]
    #[case("profileCfg 0 77 429 7 57.14 0 0 70 1 200 5209 0 0 30\n", "frameCfg")]
    fn missing_stanza_is_reported(#[case] text: &str, #[case] missing: &str) {
        let err = RadarConfig::from_str(text, 1, 1).unwrap_err();
        match err {
            Error::MissingConfig(name) => assert_eq!(name, missing),
            other => panic!("expected MissingConfig, got {other}"),
        }
    }

    #[test]
    fn short_profile_line_is_config_error() {
        let err = RadarConfig::from_str("profileCfg 0 77\nframeCfg 0 0 16 0 100 1 0\n", 1, 1)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn malformed_number_is_config_error() {
        let text = "profileCfg 0 77 429 7 57.14 0 0 seventy 1 200 5209 0 0 30\nframeCfg 0 0 16 0 100 1 0\n";
        let err = RadarConfig::from_str(text, 1, 1).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn two_tx_antennas_halve_doppler_bins() {
        let config = RadarConfig::from_str(SAMPLE, 4, 2).unwrap();
        assert_eq!(config.num_doppler_bins, 8);
    }

    #[test]
    fn comment_and_blank_lines_are_ignored() {
        let text = format!("% leading comment\n\n{SAMPLE}\n% trailing\n");
        assert!(RadarConfig::from_str(&text, 1, 1).is_ok());
    }

    #[test]
    fn last_repeated_stanza_wins() {
        let text = format!("{SAMPLE}frameCfg 0 0 32 0 50 1 0\n");
        let config = RadarConfig::from_str(&text, 1, 1).unwrap();
        assert_eq!(config.num_doppler_bins, 32);
        assert_eq!(config.frame_periodicity_ms, 50.0);
    }
}
