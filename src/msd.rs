use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::structure::Trajectory;

/// Parameters for the displacement analysis. The simulation box is cubic
/// with edge `box_length`, used for minimum-image correction.
#[derive(Debug, Clone, Copy)]
pub struct MsdConfig {
    box_length: f64,
}

impl MsdConfig {
    pub fn new(box_length: f64) -> Result<Self> {
        if !(box_length > 0.0) {
            return Err(AnalysisError::Configuration(format!(
                "box_length must be positive, got {}",
                box_length
            )));
        }
        Ok(Self { box_length })
    }

    pub fn box_length(&self) -> f64 {
        self.box_length
    }
}

/// Temporal statistics for one atom at one lag: mean of the squared
/// displacements over all valid start frames, and their standard error
/// (population standard deviation over sqrt of the sample count, so a
/// single sample has error 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagStats {
    pub mean: f64,
    pub error: f64,
}

/// Cross-atom aggregate for one lag (1-based lag index in reports).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MsdPoint {
    pub lag: usize,
    pub mean: f64,
    pub error: f64,
}

/// Output of [`compute_msd`].
#[derive(Debug, Clone, Default)]
pub struct MsdResult {
    /// Per-lag, per-atom temporal statistics: `per_atom[t - 1][k]` holds the
    /// stats for atom `k` at lag `t`. Kept so collaborators can plot the
    /// individual atom curves next to the aggregate.
    pub per_atom: Vec<Vec<LagStats>>,
    /// Cross-atom aggregate per lag, in lag order.
    pub series: Vec<MsdPoint>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_variance(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / values.len() as f64
}

/// Mean squared displacement over increasing time lags.
///
/// For every lag `t` in `1..n_frames` and every atom, the squared
/// minimum-image displacement between frames `s` and `s + t` is sampled at
/// every valid start `s`, then reduced in two levels: a temporal mean and
/// standard error per atom, followed by a cross-atom mean-of-means whose
/// error is the standard error of that population (sqrt of the variance of
/// per-atom means over the atom count) — not an average of the per-atom
/// errors.
///
/// Trajectories with fewer than two frames have no valid lag and produce an
/// empty result.
pub fn compute_msd(trajectory: &Trajectory, config: &MsdConfig) -> MsdResult {
    let n_frames = trajectory.n_frames();
    let n_atoms = trajectory.n_atoms();
    if n_frames < 2 || n_atoms == 0 {
        return MsdResult::default();
    }

    let frames = trajectory.frames();
    let mut result = MsdResult {
        per_atom: Vec::with_capacity(n_frames - 1),
        series: Vec::with_capacity(n_frames - 1),
    };

    let pb = ProgressBar::new((n_frames - 1) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} lags ({percent}%) | ETA: {eta}")
            .unwrap()
            .progress_chars("#>-")
    );

    for lag in 1..n_frames {
        let n_starts = n_frames - lag;
        let mut stats = Vec::with_capacity(n_atoms);

        for atom in 0..n_atoms {
            let mut samples = Vec::with_capacity(n_starts);
            for start in 0..n_starts {
                let sq = frames[start + lag][atom]
                    .min_image_sq_displacement(&frames[start][atom], config.box_length);
                samples.push(sq);
            }
            let sample_mean = mean(&samples);
            let error = population_variance(&samples, sample_mean).sqrt()
                / (samples.len() as f64).sqrt();
            stats.push(LagStats {
                mean: sample_mean,
                error,
            });
        }

        let atom_means: Vec<f64> = stats.iter().map(|s| s.mean).collect();
        let lag_mean = mean(&atom_means);
        let propagated_error =
            (population_variance(&atom_means, lag_mean) / n_atoms as f64).sqrt();

        result.per_atom.push(stats);
        result.series.push(MsdPoint {
            lag,
            mean: lag_mean,
            error: propagated_error,
        });
        pb.inc(1);
    }

    pb.finish_with_message("MSD computation complete");
    result
}

/// Write the MSD report: one tab-separated row per lag with the 1-based lag
/// index, mean MSD and propagated error. No header row.
pub fn write_msd_report(series: &[MsdPoint], output_path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(output_path)?;

    for point in series {
        writer.serialize(point)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Coordinate;

    fn trajectory(frames: Vec<Vec<Coordinate>>) -> Trajectory {
        Trajectory::from_frames(frames).unwrap()
    }

    #[test]
    fn test_config_rejects_non_positive_box() {
        assert!(MsdConfig::new(0.0).is_err());
        assert!(MsdConfig::new(-5.0).is_err());
        assert!(MsdConfig::new(500.0).is_ok());
    }

    #[test]
    fn test_two_frame_lag_one_is_the_single_sample() {
        let traj = trajectory(vec![
            vec![Coordinate::new(0.0, 0.0, 0.0)],
            vec![Coordinate::new(2.0, 0.0, 0.0)],
        ]);
        let config = MsdConfig::new(500.0).unwrap();
        let result = compute_msd(&traj, &config);

        assert_eq!(result.series.len(), 1);
        assert_eq!(result.per_atom[0][0], LagStats { mean: 4.0, error: 0.0 });
        assert_eq!(result.series[0].lag, 1);
        assert_eq!(result.series[0].mean, 4.0);
        // One atom: the cross-atom variance is zero.
        assert_eq!(result.series[0].error, 0.0);
    }

    #[test]
    fn test_three_frame_two_atom_scenario() {
        // Atom 0 moves 0 -> 1 -> 3 along x, atom 1 stays put; the box is far
        // too large for any wrap to trigger.
        let traj = trajectory(vec![
            vec![Coordinate::new(0.0, 0.0, 0.0), Coordinate::new(0.0, 0.0, 0.0)],
            vec![Coordinate::new(1.0, 0.0, 0.0), Coordinate::new(0.0, 0.0, 0.0)],
            vec![Coordinate::new(3.0, 0.0, 0.0), Coordinate::new(0.0, 0.0, 0.0)],
        ]);
        let config = MsdConfig::new(500.0).unwrap();
        let result = compute_msd(&traj, &config);

        assert_eq!(result.series.len(), 2);

        // Lag 1, atom 0: squared displacements 1 and 4 over starts {0, 1}.
        let lag1_atom0 = result.per_atom[0][0];
        assert_eq!(lag1_atom0.mean, 2.5);
        // Population std of {1, 4} is 1.5, over sqrt(2) samples.
        assert!((lag1_atom0.error - 1.5 / 2f64.sqrt()).abs() < 1e-12);

        // Lag 2, atom 0: single sample, squared displacement 9, error 0.
        assert_eq!(result.per_atom[1][0], LagStats { mean: 9.0, error: 0.0 });

        // Cross-atom aggregate at lag 1: means {2.5, 0.0}.
        assert_eq!(result.series[0].mean, 1.25);
        let expected_error = (1.5625f64 / 2.0).sqrt();
        assert!((result.series[0].error - expected_error).abs() < 1e-12);
    }

    #[test]
    fn test_propagated_error_is_not_mean_of_atom_errors() {
        // Both atoms have scattered temporal samples (non-zero per-atom
        // errors) but identical means, so the propagated cross-atom error
        // must be exactly zero.
        let traj = trajectory(vec![
            vec![Coordinate::new(0.0, 0.0, 0.0), Coordinate::new(10.0, 0.0, 0.0)],
            vec![Coordinate::new(1.0, 0.0, 0.0), Coordinate::new(11.0, 0.0, 0.0)],
            vec![Coordinate::new(3.0, 0.0, 0.0), Coordinate::new(13.0, 0.0, 0.0)],
        ]);
        let config = MsdConfig::new(500.0).unwrap();
        let result = compute_msd(&traj, &config);

        assert!(result.per_atom[0][0].error > 0.0);
        assert!(result.per_atom[0][1].error > 0.0);
        assert_eq!(result.series[0].error, 0.0);
    }

    #[test]
    fn test_wrap_correction_applies_per_axis() {
        // A jump from 0 to 3.5 in a box of 4 is really a jump of -0.5.
        let traj = trajectory(vec![
            vec![Coordinate::new(0.0, 0.0, 0.0)],
            vec![Coordinate::new(3.5, 0.0, 0.0)],
        ]);
        let config = MsdConfig::new(4.0).unwrap();
        let result = compute_msd(&traj, &config);
        assert!((result.series[0].mean - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_single_frame_trajectory_yields_empty_series() {
        let traj = trajectory(vec![vec![Coordinate::new(0.0, 0.0, 0.0)]]);
        let config = MsdConfig::new(500.0).unwrap();
        let result = compute_msd(&traj, &config);
        assert!(result.series.is_empty());
        assert!(result.per_atom.is_empty());
    }

    #[test]
    fn test_empty_trajectory_yields_empty_series() {
        let traj = trajectory(Vec::new());
        let config = MsdConfig::new(500.0).unwrap();
        assert!(compute_msd(&traj, &config).series.is_empty());
    }

    #[test]
    fn test_write_msd_report_format() {
        let series = vec![
            MsdPoint { lag: 1, mean: 2.5, error: 0.5 },
            MsdPoint { lag: 2, mean: 9.0, error: 0.0 },
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msd.txt");
        write_msd_report(&series, &path).unwrap();

        // The csv serializer renders floats with an explicit fraction.
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "1\t2.5\t0.5\n2\t9.0\t0.0\n");
    }
}
