use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, Axis};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::structure::{Coordinate, Trajectory};

/// Parameters for the pairwise contact analyses.
///
/// Frames are partitioned into contiguous molecule blocks of
/// `atoms_per_molecule` atoms; trailing atoms that do not fill a whole block
/// are dropped. Two molecules are in contact when any inter-block atom
/// distance falls below `cutoff`.
#[derive(Debug, Clone, Copy)]
pub struct ContactConfig {
    atoms_per_molecule: usize,
    cutoff: f64,
}

impl ContactConfig {
    pub fn new(atoms_per_molecule: usize, cutoff: f64) -> Result<Self> {
        if atoms_per_molecule == 0 {
            return Err(AnalysisError::Configuration(
                "atoms_per_molecule must be at least 1".to_string(),
            ));
        }
        if !(cutoff > 0.0) {
            return Err(AnalysisError::Configuration(format!(
                "cutoff must be positive, got {}",
                cutoff
            )));
        }
        Ok(Self {
            atoms_per_molecule,
            cutoff,
        })
    }

    pub fn atoms_per_molecule(&self) -> usize {
        self.atoms_per_molecule
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

/// How atom-pair contacts accumulate into the probability matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationPolicy {
    /// Outer product of the contact mask's row sums and column sums: atom
    /// pairs that each participate in many simultaneous contacts are
    /// amplified.
    Weighted,
    /// The boolean contact mask itself: every contacting pair counts 1.
    Raw,
}

/// Per-frame contact count, 1-based frame index as reported.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrameContacts {
    pub frame: usize,
    pub contacts: usize,
}

/// Full a×b Euclidean distance matrix between two point sets. The O(a·b)
/// primitive shared by contact counting and probability accumulation.
pub fn distance_matrix(a: &[Coordinate], b: &[Coordinate]) -> Array2<f64> {
    let mut matrix = Array2::zeros((a.len(), b.len()));
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            matrix[[i, j]] = ca.distance_to(cb);
        }
    }
    matrix
}

fn molecule_block<'a>(frame: &'a [Coordinate], index: usize, size: usize) -> &'a [Coordinate] {
    &frame[index * size..(index + 1) * size]
}

/// Count molecule pairs in contact within one frame.
///
/// Iterates the upper-triangular pair range (i < j) so each unordered pair
/// is tested exactly once; self-pairs are excluded.
pub fn count_molecule_contacts(frame: &[Coordinate], config: &ContactConfig) -> usize {
    let size = config.atoms_per_molecule;
    let n_molecules = frame.len() / size;
    let mut count = 0;

    for i in 0..n_molecules {
        for j in (i + 1)..n_molecules {
            let distances = distance_matrix(
                molecule_block(frame, i, size),
                molecule_block(frame, j, size),
            );
            if distances.iter().any(|&d| d < config.cutoff) {
                count += 1;
            }
        }
    }

    count
}

/// Per-frame contact counts over the whole trajectory, in frame order.
/// An empty trajectory yields an empty series.
pub fn contacts_over_time(trajectory: &Trajectory, config: &ContactConfig) -> Vec<FrameContacts> {
    let pb = frame_progress_bar(trajectory.n_frames());

    let mut results = Vec::with_capacity(trajectory.n_frames());
    for (idx, frame) in trajectory.frames().iter().enumerate() {
        results.push(FrameContacts {
            frame: idx + 1,
            contacts: count_molecule_contacts(frame, config),
        });
        pb.inc(1);
    }

    pb.finish_with_message("Contact counting complete");
    results
}

/// Accumulate one frame's atom-pair contacts into `accumulator`
/// (shape `atoms_per_molecule` × `atoms_per_molecule`).
///
/// Every ordered pair of distinct molecules contributes its boolean contact
/// mask, weighted per the chosen policy.
pub fn accumulate_frame_contacts(
    frame: &[Coordinate],
    config: &ContactConfig,
    policy: AccumulationPolicy,
    accumulator: &mut Array2<f64>,
) {
    let size = config.atoms_per_molecule;
    let n_molecules = frame.len() / size;

    for i in 0..n_molecules {
        for j in 0..n_molecules {
            if i == j {
                continue;
            }
            let distances = distance_matrix(
                molecule_block(frame, i, size),
                molecule_block(frame, j, size),
            );
            let mask = distances.mapv(|d| if d < config.cutoff { 1.0 } else { 0.0 });

            match policy {
                AccumulationPolicy::Weighted => {
                    let row_sums = mask.sum_axis(Axis(1)).insert_axis(Axis(1));
                    let col_sums = mask.sum_axis(Axis(0)).insert_axis(Axis(0));
                    *accumulator += &row_sums.dot(&col_sums);
                }
                AccumulationPolicy::Raw => {
                    *accumulator += &mask;
                }
            }
        }
    }
}

/// Normalize an accumulated contact matrix into a probability distribution.
/// A zero-mass accumulation comes back unchanged rather than dividing by
/// zero.
pub fn normalize_matrix(matrix: Array2<f64>) -> Array2<f64> {
    let total = matrix.sum();
    if total > 0.0 {
        matrix / total
    } else {
        matrix
    }
}

/// Atom-pair contact-probability matrix over the whole trajectory: entries
/// sum to 1 unless no contact was ever observed, in which case the matrix is
/// all zeros.
pub fn contact_probability_matrix(
    trajectory: &Trajectory,
    config: &ContactConfig,
    policy: AccumulationPolicy,
) -> Array2<f64> {
    let size = config.atoms_per_molecule;
    let mut accumulator = Array2::zeros((size, size));

    let pb = frame_progress_bar(trajectory.n_frames());
    for frame in trajectory.frames() {
        accumulate_frame_contacts(frame, config, policy, &mut accumulator);
        pb.inc(1);
    }
    pb.finish_with_message("Matrix accumulation complete");

    normalize_matrix(accumulator)
}

fn frame_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} frames ({percent}%) | ETA: {eta}")
            .unwrap()
            .progress_chars("#>-")
    );
    pb
}

/// Write the contact-over-time report: `Frame\tContacts` header, one row per
/// frame with its 1-based index and contact count.
pub fn write_contacts_report(results: &[FrameContacts], output_path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(output_path)?;

    writer.write_record(["Frame", "Contacts"])?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the probability matrix as rows of tab-separated values.
pub fn write_matrix_report(matrix: &Array2<f64>, output_path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(output_path)?;

    for row in matrix.rows() {
        let record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}
