use crate::error::{AnalysisError, Result};

/// 3D coordinate vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate Euclidean distance to another coordinate
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Squared displacement to an earlier position of the same atom, with
    /// minimum-image correction on each axis of a cubic box of edge
    /// `box_length`. A per-axis difference larger than half the box is
    /// wrapped by one box length before squaring.
    pub fn min_image_sq_displacement(&self, earlier: &Coordinate, box_length: f64) -> f64 {
        let half = box_length / 2.0;
        let mut total = 0.0;
        for delta in [
            self.x - earlier.x,
            self.y - earlier.y,
            self.z - earlier.z,
        ] {
            let corrected = if delta > half {
                delta - box_length
            } else if delta < -half {
                delta + box_length
            } else {
                delta
            };
            total += corrected * corrected;
        }
        total
    }
}

/// One simulation snapshot: atom positions in file order. Index k refers to
/// the same physical atom in every frame of a trajectory.
pub type Frame = Vec<Coordinate>;

/// The full ordered frame sequence. Built once by the parser, read-only
/// afterwards; every frame is guaranteed to hold the same number of atoms.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    frames: Vec<Frame>,
}

impl Trajectory {
    /// Seal a frame sequence, enforcing the uniform-length invariant that
    /// every downstream computation relies on.
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        if let Some(first) = frames.first() {
            let expected = first.len();
            for (idx, frame) in frames.iter().enumerate() {
                if frame.len() != expected {
                    return Err(AnalysisError::FrameLengthMismatch {
                        frame: idx,
                        expected,
                        found: frame.len(),
                    });
                }
            }
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Atoms per frame; 0 for an empty trajectory.
    pub fn n_atoms(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }
}
