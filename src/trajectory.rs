use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::structure::{Coordinate, Frame, Trajectory};

/// How coordinate fields are extracted from an ATOM record.
///
/// Both layouts occur in the wild: classic PDB writers emit fixed-width
/// columns, while coarse-grained tooling often pads fields so that plain
/// whitespace splitting works. The layout is declared up front, not guessed
/// per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateLayout {
    /// x, y, z from byte columns 30..38, 38..46, 46..54.
    FixedColumns,
    /// x, y, z from whitespace-separated tokens 6, 7, 8.
    Whitespace,
}

impl CoordinateLayout {
    /// Extract the coordinate from one ATOM record. `None` means the record
    /// is malformed under this layout.
    fn extract(&self, line: &str) -> Option<Coordinate> {
        match self {
            CoordinateLayout::FixedColumns => {
                let x = line.get(30..38)?.trim().parse::<f64>().ok()?;
                let y = line.get(38..46)?.trim().parse::<f64>().ok()?;
                let z = line.get(46..54)?.trim().parse::<f64>().ok()?;
                Some(Coordinate::new(x, y, z))
            }
            CoordinateLayout::Whitespace => {
                let parts: Vec<&str> = line.split_whitespace().collect();
                let x = parts.get(6)?.parse::<f64>().ok()?;
                let y = parts.get(7)?.parse::<f64>().ok()?;
                let z = parts.get(8)?.parse::<f64>().ok()?;
                Some(Coordinate::new(x, y, z))
            }
        }
    }
}

/// Parse a frame-delimited coordinate stream.
///
/// ATOM records accumulate into the current frame; a record starting with
/// END (which also matches ENDMDL) seals it. A malformed ATOM record aborts
/// the parse with the offending line number — records are never silently
/// skipped. Atoms left unterminated at end of stream are sealed as a final
/// frame; terminators with no accumulated atoms do not produce empty frames.
pub fn parse_frames<R: BufRead>(
    reader: R,
    layout: CoordinateLayout,
    max_frames: Option<usize>,
) -> Result<Trajectory> {
    let mut frames: Vec<Frame> = Vec::new();
    let mut current: Frame = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;

        if line.starts_with("ATOM") {
            let coord = layout
                .extract(&line)
                .ok_or_else(|| AnalysisError::MalformedRecord {
                    line: idx + 1,
                    content: line.clone(),
                })?;
            current.push(coord);
        } else if line.starts_with("END") {
            if !current.is_empty() {
                frames.push(mem::take(&mut current));
                if let Some(max) = max_frames {
                    if frames.len() >= max {
                        break;
                    }
                }
            }
        }
    }

    // Seal a trailing frame when the stream ends without a terminator.
    if !current.is_empty() {
        frames.push(current);
    }

    Trajectory::from_frames(frames)
}

/// Trait for reading trajectory files into memory
pub trait TrajectoryReader {
    /// Read and seal the full frame sequence.
    ///
    /// # Arguments
    /// * `layout` - Coordinate extraction layout declared for this file
    /// * `max_frames` - Maximum number of frames to read (None for all frames)
    fn read_frames(
        &self,
        layout: CoordinateLayout,
        max_frames: Option<usize>,
    ) -> Result<Trajectory>;
}

/// PDB-file-backed implementation of [`TrajectoryReader`]
pub struct PdbTrajectory {
    file_path: PathBuf,
}

impl PdbTrajectory {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Sibling output path `<stem><suffix>`, next to the trajectory file.
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        let base_name = self
            .file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("trajectory");
        let dir = self.file_path.parent().unwrap_or(Path::new("."));
        dir.join(format!("{}{}", base_name, suffix))
    }
}

impl TrajectoryReader for PdbTrajectory {
    fn read_frames(
        &self,
        layout: CoordinateLayout,
        max_frames: Option<usize>,
    ) -> Result<Trajectory> {
        let file = File::open(&self.file_path).map_err(|e| AnalysisError::OpenFile {
            path: self.file_path.clone(),
            source: e,
        })?;
        parse_frames(BufReader::new(file), layout, max_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn token_atom(x: f64, y: f64, z: f64) -> String {
        // Tokens 6, 7, 8 carry the coordinates.
        format!("ATOM 1 CA ALA A 1 {} {} {}", x, y, z)
    }

    fn column_atom(x: f64, y: f64, z: f64) -> String {
        // "ATOM" plus padding puts x exactly at byte column 30.
        format!("ATOM{:26}{:>8.3}{:>8.3}{:>8.3}", "", x, y, z)
    }

    #[test]
    fn test_round_trip_token_layout() {
        let mut input = String::new();
        for frame in 0..3 {
            for atom in 0..2 {
                input.push_str(&token_atom(frame as f64, atom as f64, 0.0));
                input.push('\n');
            }
            input.push_str("END\n");
        }

        let traj = parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, None).unwrap();
        assert_eq!(traj.n_frames(), 3);
        assert_eq!(traj.n_atoms(), 2);
        assert_eq!(traj.frames()[2][1], Coordinate::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_fixed_column_layout() {
        let input = format!("{}\n{}\nEND\n", column_atom(1.5, -2.0, 3.25), column_atom(0.0, 0.0, 0.0));
        let traj = parse_frames(Cursor::new(input), CoordinateLayout::FixedColumns, None).unwrap();
        assert_eq!(traj.n_frames(), 1);
        assert_eq!(traj.frames()[0][0], Coordinate::new(1.5, -2.0, 3.25));
    }

    #[test]
    fn test_missing_trailing_terminator_seals_final_frame() {
        let input = format!("{}\nEND\n{}\n", token_atom(0.0, 0.0, 0.0), token_atom(1.0, 0.0, 0.0));
        let traj = parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, None).unwrap();
        assert_eq!(traj.n_frames(), 2);
        assert_eq!(traj.frames()[1][0], Coordinate::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_terminator_only_frames_are_not_appended() {
        let input = format!("END\nEND\n{}\nEND\nEND\n", token_atom(1.0, 2.0, 3.0));
        let traj = parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, None).unwrap();
        assert_eq!(traj.n_frames(), 1);
    }

    #[test]
    fn test_malformed_record_fails_with_line_number() {
        let input = format!(
            "{}\nATOM 1 CA ALA A 1 not-a-number 0.0 0.0\nEND\n",
            token_atom(0.0, 0.0, 0.0)
        );
        match parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, None) {
            Err(AnalysisError::MalformedRecord { line, content }) => {
                assert_eq!(line, 2);
                assert!(content.contains("not-a-number"));
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_short_line_is_malformed_under_fixed_columns() {
        let input = "ATOM too short\nEND\n";
        assert!(matches!(
            parse_frames(Cursor::new(input), CoordinateLayout::FixedColumns, None),
            Err(AnalysisError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_frame_length_mismatch_is_fatal() {
        let input = format!(
            "{a}\n{a}\nEND\n{a}\nEND\n",
            a = token_atom(0.0, 0.0, 0.0)
        );
        assert!(matches!(
            parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, None),
            Err(AnalysisError::FrameLengthMismatch {
                frame: 1,
                expected: 2,
                found: 1,
            })
        ));
    }

    #[test]
    fn test_max_frames_cap() {
        let mut input = String::new();
        for _ in 0..5 {
            input.push_str(&token_atom(0.0, 0.0, 0.0));
            input.push_str("\nEND\n");
        }
        let traj = parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, Some(2)).unwrap();
        assert_eq!(traj.n_frames(), 2);
    }

    #[test]
    fn test_non_record_lines_are_ignored() {
        let input = format!(
            "REMARK generated\nTITLE condensate\n{}\nTER\nEND\n",
            token_atom(4.0, 5.0, 6.0)
        );
        let traj = parse_frames(Cursor::new(input), CoordinateLayout::Whitespace, None).unwrap();
        assert_eq!(traj.n_frames(), 1);
        assert_eq!(traj.n_atoms(), 1);
    }
}
