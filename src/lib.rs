pub mod contacts;
pub mod error;
pub mod msd;
pub mod structure;
pub mod trajectory;

#[cfg(feature = "python")]
pub mod python_bindings;

// Re-export commonly used types and traits
pub use contacts::{
    contact_probability_matrix, contacts_over_time, count_molecule_contacts, distance_matrix,
    write_contacts_report, write_matrix_report, AccumulationPolicy, ContactConfig, FrameContacts,
};
pub use error::{AnalysisError, Result};
pub use msd::{compute_msd, write_msd_report, LagStats, MsdConfig, MsdPoint, MsdResult};
pub use structure::{Coordinate, Frame, Trajectory};
pub use trajectory::{parse_frames, CoordinateLayout, PdbTrajectory, TrajectoryReader};
