use clap::{Parser, Subcommand, ValueEnum};
use condensate_analysis_rs::{
    compute_msd, contact_probability_matrix, contacts_over_time, write_contacts_report,
    write_matrix_report, write_msd_report, AccumulationPolicy, AnalysisError, ContactConfig,
    CoordinateLayout, MsdConfig, PdbTrajectory, Trajectory, TrajectoryReader,
};
use std::path::PathBuf;

/// Command-line tool for analyzing condensate trajectories
#[derive(Parser)]
#[command(name = "condensate-analysis")]
#[command(about = "Contact and diffusion analysis of PDB trajectories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Coordinate extraction layout for ATOM records
#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Fixed byte columns 30..54 (classic PDB writers)
    Columns,
    /// Whitespace tokens 6..8 (coarse-grained tooling)
    Tokens,
}

impl From<LayoutArg> for CoordinateLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Columns => CoordinateLayout::FixedColumns,
            LayoutArg::Tokens => CoordinateLayout::Whitespace,
        }
    }
}

/// Atom-pair accumulation policy for the probability matrix
#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Outer product of contact-mask row and column sums
    Weighted,
    /// Raw boolean contact mask
    Raw,
}

impl From<PolicyArg> for AccumulationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Weighted => AccumulationPolicy::Weighted,
            PolicyArg::Raw => AccumulationPolicy::Raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count molecule pairs in contact for every frame
    Contacts {
        /// Path to the PDB trajectory file
        #[arg(short, long)]
        trajectory: PathBuf,

        /// Atoms per molecule block
        #[arg(short, long)]
        atoms_per_molecule: usize,

        /// Contact distance cutoff in the coordinate units (default: 8.2)
        #[arg(long, default_value_t = 8.2)]
        cutoff: f64,

        /// Coordinate extraction layout (default: tokens)
        #[arg(long, value_enum, default_value = "tokens")]
        layout: LayoutArg,

        /// Maximum number of frames to process (default: all frames)
        #[arg(long)]
        max_frames: Option<usize>,

        /// Output path (default: auto-generated from trajectory path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Accumulate the atom-pair contact-probability matrix
    Matrix {
        /// Path to the PDB trajectory file
        #[arg(short, long)]
        trajectory: PathBuf,

        /// Atoms per molecule block
        #[arg(short, long)]
        atoms_per_molecule: usize,

        /// Contact distance cutoff in the coordinate units (default: 8.2)
        #[arg(long, default_value_t = 8.2)]
        cutoff: f64,

        /// Accumulation policy (default: weighted)
        #[arg(long, value_enum, default_value = "weighted")]
        policy: PolicyArg,

        /// Coordinate extraction layout (default: tokens)
        #[arg(long, value_enum, default_value = "tokens")]
        layout: LayoutArg,

        /// Maximum number of frames to process (default: all frames)
        #[arg(long)]
        max_frames: Option<usize>,

        /// Output path (default: auto-generated from trajectory path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mean squared displacement over increasing time lags
    Msd {
        /// Path to the PDB trajectory file
        #[arg(short, long)]
        trajectory: PathBuf,

        /// Cubic box edge length for minimum-image correction (default: 500)
        #[arg(short, long, default_value_t = 500.0)]
        box_length: f64,

        /// Coordinate extraction layout (default: columns)
        #[arg(long, value_enum, default_value = "columns")]
        layout: LayoutArg,

        /// Maximum number of frames to process (default: all frames)
        #[arg(long)]
        max_frames: Option<usize>,

        /// Output path (default: auto-generated from trajectory path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_trajectory(
    reader: &PdbTrajectory,
    layout: LayoutArg,
    max_frames: Option<usize>,
) -> Trajectory {
    match reader.read_frames(layout.into(), max_frames) {
        Ok(traj) if traj.n_frames() == 0 => {
            eprintln!("❌ Error reading trajectory: {}", AnalysisError::EmptyTrajectory);
            std::process::exit(1);
        }
        Ok(traj) => {
            println!("✅ Loaded {} frames of {} atoms", traj.n_frames(), traj.n_atoms());
            traj
        }
        Err(e) => {
            eprintln!("❌ Error reading trajectory: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Contacts {
            trajectory,
            atoms_per_molecule,
            cutoff,
            layout,
            max_frames,
            output,
        } => {
            println!("Reading trajectory: {:?}", trajectory);
            println!("Atoms per molecule: {}", atoms_per_molecule);
            println!("Cutoff: {}", cutoff);

            let config = match ContactConfig::new(atoms_per_molecule, cutoff) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };

            let reader = PdbTrajectory::new(&trajectory);
            let traj = load_trajectory(&reader, layout, max_frames);

            let results = contacts_over_time(&traj, &config);
            let output_path = output.unwrap_or_else(|| reader.output_path("_contacts.txt"));

            match write_contacts_report(&results, &output_path) {
                Ok(()) => println!("📄 Contacts report saved to: {:?}", output_path),
                Err(e) => {
                    eprintln!("❌ Error writing report: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Matrix {
            trajectory,
            atoms_per_molecule,
            cutoff,
            policy,
            layout,
            max_frames,
            output,
        } => {
            println!("Reading trajectory: {:?}", trajectory);
            println!("Atoms per molecule: {}", atoms_per_molecule);
            println!("Cutoff: {}", cutoff);

            let config = match ContactConfig::new(atoms_per_molecule, cutoff) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };

            let reader = PdbTrajectory::new(&trajectory);
            let traj = load_trajectory(&reader, layout, max_frames);

            let matrix = contact_probability_matrix(&traj, &config, policy.into());
            println!("✅ Accumulated {}x{} probability matrix", matrix.nrows(), matrix.ncols());

            let output_path = output.unwrap_or_else(|| reader.output_path("_matrix.txt"));
            match write_matrix_report(&matrix, &output_path) {
                Ok(()) => println!("📄 Matrix saved to: {:?}", output_path),
                Err(e) => {
                    eprintln!("❌ Error writing matrix: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Msd {
            trajectory,
            box_length,
            layout,
            max_frames,
            output,
        } => {
            println!("Reading trajectory: {:?}", trajectory);
            println!("Box length: {}", box_length);

            let config = match MsdConfig::new(box_length) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };

            let reader = PdbTrajectory::new(&trajectory);
            let traj = load_trajectory(&reader, layout, max_frames);

            let result = compute_msd(&traj, &config);
            println!("✅ Computed MSD over {} lags", result.series.len());

            let output_path = output.unwrap_or_else(|| reader.output_path("_msd.txt"));
            match write_msd_report(&result.series, &output_path) {
                Ok(()) => println!("📄 MSD report saved to: {:?}", output_path),
                Err(e) => {
                    eprintln!("❌ Error writing report: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
