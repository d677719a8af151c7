use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::contacts::{
    contact_probability_matrix, contacts_over_time as contacts_series, AccumulationPolicy,
    ContactConfig,
};
use crate::msd::{compute_msd as compute_msd_result, MsdConfig};
use crate::structure::Trajectory;
use crate::trajectory::{CoordinateLayout, PdbTrajectory, TrajectoryReader};

fn parse_layout(layout: &str) -> PyResult<CoordinateLayout> {
    match layout {
        "columns" => Ok(CoordinateLayout::FixedColumns),
        "tokens" => Ok(CoordinateLayout::Whitespace),
        other => Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Unknown layout {:?}, expected \"columns\" or \"tokens\"",
            other
        ))),
    }
}

fn parse_policy(policy: &str) -> PyResult<AccumulationPolicy> {
    match policy {
        "weighted" => Ok(AccumulationPolicy::Weighted),
        "raw" => Ok(AccumulationPolicy::Raw),
        other => Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Unknown policy {:?}, expected \"weighted\" or \"raw\"",
            other
        ))),
    }
}

fn read_trajectory(
    trajectory_file: &str,
    layout: &str,
    max_frames: Option<usize>,
) -> PyResult<Trajectory> {
    let layout = parse_layout(layout)?;
    PdbTrajectory::new(trajectory_file)
        .read_frames(layout, max_frames)
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyIOError, _>(format!(
                "Failed to read trajectory: {}",
                e
            ))
        })
}

/// Python binding for the contacts-over-time analysis
#[pyfunction]
#[pyo3(signature = (trajectory_file, atoms_per_molecule, cutoff=8.2, layout="tokens", max_frames=None))]
fn contacts_over_time(
    py: Python<'_>,
    trajectory_file: &str,
    atoms_per_molecule: usize,
    cutoff: f64,
    layout: &str,
    max_frames: Option<usize>,
) -> PyResult<PyObject> {
    let config = ContactConfig::new(atoms_per_molecule, cutoff)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
    let trajectory = read_trajectory(trajectory_file, layout, max_frames)?;

    let results = contacts_series(&trajectory, &config);

    // Convert results to Python list of dicts
    let py_results = PyList::empty_bound(py);
    for result in results {
        let py_dict = PyDict::new_bound(py);
        py_dict.set_item("frame", result.frame)?;
        py_dict.set_item("contacts", result.contacts)?;
        py_results.append(py_dict)?;
    }

    Ok(py_results.into())
}

/// Python binding for the contact-probability matrix
#[pyfunction]
#[pyo3(signature = (trajectory_file, atoms_per_molecule, cutoff=8.2, policy="weighted", layout="tokens", max_frames=None))]
fn probability_matrix(
    py: Python<'_>,
    trajectory_file: &str,
    atoms_per_molecule: usize,
    cutoff: f64,
    policy: &str,
    layout: &str,
    max_frames: Option<usize>,
) -> PyResult<PyObject> {
    let config = ContactConfig::new(atoms_per_molecule, cutoff)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
    let policy = parse_policy(policy)?;
    let trajectory = read_trajectory(trajectory_file, layout, max_frames)?;

    let matrix = contact_probability_matrix(&trajectory, &config, policy);

    // Convert the matrix to a list of row lists
    let py_matrix = PyList::empty_bound(py);
    for row in matrix.rows() {
        let py_row = PyList::empty_bound(py);
        for value in row {
            py_row.append(*value)?;
        }
        py_matrix.append(py_row)?;
    }

    Ok(py_matrix.into())
}

/// Python binding for the MSD analysis
#[pyfunction]
#[pyo3(signature = (trajectory_file, box_length=500.0, layout="columns", max_frames=None))]
fn compute_msd(
    py: Python<'_>,
    trajectory_file: &str,
    box_length: f64,
    layout: &str,
    max_frames: Option<usize>,
) -> PyResult<PyObject> {
    let config = MsdConfig::new(box_length)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
    let trajectory = read_trajectory(trajectory_file, layout, max_frames)?;

    let result = compute_msd_result(&trajectory, &config);

    // Convert the per-lag series to a Python list of dicts
    let py_series = PyList::empty_bound(py);
    for point in result.series {
        let py_dict = PyDict::new_bound(py);
        py_dict.set_item("lag", point.lag)?;
        py_dict.set_item("mean", point.mean)?;
        py_dict.set_item("error", point.error)?;
        py_series.append(py_dict)?;
    }

    Ok(py_series.into())
}

/// Python module definition
#[pymodule]
fn condensate_analysis_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(contacts_over_time, m)?)?;
    m.add_function(wrap_pyfunction!(probability_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(compute_msd, m)?)?;
    m.add(
        "__doc__",
        "Condensate trajectory analysis Rust library with Python bindings",
    )?;
    Ok(())
}
