//! Python bindings, built with the `python` feature.

use numpy::PyArray1;
use pyo3::exceptions::{PyArithmeticError, PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::attributes::Field;
use crate::config::{NetworkConfig, UpdateType};
use crate::error::HgfError;
use crate::model::{Network, NetworkBuilder};
use crate::topology::NodeKind;
use crate::trajectories::NodeTrajectories;

impl From<HgfError> for PyErr {
    fn from(err: HgfError) -> PyErr {
        match err {
            HgfError::NumericalInstability { .. } => PyArithmeticError::new_err(err.to_string()),
            HgfError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Accepts either a single int or a list of ints, so Python callers can write
/// `value_children=0` or `value_children=[0, 1]`.
fn int_or_list(ob: Option<&Bound<'_, PyAny>>) -> PyResult<Option<Vec<usize>>> {
    match ob {
        None => Ok(None),
        Some(ob) => match ob.extract::<usize>() {
            Ok(idx) => Ok(Some(vec![idx])),
            Err(_) => Ok(Some(ob.extract::<Vec<usize>>()?)),
        },
    }
}

/// Accepts a 1-D sequence (one input node, one value per trial) or a 2-D
/// sequence (one row per trial). NaN marks a missing observation.
fn observation_rows(ob: &Bound<'_, PyAny>) -> PyResult<Vec<Vec<Option<f64>>>> {
    let rows: Vec<Vec<f64>> = match ob.extract::<Vec<Vec<f64>>>() {
        Ok(rows) => rows,
        Err(_) => ob.extract::<Vec<f64>>()?.into_iter().map(|x| vec![x]).collect(),
    };
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|x| if x.is_nan() { None } else { Some(x) }).collect())
        .collect())
}

fn field_by_name(name: &str) -> PyResult<Field> {
    Field::ALL
        .iter()
        .copied()
        .find(|field| field.name() == name)
        .ok_or_else(|| PyValueError::new_err(format!("unknown attribute '{}'", name)))
}

#[pyclass(name = "Network")]
pub struct PyNetwork {
    builder: NetworkBuilder,
    network: Option<Network>,
    node_trajectories: NodeTrajectories,
}

impl PyNetwork {
    fn network(&self) -> PyResult<&Network> {
        self.network
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("call set_update_sequence() first"))
    }
}

#[pymethods]
impl PyNetwork {
    #[new]
    #[pyo3(signature = (update_type="standard", config_path=None))]
    pub fn new(update_type: &str, config_path: Option<&str>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => NetworkConfig::load(path)?,
            None => NetworkConfig::default(),
        };
        config.update_type = match update_type {
            "standard" => UpdateType::Standard,
            "ehgf" => UpdateType::Ehgf,
            other => return Err(PyValueError::new_err(format!("unknown update type '{}'", other))),
        };
        Ok(PyNetwork {
            builder: NetworkBuilder::new(config),
            network: None,
            node_trajectories: NodeTrajectories::default(),
        })
    }

    /// Add nodes to the network.
    ///
    /// # Arguments
    /// * `kind` - The type of node that should be added.
    /// * `value_children` - The index(es) of the node's value children (int or list).
    /// * `volatility_children` - The index(es) of the node's volatility children (int or list).
    #[pyo3(signature = (kind="continuous-state", value_children=None, volatility_children=None))]
    pub fn add_nodes(
        &mut self,
        kind: &str,
        value_children: Option<&Bound<'_, PyAny>>,
        volatility_children: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<usize> {
        let kind: NodeKind = kind.parse()?;
        let node_idx = self
            .builder
            .add_nodes(kind, int_or_list(value_children)?, int_or_list(volatility_children)?)?;
        self.network = None;
        Ok(node_idx)
    }

    pub fn set_attribute(&mut self, node_idx: usize, name: &str, value: f64) -> PyResult<()> {
        self.builder.set_attribute(node_idx, field_by_name(name)?, value)?;
        self.network = None;
        Ok(())
    }

    pub fn set_update_sequence(&mut self) -> PyResult<()> {
        self.network = Some(self.builder.clone().build()?);
        Ok(())
    }

    /// Add a sequence of observations.
    ///
    /// # Arguments
    /// * `input_data` - One value per trial, or one row of input values per trial.
    /// * `time_steps` - An optional vector of time steps of the same length as `input_data`.
    #[pyo3(signature = (input_data, time_steps=None))]
    pub fn input_data(&mut self, input_data: &Bound<'_, PyAny>, time_steps: Option<Vec<f64>>) -> PyResult<()> {
        if self.network.is_none() {
            self.set_update_sequence()?;
        }
        let rows = observation_rows(input_data)?;
        let network = self
            .network
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("network was not built"))?;
        self.node_trajectories = network.input_data_masked(&rows, time_steps.as_deref())?;
        Ok(())
    }

    #[getter]
    pub fn get_node_trajectories<'py>(&self, py: Python<'py>) -> PyResult<Py<PyList>> {
        let py_list = PyList::empty(py);
        let n_nodes = self.node_trajectories.last().map_or(0, |store| store.len());
        for node_idx in 0..n_nodes {
            let py_dict = PyDict::new(py);
            for field in Field::ALL {
                let values = self.node_trajectories.field(node_idx, field).unwrap_or_default();
                py_dict.set_item(field.name(), PyArray1::from_vec(py, values))?;
            }
            py_list.append(py_dict)?;
        }
        Ok(py_list.unbind())
    }

    #[getter]
    pub fn get_attributes<'py>(&self, py: Python<'py>) -> PyResult<Py<PyList>> {
        let py_list = PyList::empty(py);
        for node in self.network()?.attributes().iter() {
            let py_dict = PyDict::new(py);
            for field in Field::ALL {
                py_dict.set_item(field.name(), node.get(field))?;
            }
            py_list.append(py_dict)?;
        }
        Ok(py_list.unbind())
    }

    #[getter]
    pub fn get_inputs<'py>(&self, py: Python<'py>) -> PyResult<Py<PyList>> {
        let py_list = PyList::new(py, self.network()?.inputs())?;
        Ok(py_list.unbind())
    }

    #[getter]
    pub fn get_edges<'py>(&self, py: Python<'py>) -> PyResult<Py<PyList>> {
        let topology = self.network()?.topology();
        let py_list = PyList::empty(py);
        for node_idx in 0..topology.len() {
            let edges = topology.edges(node_idx);
            let py_dict = PyDict::new(py);
            py_dict.set_item("node_type", edges.node_type.name())?;
            py_dict.set_item("value_parents", &edges.value_parents)?;
            py_dict.set_item("value_children", &edges.value_children)?;
            py_dict.set_item("volatility_parents", &edges.volatility_parents)?;
            py_dict.set_item("volatility_children", &edges.volatility_children)?;
            py_list.append(py_dict)?;
        }
        Ok(py_list.unbind())
    }

    #[getter]
    pub fn get_update_sequence<'py>(&self, py: Python<'py>) -> PyResult<Py<PyList>> {
        let py_list = PyList::new(py, self.network()?.update_sequence().describe())?;
        Ok(py_list.unbind())
    }
}

// Create a module to expose the class to Python
#[pymodule]
fn rshgf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyNetwork>()?;
    Ok(())
}
