use forage_core::agent::{Action, ACTION_SIZE, OBSERVATION_SIZE};
use forage_core::env::EnvError;
use forage_core::policy::SeekPolicy;
use forage_core::{ForageConfig, ForageEnv};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn env_err(e: EnvError) -> PyErr {
    match e {
        EnvError::Spawn(_) => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

/// Headless foraging environment for Python training loops.
#[pyclass(name = "ForageEnv")]
struct PyForageEnv {
    inner: ForageEnv,
}

#[pymethods]
impl PyForageEnv {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => ForageConfig::from_json_str(json)
                .map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => ForageConfig::default(),
        };
        let inner = ForageEnv::try_new(config).map_err(env_err)?;
        Ok(Self { inner })
    }

    /// Begins a new episode and returns one observation per agent.
    fn reset(&mut self) -> PyResult<Vec<Vec<f32>>> {
        let observations = self.inner.begin_episode().map_err(env_err)?;
        Ok(observations.iter().map(|o| o.to_vec()).collect())
    }

    /// Advances one fixed step. Returns `(observations, rewards, done)`.
    fn step(&mut self, actions: Vec<Vec<f32>>) -> PyResult<(Vec<Vec<f32>>, Vec<f32>, bool)> {
        let actions = actions
            .iter()
            .map(|a| Action::try_from_slice(a))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let outcome = self.inner.on_fixed_step(&actions).map_err(env_err)?;
        let observations = outcome.observations.iter().map(|o| o.to_vec()).collect();
        Ok((observations, outcome.rewards, outcome.done))
    }

    fn observe(&self) -> Vec<Vec<f32>> {
        self.inner
            .observe_all()
            .iter()
            .map(|o| o.to_vec())
            .collect()
    }

    fn amount_obtained(&self, agent: usize) -> PyResult<f64> {
        let agent = self.inner.agent(agent).map_err(env_err)?;
        Ok(agent.episode_amount_obtained())
    }

    #[getter]
    fn num_agents(&self) -> usize {
        self.inner.agents().len()
    }

    #[getter]
    fn observation_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    #[getter]
    fn action_size(&self) -> usize {
        ACTION_SIZE
    }

    /// Runs the scripted seek baseline and returns the summary as JSON.
    #[pyo3(signature = (episodes, max_episode_steps, sample_every=100))]
    fn run_baseline_json(
        &mut self,
        episodes: usize,
        max_episode_steps: usize,
        sample_every: usize,
    ) -> PyResult<String> {
        let summary = self
            .inner
            .run_experiment(
                episodes,
                max_episode_steps,
                sample_every,
                &mut SeekPolicy::default(),
            )
            .map_err(env_err)?;
        serde_json::to_string(&summary)
            .map_err(|e| PyRuntimeError::new_err(format!("failed to serialize summary: {e}")))
    }
}

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&ForageConfig::default())
        .map_err(|e| PyRuntimeError::new_err(format!("failed to serialize config: {e}")))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_class::<PyForageEnv>()?;
    m.add("OBSERVATION_SIZE", OBSERVATION_SIZE)?;
    m.add("ACTION_SIZE", ACTION_SIZE)?;
    Ok(())
}
