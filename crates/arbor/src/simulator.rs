//! Time stepping on top of forward dynamics.
//!
//! Positions are always advanced through the configuration manifold
//! (`integrate`), so quaternions and (cos, sin) pairs stay on their
//! manifolds without an explicit renormalization pass.

use arbor_math::DVec;
use arbor_model::{Data, Model, Result};
use arbor_rigid::{forward_dynamics, forward_kinematics, integrate, neutral};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Errors raised while loading a [`SimulatorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse simulator config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),
}

/// Simulation state: configuration, velocity, applied torques and time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct State {
    pub q: DVec,
    pub v: DVec,
    pub tau: DVec,
    pub time: f64,
}

impl State {
    /// Neutral configuration at rest, no torques, time 0.
    pub fn new(model: &Model) -> Self {
        Self {
            q: neutral(model),
            v: DVec::zeros(model.nv),
            tau: DVec::zeros(model.nv),
            time: 0.0,
        }
    }
}

/// Time integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Velocity first, then position with the new velocity.
    #[default]
    SemiImplicitEuler,
    /// Classical 4th-order Runge-Kutta.
    Rk4,
}

/// Simulator settings, loadable from JSON.
///
/// ```json
/// { "dt": 0.0005, "integrator": "rk4" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Timestep in seconds.
    pub dt: f64,
    pub integrator: Integrator,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            integrator: Integrator::SemiImplicitEuler,
        }
    }
}

impl SimulatorConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.dt > 0.0 && self.dt.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::InvalidTimestep(self.dt))
        }
    }
}

/// Pluggable solver trait.
///
/// Implementations define how to advance the state by one timestep `dt`.
pub trait Solver {
    fn step(&self, model: &Model, data: &mut Data, state: &mut State, dt: f64) -> Result<()>;
}

/// Semi-implicit Euler integrator using ABA.
pub struct SemiImplicitEulerSolver;

impl Solver for SemiImplicitEulerSolver {
    fn step(&self, model: &Model, data: &mut Data, state: &mut State, dt: f64) -> Result<()> {
        let ddq = forward_dynamics(model, data, &state.q, &state.v, &state.tau)?;

        // velocity first, then position with the updated velocity
        state.v.axpy(dt, ddq, 1.0);
        state.q = integrate(model, &state.q, &(&state.v * dt))?;
        Ok(())
    }
}

/// 4th-order Runge-Kutta integrator.
///
/// Stages are taken in the tangent space of the start configuration, which
/// keeps every intermediate q on the manifold.
pub struct Rk4Solver;

impl Rk4Solver {
    /// Derivatives at the stage reached by moving `h * (dq, dv)` from `state`.
    fn derivatives(
        model: &Model,
        data: &mut Data,
        state: &State,
        dq: &DVec,
        dv: &DVec,
        h: f64,
    ) -> Result<(DVec, DVec)> {
        let q = integrate(model, &state.q, &(dq * h))?;
        let v = &state.v + dv * h;
        let ddq = forward_dynamics(model, data, &q, &v, &state.tau)?.clone();
        Ok((v, ddq))
    }
}

impl Solver for Rk4Solver {
    fn step(&self, model: &Model, data: &mut Data, state: &mut State, dt: f64) -> Result<()> {
        let zero = DVec::zeros(model.nv);

        let (dq1, dv1) = Self::derivatives(model, data, state, &zero, &zero, 0.0)?;
        let (dq2, dv2) = Self::derivatives(model, data, state, &dq1, &dv1, dt / 2.0)?;
        let (dq3, dv3) = Self::derivatives(model, data, state, &dq2, &dv2, dt / 2.0)?;
        let (dq4, dv4) = Self::derivatives(model, data, state, &dq3, &dv3, dt)?;

        let dq = (dq1 + dq2 * 2.0 + dq3 * 2.0 + dq4) * (dt / 6.0);
        let dv = (dv1 + dv2 * 2.0 + dv3 * 2.0 + dv4) * (dt / 6.0);
        state.q = integrate(model, &state.q, &dq)?;
        state.v += dv;
        Ok(())
    }
}

/// Main simulation driver.
pub struct Simulator {
    config: SimulatorConfig,
    solver: Box<dyn Solver>,
}

impl Simulator {
    /// Create a simulator using the integrator named in `config`.
    pub fn new(config: SimulatorConfig) -> Self {
        let solver: Box<dyn Solver> = match config.integrator {
            Integrator::SemiImplicitEuler => Box::new(SemiImplicitEulerSolver),
            Integrator::Rk4 => Box::new(Rk4Solver),
        };
        debug!(dt = config.dt, integrator = ?config.integrator, "simulator created");
        Self { config, solver }
    }

    /// Create a simulator with the RK4 solver and timestep `dt`.
    pub fn rk4(dt: f64) -> Self {
        Self::new(SimulatorConfig {
            dt,
            integrator: Integrator::Rk4,
        })
    }

    /// Create a simulator with a custom solver. `config.integrator` is ignored.
    pub fn with_solver(config: SimulatorConfig, solver: Box<dyn Solver>) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Advance by one timestep, then refresh placements and velocities in
    /// `data` for the new state.
    pub fn step(&self, model: &Model, data: &mut Data, state: &mut State) -> Result<()> {
        trace!(time = state.time, "step");
        self.solver.step(model, data, state, self.config.dt)?;
        state.time += self.config.dt;
        forward_kinematics(model, data, &state.q, Some(&state.v), None)
    }

    /// Run simulation for `n` steps.
    pub fn simulate(&self, model: &Model, data: &mut Data, state: &mut State, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step(model, data, state)?;
        }
        Ok(())
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arbor_math::{Inertia, Vec3, SE3};
    use arbor_model::{JointKind, ModelBuilder};

    fn ball() -> Model {
        ModelBuilder::new()
            .add_body("ball", 0, JointKind::Free, SE3::identity(), Inertia::from_sphere(1.0, 0.1).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = SimulatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimulatorConfig::default());
        assert_eq!(config.dt, 1e-3);
        assert_eq!(config.integrator, Integrator::SemiImplicitEuler);
    }

    #[test]
    fn test_config_from_json() {
        let config = SimulatorConfig::from_json_str(r#"{ "dt": 0.0005, "integrator": "rk4" }"#).unwrap();
        assert_eq!(config.dt, 0.0005);
        assert_eq!(config.integrator, Integrator::Rk4);

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SimulatorConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_config_rejects_bad_input() {
        assert!(matches!(
            SimulatorConfig::from_json_str(r#"{ "dt": -1.0 }"#),
            Err(ConfigError::InvalidTimestep(_))
        ));
        assert!(matches!(
            SimulatorConfig::from_json_str(r#"{ "integrator": "verlet" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_state_starts_neutral() {
        let model = ball();
        let state = State::new(&model);
        assert_eq!(state.q.len(), 7);
        assert_eq!(state.q[6], 1.0);
        assert_eq!(state.v, DVec::zeros(6));
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_euler_free_fall() {
        let model = ball();
        let mut data = model.create_data();
        let mut state = State::new(&model);
        let sim = Simulator::default();

        sim.simulate(&model, &mut data, &mut state, 1000).unwrap();
        assert_relative_eq!(state.time, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.v[5], -9.81, epsilon = 1e-9);
        // semi-implicit Euler overshoots the exact -g/2 by g dt / 2
        assert_relative_eq!(state.q[2], -9.81 / 2.0 - 9.81 * 1e-3 / 2.0, epsilon = 1e-9);
        assert_relative_eq!(data.joint_placements[1].translation.z, state.q[2], epsilon = 1e-12);
        assert_relative_eq!(Vec3::new(state.q[3], state.q[4], state.q[5]), Vec3::zeros(), epsilon = 1e-15);
    }

    #[test]
    fn test_rk4_free_fall_is_exact() {
        let model = ball();
        let mut data = model.create_data();
        let mut state = State::new(&model);
        let sim = Simulator::rk4(0.01);

        sim.simulate(&model, &mut data, &mut state, 100).unwrap();
        assert_relative_eq!(state.q[2], -9.81 / 2.0, epsilon = 1e-9);
    }
}
