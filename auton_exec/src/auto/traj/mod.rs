//! # Trajectory generation module
//!
//! Converts an authored [`Path`] into a [`GeneratedTrajectory`], a dense list of sample poses at
//! a fixed interpolation step between each pair of consecutive waypoints.
//!
//! Two interpolation modes are available:
//!
//! - [`InterpMode::Linear`] - straight lines between waypoints, each sample facing along its
//!   segment. Used for planner output, where the waypoints are grid cells.
//! - [`InterpMode::Spline`] - a cubic Bezier between each pair. The inner control points sit
//!   along the waypoint headings at the waypoints' exit and entry tangent lengths, and headings
//!   are blended through the same De Casteljau lerps along the shortest arc.
//!
//! Generation is a pure function of the path and the parameters, the same path always gives the
//! same trajectory.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

pub use params::TrajParams;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::{
    loc::Pose,
    path::{Path, Waypoint},
};
use util::maths::{lerp, lerp_angle};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Interpolation between waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMode {
    Linear,
    Spline,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generates trajectories from paths.
#[derive(Debug, Clone)]
pub struct TrajGenerator {
    params: TrajParams,
}

/// A dense sampled trajectory through a path's waypoints.
///
/// Only a [`TrajGenerator`] can build one, and it is never modified once generated. A non-empty
/// trajectory always has at least 2 waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTrajectory {
    /// Interpolation step the trajectory was generated with
    step_interval: f64,

    /// The waypoints the trajectory passes through
    waypoints: Vec<Waypoint>,

    /// The sampled poses. Each segment contributes `samples_per_segment` samples and the final
    /// waypoint is appended at the end, so segment `k` spans samples `k * n ..= (k + 1) * n`.
    samples: Vec<Pose>,

    /// For each sample, whether it lies on a stretch driven in reverse
    sample_reversed: Vec<bool>,

    samples_per_segment: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajGenerator {
    pub fn new(params: TrajParams) -> Self {
        Self { params }
    }

    /// Generator in the given mode with the default step.
    pub fn with_mode(mode: InterpMode) -> Self {
        Self::new(TrajParams {
            mode,
            ..Default::default()
        })
    }

    pub fn mode(&self) -> InterpMode {
        self.params.mode
    }

    /// Number of samples each segment is split into.
    pub fn samples_per_segment(&self) -> usize {
        // Guard against silly steps giving no samples at all
        ((1.0 / self.params.step_interval).round() as usize).max(1)
    }

    /// Generate the trajectory through the given path.
    ///
    /// A path with fewer than 2 waypoints gives an empty trajectory.
    pub fn generate(&self, path: &Path) -> GeneratedTrajectory {
        let n = self.samples_per_segment();
        let mut traj = GeneratedTrajectory {
            step_interval: self.params.step_interval,
            waypoints: path.waypoints.clone(),
            samples: Vec::new(),
            sample_reversed: Vec::new(),
            samples_per_segment: n,
        };

        if path.waypoints.len() < 2 {
            warn!(
                "Cannot generate a trajectory from {} waypoint(s), trajectory is empty",
                path.waypoints.len()
            );
            return traj;
        }

        let num_segments = path.waypoints.len() - 1;
        traj.samples.reserve(num_segments * n + 1);
        traj.sample_reversed.reserve(num_segments * n + 1);

        let mut reversed = false;
        let mut last_heading_rad = path.waypoints[0].heading_rad();

        for pair in path.waypoints.windows(2) {
            let (p1, p2) = (&pair[0], &pair[1]);

            if p1.reversed_after {
                reversed = !reversed;
            }

            for i in 0..n {
                let t = i as f64 / n as f64;
                let sample = match self.params.mode {
                    InterpMode::Linear => linear_sample(p1, p2, t),
                    InterpMode::Spline => spline_sample(p1, p2, reversed, t),
                };
                traj.samples.push(sample);
                traj.sample_reversed.push(reversed);
            }

            last_heading_rad = match self.params.mode {
                InterpMode::Linear => linear_sample(p1, p2, 1.0).heading_rad,
                InterpMode::Spline => p2.heading_rad(),
            };
        }

        // The final waypoint closes the last segment
        let last = &path.waypoints[num_segments];
        traj.samples.push(Pose::new(last.x, last.y, last_heading_rad));
        traj.sample_reversed.push(reversed);

        traj
    }
}

impl GeneratedTrajectory {
    /// A trajectory with no waypoints and no samples.
    pub fn empty() -> Self {
        Self {
            step_interval: TrajParams::default().step_interval,
            waypoints: Vec::new(),
            samples: Vec::new(),
            sample_reversed: Vec::new(),
            samples_per_segment: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn samples_per_segment(&self) -> usize {
        self.samples_per_segment
    }

    pub fn step_interval(&self) -> f64 {
        self.step_interval
    }

    /// The waypoints the trajectory passes through.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn samples(&self) -> &[Pose] {
        &self.samples
    }

    /// The pose the robot should start from, `None` if the trajectory is empty.
    pub fn starting_pose(&self) -> Option<Pose> {
        if self.is_empty() {
            None
        } else {
            self.waypoints.first().map(|w| w.pose())
        }
    }

    pub fn last_sample(&self) -> Option<&Pose> {
        self.samples.last()
    }

    /// Number of segments (waypoint pairs) in the trajectory.
    pub fn num_segments(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.waypoints.len() - 1
        }
    }

    /// The samples of the k-th segment, including both end points, or `None` if there is no
    /// such segment.
    pub fn segment(&self, k: usize) -> Option<&[Pose]> {
        if k >= self.num_segments() {
            return None;
        }
        let n = self.samples_per_segment;
        self.samples.get(k * n..=(k + 1) * n)
    }

    /// Whether sample `i` is on a reversed stretch.
    pub fn is_reversed(&self, i: usize) -> bool {
        self.sample_reversed.get(i).copied().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample a straight segment, facing along the direction of travel.
fn linear_sample(p1: &Waypoint, p2: &Waypoint, t: f64) -> Pose {
    let delta = p2.position() - p1.position();

    let heading_rad = if delta.norm() <= std::f64::EPSILON {
        p1.heading_rad()
    } else {
        delta[1].atan2(delta[0])
    };

    let position = p1.position() + delta * t;
    Pose::new(position[0], position[1], heading_rad)
}

/// Sample the Bezier between two waypoints by De Casteljau's algorithm.
fn spline_sample(p1: &Waypoint, p2: &Waypoint, reversed: bool, t: f64) -> Pose {
    let exit_sign = if reversed { -1.0 } else { 1.0 };

    let control = [
        (p1.position(), p1.heading_rad()),
        (
            p1.position() + p1.direction() * p1.exit_len * exit_sign,
            p1.heading_rad(),
        ),
        (p2.position() - p2.direction() * p2.entry_len, p2.heading_rad()),
        (p2.position(), p2.heading_rad()),
    ];

    let (position, heading_rad) = de_casteljau(&control, t);
    Pose::new(position[0], position[1], heading_rad)
}

/// Evaluate a Bezier curve over (position, heading) control points at `t`.
///
/// Headings are lerped along the shortest arc between each pair.
fn de_casteljau(control: &[(Vector2<f64>, f64)], t: f64) -> (Vector2<f64>, f64) {
    let mut points = control.to_vec();

    while points.len() > 1 {
        points = points
            .windows(2)
            .map(|w| {
                let (a, ha) = w[0];
                let (b, hb) = w[1];
                (
                    Vector2::new(lerp(a[0], b[0], t), lerp(a[1], b[1], t)),
                    lerp_angle(ha, hb, t),
                )
            })
            .collect();
    }

    points
        .first()
        .copied()
        .unwrap_or((Vector2::zeros(), 0.0))
}
