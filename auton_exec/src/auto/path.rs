//! # Path
//!
//! This module defines the authored paths followed by the autonomy system. A path is an ordered
//! list of waypoints, the first of which is the starting pose of the robot. Waypoints carry the
//! tangent lengths used by the spline generator and the events to raise once the robot reaches
//! them.
//!
//! Paths can be loaded from JSON (they are serde types) or from the line based path text format:
//!
//! ```text
//! # x y heading_deg entry_len exit_len
//! p 0 0 0 0 12
//! e intake on
//! p 48 24 90 12 12
//! r
//! p 24 48 180 12 0
//! ```
//!
//! `p` starts a new waypoint (the tangent lengths are optional and default to 0), `e` attaches an
//! event and its parameters to the preceding waypoint, and `r` marks the segment following the
//! preceding waypoint as driven in reverse.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::str::FromStr;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::loc::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A discrete action to be raised when the robot reaches a waypoint.
///
/// Names aren't unique, the same event may appear on many waypoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub name: String,

    /// Free-form parameter string, passed to the event's handler
    #[serde(default)]
    pub params: String,
}

/// A single authored point of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position on the field
    ///
    /// Units: inches
    pub x: f64,
    pub y: f64,

    /// Heading of the robot at this point, anticlockwise from +X
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Length of the spline tangent arriving at this point
    ///
    /// Units: inches
    #[serde(default)]
    pub entry_len: f64,

    /// Length of the spline tangent leaving this point
    ///
    /// Units: inches
    #[serde(default)]
    pub exit_len: f64,

    /// If true the direction of travel is reversed for the segment leaving this point
    #[serde(default)]
    pub reversed_after: bool,

    /// Events raised when this point is reached
    #[serde(default)]
    pub events: Vec<Event>,
}

/// An ordered sequence of waypoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub waypoints: Vec<Waypoint>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Could not read the path file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Line {line}: unknown record type \"{record}\"")]
    UnknownRecord { line: usize, record: String },

    #[error("Line {line}: expected at least {expected} values")]
    MissingValue { line: usize, expected: usize },

    #[error("Line {line}: \"{value}\" is not a number")]
    InvalidNumber { line: usize, value: String },

    #[error("Line {line}: record must follow a point")]
    NoPreviousPoint { line: usize },

    #[error("Line {line}: event has no name")]
    UnnamedEvent { line: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Event {
    pub fn new(name: &str, params: &str) -> Self {
        Self {
            name: name.to_string(),
            params: params.to_string(),
        }
    }
}

impl Waypoint {
    /// Create a waypoint with no tangents and no events.
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self {
            x,
            y,
            heading_deg,
            entry_len: 0.0,
            exit_len: 0.0,
            reversed_after: false,
            events: Vec::new(),
        }
    }

    /// Set the entry and exit tangent lengths.
    pub fn with_tangents(mut self, entry_len: f64, exit_len: f64) -> Self {
        self.entry_len = entry_len;
        self.exit_len = exit_len;
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reversed_after = true;
        self
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn heading_rad(&self) -> f64 {
        self.heading_deg.to_radians()
    }

    pub fn pose(&self) -> Pose {
        Pose::from_deg(self.x, self.y, self.heading_deg)
    }

    /// Unit vector along the waypoint's heading.
    pub fn direction(&self) -> Vector2<f64> {
        let h = self.heading_rad();
        Vector2::new(h.cos(), h.sin())
    }
}

impl Path {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Load a path from a text file in the path format.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, PathError> {
        let text = std::fs::read_to_string(path).map_err(PathError::FileLoadError)?;
        text.parse()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut waypoints: Vec<Waypoint> = Vec::new();

        for (index, raw_line) in s.lines().enumerate() {
            let line = index + 1;

            // Strip comments
            let content = match raw_line.find('#') {
                Some(i) => &raw_line[..i],
                None => raw_line,
            };

            let mut fields = content.split_whitespace();
            let record = match fields.next() {
                Some(r) => r,
                None => continue,
            };

            match record {
                "p" => {
                    let values = fields
                        .map(|v| parse_number(line, v))
                        .collect::<Result<Vec<f64>, _>>()?;

                    if values.len() < 3 {
                        return Err(PathError::MissingValue { line, expected: 3 });
                    }

                    waypoints.push(
                        Waypoint::new(values[0], values[1], values[2]).with_tangents(
                            values.get(3).copied().unwrap_or(0.0),
                            values.get(4).copied().unwrap_or(0.0),
                        ),
                    );
                }
                "e" => {
                    let name = fields.next().ok_or(PathError::UnnamedEvent { line })?;
                    let params = fields.collect::<Vec<_>>().join(" ");

                    waypoints
                        .last_mut()
                        .ok_or(PathError::NoPreviousPoint { line })?
                        .events
                        .push(Event::new(name, &params));
                }
                "r" => {
                    waypoints
                        .last_mut()
                        .ok_or(PathError::NoPreviousPoint { line })?
                        .reversed_after = true;
                }
                _ => {
                    return Err(PathError::UnknownRecord {
                        line,
                        record: record.to_string(),
                    })
                }
            }
        }

        Ok(Path { waypoints })
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_number(line: usize, value: &str) -> Result<f64, PathError> {
    value.parse().map_err(|_| PathError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const PATH_TEXT: &str = "
        # Demo path
        p 0 0 0 0 12
        e intake on
        e speed 0.5

        p 48 24 90 12 12   # turn up
        r
        p 24 48 180 12
    ";

    #[test]
    fn test_parse() {
        let path: Path = PATH_TEXT.parse().unwrap();

        assert_eq!(path.len(), 3);

        assert_eq!(
            path.waypoints[0],
            Waypoint::new(0.0, 0.0, 0.0)
                .with_tangents(0.0, 12.0)
                .with_event(Event::new("intake", "on"))
                .with_event(Event::new("speed", "0.5"))
        );
        assert_eq!(
            path.waypoints[1],
            Waypoint::new(48.0, 24.0, 90.0)
                .with_tangents(12.0, 12.0)
                .reversed()
        );
        assert_eq!(
            path.waypoints[2],
            Waypoint::new(24.0, 48.0, 180.0).with_tangents(12.0, 0.0)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "p 0 0".parse::<Path>(),
            Err(PathError::MissingValue { line: 1, .. })
        ));
        assert!(matches!(
            "p 0 zero 0".parse::<Path>(),
            Err(PathError::InvalidNumber { line: 1, .. })
        ));
        assert!(matches!(
            "\ne intake on".parse::<Path>(),
            Err(PathError::NoPreviousPoint { line: 2 })
        ));
        assert!(matches!(
            "p 0 0 0\nq 1".parse::<Path>(),
            Err(PathError::UnknownRecord { line: 2, .. })
        ));
        assert!(matches!(
            "p 0 0 0\ne".parse::<Path>(),
            Err(PathError::UnnamedEvent { line: 2 })
        ));
    }

    #[test]
    fn test_empty() {
        let path: Path = "# nothing here\n\n".parse().unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_json() {
        let json = r#"{
            "waypoints": [
                { "x": 1.0, "y": 2.0, "heading_deg": 45.0 },
                { "x": 3.0, "y": 4.0, "heading_deg": 90.0, "exit_len": 6.0,
                  "events": [{ "name": "clamp" }] }
            ]
        }"#;

        let path: Path = serde_json::from_str(json).unwrap();

        assert_eq!(path.waypoints[0], Waypoint::new(1.0, 2.0, 45.0));
        assert_eq!(
            path.waypoints[1],
            Waypoint::new(3.0, 4.0, 90.0)
                .with_tangents(0.0, 6.0)
                .with_event(Event::new("clamp", ""))
        );
    }
}
