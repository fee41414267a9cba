// fmgc-vnav/src/scenario.rs

use crate::geometry::geo::{bearing, course_change, distance_nm, intermediate_point};
use crate::geometry::{
    AltitudeConstraint, Coordinates, FixedRadiusTransition, Geometry, PathCaptureTransition,
    SegmentType, SpeedConstraint, TfLeg, Transition,
};
use crate::parameters::{ComputationParameters, EnvironmentSnapshot, GuidanceSnapshot, GuidanceState};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioLeg {
    pub ident: String,
    pub from: Coordinates,
    pub to: Coordinates,
    pub segment: SegmentType,
    #[serde(default)]
    pub altitude_constraint: Option<AltitudeConstraint>,
    #[serde(default)]
    pub speed_constraint: Option<SpeedConstraint>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ScenarioTransition {
    /// Fly-by turn at the fix ending leg `after_leg`. Both legs are shortened
    /// by the turn's tangent distance.
    FixedRadius { after_leg: usize, radius: f64 },
    /// Straight join from the end of leg `after_leg` to the start of the next.
    PathCapture { after_leg: usize },
}

impl ScenarioTransition {
    fn after_leg(&self) -> usize {
        match self {
            ScenarioTransition::FixedRadius { after_leg, .. } => *after_leg,
            ScenarioTransition::PathCapture { after_leg } => *after_leg,
        }
    }
}

/// A lateral path and the snapshot to predict it with, as stored on disk.
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub legs: Vec<ScenarioLeg>,
    #[serde(default)]
    pub transitions: Vec<ScenarioTransition>,
    pub parameters: ComputationParameters,
    #[serde(default)]
    pub environment: EnvironmentSnapshot,
    #[serde(default)]
    pub guidance: GuidanceState,
}

impl Scenario {
    pub fn from_json_file(path: &Path) -> Result<Self, ScenarioLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ScenarioLoadError> {
        let scenario: Scenario = serde_json::from_str(contents)?;
        debug!(
            "Loaded scenario with {} legs and {} transitions",
            scenario.legs.len(),
            scenario.transitions.len()
        );
        Ok(scenario)
    }

    pub fn snapshot(&self) -> GuidanceSnapshot {
        GuidanceSnapshot {
            parameters: self.parameters.clone(),
            environment: self.environment.clone(),
            guidance: self.guidance.clone(),
        }
    }

    pub fn build_geometry(&self) -> Result<Geometry, ScenarioLoadError> {
        let mut endpoints = self
            .legs
            .iter()
            .map(|leg| (leg.from, leg.to))
            .collect::<Vec<_>>();
        let mut transitions: Vec<(usize, Box<dyn Transition>)> = Vec::new();

        for transition in &self.transitions {
            let i = transition.after_leg();
            if i + 1 >= self.legs.len() {
                return Err(ScenarioLoadError::UnknownTransitionLeg(i));
            }
            let inbound = &self.legs[i];
            let outbound = &self.legs[i + 1];

            match transition {
                ScenarioTransition::FixedRadius { radius, .. } => {
                    let change = course_change(
                        bearing(&inbound.from, &inbound.to),
                        bearing(&outbound.from, &outbound.to),
                    );
                    let tangent = FixedRadiusTransition::tangent_distance(*radius, change);
                    let inbound_length = distance_nm(&inbound.from, &inbound.to);
                    let outbound_length = distance_nm(&outbound.from, &outbound.to);
                    if tangent >= inbound_length || tangent >= outbound_length {
                        return Err(ScenarioLoadError::TurnTooWide(i, tangent));
                    }

                    let entry =
                        intermediate_point(&inbound.from, &inbound.to, 1. - tangent / inbound_length);
                    let exit =
                        intermediate_point(&outbound.from, &outbound.to, tangent / outbound_length);
                    endpoints[i].1 = entry;
                    endpoints[i + 1].0 = exit;
                    transitions.push((
                        i,
                        Box::new(FixedRadiusTransition::new(
                            entry,
                            inbound.to,
                            exit,
                            *radius,
                            change,
                        )),
                    ));
                }
                ScenarioTransition::PathCapture { .. } => {
                    let from = endpoints[i].1;
                    let to = endpoints[i + 1].0;
                    transitions.push((
                        i,
                        Box::new(PathCaptureTransition::new(from, to, distance_nm(&from, &to))),
                    ));
                }
            }
        }

        let mut geometry = Geometry::new();
        for (i, (leg, (from, to))) in self.legs.iter().zip(endpoints).enumerate() {
            geometry.add_leg(
                i,
                Box::new(
                    TfLeg::new(&leg.ident, from, to, leg.segment)
                        .with_altitude_constraint(leg.altitude_constraint)
                        .with_speed_constraint(leg.speed_constraint),
                ),
            );
        }
        for (i, transition) in transitions {
            geometry.add_transition(i, transition);
        }

        Ok(geometry)
    }
}

#[derive(Error, Debug)]
pub enum ScenarioLoadError {
    #[error("File IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid scenario: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Transition after leg {0} has no following leg")]
    UnknownTransitionLeg(usize),
    #[error("Turn after leg {0} needs {1:.2} nm of tangent distance, more than the legs it joins")]
    TurnTooWide(usize, f64),
}
