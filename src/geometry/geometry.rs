// fmgc-vnav/src/geometry/geometry.rs

use super::legs::Leg;
use super::transitions::Transition;
use std::collections::BTreeMap;

/// Finished lateral path: legs keyed by flight plan index, and the transition
/// following each leg keyed by that leg's index.
#[derive(Default)]
pub struct Geometry {
    legs: BTreeMap<usize, Box<dyn Leg>>,
    transitions: BTreeMap<usize, Box<dyn Transition>>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_leg(&mut self, index: usize, leg: Box<dyn Leg>) -> &mut Self {
        self.legs.insert(index, leg);
        self
    }

    /// Adds the transition between leg `index` and leg `index + 1`.
    pub fn add_transition(&mut self, index: usize, transition: Box<dyn Transition>) -> &mut Self {
        self.transitions.insert(index, transition);
        self
    }

    pub fn leg(&self, index: usize) -> Option<&dyn Leg> {
        self.legs.get(&index).map(|leg| leg.as_ref())
    }

    pub fn transition(&self, index: usize) -> Option<&dyn Transition> {
        self.transitions.get(&index).map(|transition| transition.as_ref())
    }

    pub fn inbound_transition(&self, index: usize) -> Option<&dyn Transition> {
        index.checked_sub(1).and_then(|previous| self.transition(previous))
    }

    /// Legs in ascending index order.
    pub fn legs(&self) -> impl Iterator<Item = (usize, &dyn Leg)> {
        self.legs.iter().map(|(&index, leg)| (index, leg.as_ref()))
    }

    /// One past the highest leg index, the bound of a backwards walk over the legs.
    pub fn leg_count(&self) -> usize {
        self.legs
            .last_key_value()
            .map_or(0, |(&index, _)| index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Inbound transition, leg and outbound transition lengths of leg `index`.
    pub fn leg_path_lengths(&self, index: usize) -> Option<[f64; 3]> {
        let leg = self.leg(index)?;
        Some(Self::complete_leg_path_lengths(
            leg,
            self.inbound_transition(index),
            self.transition(index),
        ))
    }

    /// Splits the path flown for a leg into `[inbound, leg, outbound]`.
    ///
    /// Fixed radius transitions are shared half and half with the neighbouring
    /// leg. Any other transition belongs entirely to the leg it leads into.
    pub fn complete_leg_path_lengths(
        leg: &dyn Leg,
        inbound: Option<&dyn Transition>,
        outbound: Option<&dyn Transition>,
    ) -> [f64; 3] {
        let inbound_length = match inbound {
            Some(transition) if transition.is_fixed_radius() => transition.distance() / 2.,
            Some(transition) => transition.distance(),
            None => 0.,
        };
        let outbound_length = match outbound {
            Some(transition) if transition.is_fixed_radius() => transition.distance() / 2.,
            _ => 0.,
        };
        [inbound_length, leg.distance(), outbound_length]
    }

    /// Sum of all complete leg path lengths.
    pub fn total_path_length(&self) -> f64 {
        self.legs
            .keys()
            .filter_map(|&index| self.leg_path_lengths(index))
            .map(|lengths| lengths.iter().sum::<f64>())
            .sum()
    }
}
