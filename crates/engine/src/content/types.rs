use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::app::{BehaviorStep, ControlMode, OverworldMap, Person, Scenario};
use crate::grid::{to_pixels, Direction, GridPos};

/// Authoring shape of one roster member. Coordinates are grid units; the
/// build step scales them to pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonConfig {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub direction: Direction,
    #[serde(rename = "isPlayerControlled", default)]
    pub is_player_controlled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(rename = "behaviorLoop", default, skip_serializing_if = "Vec::is_empty")]
    pub behavior_loop: Vec<BehaviorStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub talking: Vec<Scenario>,
}

impl PersonConfig {
    pub(crate) fn build(&self) -> Person {
        let control = if self.is_player_controlled {
            ControlMode::Player
        } else {
            ControlMode::Behavior
        };
        let mut person = Person::new(
            GridPos::new(to_pixels(self.x), to_pixels(self.y)),
            control,
        )
        .with_direction(self.direction)
        .with_behavior_loop(self.behavior_loop.clone())
        .with_talking(self.talking.clone());
        if let Some(src) = &self.src {
            person = person.with_sprite(src);
        }
        person
    }
}

/// Authoring shape of one map. Cutscene spaces are keyed by the canonical
/// `"x,y"` coordinate key, in grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
    #[serde(rename = "lowerSrc")]
    pub lower_src: String,
    #[serde(rename = "upperSrc")]
    pub upper_src: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub walls: Vec<(i32, i32)>,
    #[serde(rename = "cutsceneSpaces", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cutscene_spaces: BTreeMap<String, Vec<Scenario>>,
    pub people: BTreeMap<String, PersonConfig>,
}

impl MapConfig {
    /// Instantiates the runtime map. Assumes the library already passed
    /// validation, so coordinate keys are well formed.
    pub fn build(&self) -> OverworldMap {
        let walls: HashSet<GridPos> = self
            .walls
            .iter()
            .map(|&(x, y)| GridPos::new(to_pixels(x), to_pixels(y)))
            .collect();
        let cutscene_spaces: HashMap<GridPos, Vec<Scenario>> = self
            .cutscene_spaces
            .iter()
            .map(|(key, scenarios)| {
                let cell = GridPos::parse_key(key)
                    .unwrap_or_else(|| panic!("bad cutscene space key '{key}'"));
                (
                    GridPos::new(to_pixels(cell.x), to_pixels(cell.y)),
                    scenarios.clone(),
                )
            })
            .collect();
        let roster: BTreeMap<String, Person> = self
            .people
            .iter()
            .map(|(name, config)| (name.clone(), config.build()))
            .collect();
        OverworldMap::new(
            self.lower_src.clone(),
            self.upper_src.clone(),
            walls,
            cutscene_spaces,
            roster,
        )
    }
}

/// Every authored map, keyed by name. This is the unit the loader reads
/// and the controller owns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapLibrary {
    maps: BTreeMap<String, MapConfig>,
}

impl MapLibrary {
    pub fn map(&self, name: &str) -> Option<&MapConfig> {
        self.maps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    pub fn insert(&mut self, name: &str, config: MapConfig) {
        self.maps.insert(name.to_string(), config);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapConfig)> {
        self.maps
            .iter()
            .map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
