use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::info;

use crate::app::events::{select_scenario, EventStep, Scenario};
use crate::app::flags::StoryFlags;
use crate::app::input::InputSnapshot;
use crate::app::loop_runner::ticks_from_millis;
use crate::app::person::{BehaviorStep, ControlMode, Person};
use crate::grid::{Direction, GridPos};

/// What one entity tick surfaced to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The player snapped onto a new cell this tick.
    pub player_finished_step: bool,
}

/// One loaded map: its wall set, its roster of people, the tiles that fire
/// cutscenes when stepped on, and whether a cutscene is currently draining.
/// The roster is ordered so every per-tick sweep is deterministic.
#[derive(Debug)]
pub struct OverworldMap {
    lower_layer: String,
    upper_layer: String,
    walls: HashSet<GridPos>,
    cutscene_spaces: HashMap<GridPos, Vec<Scenario>>,
    roster: BTreeMap<String, Person>,
    is_cutscene_playing: bool,
}

impl OverworldMap {
    pub fn new(
        lower_layer: String,
        upper_layer: String,
        walls: HashSet<GridPos>,
        cutscene_spaces: HashMap<GridPos, Vec<Scenario>>,
        mut roster: BTreeMap<String, Person>,
    ) -> Self {
        for (key, person) in roster.iter_mut() {
            person.mount(key);
        }
        Self {
            lower_layer,
            upper_layer,
            walls,
            cutscene_spaces,
            roster,
            is_cutscene_playing: false,
        }
    }

    pub fn lower_layer(&self) -> &str {
        &self.lower_layer
    }

    pub fn upper_layer(&self) -> &str {
        &self.upper_layer
    }

    pub fn is_cutscene_playing(&self) -> bool {
        self.is_cutscene_playing
    }

    pub fn set_cutscene_playing(&mut self, playing: bool) {
        self.is_cutscene_playing = playing;
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.roster.get(id)
    }

    pub fn person_mut(&mut self, id: &str) -> Option<&mut Person> {
        self.roster.get_mut(id)
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.roster.values()
    }

    pub fn person_count(&self) -> usize {
        self.roster.len()
    }

    pub fn player_id(&self) -> Option<&str> {
        self.roster
            .iter()
            .find(|(_, person)| person.is_player_controlled())
            .map(|(id, _)| id.as_str())
    }

    /// Lookup for ids that authored content is required to resolve; a miss
    /// is bad content, not a runtime condition.
    pub fn expect_person(&self, id: &str) -> &Person {
        self.person(id)
            .unwrap_or_else(|| panic!("event names unknown actor '{id}'"))
    }

    pub fn expect_person_mut(&mut self, id: &str) -> &mut Person {
        self.person_mut(id)
            .unwrap_or_else(|| panic!("event names unknown actor '{id}'"))
    }

    /// Pure wall query: is the cell one step from (x, y) walled off?
    pub fn is_blocked(&self, x: i32, y: i32, direction: Direction) -> bool {
        self.walls.contains(&GridPos::new(x, y).step(direction))
    }

    pub fn add_wall(&mut self, x: i32, y: i32) {
        self.walls.insert(GridPos::new(x, y));
    }

    pub fn remove_wall(&mut self, x: i32, y: i32) {
        self.walls.remove(&GridPos::new(x, y));
    }

    pub fn move_wall(&mut self, x: i32, y: i32, direction: Direction) {
        self.remove_wall(x, y);
        let moved = GridPos::new(x, y).step(direction);
        self.walls.insert(moved);
    }

    /// Full collision query for a prospective step: walls, plus every other
    /// person's current and target cell, so two people can never swap into
    /// each other mid-animation.
    pub fn is_space_taken(&self, from: GridPos, direction: Direction, moving_id: &str) -> bool {
        let destination = from.step(direction);
        if self.walls.contains(&destination) {
            return true;
        }
        self.roster.iter().any(|(id, person)| {
            id != moving_id
                && (person.pos() == destination || person.move_target() == Some(destination))
        })
    }

    /// Attempts one grid step. A move already in flight makes this a full
    /// no-op; otherwise facing updates even when the destination is taken.
    pub fn start_move(&mut self, id: &str, direction: Direction) -> bool {
        let person = self.expect_person(id);
        if person.is_moving() {
            return false;
        }
        let from = person.pos();
        let blocked = self.is_space_taken(from, direction, id);

        let person = self.expect_person_mut(id);
        person.face(direction);
        if blocked {
            return false;
        }
        person.begin_move(direction);
        true
    }

    pub fn face(&mut self, id: &str, direction: Direction) {
        self.expect_person_mut(id).face(direction);
    }

    /// Turns the named person to look at the player.
    pub fn face_toward_player(&mut self, id: &str) {
        let Some(player_id) = self.player_id() else {
            return;
        };
        let player_direction = self.expect_person(player_id).direction();
        self.expect_person_mut(id).face(player_direction.opposite());
    }

    /// Advances every person one tick. A person either progresses an
    /// in-flight move or starts something new, never both in one tick, so
    /// triggers see the completed step before the next one begins. In-flight
    /// moves always progress so animations finish; player input and idle
    /// behavior are suspended during cutscenes.
    pub fn tick_people(&mut self, input: &InputSnapshot) -> TickReport {
        let cutscene = self.is_cutscene_playing;
        let ids: Vec<String> = self.roster.keys().cloned().collect();
        let mut report = TickReport::default();

        for id in &ids {
            let person = self.roster.get_mut(id).expect("roster id");
            let control = person.control();

            if person.is_moving() {
                if person.advance_move() {
                    match control {
                        ControlMode::Player => report.player_finished_step = true,
                        ControlMode::Behavior => {
                            if !cutscene {
                                person.advance_behavior_cursor();
                            }
                        }
                    }
                }
                continue;
            }

            if cutscene {
                continue;
            }
            match control {
                ControlMode::Player => {
                    if let Some(direction) = input.held_direction() {
                        self.start_move(id, direction);
                    }
                }
                ControlMode::Behavior => self.tick_behavior(id),
            }
        }
        report
    }

    fn tick_behavior(&mut self, id: &str) {
        let person = self.roster.get(id).expect("roster id");
        if person.is_moving() {
            return;
        }
        let standing = person.is_standing();
        let Some(step) = person.behavior_step().cloned() else {
            return;
        };

        match step {
            BehaviorStep::Walk { direction } => {
                // Retries every tick while the destination is taken.
                self.start_move(id, direction);
            }
            BehaviorStep::Stand { direction, time } => {
                let person = self.roster.get_mut(id).expect("roster id");
                if standing {
                    if person.tick_stand() {
                        person.advance_behavior_cursor();
                    }
                } else {
                    person.face(direction);
                    person.begin_stand(time.map(ticks_from_millis));
                }
            }
        }
    }

    /// Confirm pressed: if a person with dialogue stands on the cell the
    /// player faces, start the first scenario its flags allow. Returns the
    /// event list to run; the map is already marked cutscene-active.
    pub fn check_action_trigger(&mut self, flags: &StoryFlags) -> Option<Vec<EventStep>> {
        if self.is_cutscene_playing {
            return None;
        }
        let player_id = self.player_id()?;
        let player = &self.roster[player_id];
        let front = player.pos().step(player.direction());

        let target_id = self.roster.iter().find_map(|(id, person)| {
            (id != player_id && !person.is_moving() && person.pos() == front)
                .then(|| id.clone())
        })?;
        let scenario = select_scenario(self.roster[&target_id].talking(), flags)?;
        let events = scenario.events.clone();

        self.is_cutscene_playing = true;
        info!(actor = %target_id, steps = events.len(), "action_cutscene_started");
        Some(events)
    }

    /// The player finished a step: fire the cutscene registered for the
    /// cell they now stand on, if any. Footstep scenarios are not
    /// flag-gated; the first one always plays.
    pub fn check_footstep_trigger(&mut self) -> Option<Vec<EventStep>> {
        if self.is_cutscene_playing {
            return None;
        }
        let player_id = self.player_id()?;
        let cell = self.roster[player_id].pos();
        let scenario = self.cutscene_spaces.get(&cell)?.first()?;
        let events = scenario.events.clone();

        self.is_cutscene_playing = true;
        info!(space = %cell.key(), steps = events.len(), "footstep_cutscene_started");
        Some(events)
    }

    /// Closes out a cutscene: the active flag drops and every idle loop
    /// restarts from its first action.
    pub fn end_cutscene(&mut self) {
        self.is_cutscene_playing = false;
        for person in self.roster.values_mut() {
            person.arm_behavior_loop();
        }
    }
}
