use tracing::info;

use crate::app::events::{EventSequencer, EventStep, SequencerOutcome};
use crate::app::flags::StoryFlags;
use crate::app::input::InputSnapshot;
use crate::app::map::OverworldMap;
use crate::app::person::Person;
use crate::app::rendering::{camera_offset, to_screen_px, RenderSink};
use crate::content::{validate_library, ContentError, MapLibrary};

/// The running overworld: the active map, the flag store, and at most one
/// cutscene in flight. The sequencer lives here rather than on the map so a
/// `changeMap` step mid-list keeps draining against the new map.
#[derive(Debug)]
pub struct Overworld {
    library: MapLibrary,
    map_name: String,
    map: OverworldMap,
    flags: StoryFlags,
    sequencer: Option<EventSequencer>,
}

impl Overworld {
    /// Validates the library and enters it at `start_map`.
    pub fn new(library: MapLibrary, start_map: &str) -> Result<Self, ContentError> {
        validate_library(&library)?;
        let config = library
            .map(start_map)
            .ok_or_else(|| ContentError::UnknownStartMap {
                name: start_map.to_string(),
            })?;
        let map = config.build();
        info!(map = %start_map, people = map.person_count(), "overworld_started");
        Ok(Self {
            library,
            map_name: start_map.to_string(),
            map,
            flags: StoryFlags::new(),
            sequencer: None,
        })
    }

    pub fn map(&self) -> &OverworldMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut OverworldMap {
        &mut self.map
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn flags(&self) -> &StoryFlags {
        &self.flags
    }

    pub fn is_cutscene_playing(&self) -> bool {
        self.map.is_cutscene_playing()
    }

    /// The dialogue line awaiting dismissal, if a cutscene is showing one.
    pub fn message(&self) -> Option<&str> {
        self.sequencer
            .as_ref()
            .and_then(|sequencer| sequencer.current_message())
    }

    /// One logical tick: advance people, drive the cutscene if one is in
    /// flight, otherwise let the triggers look for a new one.
    pub fn tick(&mut self, input: &InputSnapshot) {
        let report = self.map.tick_people(input);

        if self.sequencer.is_some() {
            self.drive_sequencer(input.confirm_pressed());
            return;
        }

        if input.confirm_pressed() {
            if let Some(events) = self.map.check_action_trigger(&self.flags) {
                self.start_cutscene(events);
                return;
            }
        }
        if report.player_finished_step {
            if let Some(events) = self.map.check_footstep_trigger() {
                self.start_cutscene(events);
            }
        }
    }

    /// Draw pass: lower layer, people in a fixed order (pixel row, then
    /// id), upper layer, then any active dialogue line. The camera pins the
    /// player's interpolated position to the anchor.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        let player_id = self.map.player_id().expect("map declares a player");
        let camera = self.map.expect_person(player_id).pixel_position();
        let offset = camera_offset(camera);

        sink.draw_lower(self.map.lower_layer(), offset);

        let mut people: Vec<&Person> = self.map.people().collect();
        people.sort_by(|a, b| {
            let row = a.pixel_position().1.cmp(&b.pixel_position().1);
            row.then_with(|| a.id().cmp(b.id()))
        });
        for person in people {
            sink.draw_person(
                person.sprite(),
                to_screen_px(person.pixel_position(), offset),
                person.direction(),
                person.is_moving(),
            );
        }

        sink.draw_upper(self.map.upper_layer(), offset);

        if let Some(text) = self.message() {
            sink.present_message(text);
        }
    }

    fn start_cutscene(&mut self, events: Vec<EventStep>) {
        self.sequencer = Some(EventSequencer::new(events));
        // The edge that started the cutscene must not also dismiss its
        // first message.
        self.drive_sequencer(false);
    }

    fn drive_sequencer(&mut self, mut dismiss_pressed: bool) {
        loop {
            let Some(sequencer) = self.sequencer.as_mut() else {
                return;
            };
            match sequencer.tick(&mut self.map, &mut self.flags, dismiss_pressed) {
                SequencerOutcome::Pending => return,
                SequencerOutcome::MapChange(target) => {
                    self.switch_map(&target);
                }
                SequencerOutcome::Finished(_) => {
                    self.sequencer = None;
                    return;
                }
            }
            dismiss_pressed = false;
        }
    }

    /// Drops the active map and builds the named one from its authoring
    /// config; the new roster declares where the player enters. A cutscene
    /// still draining carries its active flag across.
    fn switch_map(&mut self, name: &str) {
        let config = self
            .library
            .map(name)
            .unwrap_or_else(|| panic!("changeMap names unknown map '{name}'"));
        let mut map = config.build();
        map.set_cutscene_playing(self.sequencer.is_some());
        self.map = map;
        self.map_name = name.to_string();
        info!(map = %name, "map_switched");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::Scenario;
    use crate::app::input::InputAction;
    use crate::app::person::BehaviorStep;
    use crate::app::rendering::{CAMERA_ANCHOR_X_PX, CAMERA_ANCHOR_Y_PX};
    use crate::content::{MapConfig, PersonConfig};
    use crate::grid::{to_pixels, Direction, GridPos, GRID_SIZE};
    use std::collections::BTreeMap;

    fn grid(x_units: i32, y_units: i32) -> GridPos {
        GridPos::new(to_pixels(x_units), to_pixels(y_units))
    }

    fn person_config(x: i32, y: i32) -> PersonConfig {
        PersonConfig {
            x,
            y,
            direction: Direction::default(),
            is_player_controlled: false,
            src: None,
            behavior_loop: Vec::new(),
            talking: Vec::new(),
        }
    }

    fn player_config(x: i32, y: i32) -> PersonConfig {
        PersonConfig {
            is_player_controlled: true,
            ..person_config(x, y)
        }
    }

    fn map_config(people: Vec<(&str, PersonConfig)>) -> MapConfig {
        MapConfig {
            lower_src: "lower".to_string(),
            upper_src: "upper".to_string(),
            walls: Vec::new(),
            cutscene_spaces: BTreeMap::new(),
            people: people
                .into_iter()
                .map(|(name, config)| (name.to_string(), config))
                .collect(),
        }
    }

    fn two_map_library() -> MapLibrary {
        let mut deckhand = person_config(3, 3);
        deckhand.talking = vec![
            Scenario {
                required_flags: vec!["SIGNED_IN".to_string()],
                events: vec![EventStep::TextMessage {
                    text: "Thanks!".to_string(),
                    face_hero: Some("deckhand".to_string()),
                }],
            },
            Scenario {
                required_flags: Vec::new(),
                events: vec![
                    EventStep::TextMessage {
                        text: "Please sign in".to_string(),
                        face_hero: Some("deckhand".to_string()),
                    },
                    EventStep::AddStoryFlag {
                        flag: "SIGNED_IN".to_string(),
                    },
                ],
            },
        ];

        let mut quay = map_config(vec![
            ("hero", player_config(3, 4)),
            ("deckhand", deckhand),
        ]);
        quay.cutscene_spaces.insert(
            "1,4".to_string(),
            vec![Scenario {
                required_flags: Vec::new(),
                events: vec![EventStep::ChangeMap {
                    map: "boathouse".to_string(),
                }],
            }],
        );

        let boathouse = map_config(vec![
            ("hero", player_config(5, 6)),
            ("oars", person_config(1, 1)),
        ]);

        let mut library = MapLibrary::default();
        library.insert("quay", quay);
        library.insert("boathouse", boathouse);
        library
    }

    fn overworld() -> Overworld {
        Overworld::new(two_map_library(), "quay").expect("valid library")
    }

    fn run_ticks(overworld: &mut Overworld, input: InputSnapshot, ticks: u32) {
        for _ in 0..ticks {
            overworld.tick(&input);
        }
    }

    fn confirm() -> InputSnapshot {
        InputSnapshot::empty().with_confirm_pressed(true)
    }

    /// Records draw calls in order so tests can assert on the frame shape.
    #[derive(Debug, Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl RenderSink for RecordingSink {
        fn draw_lower(&mut self, layer: &str, _offset: (i32, i32)) {
            self.calls.push(format!("lower:{layer}"));
        }

        fn draw_person(
            &mut self,
            sprite: Option<&str>,
            screen_px: (i32, i32),
            _facing: Direction,
            _walking: bool,
        ) {
            self.calls
                .push(format!("person:{}@{},{}", sprite.unwrap_or("-"), screen_px.0, screen_px.1));
        }

        fn draw_upper(&mut self, layer: &str, _offset: (i32, i32)) {
            self.calls.push(format!("upper:{layer}"));
        }

        fn present_message(&mut self, text: &str) {
            self.calls.push(format!("message:{text}"));
        }
    }

    #[test]
    fn first_interaction_signs_in_and_later_ones_thank() {
        let mut overworld = overworld();
        // Face the deckhand one cell above the hero.
        run_ticks(
            &mut overworld,
            InputSnapshot::empty().with_action_down(InputAction::MoveUp, true),
            1,
        );
        assert_eq!(
            overworld.map().expect_person("hero").direction(),
            Direction::Up
        );
        assert!(!overworld.map().expect_person("hero").is_moving());

        overworld.tick(&confirm());
        assert_eq!(overworld.message(), Some("Please sign in"));
        // The deckhand turned to face the hero below them.
        assert_eq!(
            overworld.map().expect_person("deckhand").direction(),
            Direction::Down
        );

        overworld.tick(&confirm());
        assert_eq!(overworld.message(), None);
        assert!(!overworld.is_cutscene_playing());
        assert!(overworld.flags().contains("SIGNED_IN"));

        overworld.tick(&confirm());
        assert_eq!(overworld.message(), Some("Thanks!"));
        overworld.tick(&confirm());
        assert_eq!(overworld.message(), None);
    }

    #[test]
    fn the_triggering_confirm_does_not_dismiss_the_first_message() {
        let mut overworld = overworld();
        run_ticks(
            &mut overworld,
            InputSnapshot::empty().with_action_down(InputAction::MoveUp, true),
            1,
        );

        overworld.tick(&confirm());
        assert_eq!(overworld.message(), Some("Please sign in"));
        assert!(overworld.is_cutscene_playing());
    }

    #[test]
    fn footstep_space_switches_maps_and_discards_the_old_roster() {
        let mut overworld = overworld();
        // Two steps left from (3,4) land on the (1,4) cutscene space.
        let left = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        for _ in 0..200 {
            if overworld.map_name() == "boathouse" {
                break;
            }
            overworld.tick(&left);
        }

        assert_eq!(overworld.map_name(), "boathouse");
        let hero = overworld.map().expect_person("hero");
        assert_eq!(hero.pos(), grid(5, 6));
        assert_eq!(hero.direction(), Direction::Down);
        // The quay roster is gone; the boathouse roster is live.
        assert!(overworld.map().person("deckhand").is_none());
        assert!(overworld.map().person("oars").is_some());
        assert!(!overworld.is_cutscene_playing());
    }

    #[test]
    fn player_movement_is_suspended_while_dialogue_shows() {
        let mut overworld = overworld();
        run_ticks(
            &mut overworld,
            InputSnapshot::empty().with_action_down(InputAction::MoveUp, true),
            1,
        );
        overworld.tick(&confirm());
        assert!(overworld.message().is_some());

        let before = overworld.map().expect_person("hero").pos();
        run_ticks(
            &mut overworld,
            InputSnapshot::empty().with_action_down(InputAction::MoveDown, true),
            40,
        );
        assert_eq!(overworld.map().expect_person("hero").pos(), before);
        assert!(overworld.message().is_some());
    }

    #[test]
    fn abort_step_ends_the_run_and_skips_the_rest() {
        let mut library = two_map_library();
        let mut gated = map_config(vec![("hero", player_config(2, 2))]);
        gated.cutscene_spaces.insert(
            "3,2".to_string(),
            vec![Scenario {
                required_flags: Vec::new(),
                events: vec![
                    EventStep::AddStoryFlag {
                        flag: "REACHED".to_string(),
                    },
                    EventStep::AbortCutscene,
                    EventStep::AddStoryFlag {
                        flag: "SKIPPED".to_string(),
                    },
                ],
            }],
        );
        library.insert("gated", gated);
        let mut overworld = Overworld::new(library, "gated").expect("valid library");

        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        run_ticks(&mut overworld, right, GRID_SIZE as u32 + 2);

        assert!(overworld.flags().contains("REACHED"));
        assert!(!overworld.flags().contains("SKIPPED"));
        assert!(!overworld.is_cutscene_playing());
    }

    #[test]
    fn scripted_walks_continue_across_a_map_switch() {
        let mut library = two_map_library();
        let mut quay = library.map("quay").expect("quay").clone();
        quay.cutscene_spaces.insert(
            "5,4".to_string(),
            vec![Scenario {
                required_flags: Vec::new(),
                events: vec![
                    EventStep::ChangeMap {
                        map: "boathouse".to_string(),
                    },
                    EventStep::Walk {
                        who: "hero".to_string(),
                        direction: Direction::Up,
                    },
                    EventStep::AddStoryFlag {
                        flag: "WALKED_IN".to_string(),
                    },
                ],
            }],
        );
        library.insert("quay", quay);
        let mut overworld = Overworld::new(library, "quay").expect("valid library");

        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        run_ticks(&mut overworld, right, 2 * (GRID_SIZE as u32 + 1) + 2);
        assert_eq!(overworld.map_name(), "boathouse");
        // The scripted walk is still draining on the new map.
        assert!(overworld.is_cutscene_playing());

        run_ticks(&mut overworld, InputSnapshot::empty(), GRID_SIZE as u32 + 2);
        assert!(overworld.flags().contains("WALKED_IN"));
        assert_eq!(
            overworld.map().expect_person("hero").pos(),
            grid(5, 5)
        );
        assert!(!overworld.is_cutscene_playing());
    }

    #[test]
    fn draw_emits_layers_people_and_message_in_order() {
        let mut overworld = overworld();
        run_ticks(
            &mut overworld,
            InputSnapshot::empty().with_action_down(InputAction::MoveUp, true),
            1,
        );
        overworld.tick(&confirm());

        let mut sink = RecordingSink::default();
        overworld.draw(&mut sink);

        // Hero sits on the anchor; the deckhand is one cell up.
        let hero_at = format!("person:-@{CAMERA_ANCHOR_X_PX},{CAMERA_ANCHOR_Y_PX}");
        let deckhand_at = format!(
            "person:-@{CAMERA_ANCHOR_X_PX},{}",
            CAMERA_ANCHOR_Y_PX - GRID_SIZE
        );
        assert_eq!(
            sink.calls,
            vec![
                "lower:lower".to_string(),
                deckhand_at,
                hero_at,
                "upper:upper".to_string(),
                "message:Please sign in".to_string(),
            ]
        );
    }

    #[test]
    fn behavior_driven_people_resume_after_the_cutscene() {
        let mut library = two_map_library();
        let mut quay = library.map("quay").expect("quay").clone();
        quay.people.insert(
            "pacer".to_string(),
            PersonConfig {
                behavior_loop: vec![BehaviorStep::Walk {
                    direction: Direction::Right,
                }],
                ..person_config(6, 8)
            },
        );
        library.insert("quay", quay);
        let mut overworld = Overworld::new(library, "quay").expect("valid library");

        run_ticks(
            &mut overworld,
            InputSnapshot::empty().with_action_down(InputAction::MoveUp, true),
            1,
        );
        overworld.tick(&confirm());
        assert!(overworld.is_cutscene_playing());
        // Any in-flight animation settles, then the pacer holds still.
        run_ticks(&mut overworld, InputSnapshot::empty(), GRID_SIZE as u32 + 5);
        let held = overworld.map().expect_person("pacer").pos();

        overworld.tick(&confirm());
        assert!(!overworld.is_cutscene_playing());
        run_ticks(&mut overworld, InputSnapshot::empty(), GRID_SIZE as u32 + 5);
        assert_ne!(overworld.map().expect_person("pacer").pos(), held);
    }

    #[test]
    fn unknown_start_map_is_a_content_error() {
        let error = Overworld::new(two_map_library(), "nowhere").expect_err("must fail");
        assert!(matches!(error, ContentError::UnknownStartMap { .. }));
    }
}
