use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::flags::StoryFlags;
use crate::app::loop_runner::ticks_from_millis;
use crate::app::map::OverworldMap;
use crate::grid::Direction;

/// One atomic cutscene instruction. This is the authored wire format: a
/// `type`-tagged record that round-trips losslessly through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventStep {
    TextMessage {
        text: String,
        #[serde(rename = "faceHero", default, skip_serializing_if = "Option::is_none")]
        face_hero: Option<String>,
    },
    Walk {
        who: String,
        direction: Direction,
    },
    Stand {
        who: String,
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<u32>,
    },
    AddStoryFlag {
        flag: String,
    },
    ChangeMap {
        map: String,
    },
    AbortCutscene,
}

/// A flag-gated event list. The first scenario in authoring order whose
/// requirements are all set is the one that plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(rename = "requiredFlags", default, skip_serializing_if = "Vec::is_empty")]
    pub required_flags: Vec<String>,
    pub events: Vec<EventStep>,
}

pub fn select_scenario<'a>(scenarios: &'a [Scenario], flags: &StoryFlags) -> Option<&'a Scenario> {
    scenarios
        .iter()
        .find(|scenario| flags.satisfies(&scenario.required_flags))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running,
    Done,
    Aborted,
}

/// What a single drive of the sequencer asks of its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerOutcome {
    /// The current step is still waiting on its completion signal.
    Pending,
    /// A `changeMap` step wants the active map swapped; the remaining steps
    /// run against the new map.
    MapChange(String),
    Finished(SequencerState),
}

/// Per-step suspension state. The payload stays in the step list; this only
/// tracks how far the in-flight step has gotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Message,
    Walk { started: bool },
    Stand { ticks_left: Option<u32> },
}

/// Drains one event list, one step at a time, each step suspending the run
/// until its completion signal arrives: a dismiss edge for messages, the
/// move animation finishing for walks, a tick timer for stands. Synchronous
/// steps chain within a single tick. The whole list is single-threaded;
/// steps execute strictly in authoring order.
#[derive(Debug)]
pub struct EventSequencer {
    steps: Vec<EventStep>,
    cursor: usize,
    in_flight: Option<InFlight>,
    state: SequencerState,
}

impl EventSequencer {
    pub fn new(steps: Vec<EventStep>) -> Self {
        Self {
            steps,
            cursor: 0,
            in_flight: None,
            state: SequencerState::Idle,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The dialogue line currently awaiting dismissal, if any.
    pub fn current_message(&self) -> Option<&str> {
        match (self.in_flight, self.steps.get(self.cursor)) {
            (Some(InFlight::Message), Some(EventStep::TextMessage { text, .. })) => {
                Some(text.as_str())
            }
            _ => None,
        }
    }

    /// Advances the run by one tick. `dismiss_pressed` is the external
    /// dismiss edge; it resolves at most one message, and is dropped when no
    /// message is showing.
    pub fn tick(
        &mut self,
        map: &mut OverworldMap,
        flags: &mut StoryFlags,
        mut dismiss_pressed: bool,
    ) -> SequencerOutcome {
        if matches!(self.state, SequencerState::Done | SequencerState::Aborted) {
            return SequencerOutcome::Finished(self.state);
        }
        self.state = SequencerState::Running;

        loop {
            if self.cursor >= self.steps.len() {
                return self.finish(map, SequencerState::Done);
            }

            if self.in_flight.is_none() {
                match &self.steps[self.cursor] {
                    EventStep::TextMessage { face_hero, .. } => {
                        if let Some(who) = face_hero {
                            map.face_toward_player(who);
                        }
                        debug!(step = self.cursor, "message_shown");
                        self.in_flight = Some(InFlight::Message);
                        // A dismiss edge from before the message appeared
                        // must not resolve it.
                        return SequencerOutcome::Pending;
                    }
                    EventStep::Walk { .. } => {
                        self.in_flight = Some(InFlight::Walk { started: false });
                    }
                    EventStep::Stand {
                        who,
                        direction,
                        time,
                    } => {
                        map.face(who, *direction);
                        self.in_flight = Some(InFlight::Stand {
                            ticks_left: time.map(ticks_from_millis),
                        });
                    }
                    EventStep::AddStoryFlag { flag } => {
                        flags.add(flag);
                        info!(flag = %flag, "story_flag_added");
                        self.cursor += 1;
                        continue;
                    }
                    EventStep::ChangeMap { map: target } => {
                        let target = target.clone();
                        self.cursor += 1;
                        return SequencerOutcome::MapChange(target);
                    }
                    EventStep::AbortCutscene => {
                        return self.finish(map, SequencerState::Aborted);
                    }
                }
            }

            let resolved = match self.in_flight.as_mut().expect("in-flight step") {
                InFlight::Message => {
                    if dismiss_pressed {
                        dismiss_pressed = false;
                        true
                    } else {
                        false
                    }
                }
                InFlight::Walk { started } => {
                    let EventStep::Walk { who, direction } = &self.steps[self.cursor] else {
                        unreachable!("walk suspension on a non-walk step");
                    };
                    if *started {
                        !map.expect_person(who).is_moving()
                    } else {
                        // Blocked walks retry until the cell frees up.
                        *started = map.start_move(who, *direction);
                        false
                    }
                }
                InFlight::Stand { ticks_left } => match ticks_left {
                    None => false,
                    Some(0) => true,
                    Some(remaining) => {
                        *remaining -= 1;
                        *remaining == 0
                    }
                },
            };

            if !resolved {
                return SequencerOutcome::Pending;
            }
            self.in_flight = None;
            self.cursor += 1;
        }
    }

    fn finish(&mut self, map: &mut OverworldMap, state: SequencerState) -> SequencerOutcome {
        self.state = state;
        self.in_flight = None;
        map.end_cutscene();
        info!(
            executed = self.cursor,
            total = self.steps.len(),
            aborted = state == SequencerState::Aborted,
            "cutscene_finished"
        );
        SequencerOutcome::Finished(state)
    }
}
