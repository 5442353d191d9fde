use crate::app::EventStep;
use crate::grid::GridPos;

use super::loader::ContentError;
use super::types::{MapConfig, MapLibrary};

/// Authoring-error sweep over a whole library. Every event list is walked
/// with the map it would actually run against, tracking `changeMap` steps,
/// so an actor reference is checked against the roster that will be live
/// when the step executes.
pub fn validate_library(library: &MapLibrary) -> Result<(), ContentError> {
    if library.is_empty() {
        return Err(ContentError::EmptyLibrary);
    }

    for (name, config) in library.iter() {
        validate_roster(name, config)?;
        validate_space_keys(name, config)?;

        for person in config.people.values() {
            for scenario in &person.talking {
                validate_events(library, name, &scenario.events)?;
            }
        }
        for scenarios in config.cutscene_spaces.values() {
            for scenario in scenarios {
                validate_events(library, name, &scenario.events)?;
            }
        }
    }
    Ok(())
}

fn validate_roster(name: &str, config: &MapConfig) -> Result<(), ContentError> {
    let players = config
        .people
        .values()
        .filter(|person| person.is_player_controlled)
        .count();
    match players {
        0 => Err(ContentError::NoPlayer {
            map: name.to_string(),
        }),
        1 => Ok(()),
        _ => Err(ContentError::MultiplePlayers {
            map: name.to_string(),
        }),
    }
}

fn validate_space_keys(name: &str, config: &MapConfig) -> Result<(), ContentError> {
    for key in config.cutscene_spaces.keys() {
        if GridPos::parse_key(key).is_none() {
            return Err(ContentError::BadCoordKey {
                map: name.to_string(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}

fn validate_events(
    library: &MapLibrary,
    home: &str,
    events: &[EventStep],
) -> Result<(), ContentError> {
    let mut current = home.to_string();
    for step in events {
        match step {
            EventStep::Walk { who, .. } | EventStep::Stand { who, .. } => {
                ensure_actor(library, &current, who)?;
            }
            EventStep::TextMessage {
                face_hero: Some(who),
                ..
            } => {
                ensure_actor(library, &current, who)?;
            }
            EventStep::ChangeMap { map: target } => {
                if !library.contains(target) {
                    return Err(ContentError::UnknownMap {
                        map: current,
                        target: target.clone(),
                    });
                }
                current = target.clone();
            }
            EventStep::TextMessage { face_hero: None, .. }
            | EventStep::AddStoryFlag { .. }
            | EventStep::AbortCutscene => {}
        }
    }
    Ok(())
}

fn ensure_actor(library: &MapLibrary, map: &str, who: &str) -> Result<(), ContentError> {
    let config = library.map(map).expect("current map exists");
    if config.people.contains_key(who) {
        Ok(())
    } else {
        Err(ContentError::UnknownActor {
            map: map.to_string(),
            who: who.to_string(),
        })
    }
}
