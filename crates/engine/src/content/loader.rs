use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::types::MapLibrary;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read map library at {path}: {source}")]
    ReadLibrary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map library at {path}: {source}")]
    ParseLibrary {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    #[error("map library declares no maps")]
    EmptyLibrary,
    #[error("map '{map}' declares no player-controlled person")]
    NoPlayer { map: String },
    #[error("map '{map}' declares more than one player-controlled person")]
    MultiplePlayers { map: String },
    #[error("map '{map}' has an unparseable cutscene space key '{key}'")]
    BadCoordKey { map: String, key: String },
    #[error("an event list reaching map '{map}' names unknown actor '{who}'")]
    UnknownActor { map: String, who: String },
    #[error("an event list in map '{map}' switches to unknown map '{target}'")]
    UnknownMap { map: String, target: String },
    #[error("unknown start map '{name}'")]
    UnknownStartMap { name: String },
}

/// Reads one JSON object of map name to map config. Parse failures report
/// the JSON path that went wrong. The result is raw authoring data; it
/// still has to pass validation before an overworld will accept it.
pub fn load_map_library(path: &Path) -> Result<MapLibrary, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::ReadLibrary {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let library: MapLibrary =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
            ContentError::ParseLibrary {
                path: path.to_path_buf(),
                source,
            }
        })?;
    info!(path = %path.display(), maps = library.len(), "map_library_loaded");
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIBRARY_JSON: &str = r#"{
        "cove": {
            "lowerSrc": "maps/cove_lower",
            "upperSrc": "maps/cove_upper",
            "people": {
                "hero": { "x": 1, "y": 1, "isPlayerControlled": true }
            }
        }
    }"#;

    fn write_library(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("maps.json");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(contents.as_bytes()).expect("write");
        (dir, path)
    }

    #[test]
    fn loads_a_library_from_disk() {
        let (_dir, path) = write_library(LIBRARY_JSON);
        let library = load_map_library(&path).expect("load");
        assert_eq!(library.len(), 1);
        assert!(library.contains("cove"));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        let error = load_map_library(&path).expect_err("must fail");
        assert!(matches!(error, ContentError::ReadLibrary { .. }));
        assert!(error.to_string().contains("absent.json"));
    }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let broken = LIBRARY_JSON.replace("\"x\": 1", "\"x\": \"east\"");
        let (_dir, path) = write_library(&broken);
        let error = load_map_library(&path).expect_err("must fail");
        let ContentError::ParseLibrary { source, .. } = &error else {
            panic!("unexpected error {error:?}");
        };
        assert_eq!(source.path().to_string(), "cove.people.hero.x");
    }
}
