use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod grid;

pub use app::{
    camera_offset, run_session, select_scenario, ticks_from_millis, to_screen_px, AppError,
    BehaviorStep, ControlMode, EventSequencer, EventStep, InputAction, InputSnapshot, InputSource,
    LoopConfig, LoopMetricsSnapshot, MoveProgress, NullRenderSink, Overworld, OverworldMap,
    Person, RenderSink, Scenario, SequencerOutcome, SequencerState, StoryFlags, TickReport,
    CAMERA_ANCHOR_X_PX, CAMERA_ANCHOR_Y_PX, TICKS_PER_SECOND, WALK_SPEED_PX_PER_TICK,
};
pub use content::{
    load_map_library, validate_library, ContentError, MapConfig, MapLibrary, PersonConfig,
};
pub use grid::{to_pixels, Direction, GridPos, GRID_SIZE};

pub const ROOT_ENV_VAR: &str = "OVERWORLD_ROOT";

const MAP_LIBRARY_FILE: &str = "maps.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub map_library_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "{env_var} is set but does not point to a project root: {path}\n\
A root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot {
        env_var: &'static str,
        path: PathBuf,
    },
    #[error(
        "could not find a project root above {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/; \
set {env_var} to point at one explicitly."
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Locates the project root (env override first, then walking up from the
/// executable) and derives the content paths under it.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let assets_dir = root.join("assets");
    let map_library_file = assets_dir.join(MAP_LIBRARY_FILE);
    Ok(AppPaths {
        root,
        assets_dir,
        map_library_file,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let candidate = normalize_path(Path::new(&value));
            if is_project_root(&candidate) {
                Ok(candidate)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    env_var: ROOT_ENV_VAR,
                    path: candidate,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_project_root(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_root_requires_cargo_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("assets")).expect("mkdir");
        assert!(!is_project_root(dir.path()));
    }

    #[test]
    fn project_root_accepts_assets_or_crates_siblings() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("write");
        assert!(!is_project_root(dir.path()));

        fs::create_dir(dir.path().join("assets")).expect("mkdir");
        assert!(is_project_root(dir.path()));
    }
}
