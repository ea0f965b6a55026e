//! Headless platformer runner: loads a level playlist, simulates a fixed
//! stretch of play with scripted intents, and reports HUD lines.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use gridiron::{
    AssetError, DiskProvider, Intents, LevelError, ResourceProvider, SaveError, SaveGame, World,
};

pub const DEFAULT_SECONDS: f32 = 10.0;
pub const DEFAULT_TICK: f32 = 1.0 / 60.0;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub assets: PathBuf,
    pub levels: Vec<PathBuf>,
    pub start_level: usize,
    pub seconds: f32,
    pub tick: f32,
    pub walk_right: bool,
    pub jump_every: Option<f32>,
    pub save_in: Option<PathBuf>,
    pub save_out: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("."),
            levels: Vec::new(),
            start_level: 0,
            seconds: DEFAULT_SECONDS,
            tick: DEFAULT_TICK,
            walk_right: false,
            jump_every: None,
            save_in: None,
            save_out: None,
        }
    }
}

/// Run with the default on-disk PNG provider rooted at `options.assets`.
pub fn run(options: RunOptions, out: &mut impl Write) -> Result<(), RunError> {
    let provider = Box::new(DiskProvider::new(options.assets.clone()));
    run_with_provider(options, provider, out)
}

pub fn run_with_provider(
    options: RunOptions,
    provider: Box<dyn ResourceProvider>,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let mut world = World::new(provider)?;
    world.set_playlist(options.levels.clone());

    if let Some(path) = &options.save_in {
        let text = fs::read_to_string(path)?;
        let save = SaveGame::from_json(&text)?;
        world.restore_save(&save)?;
        info!(level = world.current_level(), "session_restored");
    } else {
        world.load_level(options.start_level)?;
    }

    // Reports are scheduled by tick count: accumulated f32 ticks land
    // just short of whole seconds, so a time comparison would skip the
    // boundary.
    let ticks_per_report = (1.0 / options.tick).round().max(1.0) as u64;
    let mut elapsed = 0.0_f32;
    let mut ticks = 0_u64;
    let mut since_jump = 0.0_f32;
    while elapsed + 1e-6 < options.seconds {
        let step = options.tick.min(options.seconds - elapsed);

        let mut intents = Intents::empty().with_right(options.walk_right);
        if let Some(every) = options.jump_every {
            since_jump += step;
            if since_jump >= every {
                intents = intents.with_jump(true);
                since_jump = 0.0;
            }
        }

        world.advance(step, intents);
        elapsed += step;
        ticks += 1;

        if ticks % ticks_per_report == 0 {
            report(&world, elapsed, out)?;
        }
    }
    if ticks % ticks_per_report != 0 {
        report(&world, elapsed, out)?;
    }

    if let Some(path) = &options.save_out {
        let json = world.capture_save().to_json()?;
        fs::write(path, json)?;
        info!(path = %path.display(), "session_saved");
    }
    Ok(())
}

fn report(world: &World, elapsed: f32, out: &mut impl Write) -> Result<(), RunError> {
    let hud = world.hud();
    let position = world.player().position();
    writeln!(
        out,
        "t={elapsed:.2} level={} score={} x={:.1} y={:.1}{}",
        world.current_level() + 1,
        hud.score,
        position.x,
        position.y,
        hud.message
            .map(|message| format!(" [{message}]"))
            .unwrap_or_default(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use gridiron::assets::FixedSizeProvider;
    use tempfile::TempDir;

    use super::*;

    const LEVEL: &str = r#"<level width="2048" height="1024" start-x="450" start-y="400">
        <declarations>
            <platform id="p1" left-image="l.png" mid-image="m.png" right-image="r.png"/>
        </declarations>
        <items>
            <platform id="p1" x="450" y="500" width="512"/>
        </items>
    </level>"#;

    fn options_with_level(dir: &TempDir) -> RunOptions {
        let level_path = dir.path().join("level1.xml");
        fs::write(&level_path, LEVEL).expect("write level");
        RunOptions {
            levels: vec![level_path],
            seconds: 2.0,
            ..RunOptions::default()
        }
    }

    #[test]
    fn headless_run_reports_hud_lines() {
        let dir = TempDir::new().expect("tempdir");
        let options = options_with_level(&dir);
        let mut out = Vec::new();

        run_with_provider(
            options,
            Box::new(FixedSizeProvider::new((32, 32))),
            &mut out,
        )
        .expect("run");

        let text = String::from_utf8(out).expect("utf8");
        // One line per whole second, landing exactly on the boundary.
        assert!(text.contains("t=1.00"), "output was: {text}");
        assert!(text.contains("t=2.00"), "output was: {text}");
        assert_eq!(text.lines().count(), 2, "output was: {text}");
        assert!(text.contains("level=1 score=0"));
    }

    #[test]
    fn save_out_then_save_in_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let save_path = dir.path().join("session.json");

        let mut options = options_with_level(&dir);
        options.walk_right = true;
        options.save_out = Some(save_path.clone());
        let mut out = Vec::new();
        run_with_provider(
            options.clone(),
            Box::new(FixedSizeProvider::new((32, 32))),
            &mut out,
        )
        .expect("first run");
        assert!(save_path.exists());

        options.save_out = None;
        options.save_in = Some(save_path);
        options.seconds = 0.5;
        let mut out = Vec::new();
        run_with_provider(
            options,
            Box::new(FixedSizeProvider::new((32, 32))),
            &mut out,
        )
        .expect("second run");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("t=0.50"), "output was: {text}");
    }

    #[test]
    fn missing_level_file_is_a_load_error() {
        let options = RunOptions {
            levels: vec![PathBuf::from("/nonexistent/level.xml")],
            seconds: 0.1,
            ..RunOptions::default()
        };
        let mut out = Vec::new();
        let err = run_with_provider(
            options,
            Box::new(FixedSizeProvider::new((32, 32))),
            &mut out,
        )
        .expect_err("err");
        assert!(matches!(err, RunError::Level(LevelError::Read { .. })));
    }
}
