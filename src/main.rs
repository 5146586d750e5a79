use log::{error, info, warn};
use particle_field::controller::{ControllerCommand, ParticlesController};
use particle_field::field_params::FieldParams;
use particle_field::fps_estimator::FpsEstimator;
use particle_field::raster::RasterCanvas;
use particle_field::sprite::Sprite;
use std::io::BufRead;

gflags::define! {
    --config: &str = "field_config.toml"
}
gflags::define! {
    /// Frames to run; 0 uses the config file.
    --frames: u32 = 0
}
gflags::define! {
    /// Write a PNG every N frames; 0 uses the config file.
    --snapshot_every: u32 = 0
}
gflags::define! {
    --out_dir: &str = ""
}
gflags::define! {
    /// Press the next toggle button every N frames.
    --cycle_every: u32 = 0
}
gflags::define! {
    /// Read mist/smoke/scatter/next/<index> lines from stdin.
    --interactive = false
}
gflags::define! {
    /// Seed for reproducible runs; 0 draws from entropy.
    --seed: u64 = 0
}
gflags::define! {
    --log_filter: &str = "warn,particle_field=info"
}
gflags::define! {
    -h, --help = false
}

const PUFF_SIZE: u32 = 128;

fn read_config_from_file(path: &str) -> anyhow::Result<FieldParams> {
    let params = std::fs::read_to_string(path)?.parse()?;
    Ok(params)
}

fn get_field_config() -> FieldParams {
    match read_config_from_file(CONFIG.flag) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to parse config file({}): {:?}", CONFIG.flag, e);
            particle_field::field_params::get_config_from_default_file()
        }
    }
}

fn load_sprite(params: &FieldParams) -> Option<Sprite> {
    if let Some(path) = &params.sprite_path {
        match Sprite::load(path) {
            Ok(sprite) => return Some(sprite),
            Err(e) => warn!("Failed to load sprite {}: {}, using a puff", path, e),
        }
    }
    match Sprite::puff(PUFF_SIZE) {
        Ok(sprite) => Some(sprite),
        Err(e) => {
            error!("Failed to build the default sprite: {}", e);
            None
        }
    }
}

fn parse_command(line: &str) -> Option<ControllerCommand> {
    match line.trim() {
        "" => None,
        "next" => Some(ControllerCommand::Cycle),
        word => match word.parse::<usize>() {
            Ok(index) => Some(ControllerCommand::Select(index)),
            Err(_) => Some(ControllerCommand::SelectKind(word.to_string())),
        },
    }
}

// Stands in for the toggle buttons: every stdin line is a button press.
fn start_stdin_thread(handle: crossbeam_channel::Sender<ControllerCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Stopped reading stdin: {}", e);
                    break;
                }
            };
            if let Some(command) = parse_command(&line) {
                if handle.send(command).is_err() {
                    break;
                }
            }
        }
    });
}

fn main() -> anyhow::Result<()> {
    gflags::parse();
    if HELP.flag {
        gflags::print_help_and_exit(0);
    }
    scrub_log::init_with_filter_string(LOG_FILTER.flag)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {:?}", e))?;

    let params = get_field_config();
    let frames = if FRAMES.flag > 0 {
        FRAMES.flag
    } else {
        params.render.frames
    };
    let snapshot_every = if SNAPSHOT_EVERY.flag > 0 {
        SNAPSHOT_EVERY.flag
    } else {
        params.render.snapshot_every
    };
    let out_dir = if OUT_DIR.flag.is_empty() {
        std::path::PathBuf::from(&params.render.output_dir)
    } else {
        std::path::PathBuf::from(OUT_DIR.flag)
    };
    if snapshot_every > 0 {
        std::fs::create_dir_all(&out_dir)?;
    }
    let seed = if SEED.flag == 0 { None } else { Some(SEED.flag) };

    let canvas = RasterCanvas::new(params.canvas_width, params.canvas_height)?;
    let mut controller = ParticlesController::new(
        canvas,
        params.presets.clone(),
        params.fps,
        load_sprite(&params),
        seed,
    );
    let handle = controller.handle();
    if INTERACTIVE.flag {
        start_stdin_thread(controller.handle());
    }

    info!(
        "Running {} frames at {} fps on a {}x{} surface",
        frames, params.fps, params.canvas_width, params.canvas_height
    );
    let mut fps = FpsEstimator::new(params.fps);
    let report_every = std::cmp::max(1, params.fps.round() as u32);
    for frame in 0..frames {
        if CYCLE_EVERY.flag > 0 && frame > 0 && frame % CYCLE_EVERY.flag == 0 {
            handle.send(ControllerCommand::Cycle)?;
        }
        controller.tick();

        if snapshot_every > 0 && frame % snapshot_every == 0 {
            if let Some(canvas) = controller.canvas() {
                let path = out_dir.join(format!("frame_{:05}.png", frame));
                match canvas.save_png(&path) {
                    Ok(()) => info!("Wrote {:?}", path),
                    Err(e) => error!("Failed to write {:?}: {}", path, e),
                }
            }
        }

        let delta_t = fps.tick();
        if (frame + 1) % report_every == 0 {
            let field = controller.field();
            info!(
                "Frame {}: {:.1} fps (last {:?}), {} x {:?}, {} respawns",
                frame + 1,
                fps.fps(),
                delta_t,
                field.len(),
                field.kind(),
                field.stats().respawns
            );
        }
    }

    if controller.destroy().is_none() {
        warn!("Particle surface was already released");
    }
    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_config() {
        let deserialized_config = read_config_from_file(CONFIG.flag).unwrap();
        println!("deserialized = {:?}", deserialized_config);
        assert!(!deserialized_config.presets.is_empty());
    }

    #[test]
    fn parses_button_presses() {
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("next"), Some(ControllerCommand::Cycle));
        assert_eq!(parse_command("2\n"), Some(ControllerCommand::Select(2)));
        assert_eq!(
            parse_command("smoke"),
            Some(ControllerCommand::SelectKind("smoke".to_string()))
        );
    }

    #[test]
    fn sprite_falls_back_to_puff() {
        let params = FieldParams {
            sprite_path: Some("no/such/sprite.png".to_string()),
            ..FieldParams::default()
        };
        let sprite = load_sprite(&params).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (PUFF_SIZE, PUFF_SIZE));
    }
}
