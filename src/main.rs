//! Fireworks viewer binary: loads options or a preset and runs the viewer.

use std::path::{Path, PathBuf};

use fireworks::{Options, Viewer};

const PRESETS_DIR: &str = "assets/presets";

fn usage() {
    log::error!("Usage: fireworks [OPTIONS.toml | PRESET] [ASSET_ROOT]");
    let presets = Options::list_presets(Path::new(PRESETS_DIR));
    if !presets.is_empty() {
        log::error!("Available presets: {}", presets.join(", "));
    }
}

/// Resolve the first argument as a TOML file or a preset name.
fn resolve_options(arg: &str) -> Option<PathBuf> {
    let direct = PathBuf::from(arg);
    if direct.is_file() {
        return Some(direct);
    }
    let preset = Path::new(PRESETS_DIR).join(format!("{arg}.toml"));
    preset.is_file().then_some(preset)
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let options = match args.next() {
        Some(arg) if arg == "-h" || arg == "--help" => {
            usage();
            return;
        }
        Some(arg) => {
            let Some(path) = resolve_options(&arg) else {
                log::error!("no options file or preset named '{arg}'");
                usage();
                std::process::exit(1);
            };
            match Options::load(&path) {
                Ok(options) => {
                    log::info!("loaded options from {}", path.display());
                    options
                }
                Err(e) => {
                    log::error!("{e}");
                    std::process::exit(1);
                }
            }
        }
        None => Options::default(),
    };
    let asset_root = args.next().unwrap_or_else(|| ".".to_owned());

    let result = Viewer::builder()
        .with_options(options)
        .with_asset_root(asset_root)
        .build()
        .run();

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
