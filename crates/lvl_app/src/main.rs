use std::process::ExitCode;

use log::{error, info};
use lvl_assets::LevelLoader;
use lvl_scene::{ImportConfig, Importer, MemorySink, SceneSink};

mod cli;
mod dir_sink;
mod error;

use cli::{Args, load_config};
use dir_sink::DirectorySink;
use error::AppError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(msg)) => {
            eprintln!("{msg}\n{}", cli::USAGE);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: impl IntoIterator<Item = String>) -> Result<(), AppError> {
    let args = Args::parse(args)?;
    let config = load_config(&args)?;

    // Dedicated IO pool, the level is parsed off the main thread
    let io_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("lvl-io")
        .build()
        .map_err(AppError::Runtime)?;
    let loader = LevelLoader::new(io_runtime.handle().clone());
    let source = loader
        .load(&args.level)
        .wait(config.poll_interval(), config.load_timeout())?;

    if args.dry_run {
        let mut sink = MemorySink::new();
        import(&source, &mut sink, config)?;
        info!(
            "Dry run: {} scenes, {} textures, {} materials",
            sink.scenes.len(),
            sink.textures.len(),
            sink.materials.len()
        );
    } else {
        import(&source, &mut DirectorySink, config)?;
    }
    Ok(())
}

fn import(
    source: &lvl_assets::MemorySource,
    sink: &mut dyn SceneSink,
    config: ImportConfig,
) -> Result<(), AppError> {
    let mut importer = Importer::new(source, sink, config);
    importer.import_level()?;
    Ok(())
}
