use anyhow::{ensure, Context, Result};
use log::info;
use rayon::ThreadPoolBuilder;

use simplicity_rs::{logging::setup_logging, BatchScorer, Config};

fn main() -> Result<()> {
    let config = Config::new();
    let _logger = setup_logging(&config.log_level, config.log_dir.as_deref())
        .context("Failed to initialise logging")?;

    ensure!(config.input.exists(), "Input path does not exist");
    config
        .simplicity_config()
        .validate()
        .context("Invalid simplicity parameters")?;

    if config.num_threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .build_global()?;
    }

    let scorer = BatchScorer::from_config(&config)?;
    let scores = scorer
        .run(&config.input)
        .with_context(|| format!("Failed to score {}", config.input.display()))?;

    for scored in &scores {
        println!("{}\t{:.6}", scored.path.display(), scored.score);
    }
    info!("scored {} images", scores.len());

    Ok(())
}
