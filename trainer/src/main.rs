use std::env;

use anyhow::{Context, Result};

use trainer::{config::RunConfig, run};

fn main() -> Result<()> {
    env_logger::init();

    let path = env::args().nth(1).context("usage: trainer <run.json>")?;
    let config = RunConfig::load(&path)?;

    run::run(config)
}
