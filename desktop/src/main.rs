use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::commands::{parse_command, App, Flow};
use crate::config::AppConfig;
use crate::error::AppError;

mod animation;
mod commands;
mod config;
mod error;
mod logging;

fn prompt() {
    print!("roulette> ");
    if let Err(err) = std::io::stdout().flush() {
        debug!("stdout flush failed: {}", err);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logging::setup()?;
    run().await?;
    Ok(())
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    info!(
        "starting with {} weighting, elimination {}, {} ms spins",
        config.settings.weight_mode,
        if config.settings.elimination_mode { "on" } else { "off" },
        config.settings.spin_duration.as_millis()
    );

    let mut app = App::new(config);
    println!("🎡 Prize wheel. Type help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            let outcome = match parse_command(&line) {
                Ok(command) => app.execute(command).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => {
                    debug!("command failed: {}", err);
                    println!("error: {}", err);
                }
            }
        }
        prompt();
    }

    info!("bye");
    Ok(())
}
