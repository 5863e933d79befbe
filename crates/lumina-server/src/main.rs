use clap::Parser;
use std::io;
use std::path::PathBuf;

use lumina_core::paths;
use lumina_server::logging::init_logging;
use lumina_server::{run_server, AppState};

#[derive(Parser, Debug, Clone)]
#[command(name = "lumina-server")]
#[command(about = "Lumina builder HTTP server")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Directory holding settings.json (defaults to ~/.lumina)
    #[arg(long, env = "LUMINA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.log_level.is_some() {
        env_logger::init();
    } else {
        init_logging(cli.debug);
    }

    let data_dir = match cli.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            dir
        }
        None => paths::ensure_lumina_dir()?,
    };
    log::info!("Data directory: {:?}", data_dir);

    if cli.debug {
        log::debug!("Debug mode enabled");
        log::debug!("  Port: {}", cli.port);
    }

    let state = AppState::load(Some(data_dir));
    run_server(cli.port, state).await
}
