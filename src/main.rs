//! Application entry point loading the blog configuration.
use goblog::models::config::ServerConfig;

fn main() {
    // Initialize logger with default level INFO if not provided.
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {}", err);
            std::process::exit(1);
        }
    };

    log::info!(
        "Configuration loaded: env={} port={} base_url={} db_path={} upload_dir={}",
        server_config.env,
        server_config.port,
        server_config.base_url,
        server_config.db_path.display(),
        server_config.upload_dir.display(),
    );
}
