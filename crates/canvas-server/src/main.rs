use canvas_server::ServerConfig;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Canvas assistant starting...");

    let config = match ServerConfig::load().await {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = canvas_server::serve(config).await {
        log::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
