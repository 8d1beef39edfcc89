use tracing::{error, info, Level};

use seqlog::init::init_tracing_bridge;
use seqlog::logger::Logger;

#[tokio::main]
async fn main() {
    let logger = Logger::to_stdout();
    init_tracing_bridge(logger.clone(), Level::INFO);

    info!("starting service");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    logger.idle().await;
}
