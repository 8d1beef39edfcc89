use seqlog::builder::LogRecordBuilder;
use seqlog::log;
use seqlog::logger::Logger;

#[tokio::main]
async fn main() {
    let logger = Logger::to_stdout();

    log!(logger, "starting service");
    log!(logger, "listening on", 3000, serde_json::json!({ "tls": false }));

    logger.log_custom(
        LogRecordBuilder::new()
            .value("certificate expires soon")
            .severity(2)
            .lifespan("2026-12-31T00:00:00Z")
            .tag("tls"),
    );

    // Wait until every record has hit stdout before exiting.
    logger.idle().await;
}
