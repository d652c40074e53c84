use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use imagelens::client::AnalysisClient;
use imagelens::config::{Settings, MAX_UPLOAD_BYTES};
use imagelens::server::routes;
use imagelens::session::ClientSession;
use imagelens::util::init_logging;
use std::{env, process};
use tracing::info;

const USAGE: &str = "usage: ./imagelens [port]";

fn get_args(default_port: u16) -> anyhow::Result<u16> {
    let args: Vec<String> = env::args().collect();
    match args.len() - 1 {
        0 => Ok(default_port),
        1 => args[1].parse().context("invalid port"),
        _ => {
            println!("{USAGE}");
            process::exit(1);
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings.log);

    let port = get_args(settings.listen_port)?;

    info!(
        "analysis service {} (bucket {}, region {})",
        settings.endpoint, settings.bucket, settings.region
    );

    // One session for the whole process, shared by every handler
    let session = web::Data::new(ClientSession::new(AnalysisClient::new(
        settings.endpoint.clone(),
    )));
    let settings = web::Data::new(settings);

    info!("serving the upload page on http://127.0.0.1:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(session.clone())
            .app_data(settings.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await?;

    Ok(())
}
