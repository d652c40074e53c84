//! Entrypoint to analyze one image from the command line. Prints the
//! rendered results to stdout

use imagelens::client::AnalysisClient;
use imagelens::config::Settings;
use imagelens::selection::FileInput;
use imagelens::session::{ClientSession, Phase};
use imagelens::util::init_logging;
use std::{env, process};

const USAGE: &str = "usage: ./analyze <image file>";

fn get_args() -> String {
    let args: Vec<String> = env::args().collect();
    if args.len() - 1 != 1 {
        println!("{USAGE}");
        process::exit(1);
    }

    args[1].clone()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings.log);

    let path = get_args();
    let session = ClientSession::new(AnalysisClient::new(settings.endpoint));

    if let Err(err) = session.select_file(Some(FileInput::from_path(&path))).await {
        eprintln!("{path}: {err}");
        process::exit(1);
    }

    session.analyze().await;
    println!("{}", session.results_html());

    if session.view().phase == Phase::Errored {
        process::exit(2);
    }
    Ok(())
}
