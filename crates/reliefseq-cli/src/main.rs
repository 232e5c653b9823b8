use anyhow::Result;
use log::LevelFilter;

use reliefseq_cli::cli::build_cli;
use reliefseq_cli::select::input::RunConfig;
use reliefseq_cli::select::runner;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("RELIEFSEQ_LOG", "error,reliefseq=info"))
        .init();

    let matches = build_cli().get_matches();

    let params = match RunConfig::from_arguments(&matches) {
        Ok(params) => params,
        Err(e) => {
            log::error!("Invalid arguments: {:#}", e);
            std::process::exit(1)
        }
    };

    match runner::run_selection(&params) {
        Ok(outcome) => {
            log::info!(
                "[ReliefSeq] Done: {} attributes scored, scores written to {}",
                outcome.attributes_scored,
                outcome.scores_path.display()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("ReliefSeq failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
