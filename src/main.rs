// src/main.rs

use testherd::{EXIT_INTERNAL_ERROR, cli, exit_code, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("testherd error: {err:?}");
            std::process::exit(EXIT_INTERNAL_ERROR);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    Ok(run(args).await?.map_or(0, exit_code))
}
