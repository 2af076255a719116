use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = tv_bridge::cli::Cli::parse();
    if let Err(e) = tv_bridge::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
