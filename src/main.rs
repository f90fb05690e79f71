use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = agri_records::Cli::parse();
    std::process::exit(agri_records::run(cli).await);
}
