use clap::Parser;
use rustkv::{server, Error};

const ADDRESS: &str = "0.0.0.0:8000";

#[derive(Parser, Debug)]
struct Args {
    /// The address and port to listen on
    #[arg(short, long, default_value = ADDRESS)]
    address: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    server::run(&args.address).await
}
