#[tokio::main]
async fn main() {
    if let Err(e) = outage_report::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
