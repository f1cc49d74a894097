#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = certprep::run().await {
        eprintln!("certprep fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
