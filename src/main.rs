use anyhow::Result;
use clap::Parser;
use suvi_forge::cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::info!("CLI arguments parsed, invoking run");

    let report = run(cli).await?;
    println!("GIF created: {}", report.output.display());
    println!(
        "frames: {}, delay: {} ms, size: {} bytes",
        report.frame_count, report.delay_ms, report.bytes
    );
    if let Some(dir) = &report.frames_dir {
        println!("frames kept in: {}", dir.display());
    }
    Ok(())
}
