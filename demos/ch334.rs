use pinout2kicad_rs::generate_library;
use std::{path::Path, time::Instant};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_time = Instant::now();
    match generate_library(
        Path::new("demos/data/CH334.csv"),
        Path::new("demos/data/ch334.json"),
        Path::new("example_lib"),
    )
    .await
    {
        Ok(report) => {
            println!("Wrote {:?} to {:?}", report.written, report.library);
            for (device, e) in &report.failed {
                eprintln!("Skipped {}: {}", device, e);
            }
        }
        Err(e) => eprintln!("Error generating library: {}", e),
    }

    println!("Done in : {:?}", start_time.elapsed());
}
