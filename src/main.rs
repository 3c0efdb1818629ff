use std::time::Instant;

use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, info, LevelFilter};
use sysinfo::{get_current_pid, ProcessExt, System, SystemExt};

use medical_data_visualizer::{MedicalVisualizer, VisualizerArgs, VisualizerConfig};

fn monitor_memory() -> u64 {
    /* Resident memory of this process in bytes, 0 when it cannot be read */
    let mut system = System::new();
    match get_current_pid() {
        Ok(pid) => {
            system.refresh_process(pid);
            system.process(pid).map(|p| p.memory()).unwrap_or(0)
        }
        Err(_) => 0,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = VisualizerArgs::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let env = Env::new().filter("MEDVIZ_LOG");
    Builder::new()
        .filter(Some("medical_data_visualizer"), log_level)
        .filter(Some("medviz"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", cli);

    let start_time = Instant::now();
    let start_memory = monitor_memory();

    let config = VisualizerConfig::from_args(&cli)?;
    let visualizer = MedicalVisualizer::load(config).await?;
    let summary = visualizer.run()?;

    if cli.summary {
        println!("{}", summary.to_json()?);
    }

    let end_memory = monitor_memory();
    let duration = start_time.elapsed();

    info!("Time elapsed: {:?}", duration);
    info!(
        "Memory used: {} KiB",
        end_memory.saturating_sub(start_memory) / 1024
    );

    Ok(())
}
