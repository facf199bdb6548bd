use serde::Deserialize;
use stat_edge_detector::experiment::{EdgeExperiment, EdgeMapMeta, EdgeMapSink, ExperimentParams};
use stat_edge_detector::image::{load_grayscale_image, save_binary_map, write_json_file, GrayImageU8};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct ExperimentToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub params: ExperimentParams,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "summary_json")]
    pub summary_json: PathBuf,
    /// Optional directory receiving the best thinned edge map per
    /// (statistic, mask size, MC iteration).
    #[serde(default, rename = "edge_map_dir")]
    pub edge_map_dir: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<ExperimentToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Writes emitted edge maps as PNGs into a fixed directory.
struct DirectorySink {
    dir: PathBuf,
}

impl EdgeMapSink for DirectorySink {
    fn emit(&mut self, meta: &EdgeMapMeta, map: &GrayImageU8) -> Result<(), String> {
        let name = format!(
            "bw_{}_mask{}_mc{}.png",
            meta.statistic.label(),
            meta.mask_size,
            meta.mc_iteration
        );
        save_binary_map(map, &self.dir.join(name))
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: edge_experiment <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let gray = load_grayscale_image(&config.input)?;
    println!(
        "Processing {} ({}x{}) with {} Monte Carlo iterations, masks {:?}",
        config.input.display(),
        gray.width(),
        gray.height(),
        config.params.monte_carlo_iters,
        config.params.mask_sizes
    );

    let mut experiment = EdgeExperiment::new(config.params)?;
    if let Some(dir) = config.output.edge_map_dir.clone() {
        experiment = experiment.with_sink(Box::new(DirectorySink { dir }));
    }

    let report = experiment.run(gray.as_view());
    println!("\nPCM mean ± std per statistic and mask size:");
    print!("{}", report.pivot_table());
    println!("\nTotal {:.1} ms", report.timing.total_ms);

    write_json_file(&config.output.summary_json, &report)?;
    println!("Summary written to {}", config.output.summary_json.display());
    Ok(())
}
