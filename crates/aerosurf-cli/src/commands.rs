//! CLI command implementations.

use std::time::Instant;

use aerosurf_bench::metrics::BenchmarkMetrics;
use aerosurf_bench::runner::BenchmarkRunner;
use aerosurf_bench::scenarios::{Scenario, ScenarioKind};
use aerosurf_io::contract::{lattice_input_from_patch, read_json, write_json};
use aerosurf_io::{validate_fem, validate_model, FemInput, MeshSummary, ModelInput};
use aerosurf_surface::{MeshConfig, MeshPipeline, Surface};
use aerosurf_telemetry::{EventBus, TracingSink};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn load_config(path: Option<&str>) -> Result<MeshConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(MeshConfig::from_file(p)?),
        None => Ok(MeshConfig::default()),
    }
}

fn load_model(path: &str, config: &MeshConfig) -> Result<Vec<Surface>, Box<dyn std::error::Error>> {
    let model: ModelInput = read_json(path)?;
    validate_model(&model)?;
    Ok(model.into_surfaces(config)?)
}

fn pipeline() -> MeshPipeline {
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new(tracing::Level::INFO)));
    MeshPipeline::new(bus)
}

/// Mesh every surface of a model.
pub fn mesh(input: &str, config_path: Option<&str>, output: Option<&str>) -> CmdResult {
    println!("aerosurf Mesh");
    println!("═════════════");
    println!();

    let config = load_config(config_path)?;
    let mut surfaces = load_model(input, &config)?;

    let start = Instant::now();
    let mut pipeline = pipeline();
    let outcome = pipeline.run(&mut surfaces)?;
    pipeline.finish();
    let summary = MeshSummary::from_outcome(outcome, start.elapsed().as_secs_f64());

    for report in &summary.surfaces {
        println!(
            "{:<16} {:>7} nodes {:>7} tris  kutta {:>4}  levels {}  bw {} → {}",
            report.name,
            report.nodes,
            report.triangles,
            report.kutta_nodes,
            report.grid_levels,
            report.bandwidth_before,
            report.bandwidth_after,
        );
    }
    for excluded in &summary.excluded {
        println!("{:<16} excluded: {}", excluded.name, excluded.reason);
    }
    println!();
    println!(
        "Total: {} tris, {} Kutta nodes in {:.3}s",
        summary.total_triangles(),
        summary.total_kutta_nodes(),
        summary.wall_time_seconds,
    );

    if let Some(path) = output {
        write_json(path, &summary)?;
        println!("Summary written to: {path}");
    }

    Ok(())
}

/// Mesh one surface and deform it with a displacement grid.
pub fn deform(
    input: &str,
    surface_name: &str,
    fem_path: &str,
    config_path: Option<&str>,
    output: Option<&str>,
) -> CmdResult {
    println!("aerosurf Deform");
    println!("═══════════════");
    println!();

    let config = load_config(config_path)?;
    let surfaces = load_model(input, &config)?;
    let mut surface = surfaces
        .into_iter()
        .find(|s| s.name() == surface_name)
        .ok_or_else(|| format!("Unknown surface: '{surface_name}'"))?;

    let fem: FemInput = read_json(fem_path)?;
    validate_fem(&fem)?;

    let mut pipeline = pipeline();
    let outcome = pipeline.run(std::slice::from_mut(&mut surface))?;
    if let Some(excluded) = outcome.excluded.first() {
        return Err(format!(
            "Surface '{}' could not be meshed: {}",
            excluded.name, excluded.reason
        )
        .into());
    }

    surface.load_fem_deformation_data(fem.into_grid()?)?;
    let max_displacement = pipeline.deform(&mut surface)?;
    pipeline.finish();

    println!("Surface:       {}", surface.name());
    println!("Max displace:  {max_displacement:.6}");
    if let Some((lo, hi)) = surface.bounding_box() {
        println!(
            "Bounds:        [{:.4}, {:.4}, {:.4}] to [{:.4}, {:.4}, {:.4}]",
            lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
        );
    }

    if let Some(path) = output {
        write_json(path, &lattice_input_from_patch(surface.patch()))?;
        println!("Deformed lattice written to: {path}");
    }

    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(scenario_name: &str, output_path: Option<&str>) -> CmdResult {
    println!("aerosurf Benchmark Suite");
    println!("════════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        match ScenarioKind::from_name(scenario_name) {
            Some(kind) => vec![kind],
            None => {
                let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                eprintln!("Unknown scenario: {scenario_name}");
                eprintln!("Available: {}, all", available.join(", "));
                return Err("Unknown scenario".into());
            }
        }
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let scenario = Scenario::from_kind(kind);

        println!(
            "Running: {} ({} × {} lattice)",
            kind.name(),
            scenario.patch.surface_num_i(),
            scenario.patch.surface_num_j(),
        );

        let metrics =
            BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Mesh:          {:.3}ms ({} tris)", metrics.mesh_time * 1000.0, metrics.triangles);
        println!("  Agglomerate:   {:.3}ms ({} levels)", metrics.agglomerate_time * 1000.0, metrics.grid_levels);
        println!("  Bandwidth:     {} → {}", metrics.bandwidth_before, metrics.bandwidth_after);
        if metrics.deform_time > 0.0 {
            println!("  Deform:        {:.3}ms", metrics.deform_time * 1000.0);
            println!("  Undeform err:  {:.3e}", metrics.max_undeform_error);
        }
        println!();

        all_metrics.push(metrics);
    }

    // Output CSV
    if let Some(path) = output_path {
        let csv = BenchmarkMetrics::to_csv(&all_metrics);
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
    }

    Ok(())
}

/// Validate a configuration or model file.
pub fn validate(path: &str) -> CmdResult {
    println!("aerosurf Validator");
    println!("──────────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating config: {path}");
        match MeshConfig::from_file(path) {
            Ok(_) => println!("✅ Config is valid."),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    } else if path.ends_with(".json") {
        println!("Validating model: {path}");
        let model: ModelInput = read_json(path)?;
        match validate_model(&model) {
            Ok(()) => {
                let lattices: usize = model
                    .surfaces
                    .iter()
                    .filter_map(|s| s.geometry.as_ref())
                    .map(|g| g.len())
                    .sum();
                println!(
                    "✅ Model is valid ({} surfaces, {} lattice points).",
                    model.surfaces.len(),
                    lattices
                );
            }
            Err(e) => println!("❌ Model validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (config) or .json (model).");
    }

    Ok(())
}
