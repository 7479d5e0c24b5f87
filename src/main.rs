use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::error;
use tracing_subscriber::EnvFilter;

use valvegen::{
    config::{self, ArcMode, InputSettings},
    mesher,
    properties::{self, GeometricProperties},
    serializer::{self, ModelFiles},
    Result, Severity, ValveModel,
};

#[derive(Parser, Debug)]
#[command(name = "valvegen")]
#[command(version, about = "Generates 2D three-leaflet valve geometry for immersed-boundary solvers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the .vertex, .spring and .beam files for one severity
    Generate {
        /// Number of points per leaflet
        #[arg(short, long)]
        resolution: Option<usize>,

        /// Disease severity: healthy, mild, moderate or severe
        #[arg(short, long, default_value = "healthy")]
        severity: String,

        /// Output file prefix
        #[arg(short, long, default_value = "valve2d")]
        output_prefix: String,

        /// JSON input file with geometry and profile overrides
        #[arg(short, long)]
        config: Option<String>,

        /// Scale leaflet deflection by the nominal arc width
        #[arg(long)]
        confine_arc: bool,
    },

    /// Read generated files back and report geometric properties
    Inspect {
        /// Prefix of the .vertex, .spring and .beam files
        #[arg(short, long)]
        prefix: String,
    },

    /// Compare geometric properties across severities
    Compare {
        /// Comma-separated severities
        #[arg(short, long, default_value = "healthy,mild,moderate,severe")]
        severities: String,

        /// Number of points per leaflet
        #[arg(short, long)]
        resolution: Option<usize>,

        /// JSON input file with geometry and profile overrides
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_settings(config_file: Option<&str>, resolution: Option<usize>) -> Result<InputSettings> {
    let mut settings = match config_file {
        Some(path) => config::load_input_file(path)?,
        None => InputSettings::default(),
    };
    if let Some(n) = resolution {
        settings.config.points_per_leaflet = n;
    }
    Ok(settings)
}

fn print_summary(model: &ValveModel, files: &ModelFiles) {
    let summary = model.summary();
    let profile = model.profile();
    println!("\nGeometry Summary:");
    println!("  Disease severity: {}", profile.severity);
    println!("  Total vertices: {}", summary.vertices);
    println!(
        "  Total springs: {} ({} longitudinal, {} cross)",
        summary.springs, summary.longitudinal_springs, summary.cross_springs
    );
    println!("  Total beams: {}", summary.beams);
    println!("  Spring stiffness: {:.2e}", profile.spring_stiffness);
    println!("  Beam rigidity: {:.2e}", profile.beam_rigidity);
    println!("  Leaflet mobility factor: {:.2}", profile.mobility_factor);
    println!(
        "  Files: {}, {}, {}",
        files.vertex.display(),
        files.spring.display(),
        files.beam.display()
    );
}

fn print_properties(props: &GeometricProperties) {
    println!("\nGeometric Properties:");
    println!(
        "  center: ({:.6}, {:.6})",
        props.center.x, props.center.y
    );
    println!("  min_radius: {:.6}", props.min_radius);
    println!("  max_radius: {:.6}", props.max_radius);
    println!("  radial_extent: {:.6}", props.radial_extent);
    println!(
        "  orifice_area: {:.6}{}",
        props.orifice_area.value(),
        if props.orifice_area.is_degenerate() {
            " (circle fallback)"
        } else {
            ""
        }
    );
    match props.stiffness {
        Some(stats) => {
            println!("  avg_stiffness: {:.6}", stats.average);
            println!("  max_stiffness: {:.6}", stats.max);
        }
        None => println!("  stiffness: no springs"),
    }
    println!("  n_vertices: {}", props.vertex_count);
    println!("  n_springs: {}", props.spring_count);
}

fn generate(
    resolution: Option<usize>,
    severity: &str,
    output_prefix: &str,
    config_file: Option<&str>,
    confine_arc: bool,
) -> Result<()> {
    let mut settings = load_settings(config_file, resolution)?;
    if confine_arc {
        settings.config.arc_mode = ArcMode::Confine;
    }
    let profile = settings.table.lookup(severity)?;

    let model = mesher::run(&settings.config, profile)?;

    let prefix = serializer::output_prefix(
        output_prefix,
        profile.severity,
        settings.config.points_per_leaflet,
    );
    let files = serializer::write_model(&prefix, &model)?;

    print_summary(&model, &files);
    Ok(())
}

fn inspect(prefix: &str) -> Result<()> {
    let files = ModelFiles::from_prefix(prefix);
    let vertices = serializer::read_vertices(&files.vertex)?;
    let springs = serializer::read_springs(&files.spring)?;
    let beams = serializer::read_beams(&files.beam)?;

    println!(
        "Loaded {} vertices, {} springs and {} beams from {prefix}",
        vertices.len(),
        springs.len(),
        beams.len()
    );

    let props = properties::compute_properties(&vertices, &springs)?;
    print_properties(&props);
    Ok(())
}

fn compare(severities: &str, resolution: Option<usize>, config_file: Option<&str>) -> Result<()> {
    let settings = load_settings(config_file, resolution)?;
    let severities: Vec<Severity> = severities
        .split(',')
        .map(|s| s.trim().parse::<Severity>())
        .collect::<Result<_>>()?;

    let mut results: Vec<(Severity, GeometricProperties)> = Vec::with_capacity(severities.len());

    let bar = ProgressBar::new(severities.len() as u64);
    for severity in &severities {
        let model = mesher::run(&settings.config, settings.table.get(*severity))?;
        let props = properties::compute_properties(model.vertices(), model.springs())?;
        results.push((*severity, props));
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!("\nGeometric Comparison Summary:");
    println!("{}", "-".repeat(80));
    println!(
        "{:<12} {:<12} {:<12} {:<15}",
        "Severity", "Area (cm²)", "Extent (cm)", "Avg Stiffness"
    );
    println!("{}", "-".repeat(80));
    for (severity, props) in &results {
        let avg = match props.stiffness {
            Some(stats) => format!("{:.2e}", stats.average),
            None => "n/a".to_owned(),
        };
        println!(
            "{:<12} {:<12.3} {:<12.3} {:<15}",
            severity.label(),
            props.orifice_area.value(),
            props.radial_extent,
            avg
        );
    }

    let find = |target: Severity| {
        results
            .iter()
            .find(|(s, _)| *s == target)
            .map(|(_, props)| props)
    };
    if let (Some(healthy), Some(severe)) = (find(Severity::Healthy), find(Severity::Severe)) {
        let change = properties::progression(healthy, severe);
        println!("{}", "-".repeat(80));
        println!("Healthy -> Severe:");
        println!("  Area reduction: {:.1}%", change.area_reduction_percent);
        if let Some(ratio) = change.stiffness_increase {
            println!("  Stiffness increase: {:.1}x", ratio);
        }
    }

    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            resolution,
            severity,
            output_prefix,
            config,
            confine_arc,
        } => generate(
            resolution,
            &severity,
            &output_prefix,
            config.as_deref(),
            confine_arc,
        ),
        Commands::Inspect { prefix } => inspect(&prefix),
        Commands::Compare {
            severities,
            resolution,
            config,
        } => compare(&severities, resolution, config.as_deref()),
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1)
    }
}
