use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use sk_core::Side;
use sk_lqr::DoubleIntegratorProxy;
use sk_mechanism::Description;
use sk_robot::{BundleSummary, ControlModel, ModelBuilder, MpcBundle, RobotConfig, RobotError};

#[derive(Parser)]
#[command(name = "sk-cli")]
#[command(about = "StanceKit CLI - contact-rich MPC model construction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a kinematic description for structural problems
    Validate {
        /// Path to the description YAML file
        description: PathBuf,
    },
    /// Build the MPC bundle and print a summary
    Inspect {
        /// Path to the description YAML file
        description: PathBuf,
        /// Robot configuration YAML (defaults to the box robot)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Do not attach contact points
        #[arg(long)]
        no_contacts: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Robot(#[from] RobotError),

    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> Result<(), CliError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { description } => cmd_validate(&description),
        Commands::Inspect {
            description,
            config,
            json,
            no_contacts,
        } => cmd_inspect(&description, config.as_deref(), json, !no_contacts),
    }
}

fn cmd_validate(path: &Path) -> Result<(), CliError> {
    println!("Validating description: {}", path.display());
    let description = Description::load_yaml(path).map_err(RobotError::from)?;
    let mechanism = description.build_mechanism().map_err(RobotError::from)?;
    println!(
        "✓ {}: {} bodies, {} joints, {} positions, {} obstacles, {} contact entries",
        mechanism.name(),
        mechanism.bodies().len(),
        mechanism.joints().len(),
        mechanism.num_positions(),
        description.obstacles.len(),
        description.contacts.len(),
    );
    Ok(())
}

fn cmd_inspect(
    path: &Path,
    config_path: Option<&Path>,
    json: bool,
    with_contacts: bool,
) -> Result<(), CliError> {
    let config = match config_path {
        Some(p) => RobotConfig::load_yaml(p)?,
        None => RobotConfig::default(),
    };

    let model = ModelBuilder::new(&config)
        .with_contacts(with_contacts)
        .build(path)?;
    let proxy = DoubleIntegratorProxy {
        positions: model.mechanism().num_velocities(),
    };
    let bundle = MpcBundle::build(model, &config, &proxy)?;
    tracing::debug!(path = %bundle.description_path().display(), "Bundle ready");

    let summary = bundle.summary()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &BundleSummary) {
    println!("Robot: {} ({})", summary.name, summary.description_path.display());
    println!(
        "  Coordinates: {} positions, {} velocities",
        summary.num_positions, summary.num_velocities
    );
    println!("  Floating base: {}", summary.floating_base.joint);
    for side in Side::BOTH {
        println!(
            "  {side}: foot {}, hand {}",
            summary.feet.get(side),
            summary.hands.get(side)
        );
    }

    println!("Contact surfaces:");
    for s in &summary.surfaces {
        println!(
            "  {} point {:?} normal {:?} friction {}",
            s.name, s.point, s.normal, s.friction
        );
    }
    println!("Contact pairs:");
    for p in &summary.pairs {
        println!("  {} - {}", p.body, p.obstacle);
    }
    println!("Contact points: {}", summary.contact_points.join(", "));

    println!("Nominal q: {:?}", summary.nominal_q);
    println!("Weights:");
    for w in &summary.weights {
        println!("  {:<24} q {:?} v {:?}", w.joint, w.position, w.velocity);
    }

    let lqr = &summary.lqr;
    println!(
        "LQR: dt {} s, gain {}x{}, invariant coordinate {:?}",
        lqr.dt, lqr.gain_shape.0, lqr.gain_shape.1, lqr.invariant_coordinate
    );
    println!(
        "MPC: horizon {}, time limit {} s, gap {}, feasibility tol {}",
        summary.mpc.horizon,
        summary.mpc.time_limit_s,
        summary.mpc.optimality_gap,
        summary.mpc.feasibility_tol
    );
}
