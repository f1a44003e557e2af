mod config;
mod spacetime;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use curv_core::{Connection, Curvature, Metric, Tensor};

use crate::config::Config;
use crate::spacetime::Spacetime;

#[derive(Parser)]
#[command(
    name = "curv",
    about = "Evaluate metrics, Christoffel symbols and curvature of built-in spacetimes"
)]
struct Cli {
    /// TOML config file (falls back to $CURV_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Spacetime to evaluate
    #[arg(long, global = true, value_enum, default_value_t = Spacetime::Minkowski)]
    spacetime: Spacetime,

    /// Spacetime parameter: rs, radius, Hubble rate or exponent
    #[arg(long, global = true, allow_hyphen_values = true)]
    param: Option<f64>,

    /// Evaluation point as comma-separated coordinates
    #[arg(long, global = true, value_delimiter = ',', allow_hyphen_values = true)]
    point: Option<Vec<f64>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the metric and its inverse at the point
    Metric,

    /// Print the non-negligible Christoffel symbols at the point
    Christoffel,

    /// Print the Ricci and Kretschmann scalars and a flatness verdict
    Curvature,

    /// Print ds² along a tangent vector and its causal character
    Interval {
        /// Tangent vector as comma-separated components
        #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
        tangent: Vec<f64>,
    },
}

/// Resolved metric, evaluation point and settings shared by the subcommands.
struct Session {
    metric: Box<dyn Metric>,
    point: Vec<f64>,
    config: Config,
    json: bool,
}

fn open_session(cli: &Cli) -> Result<Session> {
    let config = Config::load(cli.config.as_deref())?;
    let param = cli.param.unwrap_or_else(|| cli.spacetime.default_param());
    let metric = cli
        .spacetime
        .build(param)
        .with_context(|| format!("failed to build {:?} metric", cli.spacetime))?;
    let point = cli
        .point
        .clone()
        .unwrap_or_else(|| cli.spacetime.default_point(param));
    tracing::debug!(spacetime = ?cli.spacetime, param, ?point, "session ready");
    Ok(Session {
        metric,
        point,
        config,
        json: cli.json,
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = open_session(&cli)?;
    match &cli.command {
        Commands::Metric => cmd_metric(&session),
        Commands::Christoffel => cmd_christoffel(&session),
        Commands::Curvature => cmd_curvature(&session),
        Commands::Interval { tangent } => cmd_interval(&session, tangent),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn print_matrix(t: &Tensor) {
    let n = t.dimensions().first().copied().unwrap_or(1);
    for row in t.components().chunks(n) {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>14.6e}")).collect();
        println!("  {}", cells.join(" "));
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn cmd_metric(s: &Session) -> Result<()> {
    let g = s
        .metric
        .metric_tensor(&s.point)
        .context("failed to evaluate metric")?;
    let g_inv = s
        .metric
        .inverse_metric(&s.point)
        .context("failed to invert metric")?;

    if s.json {
        return print_json(&serde_json::json!({
            "point": s.point,
            "metric": g,
            "inverse": g_inv,
        }));
    }
    println!("g_μν:");
    print_matrix(&g);
    println!("g^μν:");
    print_matrix(&g_inv);
    Ok(())
}

fn cmd_christoffel(s: &Session) -> Result<()> {
    let connection = Connection::new(&*s.metric, s.config.differentiation)?;
    let gamma = connection
        .christoffel_symbols(&s.point)
        .context("failed to compute Christoffel symbols")?;

    // lower pair is symmetric: report μ ≤ ν only
    let entries: Vec<(Vec<usize>, f64)> = gamma
        .multi_indices()
        .zip(gamma.components().iter().copied())
        .filter(|(idx, value)| idx[1] <= idx[2] && value.abs() > s.config.tolerance)
        .collect();

    if s.json {
        let list: Vec<serde_json::Value> = entries
            .iter()
            .map(|(idx, value)| {
                serde_json::json!({
                    "lambda": idx[0],
                    "mu": idx[1],
                    "nu": idx[2],
                    "value": value,
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "point": s.point,
            "christoffel": list,
        }));
    }
    if entries.is_empty() {
        println!("(all Christoffel symbols vanish)");
    }
    for (idx, value) in &entries {
        println!("Γ^{}_{}{} = {value:.6e}", idx[0], idx[1], idx[2]);
    }
    Ok(())
}

fn cmd_curvature(s: &Session) -> Result<()> {
    let curvature = Curvature::new(&*s.metric, s.config.differentiation)?;
    let tolerance = s.config.tolerance;
    let flat = curvature
        .is_flat(&s.point, tolerance)
        .context("failed to evaluate flatness")?;
    let scalar = curvature
        .ricci_scalar(&s.point)
        .context("failed to compute Ricci scalar")?;
    let kretschmann = curvature
        .kretschmann(&s.point)
        .context("failed to compute Kretschmann scalar")?;
    let riemann_flat = curvature
        .is_riemann_flat(&s.point, tolerance)
        .context("failed to compute Riemann tensor")?;

    if s.json {
        return print_json(&serde_json::json!({
            "point": s.point,
            "ricciScalar": scalar,
            "kretschmann": kretschmann,
            "flat": flat,
            "riemannFlat": riemann_flat,
            "tolerance": tolerance,
        }));
    }
    println!("ricci scalar:  {scalar:.6e}");
    println!("kretschmann:   {kretschmann:.6e}");
    println!("flat:          {}", yes_no(flat));
    println!("riemann flat:  {}", yes_no(riemann_flat));
    Ok(())
}

fn cmd_interval(s: &Session, tangent: &[f64]) -> Result<()> {
    let ds2 = s
        .metric
        .line_element(&s.point, tangent)
        .context("failed to evaluate line element")?;
    let interval = s.metric.classify_interval(&s.point, tangent)?;

    if s.json {
        return print_json(&serde_json::json!({
            "point": s.point,
            "tangent": tangent,
            "ds2": ds2,
            "interval": interval,
            "causal": interval.is_causal(),
        }));
    }
    println!("ds²:       {ds2:.6e}");
    println!("interval:  {interval}");
    println!("causal:    {}", yes_no(interval.is_causal()));
    Ok(())
}
