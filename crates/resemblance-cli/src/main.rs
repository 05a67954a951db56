use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use resemblance_core::{
    ChildPairing, ChildResemblance, Engine, EngineConfig, Face, FaceSource, JsonFaceSource, Scorer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod render;

#[derive(Parser)]
#[command(name = "resemblance", about = "Family resemblance scoring over exported face detections")]
struct Cli {
    /// Engine config file (TOML). Defaults to $RESEMBLANCE_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank which parent each labeled child resembles most
    Analyze {
        /// Detections file with role labels
        faces: PathBuf,
    },
    /// All-pairs similarity matrix with summary statistics
    Matrix {
        /// Detections file
        faces: PathBuf,
    },
    /// Compare two faces directly
    Compare {
        /// Detections file
        faces: PathBuf,
        /// ID of the first face
        a: String,
        /// ID of the second face
        b: String,
    },
    /// Check that best matches agree across several photos of one family
    Validate {
        /// One detections file per photo
        #[arg(required = true, num_args = 1..)]
        photos: Vec<PathBuf>,
        /// Pair children across photos by face ID instead of by position
        #[arg(long)]
        by_child_id: bool,
    },
    /// Print the effective engine configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("loading engine config")?;
    let engine = Arc::new(Engine::new(&config));

    match cli.command {
        Commands::Analyze { faces } => {
            let (label, faces) = load_faces(&faces)?;
            let task_engine = Arc::clone(&engine);
            let results =
                tokio::task::spawn_blocking(move || task_engine.analyzer.analyze_labeled(&faces))
                    .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print!("{}", render::resemblance(&label, &results));
            }
        }
        Commands::Matrix { faces } => {
            let (label, faces) = load_faces(&faces)?;
            let task_engine = Arc::clone(&engine);
            let matrix = tokio::task::spawn_blocking(move || {
                let matrix = task_engine.matrix.build(&faces);
                (faces, matrix)
            })
            .await?;
            let (faces, matrix) = matrix;
            let stats = resemblance_core::statistics(matrix.as_ref());
            if cli.json {
                let out = serde_json::json!({
                    "photo": label,
                    "matrix": matrix,
                    "statistics": stats,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                match matrix {
                    Some(m) => print!("{}", render::matrix(&label, &faces, &m, stats.as_ref())),
                    None => println!("{label}: at least 2 faces are needed for a pairwise matrix"),
                }
            }
        }
        Commands::Compare { faces, a, b } => {
            let (_, faces) = load_faces(&faces)?;
            let face_a = find_face(&faces, &a)?;
            let face_b = find_face(&faces, &b)?;
            let result = engine
                .scorer()
                .compare_faces(face_a, face_b)
                .with_context(|| format!("comparing {a} with {b}"))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::comparison(face_a, face_b, &result));
            }
        }
        Commands::Validate {
            photos,
            by_child_id,
        } => {
            let per_photo = analyze_photos(&engine, photos).await?;
            let pairing = if by_child_id {
                ChildPairing::ByChildId
            } else {
                ChildPairing::Positional
            };
            let validator = engine.validator.clone().with_pairing(pairing);
            let results: Vec<Vec<ChildResemblance>> =
                per_photo.into_iter().map(|(_, r)| r).collect();
            let report = validator.validate(&results);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::validation(&report));
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Load and ready a detections file, returning its photo label and faces.
fn load_faces(path: &Path) -> Result<(String, Vec<Face>)> {
    let mut source = JsonFaceSource::open(path)?;
    source
        .ensure_ready()
        .with_context(|| format!("loading detections from {}", path.display()))?;
    let faces = source.faces()?;
    Ok((source.photo_label(), faces))
}

fn find_face<'a>(faces: &'a [Face], id: &str) -> Result<&'a Face> {
    match faces.iter().find(|f| f.id == id) {
        Some(face) => Ok(face),
        None => bail!("no face with id {id:?}"),
    }
}

/// Analyze every photo on its own blocking task; results keep input order.
async fn analyze_photos(
    engine: &Arc<Engine>,
    photos: Vec<PathBuf>,
) -> Result<Vec<(String, Vec<ChildResemblance>)>> {
    let handles: Vec<_> = photos
        .into_iter()
        .map(|path| {
            let engine = Arc::clone(engine);
            tokio::task::spawn_blocking(move || -> Result<(String, Vec<ChildResemblance>)> {
                let (label, faces) = load_faces(&path)?;
                let results = engine.analyzer.analyze_labeled(&faces);
                tracing::info!(photo = %label, children = results.len(), "photo analyzed");
                Ok((label, results))
            })
        })
        .collect();

    let mut per_photo = Vec::with_capacity(handles.len());
    for handle in handles {
        per_photo.push(handle.await??);
    }
    Ok(per_photo)
}
