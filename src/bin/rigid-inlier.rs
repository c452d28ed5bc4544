use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{error, info};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rigid_inlier::io::{load_points, save_points};
use rigid_inlier::report::RegistrationReport;
use rigid_inlier::synthetic::{euler_transform, generate_candidate_set};
use rigid_inlier::{register, Direction, IndexPolicy, RansacSettings};

/// Robust rigid registration of point files.
#[derive(Debug, Parser)]
#[command(author, version, about = "Register two 3D point sets with Kabsch + RANSAC")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Estimate the rigid transform between two point files
    Register {
        /// Reference point file (first set).
        #[arg(long)]
        reference: PathBuf,

        /// Candidate point file (second set).
        #[arg(long)]
        candidate: PathBuf,

        /// Number of RANSAC iterations.
        #[arg(long, default_value_t = 1000)]
        iterations: usize,

        /// Inlier distance threshold.
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,

        /// Sampler seed; random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Parallel workers (0 = all threads).
        #[arg(long, default_value_t = 1)]
        workers: usize,

        /// Index pairing: cyclic-wrap, truncate or require-equal-length.
        #[arg(long, default_value = "cyclic-wrap")]
        policy: IndexPolicy,

        /// second-onto-first or first-onto-second.
        #[arg(long, default_value = "second-onto-first")]
        direction: Direction,

        /// Refit the best transform on all of its inliers.
        #[arg(long)]
        refine: bool,

        /// Write the moved points to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write a rigidly moved copy of a point file
    Transform {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Euler angles in degrees (X Y Z), applied Z, then X, then Y.
        #[arg(
            long,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true,
            default_values_t = [30.0, 45.0, 0.0]
        )]
        rotate: Vec<f64>,

        #[arg(
            long,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true,
            default_values_t = [1.5, 1.5, 1.5]
        )]
        translate: Vec<f64>,
    },

    /// Write a noisy candidate set drawn from a reference point file
    Generate {
        #[arg(long)]
        reference: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Random seed; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = try_main() {
        error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    match Args::parse().command {
        Commands::Register {
            reference,
            candidate,
            iterations,
            threshold,
            seed,
            workers,
            policy,
            direction,
            refine,
            output,
        } => {
            let settings = RansacSettings {
                max_iterations: iterations,
                inlier_threshold: threshold,
                index_policy: policy,
                seed,
                workers,
                refine,
                ..RansacSettings::default()
            };
            run_register(&reference, &candidate, direction, &settings, output.as_deref())
        }
        Commands::Transform {
            input,
            output,
            rotate,
            translate,
        } => {
            let angles = Vector3::from_column_slice(&rotate);
            let translation = Vector3::from_column_slice(&translate);
            let count = run_transform(&input, &output, angles, translation)?;
            println!("Wrote {count} transformed points to {}", output.display());
            Ok(())
        }
        Commands::Generate {
            reference,
            output,
            seed,
        } => {
            let count = run_generate(&reference, &output, seed)?;
            println!("Wrote {count} candidate points to {}", output.display());
            Ok(())
        }
    }
}

fn run_register(
    reference_path: &Path,
    candidate_path: &Path,
    direction: Direction,
    settings: &RansacSettings,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let reference = load_points(reference_path)?;
    let candidate = load_points(candidate_path)?;
    info!(
        "loaded {} reference and {} candidate points",
        reference.len(),
        candidate.len()
    );

    let outcome = register(&reference, &candidate, direction, settings)?;
    let fixed = match direction {
        Direction::SecondOntoFirst => &reference,
        Direction::FirstOntoSecond => &candidate,
    };
    println!("{direction}");
    println!("{}", RegistrationReport::from_outcome(&outcome, fixed));

    if let Some(path) = output {
        save_points(path, &outcome.aligned)?;
        info!("aligned points written to {}", path.display());
    }
    Ok(())
}

fn run_transform(
    input: &Path,
    output: &Path,
    angles_deg: Vector3<f64>,
    translation: Vector3<f64>,
) -> Result<usize, Box<dyn Error>> {
    let points = load_points(input)?;
    let moved = euler_transform(angles_deg, translation).transform_points(&points);
    save_points(output, &moved)?;
    Ok(moved.len())
}

fn run_generate(reference: &Path, output: &Path, seed: Option<u64>) -> Result<usize, Box<dyn Error>> {
    let points = load_points(reference)?;
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let candidate = generate_candidate_set(&mut rng, &points);
    save_points(output, &candidate)?;
    info!(
        "generated {} candidate points from {} reference points",
        candidate.len(),
        points.len()
    );
    Ok(candidate.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigid_inlier::synthetic::{cube_grid, MAX_EXTRA_POINTS};

    #[test]
    fn cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "rigid-inlier",
            "transform",
            "--input",
            "p.txt",
            "--output",
            "q.txt",
            "--rotate",
            "10",
            "-20",
            "0",
        ])
        .unwrap();
        match args.command {
            Commands::Transform {
                rotate, translate, ..
            } => {
                assert_eq!(rotate, vec![10.0, -20.0, 0.0]);
                assert_eq!(translate, vec![1.5, 1.5, 1.5]);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from([
            "rigid-inlier",
            "register",
            "--reference",
            "p.txt",
            "--candidate",
            "q.txt",
            "--policy",
            "truncate",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Commands::Register {
                policy: IndexPolicy::Truncate,
                iterations: 1000,
                ..
            }
        ));
    }

    #[test]
    fn transform_then_register_recovers_motion() {
        let dir = tempfile::tempdir().unwrap();
        let p_path = dir.path().join("fileP.txt");
        let q_path = dir.path().join("fileQ.txt");
        save_points(&p_path, &cube_grid(3, 3, 2, 1.0)).unwrap();

        let angles = Vector3::new(30.0, 45.0, 0.0);
        let translation = Vector3::new(1.5, 1.5, 1.5);
        assert_eq!(run_transform(&p_path, &q_path, angles, translation).unwrap(), 18);

        let settings = RansacSettings::default().with_iterations(100).with_seed(3);
        let p = load_points(&p_path).unwrap();
        let q = load_points(&q_path).unwrap();
        let outcome = register(&p, &q, Direction::FirstOntoSecond, &settings).unwrap();
        let truth = euler_transform(angles, translation);
        assert_eq!(outcome.registration.inlier_count, 18);
        assert!((outcome.registration.transform.translation - truth.translation).norm() < 1e-2);

        let aligned = dir.path().join("aligned.txt");
        run_register(
            &p_path,
            &q_path,
            Direction::SecondOntoFirst,
            &settings,
            Some(&aligned),
        )
        .unwrap();
        assert_eq!(load_points(&aligned).unwrap().len(), 18);
    }

    #[test]
    fn generate_writes_seeded_candidate_set() {
        let dir = tempfile::tempdir().unwrap();
        let p_path = dir.path().join("fileP.txt");
        let a_path = dir.path().join("a.txt");
        let b_path = dir.path().join("b.txt");
        save_points(&p_path, &cube_grid(2, 2, 2, 10.0)).unwrap();

        let n = run_generate(&p_path, &a_path, Some(12)).unwrap();
        assert!((8..=8 + MAX_EXTRA_POINTS).contains(&n));
        assert_eq!(run_generate(&p_path, &b_path, Some(12)).unwrap(), n);
        assert_eq!(load_points(&a_path).unwrap(), load_points(&b_path).unwrap());
    }
}
