use clap::{Parser, Subcommand};
use nalgebra as na;
use projection_calibration::io::validated_correspondences;
use projection_calibration::optimization::{
    EstimatorConfig, SolveMethod, estimate, least_squares_solve,
};
use projection_calibration::synthetic::{SyntheticConfig, generate_correspondences};
use projection_calibration::util::{relative_projection_error, rms_reprojection_error};
use projection_calibration::{CalibrationError, Correspondence, ProjectionMatrix};

#[derive(Parser)]
#[command(version, about, author)]
struct PmatCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer unit prices of two fruits from three receipts
    Prices,

    /// Estimate a projection matrix from records like [[u, v, x, y, z], ...]
    Estimate {
        /// JSON records
        #[arg(short, long)]
        records: String,

        #[arg(short, long, value_enum, default_value = "null-space")]
        method: SolveMethod,

        /// Skip Hartley normalization
        #[arg(long)]
        no_normalize: bool,
    },

    /// Estimate from generated correspondences of a known camera
    Synthetic {
        #[arg(short, long, default_value = "24")]
        count: usize,

        /// Half width of the uniform pixel noise
        #[arg(short, long, default_value = "0.0")]
        noise: f64,

        #[arg(short, long, default_value = "0")]
        seed: u64,

        #[arg(short, long, value_enum, default_value = "null-space")]
        method: SolveMethod,
    },
}

fn print_projection(p: &ProjectionMatrix, correspondences: &[Correspondence]) {
    for row in p.as_slice().chunks(4) {
        let cols: Vec<_> = row.iter().map(|c| format!("{:>14.6e}", c)).collect();
        println!("{}", cols.join(" "));
    }
    match rms_reprojection_error(p, correspondences) {
        Some(rms) => println!("rms reprojection error: {:.5} px", rms),
        None => println!("rms reprojection error: undefined"),
    }
}

fn run(cli: PmatCli) -> Result<(), CalibrationError> {
    match cli.command {
        Commands::Prices => {
            let a = na::DMatrix::from_row_slice(3, 2, &[2.0, 3.0, 7.0, 5.0, 2.0, 4.0]);
            let b = na::DVector::from_vec(vec![3.49, 7.60, 4.20]);
            let prices = least_squares_solve(&a, &b)?;
            println!("Apple cost: {:.2} TL", prices[0]);
            println!("Banana cost: {:.2} TL", prices[1]);
        }
        Commands::Estimate {
            records,
            method,
            no_normalize,
        } => {
            let records: serde_json::Value = serde_json::from_str(&records)?;
            let correspondences = validated_correspondences(&records)?;
            let config = EstimatorConfig {
                method,
                normalize: !no_normalize,
                ..Default::default()
            };
            let p = estimate(&correspondences, &config)?;
            print_projection(&p, &correspondences);
        }
        Commands::Synthetic {
            count,
            noise,
            seed,
            method,
        } => {
            let synthetic = SyntheticConfig {
                num_points: count,
                pixel_noise: noise,
                seed,
                ..Default::default()
            };
            let correspondences = generate_correspondences(&synthetic);
            let config = EstimatorConfig {
                method,
                ..Default::default()
            };
            let p = estimate(&correspondences, &config)?;
            print_projection(&p, &correspondences);
            println!(
                "relative error to ground truth: {:e}",
                relative_projection_error(&p, &synthetic.projection_matrix())
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = PmatCli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
