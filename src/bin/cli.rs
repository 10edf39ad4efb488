use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::inference::premium_model::PremiumModel;
use crate::inference::Predictor;
use crate::schema::prediction_response::PredictionResponse;
use crate::schema::user_input::{AgeGroup, CityTier, LifestyleRisk, Occupation, UserInput};
use crate::schema::Validate;

#[allow(dead_code)]
#[path = "../inference/mod.rs"]
mod inference;

#[allow(dead_code)]
#[path = "../schema/mod.rs"]
mod schema;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the model artifact
    #[arg(short, long, env, default_value = "model/model.json")]
    model_path: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the version, classes and features of the model artifact
    Inspect,

    /// Run a single prediction without starting the server
    Predict {
        #[clap(long)]
        bmi: f64,

        #[clap(long, value_enum)]
        age_group: AgeGroup,

        #[clap(long, value_enum)]
        lifestyle_risk: LifestyleRisk,

        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        city_tier: u8,

        #[clap(long)]
        income_lpa: f64,

        #[clap(long, value_enum)]
        occupation: Occupation,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let model = PremiumModel::from_file(&args.model_path)?;

    match args.cmd {
        Commands::Inspect => {
            println!("Version: {}", model.version());
            println!("Classes: {}", model.classes().join(", "));
            println!(
                "Features: {}",
                model.feature_names().collect::<Vec<_>>().join(", ")
            );
        }
        Commands::Predict {
            bmi,
            age_group,
            lifestyle_risk,
            city_tier,
            income_lpa,
            occupation,
        } => {
            let input = UserInput {
                bmi,
                age_group,
                lifestyle_risk,
                city_tier: CityTier::try_from(city_tier).map_err(anyhow::Error::msg)?,
                income_lpa,
                occupation,
            };
            input.validate()?;

            let prediction = model
                .predict(&input.to_features())
                .context("Prediction failed")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&PredictionResponse::from(prediction))?
            );
        }
    }
    Ok(())
}
