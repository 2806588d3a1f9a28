use anyhow::Context;
use clap::{Parser, Subcommand};
use reel::{Metrics, DATA_DIR};
use reel_eval::{
    evaluation::{self, Evaluation},
    recommender::{
        AssociationOptions, AssociationRecommender, PopularityOptions, PopularityRecommender,
        RandomOptions, RandomRecommender,
    },
    EVAL_HEADING,
};
use reel_load::loader::{DataLoader, LoaderOptions};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ASSOCIATION_DEFAULTS: AssociationOptions = AssociationOptions::new();
const POPULARITY_DEFAULTS: PopularityOptions = PopularityOptions::new();
const RANDOM_DEFAULTS: RandomOptions = RandomOptions::new();

#[derive(Parser, Debug)]
#[command(name = "reel_eval")]
#[command(about = "Scores movie recommenders on held out MovieLens ratings")]
#[command(version)]
struct Args {
    /// Directory holding movies.dat, tags.dat and ratings.dat
    #[arg(long, global = true, default_value = DATA_DIR)]
    data_dir: String,

    /// Number of users to load, in order of first appearance
    #[arg(long, global = true, default_value_t = 1000)]
    n_user: usize,

    /// Most recent ratings per user to hold out for testing
    #[arg(long, global = true, default_value_t = 5)]
    n_test_items: usize,

    /// Length of the recommendation lists that are scored
    #[arg(short, long, global = true, default_value_t = 10)]
    k: usize,

    /// Print reports as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Association rules mined from each user's favourites
    Association {
        #[arg(long, default_value_t = ASSOCIATION_DEFAULTS.min_rating)]
        min_rating: f64,

        #[arg(long, default_value_t = ASSOCIATION_DEFAULTS.min_support)]
        min_support: f64,

        /// Minimum lift of a kept rule
        #[arg(long, default_value_t = ASSOCIATION_DEFAULTS.min_threshold)]
        min_threshold: f64,

        /// Evaluate a range of support thresholds instead of `--min-support`
        #[arg(long)]
        sweep: bool,
    },
    /// Best rated movies among those rated often enough
    Popularity {
        #[arg(long, default_value_t = POPULARITY_DEFAULTS.minimum_num_rating)]
        minimum_num_rating: u64,

        /// Evaluate a range of rating count thresholds instead of `--minimum-num-rating`
        #[arg(long)]
        sweep: bool,
    },
    /// Seeded random predictions and lists
    Random {
        #[arg(long, default_value_t = RANDOM_DEFAULTS.seed)]
        seed: u64,
    },
}

/// A single line of output
#[derive(Serialize)]
struct Report<'a> {
    recommender: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
    #[serde(flatten)]
    metrics: &'a Metrics,
}

fn print_report(
    evaluation: &Evaluation,
    parameter: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let report = Report {
        recommender: evaluation.recommender,
        parameter,
        metrics: &evaluation.metrics,
    };

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        match &report.parameter {
            Some(parameter) => {
                println!("{} ({}) {}", report.recommender, parameter, report.metrics)
            }
            None => println!("{} {}", report.recommender, report.metrics),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let loader_options = LoaderOptions::new()
        .with_data_dir(&args.data_dir)
        .with_n_user(args.n_user)
        .with_n_test_items(args.n_test_items);

    info!("{}Loading the dataset from {}", EVAL_HEADING, args.data_dir);
    let dataset = DataLoader::new_with_options(&loader_options)
        .load()
        .with_context(|| format!("Could not load the dataset from {}", args.data_dir))?;

    match args.command {
        Command::Association {
            min_rating,
            min_support,
            min_threshold,
            sweep,
        } => {
            let options = AssociationOptions::new()
                .with_min_rating(min_rating)
                .with_min_support(min_support)
                .with_min_threshold(min_threshold);

            if sweep {
                for (min_support, evaluation) in
                    evaluation::sweep_min_support(&dataset, &options, args.k)?
                {
                    let parameter = format!("min_support={}", min_support);
                    print_report(&evaluation, Some(parameter), args.json)?;
                }
            } else {
                let recommender = AssociationRecommender::new_with_options(&options);
                let evaluation = evaluation::evaluate(&recommender, &dataset, args.k)?;
                print_report(&evaluation, None, args.json)?;
            }
        }
        Command::Popularity {
            minimum_num_rating,
            sweep,
        } => {
            let options = PopularityOptions::new().with_minimum_num_rating(minimum_num_rating);

            if sweep {
                for (minimum_num_rating, evaluation) in
                    evaluation::sweep_minimum_num_rating(&dataset, &options, args.k)?
                {
                    let parameter = format!("minimum_num_rating={}", minimum_num_rating);
                    print_report(&evaluation, Some(parameter), args.json)?;
                }
            } else {
                let recommender = PopularityRecommender::new_with_options(&options);
                let evaluation = evaluation::evaluate(&recommender, &dataset, args.k)?;
                print_report(&evaluation, None, args.json)?;
            }
        }
        Command::Random { seed } => {
            let options = RandomOptions::new().with_seed(seed);
            let recommender = RandomRecommender::new_with_options(&options);
            let evaluation = evaluation::evaluate(&recommender, &dataset, args.k)?;
            print_report(&evaluation, None, args.json)?;
        }
    }

    Ok(())
}
