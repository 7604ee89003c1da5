//! tabfuse CLI for training and evaluating the hybrid classifier.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tabfuse_core::{ClassLabel, Seed};
use tabfuse_data::{read_features_npy, read_labels_npy, synthetic::BlobsConfig, train_test_split};
use tabfuse_train::{Evaluation, FitOptions, HybridClassifier, HybridClassifierConfig};

#[derive(Parser)]
#[command(name = "tabfuse")]
#[command(author, version)]
#[command(about = "Tabular classification with a hybrid recurrent/attention network")]
#[command(long_about = "tabfuse: standardize, oversample, project with PCA and classify tabular
data with an LSTM/transformer/additive-attention network.

EXAMPLES:
  # Train on NumPy arrays and write reports to ./runs
  tabfuse train --features X.npy --labels y.npy --epochs 30

  # Use a JSON model config and skip class balancing
  tabfuse train --features X.npy --labels y.npy --config model.json --no-balance

  # Fit and evaluate on synthetic separable data
  tabfuse demo --samples 500 --features 20")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on features and labels stored as .npy files
    Train {
        /// 2-D float array of shape (samples, features)
        #[arg(long, value_name = "PATH")]
        features: PathBuf,

        /// 1-D integer array of class labels
        #[arg(long, value_name = "PATH")]
        labels: PathBuf,

        /// JSON classifier config; missing fields take their defaults
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Number of training epochs
        #[arg(long, default_value = "50", value_name = "N")]
        epochs: usize,

        /// Batch size for training
        #[arg(long, default_value = "32", value_name = "SIZE")]
        batch_size: usize,

        /// Fraction of the (balanced) data held out for validation
        #[arg(long, default_value = "0.2", value_name = "FRACTION")]
        validation_split: f64,

        /// Disable minority-class oversampling
        #[arg(long, default_value = "false")]
        no_balance: bool,

        /// Output directory for history, figures and report
        #[arg(long, default_value = "./runs", value_name = "DIR")]
        output: PathBuf,
    },
    /// Fit and evaluate on synthetic Gaussian blobs
    Demo {
        /// Number of samples
        #[arg(long, default_value = "300", value_name = "N")]
        samples: usize,

        /// Number of features
        #[arg(long, default_value = "30", value_name = "N")]
        features: usize,

        /// Number of classes
        #[arg(long, default_value = "3", value_name = "N")]
        classes: usize,

        /// Number of training epochs
        #[arg(long, default_value = "20", value_name = "N")]
        epochs: usize,

        /// Random seed for data and model
        #[arg(long, default_value = "42", value_name = "SEED")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Train {
            features,
            labels,
            config,
            epochs,
            batch_size,
            validation_split,
            no_balance,
            output,
        } => {
            let options = FitOptions::default()
                .with_epochs(epochs)
                .with_batch_size(batch_size)
                .with_validation_split(validation_split)
                .with_class_balance(!no_balance);
            handle_train(&features, &labels, config.as_deref(), &options, &output)
        }
        Commands::Demo {
            samples,
            features,
            classes,
            epochs,
            seed,
        } => handle_demo(samples, features, classes, epochs, seed),
    }
}

fn load_config(path: Option<&Path>) -> Result<HybridClassifierConfig> {
    match path {
        Some(path) => HybridClassifierConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(HybridClassifierConfig::default()),
    }
}

fn handle_train(
    features: &Path,
    labels: &Path,
    config: Option<&Path>,
    options: &FitOptions,
    output: &Path,
) -> Result<()> {
    let config = load_config(config)?;

    println!("=== tabfuse Training ===\n");
    println!("Configuration:");
    println!("  Features: {}", features.display());
    println!("  Labels: {}", labels.display());
    println!("  Components: {}", config.n_components);
    println!("  LSTM units: {}", config.lstm_units);
    println!("  Heads: {}", config.num_heads);
    println!("  Epochs: {}", options.epochs);
    println!("  Batch size: {}", options.batch_size);
    println!("  Validation split: {}", options.validation_split);
    println!("  Class balance: {}", if options.class_balance { "enabled" } else { "disabled" });
    println!("  Output: {}\n", output.display());

    let x = read_features_npy(features)
        .with_context(|| format!("Failed to read features from {}", features.display()))?;
    let y = read_labels_npy(labels)
        .with_context(|| format!("Failed to read labels from {}", labels.display()))?;
    if x.nrows() != y.len() {
        bail!(
            "features have {} rows but labels have {} entries",
            x.nrows(),
            y.len()
        );
    }
    println!("Loaded {} samples with {} features\n", x.nrows(), x.ncols());

    let mut clf = HybridClassifier::new(config);
    clf.fit(&x, &y, options).context("Training failed")?;

    let evaluation = clf.evaluate(&x, &y).context("Evaluation failed")?;
    print_evaluation(&clf, &evaluation);

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    save_outputs(&clf, &evaluation, &x, &y, output)?;

    println!("\n=== Training finished successfully! ===");
    Ok(())
}

fn handle_demo(samples: usize, features: usize, classes: usize, epochs: usize, seed: u64) -> Result<()> {
    println!("=== tabfuse Demo ===\n");

    let seed = Seed::new(seed);
    let (x, y) = BlobsConfig::new(samples, features, classes)
        .with_separation(4.0)
        .with_seed(seed.derive("data"))
        .generate()
        .context("Failed to generate synthetic data")?;
    let split = train_test_split(&x, &y, 0.25, seed.derive("holdout")).context("Failed to split data")?;
    println!(
        "Generated {} samples, {} features, {} classes ({} train / {} test)\n",
        samples,
        features,
        classes,
        split.y_train.len(),
        split.y_test.len()
    );

    let config = HybridClassifierConfig::default()
        .with_n_components(features.min(20))
        .with_seed(seed);
    let mut clf = HybridClassifier::new(config);
    clf.fit(&split.x_train, &split.y_train, &FitOptions::default().with_epochs(epochs))
        .context("Training failed")?;

    let evaluation = clf
        .evaluate(&split.x_test, &split.y_test)
        .context("Evaluation failed")?;
    print_evaluation(&clf, &evaluation);
    Ok(())
}

fn print_evaluation<L: ClassLabel>(clf: &HybridClassifier<L>, evaluation: &Evaluation) {
    if let Some(last) = clf.history().last() {
        println!("Final epoch {}:", last.epoch);
        println!("  Train loss: {:.4}  accuracy: {:.2}%", last.train_loss, last.train_accuracy * 100.0);
        println!("  Valid loss: {:.4}  accuracy: {:.2}%", last.valid_loss, last.valid_accuracy * 100.0);
        println!();
    }
    println!("Accuracy: {:.2}%\n", evaluation.accuracy * 100.0);
    println!("{}", evaluation.confusion_matrix.to_string_table());
    println!("{}", evaluation.report.to_string_table());
}

fn save_outputs<L: ClassLabel>(
    clf: &HybridClassifier<L>,
    evaluation: &Evaluation,
    x: &Array2<f64>,
    y: &[L],
    output: &Path,
) -> Result<()> {
    let history_path = output.join("history.json");
    clf.history()
        .save_json(&history_path)
        .context("Failed to save training history")?;
    println!("Saved history to {}", history_path.display());

    let history_svg = output.join("history.svg");
    clf.plot_training_history()
        .context("Failed to plot training history")?
        .save(&history_svg)?;
    println!("Saved training curves to {}", history_svg.display());

    let confusion_svg = output.join("confusion.svg");
    clf.plot_confusion_matrix(x, y)
        .context("Failed to plot confusion matrix")?
        .save(&confusion_svg)?;
    println!("Saved confusion matrix to {}", confusion_svg.display());

    let report_path = output.join("report.json");
    std::fs::write(&report_path, serde_json::to_string_pretty(evaluation)?)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    info!(path = %report_path.display(), "Saved evaluation report");
    println!("Saved report to {}", report_path.display());
    Ok(())
}
