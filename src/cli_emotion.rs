//! Operator tool: offline predictions, recommendations and corpus edits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moviemood_server::corpus_store::{
    MovieEmotionStore, MovieEmotionSummary, SqliteMovieEmotionStore,
};
use moviemood_server::emotion::{
    AggregationMode, EmotionPredictionEngine, OnnxEmotionClassifier, TextSegmenter,
    DEFAULT_MAX_TOKENS, EMOTION_LABELS,
};
use moviemood_server::recommend::{RecommendationEngine, DEFAULT_RECOMMENDATION_LIMIT};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "cli-emotion")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predicts the emotion distribution of a text and prints it as JSON.
    Predict {
        #[clap(value_parser = parse_path)]
        model_dir: PathBuf,

        text: String,

        #[clap(long, value_enum, default_value_t = AggregationMode::OverallAvg)]
        aggregation: AggregationMode,

        /// Units longer than this many tokens are truncated.
        #[clap(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: usize,
    },

    /// Ranks the corpus movies against an emotion profile.
    Recommend {
        #[clap(value_parser = parse_path)]
        db: PathBuf,

        #[clap(long)]
        joy: f32,

        #[clap(long)]
        sadness: f32,

        #[clap(long)]
        anger: f32,

        #[clap(long)]
        fear: f32,

        #[clap(long)]
        disgust: f32,

        #[clap(long, default_value_t = DEFAULT_RECOMMENDATION_LIMIT)]
        limit: usize,
    },

    /// Inserts or replaces the emotion summary of a movie.
    SetSummary {
        #[clap(value_parser = parse_path)]
        db: PathBuf,
        movie_id: i64,
        joy: f64,
        sadness: f64,
        anger: f64,
        fear: f64,
        disgust: f64,
    },

    /// Deletes the emotion summary of a movie.
    DeleteSummary {
        #[clap(value_parser = parse_path)]
        db: PathBuf,
        movie_id: i64,
    },

    /// Prints every stored emotion summary.
    ListSummaries {
        #[clap(value_parser = parse_path)]
        db: PathBuf,
    },
}

fn open_store(db: &Path) -> Result<SqliteMovieEmotionStore> {
    SqliteMovieEmotionStore::new(db).with_context(|| format!("Failed to open corpus {:?}", db))
}

fn format_component(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.4}", value),
        None => "NULL".to_string(),
    }
}

fn summary_header() -> String {
    std::iter::once("movie_id")
        .chain(EMOTION_LABELS.iter().map(|label| label.as_str()))
        .collect::<Vec<_>>()
        .join("\t")
}

fn summary_line(summary: &MovieEmotionSummary) -> String {
    std::iter::once(summary.movie_id.to_string())
        .chain(
            EMOTION_LABELS
                .iter()
                .map(|label| format_component(summary.component(*label))),
        )
        .collect::<Vec<_>>()
        .join("\t")
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Predict {
            model_dir,
            text,
            aggregation,
            max_tokens,
        } => {
            let classifier = OnnxEmotionClassifier::load(&model_dir, max_tokens)?;
            let engine =
                EmotionPredictionEngine::new(Arc::new(classifier), TextSegmenter::default());
            let prediction = engine.predict(&text, aggregation)?;
            info!(
                "Dominant emotion: {}",
                prediction.probabilities.dominant().as_str()
            );
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Command::Recommend {
            db,
            joy,
            sadness,
            anger,
            fear,
            disgust,
            limit,
        } => {
            let engine = RecommendationEngine::new(Arc::new(open_store(&db)?));
            let result = engine.recommend(&[joy, sadness, anger, fear, disgust], limit)?;
            println!("{} movies", result.count);
            for (rank, item) in result.items.iter().enumerate() {
                println!("{:>3}. movie {} ({:.4})", rank + 1, item.movie_id, item.similarity);
            }
        }
        Command::SetSummary {
            db,
            movie_id,
            joy,
            sadness,
            anger,
            fear,
            disgust,
        } => {
            let store = open_store(&db)?;
            let previous = store.find(movie_id)?;
            store.upsert(&MovieEmotionSummary::new(
                movie_id,
                [joy, sadness, anger, fear, disgust],
            ))?;
            if previous.is_some() {
                info!("Replaced emotion summary for movie {}", movie_id);
            } else {
                info!("Stored emotion summary for movie {}", movie_id);
            }
        }
        Command::DeleteSummary { db, movie_id } => {
            let store = open_store(&db)?;
            if store.delete(movie_id)? {
                info!("Deleted emotion summary for movie {}", movie_id);
            } else {
                info!("Movie {} has no emotion summary", movie_id);
            }
        }
        Command::ListSummaries { db } => {
            let store = open_store(&db)?;
            let summaries = store.find_all()?;
            println!("{}", summary_header());
            for summary in &summaries {
                println!("{}", summary_line(summary));
            }
            info!("{} summaries", summaries.len());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    execute(cli_args.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_recommend_arguments() {
        let args = CliArgs::try_parse_from([
            "cli-emotion",
            "recommend",
            "/tmp/corpus.db",
            "--joy",
            "0.7",
            "--sadness",
            "0.1",
            "--anger",
            "0",
            "--fear",
            "0",
            "--disgust",
            "0.2",
        ])
        .unwrap();
        match args.command {
            Command::Recommend { db, joy, limit, .. } => {
                assert_eq!(db, PathBuf::from("/tmp/corpus.db"));
                assert_eq!(joy, 0.7);
                assert_eq!(limit, DEFAULT_RECOMMENDATION_LIMIT);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn corpus_edits_round_trip_through_the_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("corpus.db");

        execute(Command::SetSummary {
            db: db.clone(),
            movie_id: 3,
            joy: 0.5,
            sadness: 0.2,
            anger: 0.1,
            fear: 0.1,
            disgust: 0.1,
        })
        .unwrap();
        execute(Command::SetSummary {
            db: db.clone(),
            movie_id: 3,
            joy: 0.9,
            sadness: 0.0,
            anger: 0.0,
            fear: 0.1,
            disgust: 0.0,
        })
        .unwrap();
        let store = open_store(&db).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find(3).unwrap().unwrap().joy, Some(0.9));
        drop(store);

        execute(Command::DeleteSummary {
            db: db.clone(),
            movie_id: 3,
        })
        .unwrap();
        assert_eq!(open_store(&db).unwrap().count().unwrap(), 0);
    }

    #[test]
    fn formats_null_components() {
        assert_eq!(format_component(None), "NULL");
        assert_eq!(format_component(Some(0.25)), "0.2500");
    }

    #[test]
    fn summary_lines_follow_label_order() {
        assert_eq!(summary_header(), "movie_id\tjoy\tsadness\tanger\tfear\tdisgust");
        let summary = MovieEmotionSummary {
            movie_id: 9,
            joy: Some(0.5),
            sadness: None,
            anger: Some(0.25),
            fear: None,
            disgust: Some(0.25),
        };
        assert_eq!(
            summary_line(&summary),
            "9\t0.5000\tNULL\t0.2500\tNULL\t0.2500"
        );
    }
}
