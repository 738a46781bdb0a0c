use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use study_planner::{
    config::PlannerConfig,
    core::{sibling_policy_path, StudySession},
    planner::{Difficulty, Schedule, UserPreferences},
    reinforcement::{FeedbackMap, FeedbackRating, Policy},
    utils::{calculate_schedule_metrics, format_hour_chart, format_metrics, format_schedule_table},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (json, yaml or toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Application state file (overrides the configuration)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Learned policy file (defaults to <state>_policy.json next to --state)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Seed for exploration, for reproducible refinement
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new study schedule
    Generate {
        /// Subject, optionally with difficulty: "Math" or "Math:high" (repeatable)
        #[arg(short, long = "subject", value_parser = parse_subject)]
        subjects: Vec<(String, Option<Difficulty>)>,

        /// Study hours per day
        #[arg(long)]
        hours: Option<usize>,

        /// Number of study days
        #[arg(long)]
        days: Option<usize>,
    },

    /// Refine the stored schedule from feedback on each subject
    Optimize {
        /// Feedback as SUBJECT=RATING, rating one of excellent, good, fair, poor, very_poor
        #[arg(short, long = "feedback", value_parser = parse_feedback)]
        feedback: Vec<(String, FeedbackRating)>,
    },

    /// Show stored schedules, metrics and the learned preferences
    Show,
}

fn parse_subject(raw: &str) -> Result<(String, Option<Difficulty>), String> {
    let (name, difficulty) = match raw.rsplit_once(':') {
        Some((name, level)) => (name, Some(level.parse().map_err(|e| format!("{}", e))?)),
        None => (raw, None),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("subject name must not be empty".to_string());
    }
    Ok((name.to_string(), difficulty))
}

fn parse_feedback(raw: &str) -> Result<(String, FeedbackRating), String> {
    let (subject, rating) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SUBJECT=RATING, got '{}'", raw))?;
    let rating = rating.parse().map_err(|e| format!("{}", e))?;
    Ok((subject.trim().to_string(), rating))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    study_planner::init_with_logger(true, cli.verbose)?;

    let mut config = PlannerConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(state) = &cli.state {
        config.state_path = state.clone();
        config.policy_path = sibling_policy_path(state);
    }
    if let Some(policy) = &cli.policy {
        config.policy_path = policy.clone();
    }

    let mut session = StudySession::new(config);
    if let Some(seed) = cli.seed {
        session = session.with_seed(seed);
    }
    info!("Using state file {}", session.state_path().display());

    match cli.command {
        Commands::Generate {
            subjects,
            hours,
            days,
        } => generate(&session, subjects, hours, days),
        Commands::Optimize { feedback } => optimize(&session, feedback),
        Commands::Show => show(&session),
    }
}

fn generate(
    session: &StudySession,
    subjects: Vec<(String, Option<Difficulty>)>,
    hours: Option<usize>,
    days: Option<usize>,
) -> Result<()> {
    let defaults = &session.config().defaults;
    let subjects = if subjects.is_empty() {
        defaults.subjects.iter().map(|s| (s.clone(), None)).collect()
    } else {
        subjects
    };

    let mut preferences = UserPreferences::new(
        subjects.iter().map(|(name, _)| name.clone()).collect(),
        hours.unwrap_or(defaults.hours_per_day),
        days.unwrap_or(defaults.days),
    );
    for (name, difficulty) in subjects {
        if let Some(difficulty) = difficulty {
            preferences = preferences.with_difficulty(name, difficulty);
        }
    }

    let outcome = session
        .generate(preferences)
        .context("Failed to generate schedule")?;

    println!("Your personalized study schedule:\n");
    print!("{}", format_schedule_table(&outcome.schedule));
    if outcome.omitted_days > 0 {
        println!(
            "\n{} day(s) could not be scheduled: adjacent hours need at least two different subjects.",
            outcome.omitted_days
        );
    }
    println!();
    print!("{}", format_metrics(&outcome.metrics));
    Ok(())
}

fn optimize(session: &StudySession, feedback: Vec<(String, FeedbackRating)>) -> Result<()> {
    let explicit: FeedbackMap = feedback.into_iter().collect();
    let outcome = session
        .optimize(&explicit)
        .context("Failed to optimize schedule")?;

    println!("Feedback applied:");
    for (subject, rating) in &outcome.feedback {
        println!("  {:<16} {} ({:+.1})", subject, rating, rating.reward());
    }
    println!(
        "\n{} policy; {} value updates, {} of {} slots changed.\n",
        if outcome.restored_policy { "Continued saved" } else { "Started new" },
        outcome.summary.updates,
        outcome.summary.changed,
        outcome.summary.slots
    );

    println!("Your optimized study schedule:\n");
    print!("{}", format_schedule_table(&outcome.schedule));
    println!();
    print!("{}", format_metrics(&outcome.metrics));
    Ok(())
}

fn show(session: &StudySession) -> Result<()> {
    let state = session.load_state().context("Failed to load state")?;
    let Some(preferences) = state.user_preferences else {
        println!("No schedule yet. Run `study-planner generate` first.");
        return Ok(());
    };

    println!(
        "Subjects: {}",
        preferences
            .subjects
            .iter()
            .map(|s| format!("{} ({})", s, preferences.difficulty_of(s)))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "{} hours per day, {} days\n",
        preferences.hours_per_day, preferences.days
    );

    let sections: [(&str, Option<&Schedule>); 2] = [
        ("Initial", state.generated_schedule.as_ref()),
        ("Optimized", state.optimized_schedule.as_ref()),
    ];
    for (label, schedule) in sections {
        let Some(schedule) = schedule else { continue };
        let metrics = calculate_schedule_metrics(schedule, &preferences.subjects);
        println!("{} schedule:\n", label);
        print!("{}", format_schedule_table(schedule));
        println!();
        print!("{}", format_metrics(&metrics));
        println!("\nDistribution of study hours by subject ({}):", label.to_lowercase());
        print!("{}", format_hour_chart(&metrics));
        println!();
    }

    let (refiner, restored) = session
        .refiner_for(&preferences.subjects)
        .context("Failed to load policy")?;
    if restored {
        let q_learning = refiner.q_learning();
        println!("Learned preferences (greedy subject per state):");
        for state in 0..q_learning.state_size() {
            if let Some(action) = q_learning.greedy_action(state) {
                println!(
                    "  state {:>3}: {:<16} p={:.2}  Q={:.3}",
                    state,
                    q_learning.action_to_subject(action),
                    q_learning.action_probability(state, action),
                    q_learning.q_table().get(state, action)
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subject() {
        assert_eq!(parse_subject("Math").unwrap(), ("Math".to_string(), None));
        assert_eq!(
            parse_subject(" Organic Chemistry :high").unwrap(),
            ("Organic Chemistry".to_string(), Some(Difficulty::High))
        );
        assert!(parse_subject("Math:extreme").unwrap_err().contains("extreme"));
        assert!(parse_subject("   ").is_err());
        assert!(parse_subject(":low").is_err());
    }

    #[test]
    fn test_parse_feedback() {
        assert_eq!(
            parse_feedback("Math=very poor").unwrap(),
            ("Math".to_string(), FeedbackRating::VeryPoor)
        );
        assert!(parse_feedback("Math").unwrap_err().contains("SUBJECT=RATING"));
        assert!(parse_feedback("Math=superb").unwrap_err().contains("superb"));
    }

    #[test]
    fn test_cli_collects_repeated_arguments() {
        let cli = Cli::try_parse_from([
            "study-planner",
            "generate",
            "-s",
            "Math:high",
            "--subject",
            "Art",
            "--hours",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate { subjects, hours, days } => {
                assert_eq!(subjects.len(), 2);
                assert_eq!(subjects[0].1, Some(Difficulty::High));
                assert_eq!(hours, Some(3));
                assert_eq!(days, None);
            }
            _ => panic!("expected generate"),
        }

        assert!(Cli::try_parse_from(["study-planner", "optimize", "-f", "Math"]).is_err());
    }
}
