use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use taskline_core::{OpenAiBackend, ScheduleGenerator};

use super::common::load_config;

#[derive(Args)]
pub struct GenerateArgs {
    /// Plain-text task list, one task per line or free prose
    pub task_file: PathBuf,

    /// Where to write the schedule
    #[arg(short, long, default_value = "schedule.json")]
    pub output: PathBuf,

    /// Refuse schedules with overlaps, gaps in order or mismatched durations
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: GenerateArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let task_text = std::fs::read_to_string(&args.task_file)
        .map_err(|e| format!("cannot read task file {}: {e}", args.task_file.display()))?;
    if task_text.trim().is_empty() {
        return Err(format!("task file {} is empty", args.task_file.display()).into());
    }

    let config = load_config(config_path)?;
    let policy = config.planning.prompt_policy()?;
    let api_key = config.llm.resolve_api_key()?;
    let backend = OpenAiBackend::new(
        &config.llm.base_url,
        api_key,
        &config.llm.model,
        Duration::from_secs(config.llm.timeout_secs),
    )?;
    let generator =
        ScheduleGenerator::new(backend, policy).strict(args.strict || config.planning.strict);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let now = chrono::Local::now().naive_local();
    let generated = runtime.block_on(generator.generate(&task_text, now))?;

    for issue in &generated.issues {
        eprintln!("warning: {issue}");
    }

    println!("{}", generated.schedule.to_json_pretty()?);
    generated.schedule.save(&args.output)?;
    eprintln!(
        "{} tasks ({} min) written to {}",
        generated.schedule.len(),
        generated.schedule.total_minutes(),
        args.output.display()
    );
    Ok(())
}
