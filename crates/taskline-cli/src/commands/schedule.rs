use std::path::{Path, PathBuf};

use clap::Subcommand;
use taskline_core::Schedule;

use super::common::load_config;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Print a schedule file as a table
    Show {
        file: PathBuf,
        /// Print normalized JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Check a schedule file for overlaps, ordering and duration mismatches
    Validate {
        file: PathBuf,
    },
}

pub fn run(action: ScheduleAction, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Show { file, json } => {
            let schedule = Schedule::load(&file)?;
            if json {
                println!("{}", schedule.to_json_pretty()?);
                return Ok(());
            }
            println!("Schedule for {}", schedule.date_label());
            for (i, task) in schedule.tasks.iter().enumerate() {
                println!(
                    "{:>3}. {}-{}  {:<32} {:>4} min",
                    i + 1,
                    task.start_time.format("%H:%M"),
                    task.end_time.format("%H:%M"),
                    task.task_name,
                    task.duration_minutes
                );
            }
            println!("{} tasks, {} min total", schedule.len(), schedule.total_minutes());
        }
        ScheduleAction::Validate { file } => {
            let schedule = Schedule::load(&file)?;
            let day_end = load_config(config_path)?.planning.day_end_time()?;
            let issues = schedule.validate(day_end);
            if issues.is_empty() {
                println!("ok: {} tasks", schedule.len());
                return Ok(());
            }
            for issue in &issues {
                println!("{issue}");
            }
            return Err(format!("{} issue(s) in {}", issues.len(), file.display()).into());
        }
    }
    Ok(())
}
