//! End-of-run summary printed to the terminal

use colored::*;

use super::{Mode, RunReport};

/// Print what a successful run did
pub fn print_run_report(mode: Mode, name: &str, report: &RunReport) {
    if let Some(batch) = &report.batch {
        println!(
            "{} {}",
            "✓".green(),
            format!(
                "{} job(s) completed after {} probe cycle(s)",
                batch.jobs.len(),
                batch.cycles
            )
            .bold()
        );
        for job in &batch.jobs {
            println!(
                "  {} {} {}",
                "▸".cyan(),
                job.job_name,
                format!("(run {}, batch {})", job.run_id, job.batch_job_id).dimmed()
            );
        }
    }

    if report.transformed {
        let key = mode.transform_key(name);
        let target = if key.is_empty() { "repository run" } else { key };
        println!("{} Downstream transform issued for {}", "✓".green(), target.cyan());
    }
}
