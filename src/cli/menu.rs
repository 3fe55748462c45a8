// Interactive menu: batch a whole file or test one input manually.
//
// Every failure is caught here and printed; the process ends normally either
// way so the menu can be driven from shell scripts without exit-code checks.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::core::batch::{BatchService, SampleSheetStore};
use crate::core::moderation::{ModerationApi, ModerationService};

pub async fn run<M, S>(moderation: &ModerationService<M>, batch: &BatchService<M, S>)
where
    M: ModerationApi,
    S: SampleSheetStore,
{
    println!("Choose an option:");
    println!("1. Process a complete file");
    println!("2. Test a single input manually");
    let choice = prompt("Your choice (1 or 2): ");

    match choice.trim() {
        "1" => {
            let input_file = prompt("Enter the path to the input Excel file: ");
            run_batch(batch, PathBuf::from(input_file.trim())).await;
        }
        "2" => run_single(moderation).await,
        _ => println!("Invalid choice. Please restart the program."),
    }
}

async fn run_batch<M, S>(batch: &BatchService<M, S>, input: PathBuf)
where
    M: ModerationApi,
    S: SampleSheetStore,
{
    match batch.run(&input).await {
        Ok(summary) => {
            println!(
                "Results saved to {} ({} rows: {} processed, {} failed)",
                summary.output_path.display(),
                summary.total,
                summary.succeeded,
                summary.failed
            );
        }
        Err(err) => println!("Error: {}", err),
    }
}

async fn run_single<M: ModerationApi>(moderation: &ModerationService<M>) {
    let text = prompt("Enter the text to moderate: ");

    match moderation.moderate_and_interpret(text.trim()).await {
        Ok(outcome) => {
            println!();
            println!("--- Results ---");
            println!("Rejection Chance: {:.2}%", outcome.rejection_percentage);
            println!("Category: {}", outcome.category);
            println!("Status: {}", outcome.status);
        }
        Err(err) => println!("Error: {}", err),
    }
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return String::new();
    }
    line
}
