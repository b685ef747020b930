use std::io::{BufRead, BufReader};

use stepsolve::{solve_problem, InputFormat};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match solve_problem(&line, InputFormat::Plain) {
            Ok(result) => {
                println!("{}", result.canonical_equation);
                println!("  type: {}", result.problem_type);
                if result.solutions.is_empty() {
                    println!("  no closed-form solutions");
                } else {
                    println!("  solutions: {}", result.solutions.join(", "));
                }
                println!("  validated: {}", result.validated);
                println!("  factored: {}", result.factored_form);
                for step in &result.steps {
                    println!(
                        "  step {} ({}): {}  ->  {}",
                        step.index, step.rule, step.before, step.after
                    );
                    println!("    {}", step.narration);
                }
            }
            Err(e) => eprintln!("Unable to solve \"{}\": {}", line, e),
        }
    }

    Ok(())
}
