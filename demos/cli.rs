use exact_algebra::{Equation, Options, Trace};
use std::io::{BufRead, BufReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let stdin = std::io::stdin();
    let verbose = std::env::args().any(|arg| arg == "--steps");

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let equation: Equation = match line.parse() {
            Ok(equation) => equation,
            Err(e) => {
                eprintln!("Unable to parse \"{}\": {}", line, e);
                continue;
            },
        };

        let mut trace = Trace::default();
        let got = equation.solve_with(&Options::default(), &mut trace);

        if verbose {
            for snapshot in &trace.stages {
                println!("  {:>14}: {}", snapshot.stage, snapshot.text);
            }
        }

        match got {
            Ok(solution) => println!("{} => {}", equation, solution),
            Err(e) => eprintln!("Unable to solve \"{}\": {}", equation, e),
        }
    }

    Ok(())
}
