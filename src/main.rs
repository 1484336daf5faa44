use anyhow::Context;
use clap::Parser;
use tailwind_class_validator::{logging, run_check, run_registry, Cli, Commands};

fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => {
            let stdout = std::io::stdout();
            let found = run_check(&args, std::io::stdin().lock(), &mut stdout.lock())
                .context("class check failed")?;
            if found > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Registry(args) => {
            let stdout = std::io::stdout();
            let report = run_registry(&args, &mut stdout.lock())
                .context("failed to build class registry")?;
            if let Some(path) = &args.output {
                eprintln!(
                    "Wrote registry report with {} classes to {}",
                    report.classes.len(),
                    path.display()
                );
            }
            Ok(())
        }
    }
}
