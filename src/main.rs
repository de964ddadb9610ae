use anyhow::{Context, Result};
use extract_lines::extract;
use is_terminal::IsTerminal;
use std::fs::File;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();

    let Some(args) = extract_lines::args::parsed()? else {
        return Ok(()); // No arguments: the usage message has been printed
    };

    let diagnostics = io::stderr().lock();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Can't create file: {}", path.display()))?;
            extract(&args, io::BufWriter::new(file), diagnostics)?;
        }
        None => {
            let stdout = io::stdout();
            if stdout.is_terminal() {
                extract(&args, stdout.lock(), diagnostics)?;
            } else {
                extract(&args, io::BufWriter::new(stdout.lock()), diagnostics)?;
            }
        }
    }
    Ok(())
}
