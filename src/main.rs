use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use overlap::args::{Args, Command};
use overlap::operands::{
    hashed_path, output_info, read_both, read_operand, write_digests, write_generated,
};
use overlap::{compare_texts, generate, report, ErrorClass, UniqueDataset};

fn main() -> ExitCode {
    let args = match overlap::args::parsed() {
        Ok(args) => args,
        Err(e) => return failure(&e),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => failure(&e),
    }
}

/// Exit status 2 for problems with the input, 1 for anything else.
fn failure(e: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {e:#}");
    match e.downcast_ref::<overlap::Error>().map(overlap::Error::class) {
        Some(ErrorClass::Client) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn run(args: &Args) -> Result<()> {
    let color = args.color.into();
    let stdout = io::stdout();
    let mut out: Box<dyn Write> = if stdout.is_terminal() {
        Box::new(anstream::AutoStream::new(stdout.lock(), color))
    } else {
        Box::new(BufWriter::new(anstream::AutoStream::new(stdout.lock(), color)))
    };

    match &args.command {
        Command::Compare { file1, file2, method } => {
            method.ensure_implemented()?;
            let (text1, text2) = read_both(file1, file2)?;
            info!(
                "Comparing {} ({} bytes) and {} ({} bytes)",
                file1.display(),
                text1.len(),
                file2.display(),
                text2.len()
            );
            let result = compare_texts(&text1, &text2, *method, &args.limits)?;
            report::comparison(&mut out, &result, args.format)
        }
        Command::Generate { request, out_dir, prefix } => {
            let result = generate(request, &args.limits)?;
            let (first, second) = write_generated(&result, out_dir, prefix)?;
            report::generation(&mut out, &result.stats, (&first, &second), args.format)
        }
        Command::Hash { file, output } => {
            let text = read_operand(file)?;
            let (dataset, _) = UniqueDataset::parse(&text, &args.limits)?;
            let path = output.clone().unwrap_or_else(|| hashed_path(file));
            let (bom, line_terminator) = output_info(&text);
            let sink = File::create(&path)
                .with_context(|| format!("Can't create file: {}", path.display()))?;
            write_digests(&dataset, BufWriter::new(sink), bom, line_terminator)
                .with_context(|| format!("Error writing file: {}", path.display()))?;
            report::hashed(&mut out, dataset.len(), &path, args.format)
        }
    }
}
