mod cli;

use anyhow::Context;
use ndo_vars::document::Document;
use ndo_vars::tables::Tables;
use std::io::Write;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("NDO_VARS_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Convert(convert_cli) => convert(convert_cli),
        cli::Command::Check(check_cli) => check(check_cli),
        cli::Command::Flatten(flatten_cli) => flatten(flatten_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn convert(cli: cli::ConvertCommand) -> anyhow::Result<()> {
    let tables = load(&cli.input)?;
    let document = ndo_vars::convert(&tables)?;

    match &cli.output.file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            output(&cli.output, &document, std::io::BufWriter::new(file))?;

            eprintln!("Generated {}", path.display());
            eprintln!("{}", document.summary());
        }
        None => output(&cli.output, &document, std::io::stdout().lock())?,
    }

    Ok(())
}

pub fn check(cli: cli::CheckCommand) -> anyhow::Result<()> {
    let tables = load(&cli.input)?;
    let document = ndo_vars::convert(&tables)?;

    println!("Tables are valid");
    println!("{}", document.summary());
    Ok(())
}

/// Read a document in tree layout and write it as tables
pub fn flatten(cli: cli::FlattenCommand) -> anyhow::Result<()> {
    let text = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin())?,
    };

    // json documents are valid yaml
    let document: Document = serde_yaml::from_str(&text).context("Unable to parse document")?;
    let tables = ndo_vars::flatten::flatten(&document);

    // a hand-edited document may not hold up
    ndo_vars::convert(&tables).context("Document does not flatten into valid tables")?;

    tables.write_directory(&cli.output_dir)?;
    eprintln!("Wrote {} rows to {}", tables.row_count(), cli.output_dir.display());
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Tables> {
    let mut tables = Tables::default();

    if input.directories.is_empty() && input.files().next().is_none() {
        tables.load_directory(&std::env::current_dir()?)?;
        return Ok(tables);
    }

    for dir_path in &input.directories {
        tables.load_directory(dir_path)?;
    }

    for (kind, file_path) in input.files() {
        tables.load_file(kind, file_path)?;
    }

    Ok(tables)
}

fn output(output: &cli::OutputArgs, document: &Document, writer: impl Write) -> anyhow::Result<()> {
    match output.layout {
        cli::Layout::Tree => write_value(output.format, document, writer),
        cli::Layout::Ndo => write_value(
            output.format,
            &ndo_vars::ndo::NdoVars::from(document),
            writer,
        ),
    }
}

fn write_value<T: serde::Serialize>(
    format: cli::OutputFormat,
    value: &T,
    mut writer: impl Write,
) -> anyhow::Result<()> {
    match format {
        cli::OutputFormat::Yaml => {
            writer.write_all(b"# Auto-generated from CSV files\n")?;
            serde_yaml::to_writer(&mut writer, value)?;
        }
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
    };

    writer.flush()?;
    Ok(())
}

/// (ndo-vars-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    let tables = load(&cli.input)?;

    match cli.command {
        cli::DevSubCommand::Tables => println!("{tables:#?}"),
        cli::DevSubCommand::Records => {
            let records = ndo_vars::normalize::Records::from_tables(&tables)?;
            println!("{records:#?}")
        }
        cli::DevSubCommand::Links => {
            let records = ndo_vars::normalize::Records::from_tables(&tables)?;
            let links = ndo_vars::resolve::resolve(&records)?;
            println!("{links:#?}")
        }
    }

    Ok(())
}
