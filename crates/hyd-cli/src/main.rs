use clap::Parser;
use clap_complete::{generate, Shell};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use hyd_cli::cli::{build_cli_command, Cli, Commands, GraphCommands};
use hyd_core::{topology, Dialect, Document};
use hyd_io::importers::{parse_inp, parse_inp_auto, parse_rpt_str, Format};
use hyd_io::{exporters, ReportBundle};
use hyd_run::{validate_inp, EngineConfig, EngineKind, EngineRunner};

fn parse_dialect(dialect: &Option<String>) -> anyhow::Result<Option<Dialect>> {
    dialect
        .as_deref()
        .map(|s| s.parse::<Dialect>().map_err(anyhow::Error::from))
        .transpose()
}

fn load_document(inp: &str, dialect: &Option<String>) -> anyhow::Result<Document> {
    let doc = match parse_dialect(dialect)? {
        Some(dialect) => parse_inp(inp, dialect)?,
        None => parse_inp_auto(inp)?,
    };
    Ok(doc)
}

fn load_report(rpt: &str, dialect: &Option<String>) -> anyhow::Result<ReportBundle> {
    let text = fs::read_to_string(rpt)?;
    let dialect = match parse_dialect(dialect)? {
        Some(dialect) => dialect,
        None => Format::detect_content("rpt", &text)
            .map(|(format, _)| format.dialect())
            .unwrap_or(Dialect::Swmm),
    };
    Ok(parse_rpt_str(&text, dialect)?)
}

fn print_summary(doc: &Document) -> anyhow::Result<()> {
    let summary = doc.summary();
    if let Some(title) = &summary.title {
        println!("Title: {title}");
    }
    println!("Dialect: {}", summary.dialect);
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "ELEMENT\tCOUNT")?;
    for (label, count) in &summary.counts {
        writeln!(writer, "{label}\t{count}")?;
    }
    writer.flush()?;
    println!(
        "Diagnostics: {} warning(s), {} error(s)",
        summary.warnings, summary.errors
    );
    Ok(())
}

fn summary_cmd(inp: &str, dialect: &Option<String>, json: bool) -> anyhow::Result<()> {
    let doc = load_document(inp, dialect)?;
    if json {
        serde_json::to_writer_pretty(io::stdout(), &doc.summary())?;
        println!();
    } else {
        print_summary(&doc)?;
        for issue in &doc.diagnostics().issues {
            println!("  {issue}");
        }
    }
    Ok(())
}

fn validate_cmd(inp: &str, dialect: &Option<String>, json: bool) -> anyhow::Result<()> {
    let validation = validate_inp(Path::new(inp), parse_dialect(dialect)?);
    if json {
        serde_json::to_writer_pretty(io::stdout(), &validation)?;
        println!();
    } else {
        println!("valid: {}", validation.valid);
        for err in &validation.errors {
            println!("error: {err}");
        }
        for warning in &validation.warnings {
            println!("warning: {warning}");
        }
    }
    if validation.valid {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{inp} is not a usable model"))
    }
}

fn convert_cmd(input: &str, output: &str, dialect: &Option<String>) -> anyhow::Result<()> {
    let doc = load_document(input, dialect)?;
    exporters::write_inp(&doc, output)?;
    println!("Wrote {output}");
    Ok(())
}

fn run_cmd(
    inp: &str,
    rpt: &Option<String>,
    out: &Option<String>,
    engine: &Option<String>,
    binary: &Option<std::path::PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let kind = match engine {
        Some(name) => name.parse::<EngineKind>()?,
        None => EngineKind::for_dialect(load_document(inp, &None)?.dialect()),
    };
    let mut runner = match binary {
        Some(path) => EngineRunner::new(kind, path.clone()),
        None => {
            let config = EngineConfig::load()?;
            EngineRunner::discover(kind, &config)?
        }
    };
    runner.set_progress_callback(|pct, msg| info!("[{pct:>3}%] {msg}"));

    let outcome = runner.run(
        Path::new(inp),
        rpt.as_deref().map(Path::new),
        out.as_deref().map(Path::new),
    );
    if json {
        serde_json::to_writer_pretty(io::stdout(), &outcome)?;
        println!();
    } else {
        println!("status: {}", outcome.status);
        if let Some(rpt) = &outcome.rpt_path {
            println!("report: {}", rpt.display());
        }
        for warning in &outcome.warnings {
            println!("warning: {warning}");
        }
        for err in &outcome.errors {
            println!("error: {err}");
        }
    }
    match outcome.status {
        hyd_io::RunStatus::Error => Err(anyhow::anyhow!("simulation failed")),
        _ => Ok(()),
    }
}

fn report_cmd(
    rpt: &str,
    dialect: &Option<String>,
    table: &Option<String>,
    csv: &Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let bundle = load_report(rpt, dialect)?;

    if let Some(label) = table {
        let table = bundle.table(label);
        if let Some(csv_path) = csv {
            exporters::write_table_csv(table, csv_path)?;
            println!("Wrote {csv_path}");
            return Ok(());
        }
        if json {
            serde_json::to_writer_pretty(io::stdout(), table)?;
            println!();
            return Ok(());
        }
        let mut writer = TabWriter::new(io::stdout());
        writeln!(writer, "{}", table.columns.join("\t"))?;
        for row in table.rows() {
            let cells: Vec<String> = row.iter().map(|v| v.to_token()).collect();
            writeln!(writer, "{}", cells.join("\t"))?;
        }
        writer.flush()?;
        return Ok(());
    }

    if json {
        serde_json::to_writer_pretty(io::stdout(), &bundle)?;
        println!();
        return Ok(());
    }
    println!("status: {}", bundle.status());
    for table in bundle.tables() {
        println!("table: {} ({} rows)", table.label, table.len());
    }
    println!(
        "{} warning(s), {} error(s)",
        bundle.warnings.len(),
        bundle.errors.len()
    );
    Ok(())
}

fn graph_cmd(command: &GraphCommands) -> anyhow::Result<()> {
    match command {
        GraphCommands::Stats { inp, dialect } => {
            let doc = load_document(inp, dialect)?;
            let stats = topology::graph_stats(&doc)?;
            println!("Graph statistics for {inp}:");
            println!("  Nodes         : {}", stats.node_count);
            println!("  Edges         : {}", stats.edge_count);
            println!("  Components    : {}", stats.connected_components);
            println!(
                "  Degree [min/avg/max]: {}/{:.2}/{}",
                stats.min_degree, stats.avg_degree, stats.max_degree
            );
            println!("  Density       : {:.4}", stats.density);
            Ok(())
        }
        GraphCommands::Islands { inp, emit, dialect } => {
            let doc = load_document(inp, dialect)?;
            let analysis = topology::find_islands(&doc)?;
            for summary in &analysis.islands {
                println!("Island {}: {} node(s)", summary.island_id, summary.node_count);
            }
            if *emit {
                println!("\nNode -> Island assignments:");
                for assignment in &analysis.assignments {
                    println!(
                        "  idx {:>3}: {:<20} -> island {}",
                        assignment.node_index, assignment.label, assignment.island_id
                    );
                }
            }
            Ok(())
        }
        GraphCommands::Export {
            inp,
            format,
            out,
            dialect,
        } => {
            let doc = load_document(inp, dialect)?;
            let dot = topology::export_graph(&doc, format)?;
            if let Some(path) = out {
                fs::write(path, &dot)
                    .map_err(|e| anyhow::anyhow!("writing graph export to {path}: {e}"))?;
                println!("Graph exported to {path}");
            } else {
                println!("{dot}");
            }
            Ok(())
        }
    }
}

fn generate_completions(shell: Shell, out: Option<&Path>) -> anyhow::Result<()> {
    let mut cmd = build_cli_command();
    if let Some(path) = out {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        generate(shell, &mut cmd, "hyd", &mut file);
        println!("Wrote {shell:?} completion to {}", path.display());
    } else {
        let stdout = &mut io::stdout();
        generate(shell, &mut cmd, "hyd", stdout);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = match &cli.command {
        Some(Commands::Summary { inp, dialect, json }) => summary_cmd(inp, dialect, *json),
        Some(Commands::Validate { inp, dialect, json }) => validate_cmd(inp, dialect, *json),
        Some(Commands::Convert {
            input,
            output,
            dialect,
        }) => convert_cmd(input, output, dialect),
        Some(Commands::Graph { command }) => graph_cmd(command),
        Some(Commands::Run {
            inp,
            rpt,
            out,
            engine,
            binary,
            json,
        }) => run_cmd(inp, rpt, out, engine, binary, *json),
        Some(Commands::Report {
            rpt,
            dialect,
            table,
            csv,
            json,
        }) => report_cmd(rpt, dialect, table, csv, *json),
        Some(Commands::Completions { shell, out }) => generate_completions(*shell, out.as_deref()),
        None => {
            println!("No subcommand provided. Use `hyd --help` for more information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("command failed: {e:?}");
        std::process::exit(1);
    }
}
