/*!
# Inlist Catalog CLI

Builds the parameter catalog of an installation and answers questions about
it: a parameter's type, default or documentation, name and doc searches, and
a rendered inlist of a group's defaults.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

use inlist_catalog::catalog::{
    discover_root, render_inlist, CatalogBuilder, CatalogStore, GroupBuild, InstallLayout, RenderOptions,
};
use inlist_catalog::cli_common::{
    self, ensure_dir_exists, format_duration, group_progress, print_header, print_info, print_success, print_warning, spinner, CatalogArgs,
    CommonArgs, OutputArgs, OutputFormat, OutputWriter,
};
use inlist_catalog::config::{user_config_path, CatalogConfig};
use inlist_catalog::core::ErrorLevel;

#[derive(Parser)]
#[command(
    name = "inlist-catalog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Catalog of Fortran namelist parameters: types, defaults and documentation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[clap(flatten)]
    common: CommonArgs,

    #[clap(flatten)]
    catalog: CatalogArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the installation sources and write a fresh catalog
    Build {
        /// Parse and report without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },

    /// Show everything known about a parameter
    Show {
        name: String,
        /// Restrict the lookup to one namelist group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Print the documentation block of a parameter
    Doc {
        name: String,
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Print the default value of a parameter as a Fortran literal
    Default {
        name: String,
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Find parameters whose name (or documentation) contains a fragment
    Search {
        fragment: String,
        #[arg(short, long)]
        group: Option<String>,
        /// Search documentation instead of names
        #[arg(long)]
        doc: bool,
    },

    /// Run a placeholder query, e.g. "dtype = ? AND group LIKE ?"
    Query {
        template: String,
        terms: Vec<String>,
    },

    /// Render a group's defaults as an inlist
    Render {
        group: String,
        /// Include documentation blocks as comments
        #[arg(long)]
        with_docs: bool,
        /// Include declared parameters without a default, commented out
        #[arg(long)]
        include_unassigned: bool,
        #[clap(flatten)]
        output: OutputArgs,
    },

    /// List groups in the catalog with their parameter counts
    Groups,

    /// Print the effective configuration, or write it to a file
    Config {
        #[clap(flatten)]
        output: OutputArgs,
        /// Write to the user config (~/.inlist_catalog/config.toml)
        #[arg(long, conflicts_with = "output")]
        user: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli_common::init_logging(cli.common.log_level()) {
        eprintln!("{:#}", e);
    }

    if let Err(e) = run(cli) {
        cli_common::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.common.output_format()?;
    let config = CatalogConfig::discover(cli.catalog.config.as_deref())?;

    match cli.command {
        Commands::Build { dry_run } => build_command(&cli.common, &cli.catalog, config, dry_run),
        Commands::Config { output, user } => config_command(&config, output, user),
        command => {
            let store = open_store(&cli.catalog, &config)?;
            let mut out = OutputWriter::stdout(format).with_pretty(cli.common.pretty);
            query_command(command, &store, &mut out)?;
            out.flush()
        }
    }
}

fn open_store(args: &CatalogArgs, config: &CatalogConfig) -> Result<CatalogStore> {
    let dir = match &args.catalog {
        Some(dir) => dir.clone(),
        None => discover_root(args.root.as_deref())?.join(&config.catalog_dir),
    };
    Ok(CatalogStore::new(dir))
}

fn build_command(common: &CommonArgs, args: &CatalogArgs, config: CatalogConfig, dry_run: bool) -> Result<()> {
    let start = Instant::now();
    let layout = InstallLayout::discover(args.root.as_deref(), &config)?;
    let catalog_dir = args
        .catalog
        .clone()
        .unwrap_or_else(|| layout.catalog_dir(&config));

    let status = common.shows_status();
    if status {
        print_header(
            "inlist-catalog",
            env!("CARGO_PKG_VERSION"),
            "Building the namelist parameter catalog",
        );
        print_info(&format!(
            "Installation {} (version {}, .{} sources)",
            layout.root.display(),
            layout.version,
            layout.extension
        ));
    }

    let pb = group_progress(config.groups.len(), status);
    let builder = CatalogBuilder::new(layout, config);
    let report = builder.build_with_progress(&|build: &GroupBuild| {
        pb.set_message(build.group.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let format = common.output_format()?;
    let mut out = OutputWriter::stdout(format).with_pretty(common.pretty);
    if format == OutputFormat::Json {
        out.write_object(&report.groups)?;
    } else if common.should_print() {
        let rows = report
            .groups
            .iter()
            .map(|g| {
                vec![
                    g.group.clone(),
                    g.records.to_string(),
                    g.declared.to_string(),
                    g.defaults_seen.to_string(),
                    g.appended.to_string(),
                ]
            })
            .collect();
        out.write_table(&["group", "records", "declared", "defaults", "undeclared"], rows)?;
    }
    out.flush()?;

    for diagnostic in report.diagnostics.iter() {
        match diagnostic.level {
            ErrorLevel::Error => cli_common::print_error(&diagnostic.to_string()),
            ErrorLevel::Warning if status && common.verbose => print_warning(&diagnostic.to_string()),
            _ => {}
        }
    }
    if status && report.diagnostics.warning_count() > 0 && !common.verbose {
        print_warning(&format!(
            "{} warnings (use --verbose to list them)",
            report.diagnostics.warning_count()
        ));
    }

    if dry_run {
        if status {
            print_info("Dry run: catalog not written");
        }
        return Ok(());
    }

    let sp = spinner("Writing catalog...", status);
    CatalogStore::create(&catalog_dir, &report.records, report.version)
        .with_context(|| format!("Failed to write catalog to {}", catalog_dir.display()))?;
    sp.finish_and_clear();

    if status {
        print_success(&format!(
            "{} parameters written to {} in {}",
            report.records.len(),
            catalog_dir.display(),
            format_duration(start.elapsed())
        ));
    }
    Ok(())
}

fn query_command(command: Commands, store: &CatalogStore, out: &mut OutputWriter) -> Result<()> {
    match command {
        Commands::Show { name, group } => {
            let record = store.find(&name, group.as_deref())?;
            out.write_record(record)?;
        }
        Commands::Doc { name, group } => {
            let record = store.find(&name, group.as_deref())?;
            out.write_line(&record.doc)?;
        }
        Commands::Default { name, group } => {
            let record = store.find(&name, group.as_deref())?;
            if out.format() == OutputFormat::Json {
                out.write_object(&record.default)?;
            } else {
                out.write_line(&record.default.to_fortran())?;
            }
        }
        Commands::Search { fragment, group, doc } => {
            let records = if doc {
                store.search_doc(&fragment, group.as_deref())?
            } else {
                store.search_name(&fragment, group.as_deref())?
            };
            if records.is_empty() && out.format() != OutputFormat::Json {
                print_warning(&format!("Nothing matches '{}'", fragment));
            } else {
                out.write_records(&records)?;
            }
        }
        Commands::Query { template, terms } => {
            let records = store.search(&template, &terms)?;
            out.write_records(&records)?;
        }
        Commands::Render {
            group,
            with_docs,
            include_unassigned,
            output,
        } => {
            let catalog = store.catalog()?;
            let records = catalog.group_records(&group);
            if records.is_empty() {
                anyhow::bail!("No parameters in group '{}'", group);
            }
            let text = render_inlist(
                &group,
                &records,
                RenderOptions {
                    with_docs,
                    include_unassigned,
                },
            );
            write_text(output.output, &text)?;
        }
        Commands::Groups => {
            let catalog = store.catalog()?;
            let rows = catalog
                .groups()
                .into_iter()
                .map(|g| {
                    let records = catalog.group_records(g);
                    let assigned = records.iter().filter(|r| r.has_default()).count();
                    vec![g.to_string(), records.len().to_string(), assigned.to_string()]
                })
                .collect();
            out.write_table(&["group", "parameters", "with default"], rows)?;
        }
        // handled in run() without a store
        Commands::Build { .. } | Commands::Config { .. } => {}
    }
    Ok(())
}

fn config_command(config: &CatalogConfig, output: OutputArgs, user: bool) -> Result<()> {
    for problem in config.validate() {
        print_warning(&problem);
    }
    let target = if user {
        Some(user_config_path().context("Could not determine home directory")?)
    } else {
        output.output
    };
    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir_exists(parent)?;
            }
            config.save_to_file(&path)?;
            print_success(&format!("Configuration written to {}", path.display()));
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn write_text(path: Option<PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = OutputWriter::file(&path, OutputFormat::Text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            file.write_line(text.trim_end_matches('\n'))?;
            file.flush()?;
            eprintln!("{} {}", "Wrote".green(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
