use std::env;
use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;

use crate::config::resolve::{load_file_config, resolve_config_path};
use crate::config::{validate, RawSettings, RepoLocation, Settings};
use crate::error::{DepvizError, Result};
use crate::graph::builder::{build_from_source, BuildReport};
use crate::graph::ops::{load_order, LoadOrder};
use crate::graph::viz;
use crate::graph::DependencyGraph;
use crate::source::nuget::VersionSelector;
use crate::source::{MockRepository, NuGetSource};
use crate::util::{logging, output};

#[derive(Parser, Debug)]
#[command(name = "depviz")]
#[command(about = "Package dependency graph and load order", long_about = None)]
pub struct Cli {
    /// Package to analyse
    #[arg(short, long, env = "DEPVIZ_NAME", global = true)]
    pub name: Option<String>,
    /// Registry URL, or mock repository file in local/test mode
    #[arg(short, long, env = "DEPVIZ_REPO", global = true)]
    pub repo: Option<String>,
    /// off | local | remote | test
    #[arg(short, long, env = "DEPVIZ_MODE", global = true)]
    pub mode: Option<String>,
    /// Package version, or `latest`
    #[arg(long = "version", env = "DEPVIZ_VERSION", global = true)]
    pub version: Option<String>,
    #[arg(short, long, env = "DEPVIZ_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// abort | leaf
    #[arg(long, env = "DEPVIZ_FETCH_ERRORS", global = true)]
    pub fetch_errors: Option<String>,
    /// Registry request timeout in seconds
    #[arg(long = "timeout", env = "DEPVIZ_TIMEOUT", global = true)]
    pub timeout_secs: Option<u64>,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    fn raw_settings(&self) -> RawSettings {
        RawSettings {
            name: self.name.clone(),
            repo: self.repo.clone(),
            mode: self.mode.clone(),
            version: self.version.clone(),
            fetch_errors: self.fetch_errors.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the full dependency graph
    Graph(GraphArgs),
    /// Print the dependencies-first load order
    Order(OrderArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// list | tree | dot | json
    #[arg(long, default_value = "list")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    pub shell: Shell,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        output::set_colors(false);
    }
    logging::init(cli.verbose, cli.quiet);

    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let raw = cli.raw_settings();
    let command = cli.command.unwrap_or(Commands::Graph(GraphArgs {
        format: "list".to_string(),
    }));

    match command {
        Commands::Completions(args) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "depviz", &mut io::stdout());
            Ok(())
        }
        Commands::Graph(args) => {
            let format = parse_graph_format(&args.format)?;
            let settings = load_settings(raw, cli.config)?;
            if !cli.quiet {
                print_parameters(&settings, "graph");
            }
            let mut graph = DependencyGraph::new();
            build_graph(&settings, &mut graph)?;
            handle_graph(format, &graph, &settings, cli.quiet)
        }
        Commands::Order(args) => {
            let settings = load_settings(raw, cli.config)?;
            if !cli.quiet {
                print_parameters(&settings, "order");
            }
            let mut graph = DependencyGraph::new();
            build_graph(&settings, &mut graph)?;
            handle_order(args, &mut graph, &settings, cli.quiet)
        }
    }
}

/// Flags and environment first, then the config file.
fn load_settings(raw: RawSettings, config_path: Option<PathBuf>) -> Result<Settings> {
    let cwd = env::current_dir()?;
    let file = match resolve_config_path(&cwd, config_path)? {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            RawSettings::from(load_file_config(&path)?)
        }
        None => RawSettings::default(),
    };
    Ok(validate(raw.or(file))?)
}

fn build_graph(settings: &Settings, graph: &mut DependencyGraph) -> Result<BuildReport> {
    let report = match &settings.repo {
        RepoLocation::File(path) => {
            let mut source = MockRepository::load(path)?;
            if !source.contains(&settings.name) {
                output::warn(&format!(
                    "{} is not listed in {}",
                    settings.name,
                    path.display()
                ));
            }
            build_from_source(graph, &settings.name, &mut source, settings.fetch_policy)?
        }
        RepoLocation::Registry(url) => {
            let mut source = NuGetSource::new(
                url.clone(),
                settings.name.clone(),
                VersionSelector::parse(&settings.version),
                settings.timeout,
            )?;
            build_from_source(graph, &settings.name, &mut source, settings.fetch_policy)?
        }
    };

    for (package, err) in &report.failures {
        output::warn(&format!("{package}: {err} (treated as having no dependencies)"));
    }
    Ok(report)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GraphFormat {
    List,
    Tree,
    Dot,
    Json,
}

fn parse_graph_format(input: &str) -> Result<GraphFormat> {
    match input.to_ascii_lowercase().as_str() {
        "list" => Ok(GraphFormat::List),
        "tree" => Ok(GraphFormat::Tree),
        "dot" => Ok(GraphFormat::Dot),
        "json" => Ok(GraphFormat::Json),
        _ => Err(DepvizError::Other(anyhow::anyhow!(format!(
            "unknown graph format '{}' (use list, tree, dot or json)",
            input
        )))),
    }
}

fn handle_graph(
    format: GraphFormat,
    graph: &DependencyGraph,
    settings: &Settings,
    quiet: bool,
) -> Result<()> {
    match format {
        GraphFormat::List => {
            if !quiet {
                output::heading("Dependency graph:");
            }
            print!("{}", viz::render_list(graph));
        }
        GraphFormat::Tree => {
            if !quiet {
                output::heading("Dependency graph:");
            }
            print!("{}", viz::render_tree(graph, &settings.name));
        }
        GraphFormat::Dot => print!("{}", viz::render_dot(graph)),
        GraphFormat::Json => {
            let json = viz::render_json(graph).map_err(|err| DepvizError::Other(err.into()))?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn handle_order(
    args: OrderArgs,
    graph: &mut DependencyGraph,
    settings: &Settings,
    quiet: bool,
) -> Result<()> {
    let result = load_order(graph, &settings.name);

    if args.json {
        let json = viz::render_order_json(&result).map_err(|err| DepvizError::Other(err.into()))?;
        println!("{}", json);
        return Ok(());
    }

    match result {
        LoadOrder::Ordered(order) => {
            if !quiet {
                output::heading("Load order:");
            }
            println!("{}", viz::render_order(&order));
        }
        LoadOrder::Cycle(report) => {
            output::warn(&viz::render_cycle_warning(&report.members, &report.path));
        }
    }
    Ok(())
}

fn print_parameters(settings: &Settings, operation: &str) {
    output::heading("--- parameters ---");
    output::info(&format!("package:   {}", settings.name));
    output::info(&format!("repo:      {}", settings.repo));
    output::info(&format!("mode:      {}", settings.mode));
    output::info(&format!("version:   {}", settings.version));
    output::info(&format!("operation: {}", operation));
    output::heading("------------------");
}
