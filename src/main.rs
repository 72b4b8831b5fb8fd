use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sortie_plan::{
    compile_rule, logging, recompute_reachability, MapConfigs, MapLookup, Plan, PlanType,
    Settings, SETTINGS_FILE,
};

#[derive(Parser)]
#[command(name = "sortie-plan", about = "Check and tidy sortie plan files")]
struct Cli {
    /// User settings file, used for map config locations.
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    settings: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an enemy rule given as blocks, e.g. `BB + CL > 1 and DD >= 2`.
    CheckRule {
        #[arg(required = true, allow_hyphen_values = true)]
        blocks: Vec<String>,
    },
    /// Show which checked nodes survive the reachability check.
    Reachable {
        /// Normal map node config. Defaults to the one named in the settings.
        #[arg(long)]
        map_configs: Option<PathBuf>,
        /// Event map node config.
        #[arg(long)]
        event_configs: Option<PathBuf>,
        #[arg(long = "type", default_value = "normal_fight")]
        plan_type: String,
        #[arg(long)]
        chapter: String,
        #[arg(long)]
        map: String,
        /// Event folder, for event maps.
        #[arg(long)]
        event: Option<String>,
        /// Comma separated node names.
        #[arg(long, value_delimiter = ',')]
        nodes: Vec<String>,
    },
    /// Rewrite a plan with its keys in canonical order.
    Reorder {
        plan: PathBuf,
        #[arg(long = "type")]
        plan_type: Option<PlanType>,
    },
    /// Report broken rules, stale node overrides and unreachable nodes.
    Lint {
        plan: PathBuf,
        #[arg(long = "type")]
        plan_type: Option<PlanType>,
        #[arg(long)]
        event: Option<String>,
    },
}

fn load_map_configs(settings_path: &Path, normal: Option<PathBuf>, event: Option<PathBuf>) -> Result<MapConfigs> {
    let settings = Settings::load(settings_path)
        .with_context(|| format!("reading settings {}", settings_path.display()))?;
    Ok(MapConfigs::load(
        normal.unwrap_or(settings.normal_map_config),
        event.unwrap_or(settings.event_map_config),
    ))
}

fn check_rule(blocks: &[String]) -> Result<()> {
    match compile_rule(blocks) {
        Ok(rule) => {
            println!("valid: {}", rule.condition);
            Ok(())
        }
        Err(err) => bail!("invalid rule: {err}"),
    }
}

fn reachable(lookup: MapLookup, nodes: &[String]) -> Result<()> {
    let graph = match lookup {
        MapLookup::Found(graph) => graph,
        other => bail!("{other}"),
    };
    let checked: BTreeSet<String> = nodes.iter().map(|n| n.trim().to_owned()).collect();
    let result = recompute_reachability(&graph, &checked, &BTreeSet::new());
    println!("valid:   {}", join(&result.valid));
    println!("pruned:  {}", join(&result.pruned));
    println!("enabled: {}", join(&result.enabled));
    Ok(())
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn reorder(path: &Path, plan_type: Option<PlanType>) -> Result<()> {
    let plan = Plan::load(path, plan_type).with_context(|| format!("loading {}", path.display()))?;
    plan.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("reordered {}", path.display());
    Ok(())
}

fn lint(settings: &Path, path: &Path, plan_type: Option<PlanType>, event: Option<&str>) -> Result<()> {
    let plan = Plan::load(path, plan_type).with_context(|| format!("loading {}", path.display()))?;
    let mut problems = 0usize;

    for issue in plan.rule_issues() {
        println!("rule      {issue}");
        problems += 1;
    }
    for node in plan.stale_node_args() {
        println!("stale     node_args.{node} (node not selected)");
        problems += 1;
    }

    if plan.plan_type().has_node_map() {
        let configs = load_map_configs(settings, None, None)?;
        match configs.lookup_plan(&plan, event) {
            MapLookup::Found(graph) => {
                let checked: BTreeSet<String> = plan.selected_nodes().into_iter().collect();
                let result = recompute_reachability(&graph, &checked, &BTreeSet::new());
                for node in &result.pruned {
                    println!("unreached selected_nodes.{node}");
                    problems += 1;
                }
            }
            other => tracing::info!(reason = %other, "skipping reachability check"),
        }
    }

    if problems > 0 {
        bail!("{problems} problem(s) in {}", path.display());
    }
    println!("ok {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckRule { blocks } => check_rule(&blocks),
        Commands::Reachable {
            map_configs,
            event_configs,
            plan_type,
            chapter,
            map,
            event,
            nodes,
        } => {
            let configs = load_map_configs(&cli.settings, map_configs, event_configs)?;
            let lookup = configs.lookup_named(&plan_type, Some(&chapter), Some(&map), event.as_deref());
            reachable(lookup, &nodes)
        }
        Commands::Reorder { plan, plan_type } => reorder(&plan, plan_type),
        Commands::Lint {
            plan,
            plan_type,
            event,
        } => lint(&cli.settings, &plan, plan_type, event.as_deref()),
    }
}
