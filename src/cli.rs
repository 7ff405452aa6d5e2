use std::path::PathBuf;

use tracing::debug;

use crate::ingest::{extract_human_pilots, load_debriefing, Debriefing};
use crate::linking::{classify, link_combined, LinkConfig, LinkOutcome};
use crate::parallel::{analyze_logs, WorkerPool};
use crate::report::{
    build_pilot_view_model, export_chains_csv, render_aa_kills, render_chains, render_leftovers,
    render_pilot_stats, LeftoverOptions,
};
use crate::stats::{accumulate_pilot_stats, compute_aa_kills_by_target, compute_flight_time_by_pilot};

const USAGE: &str = "usage: debrief <link|stats|report|export|batch>";

/// Flags that consume the following argument.
const VALUE_FLAGS: [&str; 3] = ["--config", "--limit", "--workers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Link,
    Stats,
    Report,
    Export,
    Batch,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("link") => Some(Command::Link),
        Some("stats") => Some(Command::Stats),
        Some("report") => Some(Command::Report),
        Some("export") => Some(Command::Export),
        Some("batch") => Some(Command::Batch),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Link) => handle_link(args),
        Some(Command::Stats) => handle_stats(args),
        Some(Command::Report) => handle_report(args),
        Some(Command::Export) => handle_export(args),
        Some(Command::Batch) => handle_batch(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_link(args: &[String]) -> i32 {
    let positional = positionals(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: debrief link <log.json> [--config <linker.yaml>] [--table] [--limit N]");
        return 2;
    };
    let (debriefing, outcome) = match load_and_link(path, args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    if has_flag(args, "--table") {
        let limit = parse_usize_arg(flag_value(args, "--limit"), "limit", 20);
        println!(
            "events={} skipped={} chains={}",
            debriefing.events.len(),
            debriefing.skipped_events,
            outcome.chains.len()
        );
        for line in render_chains(&outcome.chains) {
            println!("{line}");
        }
        let options = LeftoverOptions {
            limit,
            ..LeftoverOptions::default()
        };
        for line in render_leftovers(&outcome, &options) {
            println!("{line}");
        }
        return 0;
    }

    print_json(&outcome, "link outcome")
}

fn handle_stats(args: &[String]) -> i32 {
    let positional = positionals(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: debrief stats <log.json> [--config <linker.yaml>]");
        return 2;
    };
    let (debriefing, outcome) = match load_and_link(path, args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let events = &debriefing.events;
    let humans = extract_human_pilots(events, debriefing.mission.as_ref());
    if !humans.is_empty() {
        let names: Vec<&str> = humans.iter().map(String::as_str).collect();
        println!("Human pilots: {}", names.join(", "));
    }

    let stats = accumulate_pilot_stats(events);
    let flight_times = compute_flight_time_by_pilot(events);
    let rendered = render_pilot_stats(&stats, Some(&flight_times));
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    let launches = classify(events).launches;
    let aa_kills = compute_aa_kills_by_target(&outcome.chains, &launches);
    println!("{}", render_aa_kills(&aa_kills));
    0
}

fn handle_report(args: &[String]) -> i32 {
    let positional = positionals(args);
    let Some(path) = positional.first() else {
        eprintln!("usage: debrief report <log.json> [--config <linker.yaml>]");
        return 2;
    };
    let (debriefing, outcome) = match load_and_link(path, args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let view = build_pilot_view_model(&debriefing.events, &outcome);
    print_json(&view, "pilot report")
}

fn handle_export(args: &[String]) -> i32 {
    let positional = positionals(args);
    let (Some(path), Some(out)) = (positional.first(), positional.get(1)) else {
        eprintln!("usage: debrief export <log.json> <out.csv> [--config <linker.yaml>]");
        return 2;
    };
    let (_, outcome) = match load_and_link(path, args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    match export_chains_csv(out, &outcome.chains) {
        Ok(()) => {
            println!("exported {} chain(s) to {out}", outcome.chains.len());
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_batch(args: &[String]) -> i32 {
    let paths: Vec<PathBuf> = positionals(args).into_iter().map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: debrief batch <log.json>... [--workers N] [--config <linker.yaml>]");
        return 2;
    }
    let config = match load_config(args) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let pool = WorkerPool::with_workers(parse_usize_arg(flag_value(args, "--workers"), "workers", 0));

    let entries = match analyze_logs(&paths, &config, &pool) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("failed to start worker pool: {err}");
            return 1;
        }
    };

    let mut failures = 0;
    for entry in &entries {
        match &entry.result {
            Ok(summary) => println!(
                "{}\tevents={} chains={} hits={} kills={} splash={} intercepted={} unlinked_shots={} unlinked_hits={} unlinked_kills={}",
                entry.path.display(),
                summary.events,
                summary.chains,
                summary.hits,
                summary.kills,
                summary.splash_kills,
                summary.intercepted,
                summary.leftover_launches,
                summary.leftover_impacts,
                summary.leftover_destructions
            ),
            Err(err) => {
                failures += 1;
                eprintln!("{}\terror: {err}", entry.path.display());
            }
        }
    }

    if failures == 0 {
        0
    } else {
        1
    }
}

fn load_config(args: &[String]) -> Result<LinkConfig, i32> {
    let Some(path) = flag_value(args, "--config") else {
        return Ok(LinkConfig::default());
    };
    LinkConfig::load(path).map_err(|err| {
        eprintln!("config error: {err}");
        1
    })
}

fn load_and_link(path: &str, args: &[String]) -> Result<(Debriefing, LinkOutcome), i32> {
    let config = load_config(args)?;
    let debriefing = load_debriefing(path).map_err(|err| {
        eprintln!("load failed: {err}");
        1
    })?;
    debug!(path, events = debriefing.events.len(), "debriefing loaded");
    let outcome = link_combined(&debriefing.events, &config);
    Ok((debriefing, outcome))
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

/// Arguments after the subcommand that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().skip(2).any(|arg| arg == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .skip(2)
        .position(|arg| arg == flag)
        .and_then(|idx| args.get(idx + 3))
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
