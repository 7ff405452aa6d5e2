use std::collections::BTreeMap;

use crate::linking::LinkOutcome;
use crate::model::Chain;
use crate::stats::PilotStats;

/// `hh:mm:ss` from whole seconds; fractions are dropped.
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

pub fn render_chains(chains: &[Chain]) -> Vec<String> {
    chains
        .iter()
        .map(|chain| {
            let mut parts = vec![
                format!("Pilot={}", chain.launch.shooter_pilot),
                format!("Weapon={}", chain.launch.weapon_name),
                format!("WeaponID={}", opt(chain.launch.weapon_id)),
                format!("ShotT={:.2}", chain.launch.time),
            ];
            if let Some(impact) = &chain.impact {
                parts.push(format!("HitT={:.2}", impact.time));
                parts.push(format!("TargetID={}", opt(impact.target_id)));
            }
            if let Some(kill) = &chain.kill {
                parts.push(format!("KillT={:.2}", kill.time));
            }
            if !chain.extra_kills.is_empty() {
                parts.push(format!("SplashKills={}", chain.extra_kills.len()));
            }
            if let Some(interceptor) = chain.interceptor() {
                parts.push(format!("InterceptedBy={interceptor}"));
            }
            if !chain.shooter_consistent {
                parts.push("ShooterMismatch".to_string());
            }
            if chain.friendly_fire {
                parts.push("FriendlyFire".to_string());
            }
            format!("Chain: {}", parts.join(", "))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LeftoverOptions<'a> {
    /// Rows shown per section; 0 shows everything.
    pub limit: usize,
    pub exclude_launch_types: &'a [&'a str],
    pub launches_label: &'a str,
}

impl Default for LeftoverOptions<'_> {
    fn default() -> Self {
        Self {
            limit: 20,
            exclude_launch_types: &[],
            launches_label: "Unlinked Shots",
        }
    }
}

fn push_section<T>(
    lines: &mut Vec<String>,
    label: &str,
    items: &[T],
    limit: usize,
    row: impl Fn(&T) -> String,
) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("{label}: {}", items.len()));
    let shown = if limit == 0 { items.len() } else { limit.min(items.len()) };
    lines.extend(items[..shown].iter().map(|item| format!("  {}", row(item))));
    if shown < items.len() {
        lines.push(format!("  ... and {} more", items.len() - shown));
    }
}

pub fn render_leftovers(outcome: &LinkOutcome, options: &LeftoverOptions<'_>) -> Vec<String> {
    let launches: Vec<_> = outcome
        .leftover_launches
        .iter()
        .filter(|launch| {
            !options
                .exclude_launch_types
                .iter()
                .any(|kind| launch.weapon_type.eq_ignore_ascii_case(kind))
        })
        .collect();

    let mut lines = Vec::new();
    push_section(&mut lines, options.launches_label, &launches, options.limit, |l| {
        format!(
            "Shot: Pilot={}, Weapon={}, WeaponID={}, T={:.2}",
            l.shooter_pilot,
            l.weapon_name,
            opt(l.weapon_id),
            l.time
        )
    });
    push_section(
        &mut lines,
        "Unlinked Hits",
        &outcome.leftover_impacts,
        options.limit,
        |h| {
            format!(
                "Hit: Pilot={}, WeaponID={}, TargetID={}, T={:.2}",
                h.shooter_pilot,
                opt(h.weapon_id),
                opt(h.target_id),
                h.time
            )
        },
    );
    push_section(
        &mut lines,
        "Unlinked Kills",
        &outcome.leftover_destructions,
        options.limit,
        |k| {
            format!(
                "Kill: KillerPilot={}, TargetID={}, T={:.2}",
                k.killer_pilot,
                opt(k.target_id),
                k.time
            )
        },
    );
    lines
}

/// One line per pilot (case-insensitive order) followed by a per-weapon breakdown.
pub fn render_pilot_stats(
    stats: &BTreeMap<String, PilotStats>,
    flight_times: Option<&BTreeMap<String, f64>>,
) -> String {
    let mut pilots: Vec<&String> = stats.keys().collect();
    pilots.sort_by_key(|pilot| pilot.to_lowercase());

    let mut lines = Vec::new();
    for pilot in pilots {
        let s = &stats[pilot];
        let flight = flight_times
            .and_then(|times| times.get(pilot))
            .map(|secs| format!(" {}", format_hms(*secs)))
            .unwrap_or_default();
        lines.push(format!(
            "{pilot}: {} shots, {} hits, {} kills{flight}",
            s.shots, s.hits, s.kills
        ));

        let mut weapons: Vec<(&String, &u32)> = s.weapon_shots.iter().collect();
        weapons.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase())));
        for (weapon, count) in weapons {
            lines.push(format!("  {weapon}: {count} shots"));
        }
    }
    lines.join("\n")
}

pub fn render_aa_kills(aa_kills: &BTreeMap<String, u32>) -> String {
    if aa_kills.is_empty() {
        return "No A-A kills found.".to_string();
    }
    let total: u32 = aa_kills.values().sum();
    let mut lines = vec![
        String::new(),
        "A-A Kills by Target:".to_string(),
        format!("Total A-A kills: {total}"),
        String::new(),
    ];

    let mut rows: Vec<(&String, &u32)> = aa_kills.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (aircraft, count) in rows {
        let plural = if *count == 1 { "kill" } else { "kills" };
        lines.push(format!("{aircraft}, {count}, {plural}"));
    }
    lines.join("\n")
}
