//! Caller-side presentation of linking results: text, pilot view model, and CSV.

pub mod export_csv;
pub mod text;
pub mod viewmodel;

pub use export_csv::{export_chains_csv, write_chains_csv, ChainCsvRow};
pub use text::{
    format_hms, render_aa_kills, render_chains, render_leftovers, render_pilot_stats,
    LeftoverOptions,
};
pub use viewmodel::{
    build_pilot_view_model, ChainRow, MissRow, PilotEntry, PilotViewModel, WeaponRow, WeaponTally,
};
