use std::fmt::Write;

use crate::config::Config;
use crate::distribution::Distribution;

pub const DEFAULT_WIDTH: usize = 20;

/// Aligned `label : value` listing of a resolved config, one field per line.
pub fn render(cfg: &Config, width: usize) -> String {
    let rows: [(&str, String); 7] = [
        ("ncrit", cfg.ncrit().to_string()),
        ("distribution", cfg.distribution().to_string()),
        ("numBodies", cfg.num_bodies().to_string()),
        ("P", cfg.order().to_string()),
        ("maxlevel", cfg.maxlevel().to_string()),
        ("threads", cfg.threads().to_string()),
        ("wavenumber", format!("{:.6}", cfg.wavenumber())),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:<width$} : {}", label, value, width = width);
    }
    out
}

/// Help screen listing every option with the value it currently holds.
pub fn usage(program: &str, d: &Config) -> String {
    let kinds = Distribution::ALL
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    let _ = writeln!(out, "Usage: {} [options]", program);
    let _ = writeln!(out, "Long option (short option)     : Description (Default value)");
    let lines = [
        (" --ncrit (-c)", "Number of bodies per leaf node".to_string(), d.ncrit().to_string(), ""),
        (" --distribution (-d) [c/s/p]", kinds, d.distribution().to_string(), ""),
        (" --wavenumber (-k)", "Wavenumber of Helmholtz kernel".to_string(), format!("{:.6}", d.wavenumber()), ""),
        (
            " --maxlevel (-l)",
            "Max level of tree".to_string(),
            d.maxlevel().to_string(),
            " (only applies to non-adaptive tree)",
        ),
        (" --numBodies (-n)", "Number of bodies".to_string(), d.num_bodies().to_string(), ""),
        (" --P (-P)", "Order of expansion".to_string(), d.order().to_string(), ""),
        (" --threads (-T)", "Number of threads".to_string(), d.threads().to_string(), ""),
        (" --config", "TOML file with option values".to_string(), "none".to_string(), ""),
    ];
    for (flag, desc, default, note) in lines {
        let _ = writeln!(out, "{:<30} : {} ({}){}", flag, desc, default, note);
    }
    out
}
