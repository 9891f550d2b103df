//! Headless hover-locomotion sandbox.
//!
//! Builds a seeded arena, drops a scripted player and a few wandering hover
//! drones into it and steps them on a fixed timestep, logging their ground
//! state as they go.
//!
//! Usage: `hover-sandbox [config.ron] [--write-default]`

mod config;
mod scene;
mod script;
mod terrain;

use anyhow::Result;
use std::path::PathBuf;

use config::{default_config_path, SandboxConfig};
use scene::Sandbox;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut path = None;
    let mut write_default = false;
    for arg in std::env::args().skip(1) {
        if arg == "--write-default" {
            write_default = true;
        } else {
            path = Some(PathBuf::from(arg));
        }
    }
    let path = path.unwrap_or_else(default_config_path);

    if write_default {
        SandboxConfig::default().save(&path);
        log::info!("Wrote default config to {:?}", path);
        return Ok(());
    }

    let config = SandboxConfig::load(&path);
    log::info!(
        "Starting hover sandbox: seed {}, {} drones, {:.1} s at {} Hz",
        config.seed,
        config.drone_count,
        config.duration_seconds,
        config.fixed_rate_hz
    );

    let mut sandbox = Sandbox::new(config)?;
    let summary = sandbox.run()?;

    log::info!(
        "Finished after {} fixed steps ({:.2} s simulated)",
        sandbox.time.step_count(),
        sandbox.time.simulated_seconds()
    );
    for agent in &summary {
        let stats = &agent.stats;
        log::info!(
            "{:<8} grounded {:5.1}%  steep {:4}  jumps {:3}  landings {:3}  tunneling {:3}  \
             top speed {:5.2} m/s  final {:?} at ({:.1}, {:.2}, {:.1})",
            agent.name,
            stats.grounded_ratio() * 100.0,
            stats.steep_steps,
            stats.jumps,
            stats.landings,
            stats.tunneling_corrections,
            stats.max_speed,
            agent.state,
            agent.position.x,
            agent.position.y,
            agent.position.z
        );
    }

    Ok(())
}
