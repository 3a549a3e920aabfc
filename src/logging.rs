use env_logger::{Builder, Env};
use log::LevelFilter;

/// Target prefix of the simulation's per-actor log lines.
const SIM_TARGET: &str = "platphys::sim";

/// Filter used when `RUST_LOG` is unset: dependencies stay at `warn`, this
/// crate logs at `info`, and `verbose` opens up the simulation's `debug!`
/// lines (spawns, triggers, resurrections).
pub fn default_filter(verbose: bool) -> String {
    let sim = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    format!("warn,platphys=info,{SIM_TARGET}={}", sim.as_str().to_lowercase())
}

/// Install the `RUST_LOG`-driven logger.  `RUST_LOG` always wins over
/// [`default_filter`].
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    // a logger may already be installed (tests, embedding hosts)
    let _ = Builder::from_env(env).format_timestamp(None).try_init();
}
