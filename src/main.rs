use tataku_beatmap::prelude::*;
use tokio::runtime::Builder;

#[macro_use]
extern crate log;

// main fn
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("error creating runtime: {e}");
            std::process::exit(2);
        }
    };

    let mut args = std::env::args().skip(1);
    match runtime.block_on(beatmap_dump_cli(&mut args)).log_error_message("beatmap-dump failed") {
        Ok(0) => {}
        Ok(failed) => {
            warn!("{failed} file(s) failed to load");
            std::process::exit(1);
        }
        Err(_) => std::process::exit(2),
    }
}
