use std::{io, sync::Once, thread};

use log::LevelFilter;
use pbft_rs::types::data_types::SignerId;

static LOGGER_INIT: Once = Once::new();

// Set up a logger that logs all log messages with level `level` and above.
pub(crate) fn setup_logger(level: LevelFilter) {
    LOGGER_INIT.call_once(|| {
        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{:?}][{}] {}",
                    thread::current().id(),
                    record.level(),
                    message
                ))
            })
            .level(level)
            .chain(io::stdout())
            .apply()
            .unwrap();
    })
}

pub(crate) fn log_with_context(signer: Option<SignerId>, content: &str) {
    match signer {
        Some(signer) => log::info!("replica {}: {}", signer, content),
        None => log::info!("{}", content),
    }
}
