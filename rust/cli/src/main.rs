use std::io;

use war_server::{LogFormat, init_logging};

fn main() {
    let format = match std::env::var("WAR_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Text,
    };
    if let Err(e) = init_logging(format) {
        eprintln!("WARNING: logging disabled: {}", e);
    }

    let code = war_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
