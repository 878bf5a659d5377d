use std::io::{self, BufRead, Write};

use heritage_core::protocol;
use log::LevelFilter;

fn init_logging() {
    let level = std::env::var("HERITAGE_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    // colog writes to stderr; stdout carries protocol responses only
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();
}

fn main() {
    init_logging();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(|| protocol::handle(&line));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                log::error!("handler panicked on request: {line}");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
