//! CellPad notebook server executable.
//!
//! # Responsibility
//! - Parse startup arguments and initialize logging.
//! - Accept connections and hand each one to the HTTP adapter.

mod http;

use cellpad_core::{
    core_version, default_log_level, init_logging, FileCollectionStore, NotebookService,
};
use log::{info, warn};
use std::env;
use std::net::TcpListener;

const DEFAULT_FILENAME: &str = "notebook.json";
const DEFAULT_PORT: u16 = 4005;

fn usage() {
    eprintln!(
        "Usage:\n  \
  cellpad_server [--dir PATH] [--file NAME] [--port N] [--log-dir PATH] [--log-level LEVEL]\n  \
  cellpad_server --version\n\n\
Defaults: --dir . --file {DEFAULT_FILENAME} --port {DEFAULT_PORT}"
    );
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("cellpad_server {}", core_version());
        return Ok(());
    }

    let options = parse_options(&args[1..])?;
    init_logging(&options.log_level, options.log_dir.as_deref())?;

    let store = FileCollectionStore::new(&options.dir, &options.file);
    let notebook_path = store.path().to_path_buf();
    let service = NotebookService::new(store);

    let listener = TcpListener::bind(("127.0.0.1", options.port))
        .map_err(|err| format!("could not bind 127.0.0.1:{}: {err}", options.port))?;
    info!(
        "event=server_start module=server status=ok port={} notebook={}",
        options.port,
        notebook_path.display()
    );
    println!(
        "serving {} on http://127.0.0.1:{}",
        notebook_path.display(),
        options.port
    );

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let service = service.clone();
                std::thread::spawn(move || http::handle_stream(&service, stream));
            }
            Err(err) => {
                warn!("event=accept module=server status=error error={err}");
            }
        }
    }

    Ok(())
}

#[derive(Debug)]
struct Options {
    dir: String,
    file: String,
    port: u16,
    log_dir: Option<String>,
    log_level: String,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        dir: ".".to_string(),
        file: DEFAULT_FILENAME.to_string(),
        port: DEFAULT_PORT,
        log_dir: None,
        log_level: default_log_level().to_string(),
    };

    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        let value = args.get(index + 1);
        match flag {
            "--dir" => options.dir = required(flag, value)?,
            "--file" => options.file = required(flag, value)?,
            "--port" => {
                let raw = required(flag, value)?;
                options.port = raw
                    .parse::<u16>()
                    .map_err(|err| format!("invalid port `{raw}`: {err}"))?;
            }
            "--log-dir" => options.log_dir = Some(required(flag, value)?),
            "--log-level" => options.log_level = required(flag, value)?,
            other => {
                usage();
                return Err(format!("unknown argument `{other}`"));
            }
        }
        index += 2;
    }

    Ok(options)
}

fn required(flag: &str, value: Option<&String>) -> Result<String, String> {
    value
        .cloned()
        .ok_or_else(|| format!("missing value for {flag}"))
}
