use std::io::Read;
use std::path::PathBuf;
use std::{env, fs, io};

use shopdb_cli::{init_tracing, open_catalog};
use shopdb_core::config::Config;
use shopdb_message::{assistant_message, hydrate, IdCodec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    let mut input = None; let mut catalog_path = None; let mut hydrate_items = true;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" | "-c" => {
                let Some(path) = args.get(i + 1) else { eprintln!("Error: --catalog requires a path"); std::process::exit(1) };
                catalog_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--no-hydrate" => hydrate_items = false,
            "--help" | "-h" => {
                eprintln!("Usage: shopdb-parse [FILE|-] [--catalog PATH] [--no-hydrate]");
                eprintln!("Reads assistant text (stdin when FILE is omitted or '-') and prints its segments as JSON.");
                return Ok(());
            }
            arg if arg != "-" && arg.starts_with('-') => { eprintln!("Error: unknown flag '{arg}'"); std::process::exit(1) }
            arg => input = Some(arg.to_string()),
        }
        i += 1;
    }

    let text = match input.as_deref() {
        None | Some("-") => { let mut buf = String::new(); io::stdin().read_to_string(&mut buf)?; buf }
        Some(path) => fs::read_to_string(path)?,
    };
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let codec = IdCodec::from_settings(&settings.message)?;
    let message = assistant_message(&codec, text);

    if !hydrate_items {
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }
    let catalog = open_catalog(&settings, catalog_path.as_deref())?;
    let hydrated = hydrate(vec![message], catalog.as_ref()).await;
    println!("{}", serde_json::to_string_pretty(&hydrated)?);
    Ok(())
}
