mod app;
mod audio;
mod config;
mod curation;
mod error;
mod export;
mod harmony;
mod library;
mod runtime;
mod suggest;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
