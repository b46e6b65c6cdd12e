use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::style::{self, Stylize};
use tokio::runtime::Runtime;

use koralowy::api;
use koralowy::cli::{Args, ClientCommand, Command};
use koralowy::client::PaletteClient;
use koralowy::color::Color;
use koralowy::model::{self, Palette, MIN_COLORS};
use koralowy::store::JsonFileStore;
use koralowy::tui::{self, TuiApp};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.command {
        Command::Serve { .. } => "info",
        Command::Client(ClientCommand::Tui) => "off",
        Command::Client(_) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let rt = Runtime::new().context("failed to start async runtime")?;

    match args.command {
        Command::Serve { addr, data, create } => rt.block_on(serve(addr, data, create)),
        Command::Client(command) => {
            let timeout = Duration::from_secs(args.timeout);
            let client = PaletteClient::new(&args.url, timeout)
                .with_context(|| format!("invalid server URL: {}", args.url))?;
            run_client(command, client, &rt)
        },
    }
}

async fn serve(addr: SocketAddr, data: PathBuf, create: bool) -> Result<()> {
    let store = JsonFileStore::new(data);
    if create && store.create_if_missing()? {
        log::info!("created empty collection at {}", store.path().display());
    }
    log::info!("serving palettes from {}", store.path().display());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("palette API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, api::router(Arc::new(store)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}

fn run_client(command: ClientCommand, mut client: PaletteClient, rt: &Runtime) -> Result<()> {
    match command {
        ClientCommand::List { preview } => {
            let palettes = fetch(&mut client, rt)?;
            if palettes.is_empty() {
                eprintln!("no palettes");
            }
            let mut stdout = std::io::stdout().lock();
            for (index, palette) in palettes.iter().enumerate() {
                writeln!(
                    stdout,
                    "{index}: {} ({} colors) {}",
                    palette.name,
                    palette.colors.len(),
                    palette.colors.join(" ")
                )?;
                if preview {
                    print_preview(&mut stdout, palette)?;
                }
            }
        },
        ClientCommand::Add {
            name,
            colors,
            random,
        } => {
            let mut colors = if colors.is_empty() {
                model::starter_colors(MIN_COLORS)
            } else {
                colors
            };
            colors.extend((0..random).map(|_| Color::random().to_hex()));
            let palette = rt.block_on(client.add(Palette { name, colors }))?;
            println!("added {} ({})", palette.name, palette.colors.join(" "));
        },
        ClientCommand::Delete { index } => {
            rt.block_on(client.delete_at(index))?;
            println!("deleted palette {index}");
        },
        ClientCommand::Export { output } => {
            fetch(&mut client, rt)?;
            match output {
                Some(path) => {
                    client.export_to(&path)?;
                    eprintln!("exported to {}", path.display());
                },
                None => println!("{}", client.export()?),
            }
        },
        ClientCommand::Import { file } => {
            rt.block_on(client.import_from(&file))
                .with_context(|| format!("import of {} failed", file.display()))?;
            println!("imported {} palettes", client.state().palettes().len());
        },
        ClientCommand::Tui => tui::run(TuiApp::new(client, PathBuf::from("palettes.json")), rt)?,
    }
    Ok(())
}

/// Refresh and return the palettes, failing when the server could not be
/// reached.
fn fetch(client: &mut PaletteClient, rt: &Runtime) -> Result<Vec<Palette>> {
    let state = rt.block_on(client.refresh());
    if let Some(err) = state.error() {
        bail!("could not load palettes: {err}");
    }
    Ok(state.palettes().to_vec())
}

fn print_preview(out: &mut impl Write, palette: &Palette) -> Result<()> {
    write!(out, "   ")?;
    for color in palette.parsed_colors() {
        let fg = if color.wants_dark_text() {
            style::Color::Black
        } else {
            style::Color::White
        };
        let bg = style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        };
        write!(out, "{}", format!(" {} ", color.to_hex().to_uppercase()).with(fg).on(bg))?;
    }
    writeln!(out)?;
    Ok(())
}
