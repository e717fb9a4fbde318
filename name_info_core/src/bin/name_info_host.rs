use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use name_info_core::{
    load_plugin_config, load_plugin_config_from_env, HeadlessHost, NameInfoPlugin, PLUGIN_NAME,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless host for the custom name and info plugin", long_about = None)]
struct Args {
    /// Plugin config JSON (defaults to NAME_INFO_CONFIG_PATH, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the directory holding the persisted custom info file
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Address for line-based command clients
    #[arg(long, default_value = "127.0.0.1:41100")]
    bind: SocketAddr,
}

struct HostRequest {
    line: String,
    reply: Sender<Vec<String>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = match &args.config {
        Some(path) => load_plugin_config(path),
        None => load_plugin_config_from_env(),
    };
    if let Some(dir) = args.config_dir {
        config = config.with_config_dir(dir);
    }

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Config loading logs are emitted before the subscriber exists.
    let source = source
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    info!(
        target: "name_info::config",
        source = %source,
        config_dir = %config.config_dir.display(),
        "plugin_config.resolved"
    );

    let plugin = NameInfoPlugin::new(config);
    if let Err(err) = plugin.enable() {
        warn!(
            target: "name_info::host",
            error = %err,
            "host.custom_info_unavailable"
        );
    }
    let host = HeadlessHost::new(plugin);

    let requests = spawn_line_listener(args.bind)
        .with_context(|| format!("Failed to bind command listener at {}", args.bind))?;

    info!(
        target: "name_info::host",
        bind = %args.bind,
        plugin = PLUGIN_NAME,
        "host.ready"
    );

    while let Ok(request) = requests.recv() {
        let replies = host.handle_line(&request.line);
        let _ = request.reply.send(replies);
    }

    host.plugin().disable();
    Ok(())
}

fn spawn_line_listener(bind_addr: SocketAddr) -> Result<Receiver<HostRequest>> {
    let listener = TcpListener::bind(bind_addr)?;
    let (sender, receiver) = unbounded::<HostRequest>();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    info!(target: "name_info::host", %addr, "client.connected");
                    let sender = sender.clone();
                    thread::spawn(move || handle_client(stream, sender));
                }
                Err(err) => warn!(target: "name_info::host", error = %err, "client.accept_failed"),
            }
        }
    });

    Ok(receiver)
}

fn handle_client(stream: TcpStream, sender: Sender<HostRequest>) {
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            warn!(target: "name_info::host", error = %err, "client.clone_failed");
            return;
        }
    };
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let (reply_tx, reply_rx) = unbounded();
                let request = HostRequest {
                    line: trimmed.to_string(),
                    reply: reply_tx,
                };
                if sender.send(request).is_err() {
                    break;
                }
                let Ok(replies) = reply_rx.recv() else {
                    break;
                };
                for reply in replies {
                    if let Err(err) = writeln!(writer, "{reply}") {
                        warn!(target: "name_info::host", error = %err, "client.write_failed");
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(target: "name_info::host", error = %err, "client.read_failed");
                break;
            }
        }
    }
}
