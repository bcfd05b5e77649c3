//! Price Client — a terminal dashboard that logs in to the price server over WebSocket,
//! subscribes to a set of tickers, and prints a live price table on every update.
//!
//! Usage example (CLI):
//! ```bash
//! price_client --origin https://prices.example.com --email alice@gmail.com --stocks AAPL,TSLA
//! ```
//!
//! The origin decides the transport: `http://` connects with `ws://`, `https://` with
//! `wss://`. Tickers can also be read from a file (`--path`), separated by commas, spaces,
//! or new lines. See `model::board` for the rendered table.
//!
//! While running, the subscription list is edited from stdin, one command per line:
//! `+SYM` adds a ticker, `-SYM` removes it, a bare `SYM` toggles it, and `logout` closes
//! the session.
#![warn(missing_docs)]
mod args;
mod model;
mod sender;

use crate::args::Args;
use crate::model::board::PriceBoard;
use crate::model::email::validate_email;
use crate::model::watchlist::{Change, UserCommand, Watchlist};
use crate::sender::CommandSender;
use chrono::Local;
use clap::Parser;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use price_common::net::websocket_url;
use price_common::tickers::read_symbols;
use price_common::{Result, ServerMessage, StreamError, Ticker};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// How long a read may block before the shutdown flag is checked again.
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Reads stdin on a background thread and forwards every parsed command.
///
/// End of input only stops the reader; the session keeps running.
fn start_command_reader(commands: Sender<UserCommand>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    debug!("Stdin closed: {}", e);
                    return;
                }
            };
            match UserCommand::parse(&line) {
                Some(command) => {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
                None if line.trim().is_empty() => {}
                None => warn!("Unknown command: {}", line.trim()),
            }
        }
    });
}

/// Applies pending stdin commands. A changed list is sent to the server in full, since
/// `subscribe` replaces the session's set. Returns `false` once the user logged out.
fn apply_commands(
    socket: &mut Socket,
    commands: &Receiver<UserCommand>,
    watchlist: &mut Watchlist,
    board: &mut PriceBoard,
) -> Result<bool, StreamError> {
    for command in commands.try_iter() {
        if command == UserCommand::Logout {
            info!("Logging out");
            return Ok(false);
        }
        match watchlist.apply(&command) {
            Change::Updated => {
                CommandSender::subscribe(socket, watchlist.symbols())?;
                board.resubscribe(watchlist.tickers());
                println!("{}", board.render());
            }
            Change::Unchanged => debug!("{:?} changed nothing", command),
            Change::Unsupported(symbol) => {
                warn!("{} is not a supported ticker; supported: {:?}", symbol, Ticker::all())
            }
        }
    }
    Ok(true)
}

/// Runs a blocking loop that receives `prices` messages from `socket` and prints the
/// updated board, applying stdin commands between reads. Returns when the server closes
/// the connection, the user logs out, or Ctrl+C is pressed.
fn start_receiver_loop(
    mut socket: Socket,
    mut watchlist: Watchlist,
    commands: Receiver<UserCommand>,
    shutdown: Arc<AtomicBool>,
) -> Result<(), StreamError> {
    let mut board = PriceBoard::new(watchlist.tickers());

    while !shutdown.load(Ordering::Relaxed) {
        if !apply_commands(&mut socket, &commands, &mut watchlist, &mut board)? {
            break;
        }
        match socket.read() {
            Ok(Message::Text(text)) => match ServerMessage::parse(text.as_str()) {
                Ok(ServerMessage::Prices { prices }) => {
                    board.apply(&prices, Local::now());
                    println!("{}", board.render());
                }
                Err(e) => debug!("Bad message: {}", e),
            },
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                info!("Disconnected");
                return Ok(());
            }
            Err(e) => {
                let e = StreamError::from(e);
                if e.is_timeout() {
                    continue;
                }
                error!("Connection error: {}", e);
                return Err(e);
            }
        }
    }

    info!("Receiver loop stopping...");
    if let Err(e) = socket.close(None) {
        debug!("Close failed: {}", e);
        return Ok(());
    }
    loop {
        match socket.read() {
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(e) => {
                let e = StreamError::from(e);
                if !e.is_timeout() {
                    debug!("Error while closing: {}", e);
                    break;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), StreamError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| StreamError::Config(format!("failed to set Ctrl+C handler: {}", e)))?;
    }

    let email = validate_email(&args.email)?;
    let watchlist = Watchlist::new(collect_symbols(&args)?);
    let stocks = watchlist.symbols();
    if stocks.is_empty() {
        warn!("No tickers requested; supported: {:?}", Ticker::all());
    }
    for symbol in stocks {
        if symbol.parse::<Ticker>().is_err() {
            warn!("{} is not a supported ticker, the server will drop it", symbol);
        }
    }

    let url = websocket_url(&args.origin)?;
    info!("Connecting to {}", url);
    let (mut socket, _) = tungstenite::connect(url.as_str())?;
    set_read_timeout(&socket, READ_TIMEOUT)?;

    CommandSender::start_session(&mut socket, &email, stocks)?;

    let (command_tx, command_rx) = unbounded();
    start_command_reader(command_tx);
    info!("Client is running. Type +SYM / -SYM to edit subscriptions, logout or Ctrl+C to exit.");
    start_receiver_loop(socket, watchlist, command_rx, shutdown)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Tickers from `--stocks` followed by those in `--path`, trimmed and without blanks.
fn collect_symbols(args: &Args) -> Result<Vec<String>, StreamError> {
    let mut symbols: Vec<String> = args
        .stocks
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(raw) = &args.path {
        let file = File::open(normalize_path(raw))?;
        symbols.extend(read_symbols(BufReader::new(file))?);
    }
    Ok(symbols)
}

fn set_read_timeout(socket: &Socket, timeout: Duration) -> Result<(), StreamError> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout))?,
        MaybeTlsStream::NativeTls(stream) => stream.get_ref().set_read_timeout(Some(timeout))?,
        _ => warn!("Unknown stream type, reads will block"),
    }
    Ok(())
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
