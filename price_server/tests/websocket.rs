use price_common::{ServerMessage, Ticker};
use price_server::{BroadcastHandle, BroadcastLoop, PriceListener, ServerState};
use serde_json::json;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

type Client = WebSocket<MaybeTlsStream<TcpStream>>;

/// Starts a server on an ephemeral port. The broadcast thread runs while the returned
/// handle is alive.
fn start_server(tick: Duration) -> (Arc<ServerState>, String, BroadcastHandle) {
    let state = Arc::new(ServerState::new());
    let listener = PriceListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}/", listener.local_addr().unwrap());

    let accept_state = Arc::clone(&state);
    thread::spawn(move || listener.accept_loop(accept_state).unwrap());
    let broadcaster = BroadcastLoop::start(Arc::clone(&state), tick);

    (state, url, broadcaster)
}

fn connect(url: &str) -> Client {
    let (socket, _) = tungstenite::connect(url).unwrap();
    if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
        stream.set_read_timeout(Some(Duration::from_millis(100))).unwrap();
    }
    socket
}

fn send(socket: &mut Client, value: serde_json::Value) {
    socket.send(Message::text(value.to_string())).unwrap();
}

/// Waits up to `within` for the next `prices` message.
fn next_prices(socket: &mut Client, within: Duration) -> Option<ServerMessage> {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        match socket.read() {
            Ok(Message::Text(text)) => return Some(ServerMessage::parse(text.as_str()).unwrap()),
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(e) => panic!("unexpected read error: {}", e),
        }
    }
    None
}

fn keys(message: &ServerMessage) -> Vec<Ticker> {
    let ServerMessage::Prices { prices } = message;
    prices.keys().copied().collect()
}

#[test]
fn test_login_subscribe_and_broadcast() {
    let (_state, url, _broadcaster) = start_server(Duration::from_millis(200));
    let mut socket = connect(&url);

    send(&mut socket, json!({"type": "login", "email": "alice@gmail.com"}));
    send(&mut socket, json!({"type": "subscribe", "stocks": ["AAPL", "ZZZZ"]}));

    let ack = next_prices(&mut socket, Duration::from_secs(2)).expect("no ack");
    assert_eq!(keys(&ack), vec![Ticker::AAPL]);
    let ServerMessage::Prices { prices } = &ack;
    let ack_price = prices[&Ticker::AAPL];

    let update = next_prices(&mut socket, Duration::from_secs(2)).expect("no broadcast");
    assert_eq!(keys(&update), vec![Ticker::AAPL]);
    let ServerMessage::Prices { prices } = &update;
    assert!((prices[&Ticker::AAPL] - ack_price).abs() <= 5.0 + 1e-9);
    assert!(prices[&Ticker::AAPL] >= 1.0);
}

#[test]
fn test_anonymous_and_malformed_frames_get_nothing() {
    let (_state, url, _broadcaster) = start_server(Duration::from_millis(50));
    let mut socket = connect(&url);

    socket.send(Message::text("definitely not json")).unwrap();
    send(&mut socket, json!({"type": "unknown"}));
    send(&mut socket, json!({"type": "subscribe", "stocks": ["GOOG"]}));
    assert!(next_prices(&mut socket, Duration::from_millis(400)).is_none());

    // The connection survived the garbage and still works once logged in.
    send(&mut socket, json!({"type": "login", "email": "bob@gmail.com"}));
    send(&mut socket, json!({"type": "subscribe", "stocks": ["GOOG", "TSLA"]}));
    let ack = next_prices(&mut socket, Duration::from_secs(2)).expect("no ack");
    assert_eq!(keys(&ack), vec![Ticker::GOOG, Ticker::TSLA]);
}

#[test]
fn test_empty_subscription_receives_no_broadcasts() {
    let (_state, url, _broadcaster) = start_server(Duration::from_millis(50));
    let mut socket = connect(&url);

    send(&mut socket, json!({"type": "login", "email": "carol@gmail.com"}));
    send(&mut socket, json!({"type": "subscribe", "stocks": []}));

    let ack = next_prices(&mut socket, Duration::from_secs(2)).expect("no ack");
    assert!(keys(&ack).is_empty());
    assert!(next_prices(&mut socket, Duration::from_millis(400)).is_none());
}

#[test]
fn test_disconnect_removes_session() {
    let (state, url, _broadcaster) = start_server(Duration::from_millis(50));
    let mut socket = connect(&url);
    send(&mut socket, json!({"type": "login", "email": "dave@gmail.com"}));
    send(&mut socket, json!({"type": "subscribe", "stocks": ["IBM"]}));
    next_prices(&mut socket, Duration::from_secs(2)).expect("no ack");
    assert_eq!(state.session_count().unwrap(), 1);

    socket.close(None).unwrap();
    let deadline = Instant::now() + Duration::from_secs(3);
    while state.session_count().unwrap() > 0 && Instant::now() < deadline {
        let _ = socket.read();
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(state.session_count().unwrap(), 0);
}

#[test]
fn test_resubscribe_never_delivers_old_set_after_new_ack() {
    let (_state, url, _broadcaster) = start_server(Duration::from_millis(5));

    for _ in 0..5 {
        let mut socket = connect(&url);
        send(&mut socket, json!({"type": "login", "email": "erin@gmail.com"}));
        send(&mut socket, json!({"type": "subscribe", "stocks": ["GOOG"]}));
        // Let broadcasts for the first set pile up unread.
        thread::sleep(Duration::from_millis(30));
        send(&mut socket, json!({"type": "subscribe", "stocks": ["AAPL"]}));

        let mut switched = false;
        let mut after_switch = 0;
        while after_switch < 20 {
            let message = next_prices(&mut socket, Duration::from_secs(2)).expect("stream stalled");
            let tickers = keys(&message);
            if switched {
                assert_eq!(tickers, vec![Ticker::AAPL], "old subscription leaked after the new ack");
                after_switch += 1;
            } else if tickers == vec![Ticker::AAPL] {
                switched = true;
            } else {
                assert_eq!(tickers, vec![Ticker::GOOG]);
            }
        }
        socket.close(None).unwrap();
    }
}
