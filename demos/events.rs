//! Event server - a TCP listener driving one session per connection.
//!
//! Each connection gets its own `Player` context; the bus is built once and
//! shared by every session.
//!
//! ```text
//! cargo run --example events
//! ```
//!
//! Packets are `[id u16 BE][length u32 BE][msgpack payload]`:
//! - 100 `Move { x, y }`: fire-and-forget
//! - 200 `()`: replies on 201 with the current position

use std::sync::Arc;

use netevent_bus::{NetEventBus, Session};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Deserialize, Debug)]
struct Move {
    x: i32,
    y: i32,
}

#[derive(Serialize, Debug)]
struct Position {
    x: i32,
    y: i32,
}

#[derive(Default)]
struct Player {
    x: i32,
    y: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = NetEventBus::<Player>::builder();
    builder
        .register_void(100, |player: &mut Player, m: &mut Move| {
            player.x = m.x;
            player.y = m.y;
        })
        .register_reply(200, 201, |player: &mut Player, _: &mut ()| {
            Some(Position {
                x: player.x,
                y: player.y,
            })
        });
    let session = Session::new(Arc::new(builder.build())).stop_on_decode_error(true);

    let listener = TcpListener::bind("127.0.0.1:7400").await?;
    eprintln!("listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        let session = session.clone();

        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            let mut player = Player::default();
            match session.run(&mut player, reader, writer).await {
                Ok(stats) => eprintln!("{peer} closed: {stats:?}"),
                Err(e) => eprintln!("{peer} dropped: {e}"),
            }
        });
    }
}
