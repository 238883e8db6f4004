// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use s2n_h2_flow::{FlowControlViolation, Ledger, Limits, Window};
use std::collections::BTreeMap;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, PartialEq, Eq)]
enum Frame {
    WindowUpdate { stream_id: u32, increment: u32 },
}

/// A minimal receiver which owns one ledger for the connection and one per stream
struct Receiver {
    limits: Limits,
    connection: Ledger,
    streams: BTreeMap<u32, Ledger>,
    outgoing: Vec<Frame>,
}

impl Receiver {
    fn new(limits: Limits) -> Self {
        Self {
            limits,
            connection: limits.connection_ledger(),
            streams: BTreeMap::new(),
            outgoing: Vec::new(),
        }
    }

    fn open(&mut self, stream_id: u32) {
        self.streams.insert(stream_id, self.limits.stream_ledger());
    }

    fn on_data(&mut self, stream_id: u32, len: u32) -> Result<(), FlowControlViolation> {
        self.connection.on_data_received(len)?;
        let stream = self.streams.get_mut(&stream_id).expect("stream is open");
        stream.on_data_received(len)?;

        if let Some(increment) = self.connection.take_window_update() {
            self.outgoing.push(Frame::WindowUpdate {
                stream_id: 0,
                increment,
            });
        }
        if let Some(increment) = stream.take_window_update() {
            self.outgoing.push(Frame::WindowUpdate {
                stream_id,
                increment,
            });
        }

        Ok(())
    }

    /// Applies a local window change to every open stream without telling the peer
    fn set_stream_windows(&mut self, window: Window) -> Result<(), FlowControlViolation> {
        for (&stream_id, stream) in self.streams.iter_mut() {
            let increment = stream.set_window(window)?;
            if increment > 0 {
                self.outgoing.push(Frame::WindowUpdate {
                    stream_id,
                    increment,
                });
            }
            if let Some(increment) = stream.take_window_update() {
                self.outgoing.push(Frame::WindowUpdate {
                    stream_id,
                    increment,
                });
            }
        }
        Ok(())
    }

    fn drain(&mut self) -> Vec<Frame> {
        core::mem::take(&mut self.outgoing)
    }
}

/// The sender's view of how much it may still send on a flow controlled entity
struct Sender {
    windows: BTreeMap<u32, i64>,
}

impl Sender {
    fn new(connection: i64, streams: &[(u32, i64)]) -> Self {
        let mut windows = BTreeMap::new();
        windows.insert(0, connection);
        windows.extend(streams.iter().copied());
        Self { windows }
    }

    fn send(&mut self, stream_id: u32, len: u32) {
        for id in [0, stream_id] {
            let window = self.windows.get_mut(&id).unwrap();
            *window -= len as i64;
            assert!(*window >= 0, "sender exceeded the window on {id}");
        }
    }

    fn on_frames(&mut self, frames: Vec<Frame>) {
        for Frame::WindowUpdate {
            stream_id,
            increment,
        } in frames
        {
            *self.windows.get_mut(&stream_id).unwrap() += increment as i64;
        }
    }

    fn window(&self, stream_id: u32) -> i64 {
        self.windows[&stream_id]
    }
}

#[test]
fn window_updates_test() {
    init_tracing();

    let mut receiver = Receiver::new(Limits::default());
    receiver.open(1);
    let mut sender = Sender::new(65_535, &[(1, 65_535)]);

    for _ in 0..3 {
        sender.send(1, 16_384);
        receiver.on_data(1, 16_384).unwrap();
        sender.on_frames(receiver.drain());
    }

    // the second frame crossed the half window threshold and was returned
    assert_eq!(receiver.connection.consumed_credit(), 16_384);
    assert_eq!(sender.window(0), 49_151);
    assert_eq!(sender.window(1), 49_151);

    assert_eq!(receiver.connection.remaining(), sender.window(0));
    assert_eq!(receiver.streams[&1].remaining(), sender.window(1));
}

#[test]
fn peer_exceeds_window_test() {
    init_tracing();

    let mut receiver = Receiver::new(Limits::new().with_stream_window(1000).unwrap());
    receiver.open(1);

    receiver.on_data(1, 1000).unwrap();
    assert_eq!(
        receiver.drain(),
        vec![Frame::WindowUpdate {
            stream_id: 1,
            increment: 1000
        }]
    );

    assert_eq!(
        receiver.on_data(1, 1001),
        Err(FlowControlViolation::WINDOW_EXCEEDED)
    );
}

#[test]
fn memory_pressure_test() {
    init_tracing();

    let mut receiver = Receiver::new(Limits::default());
    receiver.open(1);
    receiver.open(3);
    let mut sender = Sender::new(65_535, &[(1, 65_535), (3, 65_535)]);

    // the peer has data in flight when the windows are shrunk
    sender.send(1, 10_000);
    receiver
        .set_stream_windows(Window::new(16_384).unwrap())
        .unwrap();
    receiver.on_data(1, 10_000).unwrap();

    // the peer is never told about the shrink
    assert!(receiver.drain().is_empty());
    for stream_id in [1, 3] {
        assert_eq!(receiver.streams[&stream_id].advertised_window(), 16_384);
        assert_eq!(
            receiver.streams[&stream_id].remaining(),
            sender.window(stream_id)
        );
    }

    sender.send(3, 8_192);
    receiver.on_data(3, 8_192).unwrap();
    sender.on_frames(receiver.drain());
    assert_eq!(receiver.streams[&3].remaining(), sender.window(3));

    // updates are withheld until the shrink has been absorbed
    for _ in 0..3 {
        sender.send(1, 16_384);
        receiver.on_data(1, 16_384).unwrap();
        sender.on_frames(receiver.drain());
    }
    assert_eq!(sender.window(1), 16_384);
    assert_eq!(receiver.streams[&1].remaining(), 16_384);
    assert_eq!(receiver.connection.remaining(), sender.window(0));

    // growing back pays off the shrink debt
    receiver.set_stream_windows(Window::DEFAULT).unwrap();
    sender.on_frames(receiver.drain());

    assert_eq!(sender.window(1), 65_535);
    assert_eq!(sender.window(3), 57_343);

    for stream_id in [1, 3] {
        let stream = &receiver.streams[&stream_id];
        assert_eq!(stream.advertised_window(), 65_535);
        assert_eq!(stream.pending_shrink_debt(), 0);
        assert_eq!(stream.remaining(), sender.window(stream_id));
    }
}
