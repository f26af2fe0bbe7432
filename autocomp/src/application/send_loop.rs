// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Send Loop (§4.L)
//!
//! The sole writer for one connection's socket. Drains [`SendItem`]s off
//! the channel K feeds and frames each onto the wire, folding every write
//! into the shared [`BandwidthEstimator`] (§4.G) as it goes. Runs on the
//! transmission pool (O) — a separate pool from the request pool running
//! K, so compression-bound work on one connection never starves
//! socket-draining on another.

use std::sync::Arc;

use crossbeam::channel::Receiver;

use autocomp_domain::value_objects::ResourceState;

use crate::infrastructure::net::{write_frame, BandwidthEstimator, SendBufferSocket};

use super::pipeline::SendItem;

/// Runs until the channel disconnects (the pipeline dropped its sender,
/// normally after an `EndOfRequest`) or a write fails. A write failure
/// closes the channel by simply returning — the pipeline's next `send`
/// then fails too, which propagates as a connection-fatal error there.
pub fn run_send_loop(mut socket: impl SendBufferSocket, receiver: Receiver<SendItem>, resource: Arc<ResourceState>, connection_id: u64) {
    let mut estimator = BandwidthEstimator::new(resource);

    for item in receiver {
        let result = match item {
            SendItem::Control(bytes) => write_and_record(&mut socket, &mut estimator, &bytes),
            SendItem::Payload(buf) => write_and_record(&mut socket, &mut estimator, buf.data()),
            SendItem::EndOfRequest => break,
        };

        if let Err(err) = result {
            tracing::warn!(connection_id, error = %err, "send loop aborting connection");
            break;
        }
    }

    estimator.close();
}

fn write_and_record(
    socket: &mut impl SendBufferSocket,
    estimator: &mut BandwidthEstimator,
    payload: &[u8],
) -> Result<(), autocomp_domain::AutoCompError> {
    write_frame(socket, payload)?;
    estimator.record_write(socket, payload.len() + 4);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::net::socket::FixedLoadSocket;
    use autocomp_domain::value_objects::ChunkBuffer;
    use crossbeam::channel::unbounded;

    #[test]
    fn drains_control_and_payload_items_in_order() {
        let socket = FixedLoadSocket::new(0, 12_000_000);
        let resource = Arc::new(ResourceState::new());
        let (sender, receiver) = unbounded();

        sender.send(SendItem::Control(vec![1, 2, 3])).unwrap();
        let mut payload = ChunkBuffer::new(16);
        payload.set_data(b"hello world").unwrap();
        sender.send(SendItem::Payload(payload)).unwrap();
        sender.send(SendItem::EndOfRequest).unwrap();
        drop(sender);

        run_send_loop(socket, receiver, resource.clone(), 1);
        assert_eq!(resource.bandwidth_mbps(), 0.0);
    }

    #[test]
    fn empty_queue_closes_immediately() {
        let socket = FixedLoadSocket::new(0, 12_000_000);
        let resource = Arc::new(ResourceState::new());
        let (sender, receiver) = unbounded();
        drop(sender);

        run_send_loop(socket, receiver, resource.clone(), 2);
        assert_eq!(resource.bandwidth_mbps(), 0.0);
    }
}
