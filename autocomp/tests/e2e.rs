// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end scenarios from §8, driven over a real loopback TCP connection
//! rather than the in-process channel-level tests that already cover
//! `run_request` in isolation. Each test plays both halves of one session:
//! a server thread running the pipeline (K) + send loop (L) exactly as the
//! acceptor (N) would dispatch them, and the client mirror (Q) receiving
//! into a temporary destination directory.

use std::io::Cursor;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::bounded;

use autocomp::application::client;
use autocomp::application::pipeline::{run_request, PipelineContext};
use autocomp::application::send_loop::run_send_loop;
use autocomp::infrastructure::net::socket::TcpSendSocket;
use autocomp::infrastructure::telemetry::TelemetrySink;

use autocomp_bootstrap::ClientArgs;
use autocomp_domain::services::DecisionTree;
use autocomp_domain::value_objects::ResourceState;

const SEND_QUEUE_DEPTH: usize = 64;

/// A tree whose only leaf is `copy`, i.e. it never picks a codec on its
/// own — scenarios below drive codec choice through `mode`/`codec`
/// request fields instead, so the tree only matters for `AUTOCOMP`.
fn copy_only_tree() -> Arc<DecisionTree> {
    Arc::new(DecisionTree::load(Cursor::new("1\ncopy\n3\n1\n0 0 0 0 0\n")).unwrap())
}

/// Accepts exactly one connection on `listener` and runs the server side of
/// one session to completion: the pipeline (K) on the calling thread, the
/// send loop (L) on a spawned thread, mirroring `acceptor::dispatch_connection`.
fn serve_one_connection(listener: TcpListener, tree: Arc<DecisionTree>, telemetry: Arc<TelemetrySink>) {
    let (stream, _) = listener.accept().expect("test client must connect");
    let reader_stream = stream.try_clone().expect("clone accepted stream for reader half");
    let write_socket = TcpSendSocket::new(stream, 12_000_000);
    let load_socket = write_socket.try_clone().expect("clone accepted stream for load queries");

    let (sender, receiver) = bounded(SEND_QUEUE_DEPTH);
    let resource = Arc::new(ResourceState::new());
    let resource_for_send = resource.clone();

    let send_handle = thread::spawn(move || run_send_loop(write_socket, receiver, resource_for_send, 1));

    let ctx = PipelineContext { connection_id: 1, resource, tree, telemetry };
    let _ = run_request(reader_stream, &load_socket, &sender, &ctx);

    send_handle.join().expect("send loop thread must not panic");
}

fn telemetry_sink(dir: &std::path::Path) -> Arc<TelemetrySink> {
    Arc::new(TelemetrySink::open(dir, "20260101-000000").unwrap())
}

fn client_args(host: &str, port: u16, path: &std::path::Path, dest_dir: &std::path::Path, mode: &str, codec: Option<&str>, level: Option<i32>) -> ClientArgs {
    ClientArgs {
        host: host.to_string(),
        port,
        path: path.to_path_buf(),
        dest_dir: dest_dir.to_string_lossy().into_owned(),
        mode: mode.to_string(),
        codec: codec.map(str::to_string),
        level,
        config: None,
        log_json: false,
    }
}

/// Scenario 1: `NO_COMPRESSION` on a single ~152 KB file with a 64 KiB
/// chunk size. Three `COPY` chunks, last one flagged, payload identical to
/// the source file byte-for-byte once reassembled on disk.
#[test]
fn scenario_1_no_compression_round_trips_alice29() {
    let src_dir = tempfile::tempdir().unwrap();
    let dest_dir = tempfile::tempdir().unwrap();
    let telemetry_dir = tempfile::tempdir().unwrap();

    let original = vec![b'a'; 152_089];
    let src_path = src_dir.path().join("alice29.txt");
    std::fs::write(&src_path, &original).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let tree = copy_only_tree();
    let telemetry = telemetry_sink(telemetry_dir.path());
    let server = thread::spawn(move || serve_one_connection(listener, tree, telemetry));

    let args = client_args("127.0.0.1", addr.port(), &src_path, dest_dir.path(), "NO_COMPRESSION", None, None);
    client::run(args).unwrap();
    server.join().unwrap();

    let received = std::fs::read(dest_dir.path().join("alice29.txt")).unwrap();
    assert_eq!(received, original);
}

/// Scenario 2: `COMPRESS` with `BZIP2` level 9. Every chunk the server
/// sends is BZIP2-compressed; the client decompresses and the file matches
/// byte-for-byte.
#[test]
fn scenario_2_compress_bzip2_round_trips() {
    let src_dir = tempfile::tempdir().unwrap();
    let dest_dir = tempfile::tempdir().unwrap();
    let telemetry_dir = tempfile::tempdir().unwrap();

    let original = b"some text that compresses nicely via bzip2 ".repeat(20_000);
    let src_path = src_dir.path().join("report.txt");
    std::fs::write(&src_path, &original).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let tree = copy_only_tree();
    let telemetry = telemetry_sink(telemetry_dir.path());
    let server = thread::spawn(move || serve_one_connection(listener, tree, telemetry));

    let args = client_args("127.0.0.1", addr.port(), &src_path, dest_dir.path(), "COMPRESS", Some("BZIP2"), Some(9));
    client::run(args).unwrap();
    server.join().unwrap();

    let received = std::fs::read(dest_dir.path().join("report.txt")).unwrap();
    assert_eq!(received, original);
}

/// Scenario 5: a directory tree of three files, `COMPRESS`/`ZLIB`/6.
/// Per-file chunking is independent and every file's decompressed content
/// matches its source.
#[test]
fn scenario_5_directory_tree_each_file_round_trips_independently() {
    let src_dir = tempfile::tempdir().unwrap();
    let dest_dir = tempfile::tempdir().unwrap();
    let telemetry_dir = tempfile::tempdir().unwrap();

    std::fs::write(src_dir.path().join("a.txt"), b"alpha file contents ".repeat(3000)).unwrap();
    std::fs::create_dir(src_dir.path().join("d")).unwrap();
    std::fs::write(src_dir.path().join("d/b.txt"), b"bravo file contents ".repeat(4000)).unwrap();
    std::fs::create_dir(src_dir.path().join("d/e")).unwrap();
    std::fs::write(src_dir.path().join("d/e/c.txt"), b"charlie file contents ".repeat(5000)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let tree = copy_only_tree();
    let telemetry = telemetry_sink(telemetry_dir.path());
    let server = thread::spawn(move || serve_one_connection(listener, tree, telemetry));

    let args = client_args("127.0.0.1", addr.port(), src_dir.path(), dest_dir.path(), "COMPRESS", Some("ZLIB"), Some(6));
    client::run(args).unwrap();
    server.join().unwrap();

    assert_eq!(std::fs::read(dest_dir.path().join("a.txt")).unwrap(), b"alpha file contents ".repeat(3000));
    assert_eq!(std::fs::read(dest_dir.path().join("b.txt")).unwrap(), b"bravo file contents ".repeat(4000));
    assert_eq!(std::fs::read(dest_dir.path().join("c.txt")).unwrap(), b"charlie file contents ".repeat(5000));
}

/// Scenario 6: an invalid request (unknown codec name) produces one
/// `ErrorMessage`, no `FileInitialMessage`, and the server closes without
/// ever creating a destination file.
#[test]
fn scenario_6_invalid_codec_yields_error_and_no_file() {
    let src_dir = tempfile::tempdir().unwrap();
    let dest_dir = tempfile::tempdir().unwrap();
    let telemetry_dir = tempfile::tempdir().unwrap();

    let src_path = src_dir.path().join("whatever.txt");
    std::fs::write(&src_path, b"irrelevant contents").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let tree = copy_only_tree();
    let telemetry = telemetry_sink(telemetry_dir.path());
    let server = thread::spawn(move || serve_one_connection(listener, tree, telemetry));

    let args = client_args("127.0.0.1", addr.port(), &src_path, dest_dir.path(), "COMPRESS", Some("not-a-real-codec"), None);
    // The server rejects the request before ever sending a
    // FileInitialMessage; the client's receive loop simply sees the
    // connection close after logging the ErrorMessage, so `run` succeeds.
    client::run(args).unwrap();
    server.join().unwrap();

    assert!(!dest_dir.path().join("whatever.txt").exists());
    assert_eq!(std::fs::read_dir(dest_dir.path()).unwrap().count(), 0);
}

/// Sanity check that a real `TcpStream` pair round-trips a length-prefixed
/// frame the same way the in-memory framer tests already cover for
/// `Cursor`-backed readers.
#[test]
fn frame_round_trips_over_a_real_tcp_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        autocomp::infrastructure::net::write_frame(&mut stream, b"hello frame").unwrap();
    });

    let mut client_stream = TcpStream::connect(addr).unwrap();
    let frame = autocomp::infrastructure::net::read_frame(&mut client_stream).unwrap();
    server.join().unwrap();

    assert_eq!(frame.unwrap(), b"hello frame");
}
