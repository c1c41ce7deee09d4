use statline::prelude::*;
use statline::{StatsdClient, Tags};
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, UdpSocket};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: StatsdClient, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                let mut tags = Tags::new();
                tags.insert("thread".to_owned(), "worker".to_owned());

                for i in 0..iterations as i64 {
                    local_client.counter("some.counter", i, &tags).unwrap();
                    local_client.increment("some.counter", 1, &tags).unwrap();
                    local_client.decrement("some.counter", 1, &tags).unwrap();
                    local_client.timing("some.timer", i, &tags).unwrap();
                    local_client.gauge("some.gauge", i, &tags).unwrap();
                    local_client.gauge_delta("some.gauge", -i, &tags).unwrap();
                    local_client.histogram("some.histogram", i, &tags).unwrap();
                    local_client.set("some.set", i, &tags).unwrap();
                    thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}

/// Number of lines each call to `run_arc_threaded_test` sends per iteration.
#[allow(dead_code)]
pub const LINES_PER_ITERATION: usize = 8;

/// Bind a TCP collector on a loopback port and read `expected` lines from
/// the first connection in a background thread.
#[allow(dead_code)]
pub fn tcp_collector(expected: usize) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = thread::spawn(move || {
        let (conn, _) = listener.accept().unwrap();
        conn.set_read_timeout(Some(Duration::from_secs(10))).unwrap();

        BufReader::new(conn)
            .lines()
            .take(expected)
            .map(|line| line.unwrap())
            .collect()
    });

    (addr, handle)
}

/// Bind a UDP collector on a loopback port.
#[allow(dead_code)]
pub fn udp_collector() -> (String, UdpSocket) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let addr = socket.local_addr().unwrap().to_string();
    (addr, socket)
}

#[allow(dead_code)]
pub fn recv_datagram(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 1024];
    let n = socket.recv(&mut buf).unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[allow(dead_code)]
pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
