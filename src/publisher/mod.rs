/*!
Delivery of records to the Kafka bus.

One producer is shared by every session task. Records cross a bounded
channel into a blocking worker that owns the producer; the channel is
the backpressure boundary, and overflow is counted and logged, never
silent and never blocking the decoders.
*/
use kafka::client::KafkaClient;
use kafka::producer::{Producer, Record as ProducerRecord, RequiredAcks};
use log::{error, info, warn};
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::error::PublisherError;
use crate::records::{Record, Topic};

/// How long to wait for the first successful broker exchange.
const BROKER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for one topic to become visible after a create request.
const TOPIC_CREATE_TIMEOUT: Duration = Duration::from_secs(5);
/// Retry tick for broker and topic polling.
const RETRY_TICK: Duration = Duration::from_millis(100);
/// Bounded handoff between decoder tasks and the producer worker.
const QUEUE_DEPTH: usize = 8192;

#[derive(Debug, Default)]
pub struct PublisherStats {
    pub published: AtomicU64,
    pub dropped: AtomicU64,
    pub delivery_errors: AtomicU64,
}

enum Command {
    Produce {
        topic: &'static str,
        key: Vec<u8>,
        body: Vec<u8>,
    },
    Stop,
}

/// Shared handle to the producer worker. Cloning is cheap and every
/// clone enqueues into the same bounded channel.
#[derive(Clone)]
pub struct KafkaPublisher {
    tx: mpsc::Sender<Command>,
    stopped: Arc<AtomicBool>,
    worker: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
    stats: Arc<PublisherStats>,
}

impl KafkaPublisher {
    /// Validate the broker address, wait for the broker, make sure the
    /// eight topics exist, then start the producer worker.
    ///
    /// Startup failure here is fatal to the process: a collector with no
    /// bus has nothing to do.
    pub fn start(broker: &str) -> Result<KafkaPublisher, PublisherError> {
        validate_broker_addr(broker)?;
        info!("connecting to broker {}", broker);

        let mut client = KafkaClient::new(vec![broker.to_string()]);
        wait_for_broker(&mut client)?;
        ensure_topics(&mut client)?;

        let producer = Producer::from_hosts(vec![broker.to_string()])
            .with_ack_timeout(Duration::from_secs(1))
            .with_required_acks(RequiredAcks::One)
            .create()?;

        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let stats = Arc::new(PublisherStats::default());
        let worker_stats = Arc::clone(&stats);
        let worker = thread::Builder::new()
            .name("kafka-producer".to_string())
            .spawn(move || producer_loop(producer, rx, worker_stats))
            .map_err(PublisherError::from)?;

        info!("producer started, {} topics ready", Topic::ALL.len());
        Ok(KafkaPublisher {
            tx,
            stopped: Arc::new(AtomicBool::new(false)),
            worker: Arc::new(Mutex::new(Some(worker))),
            stats,
        })
    }

    /// Enqueue one record. Returns false when the bounded queue is full
    /// and the record was dropped; the drop is counted and logged.
    pub fn publish(&self, record: &Record) -> bool {
        let command = Command::Produce {
            topic: record.topic().as_str(),
            key: record.key(),
            body: record.body(),
        };
        match self.tx.try_send(command) {
            Ok(()) => {
                self.stats.published.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                let dropped = self.stats.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    warn!("producer queue full, {} record(s) dropped so far", dropped);
                }
                false
            }
        }
    }

    pub fn stats(&self) -> &PublisherStats {
        &self.stats
    }

    /// Drain in-flight deliveries and shut the worker down. Idempotent.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(Command::Stop).await;
        let handle = self.worker.lock().expect("worker lock").take();
        if let Some(handle) = handle {
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }
        info!(
            "producer stopped: {} published, {} dropped, {} delivery errors",
            self.stats.published.load(Ordering::Relaxed),
            self.stats.dropped.load(Ordering::Relaxed),
            self.stats.delivery_errors.load(Ordering::Relaxed),
        );
    }
}

fn producer_loop(
    mut producer: Producer,
    mut rx: mpsc::Receiver<Command>,
    stats: Arc<PublisherStats>,
) {
    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Produce { topic, key, body } => {
                let record = ProducerRecord::from_key_value(topic, key.as_slice(), body.as_slice());
                if let Err(e) = producer.send(&record) {
                    stats.delivery_errors.fetch_add(1, Ordering::Relaxed);
                    error!(
                        "delivery to {} failed for key {}: {}",
                        topic,
                        hex::encode(&key),
                        e
                    );
                }
            }
            Command::Stop => break,
        }
    }
    // dropping the producer flushes what the client still buffers
}

/// Poll the broker with a bounded retry loop until metadata loads.
fn wait_for_broker(client: &mut KafkaClient) -> Result<(), PublisherError> {
    let deadline = Instant::now() + BROKER_CONNECT_TIMEOUT;
    loop {
        match client.load_metadata_all() {
            Ok(()) => return Ok(()),
            Err(e) if Instant::now() >= deadline => {
                return Err(PublisherError::Transport(format!(
                    "broker unreachable before deadline: {}",
                    e
                )))
            }
            Err(_) => thread::sleep(RETRY_TICK),
        }
    }
}

/// Make sure every output topic is visible, requesting creation via
/// metadata for brokers with auto-create enabled. A topic already
/// present is success; one that never appears before the deadline
/// aborts startup.
fn ensure_topics(client: &mut KafkaClient) -> Result<(), PublisherError> {
    let names: Vec<&'static str> = Topic::ALL.iter().map(|t| t.as_str()).collect();
    let deadline = Instant::now() + TOPIC_CREATE_TIMEOUT;
    loop {
        client.load_metadata(&names)?;
        match names.iter().find(|name| !client.topics().contains(name)) {
            None => return Ok(()),
            Some(missing) => {
                if Instant::now() >= deadline {
                    return Err(PublisherError::TopicUnavailable(missing.to_string()));
                }
                thread::sleep(RETRY_TICK);
            }
        }
    }
}

/// Validate a `host:port` broker address: non-empty host and port, port
/// in 1..=65535, and a host that is either a literal IP or a name that
/// actually resolves to at least one address.
pub fn validate_broker_addr(addr: &str) -> Result<(), PublisherError> {
    let (host, port) = split_host_port(addr)?;

    if port == 0 {
        return Err(PublisherError::InvalidAddress(format!(
            "port 0 in {}",
            addr
        )));
    }

    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let resolved = (host, port)
        .to_socket_addrs()
        .map_err(|e| PublisherError::InvalidAddress(format!("host {} not resolvable: {}", host, e)))?;
    if resolved.len() == 0 {
        return Err(PublisherError::InvalidAddress(format!(
            "host {} resolves to nothing",
            host
        )));
    }
    Ok(())
}

fn split_host_port(addr: &str) -> Result<(&str, u16), PublisherError> {
    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        // bracketed IPv6 literal
        let (host, rest) = rest.split_once(']').ok_or_else(|| {
            PublisherError::InvalidAddress(format!("unterminated bracket in {}", addr))
        })?;
        let port = rest.strip_prefix(':').ok_or_else(|| {
            PublisherError::InvalidAddress(format!("missing port in {}", addr))
        })?;
        (host, port)
    } else {
        let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
            PublisherError::InvalidAddress(format!("missing port in {}", addr))
        })?;
        if host.contains(':') {
            return Err(PublisherError::InvalidAddress(format!(
                "IPv6 address must be bracketed in {}",
                addr
            )));
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(PublisherError::InvalidAddress(format!(
            "empty host in {}",
            addr
        )));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| PublisherError::InvalidAddress(format!("bad port in {}", addr)))?;
    Ok((host, port))
}
