//! Live log tail over WebSocket
//!
//! Connects to the backend's tail endpoint and turns each text frame into a
//! [`LogRecord`]. An optional process allow-list is applied before records
//! reach the consumer; it can be changed at any time through the handle.
//!
//! The stream does not reconnect. After a `Disconnected` event the handle
//! is spent and the caller decides whether to open a new one.
//!
//! # Example
//! ```no_run
//! use opsconsole_client::{TailEvent, TailStream};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut tail = TailStream::open("ws://localhost:5001/ws/tail").await?;
//! tail.set_process_filter(Some(["pinger".to_string()].into()));
//!
//! while let Some(event) = tail.next_event().await {
//!     match event {
//!         TailEvent::Record(record) => println!("{}", record.display_line()),
//!         TailEvent::Disconnected { reason } => println!("disconnected: {}", reason),
//!         TailEvent::Connected => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use futures_util::{SinkExt, Stream, StreamExt};
use opsconsole_core::domain::log::{LogRecord, ProcessFilter};
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

use crate::error::{ClientError, Result};

/// Events delivered by the tail stream, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    /// Connection established
    Connected,
    /// A log line that passed the process filter
    Record(LogRecord),
    /// Connection ended; no further events follow
    Disconnected { reason: String },
}

/// Entry point for opening tail connections
pub struct TailStream;

impl TailStream {
    /// Connect to a tail endpoint
    ///
    /// The first event on the returned handle is always `Connected`.
    pub async fn open(endpoint: &str) -> Result<TailHandle> {
        info!(url = %endpoint, "Connecting to log tail");
        let (ws_stream, _) = connect_async(endpoint).await.map_err(|e| {
            error!(error = %e, "Failed to connect to log tail");
            ClientError::from(e)
        })?;

        let (mut write, read) = ws_stream.split();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (filter_tx, filter_rx) = watch::channel(ProcessFilter::allow_all());
        let (close_tx, close_rx) = oneshot::channel();

        let _ = events_tx.send(TailEvent::Connected);

        let task = tokio::spawn(async move {
            let reason = pump(read, filter_rx, &events_tx, close_rx).await;
            if let Err(e) = write.close().await {
                debug!(error = %e, "Error while closing tail socket");
            }
            info!(reason = %reason, "Log tail disconnected");
            let _ = events_tx.send(TailEvent::Disconnected { reason });
        });

        Ok(TailHandle {
            events: Some(events_rx),
            filter: filter_tx,
            close: Some(close_tx),
            task,
        })
    }
}

/// Handle to an open tail connection
pub struct TailHandle {
    events: Option<mpsc::UnboundedReceiver<TailEvent>>,
    filter: watch::Sender<ProcessFilter>,
    close: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TailHandle {
    /// Replace the process allow-list; `None` accepts every process
    ///
    /// Applies to frames received after the call.
    pub fn set_process_filter(&self, processes: Option<HashSet<String>>) {
        self.filter.send_replace(ProcessFilter::from(processes));
    }

    /// Wait for the next event
    ///
    /// Returns `None` once the stream has ended and every event was
    /// consumed, or if the events were handed to [`TailHandle::on_record`].
    pub async fn next_event(&mut self) -> Option<TailEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    /// Deliver every event to `callback` from a background task
    ///
    /// The task ends after the `Disconnected` event. Can be called once.
    pub fn on_record<F>(&mut self, mut callback: F) -> Result<JoinHandle<()>>
    where
        F: FnMut(TailEvent) + Send + 'static,
    {
        let mut events = self.events.take().ok_or_else(|| {
            ClientError::InvalidRequest("Tail events already have a consumer".to_string())
        })?;

        Ok(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                callback(event);
            }
        }))
    }

    /// Close the connection and wait for the reader to finish
    ///
    /// A `Disconnected` event is still delivered to any consumer.
    pub async fn close(mut self) {
        if let Some(close) = self.close.take() {
            let _ = close.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("Tail reader task panicked: {}", e);
        }
    }
}

/// Parse one frame and apply the filter
///
/// Returns `None` for records the filter rejects.
pub fn accept_frame(frame: &str, filter: &ProcessFilter) -> Option<LogRecord> {
    let record = LogRecord::parse_frame(frame);
    if filter.accepts(&record) {
        Some(record)
    } else {
        debug!(process = %record.process_name, "Dropping filtered tail record");
        None
    }
}

/// Forward frames from `read` until the peer closes, the transport fails
/// or the handle asks to close. Returns the disconnect reason.
async fn pump<S>(
    mut read: S,
    filter: watch::Receiver<ProcessFilter>,
    events: &mpsc::UnboundedSender<TailEvent>,
    mut close: oneshot::Receiver<()>,
) -> String
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    let forward = |frame: &str| {
        let filter = filter.borrow();
        if let Some(record) = accept_frame(frame, &filter) {
            let _ = events.send(TailEvent::Record(record));
        }
    };

    loop {
        tokio::select! {
            _ = &mut close => return "closed by client".to_string(),
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => forward(&text),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => forward(&text),
                    Err(_) => debug!("Ignoring non UTF-8 binary tail frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    return frame
                        .map(|f| f.reason.to_string())
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| "closed by server".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "Log tail transport error");
                    return e.to_string();
                }
                None => return "connection closed".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    fn text(frame: &str) -> std::result::Result<Message, tungstenite::Error> {
        Ok(Message::Text(frame.to_string()))
    }

    async fn run_pump(
        frames: Vec<std::result::Result<Message, tungstenite::Error>>,
        filter: ProcessFilter,
    ) -> (Vec<TailEvent>, String) {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (_filter_tx, filter_rx) = watch::channel(filter);
        let (_close_tx, close_rx) = oneshot::channel();

        let reason = pump(stream::iter(frames), filter_rx, &events_tx, close_rx).await;
        drop(events_tx);

        let mut events = Vec::new();
        while let Some(event) = events_rx.recv().await {
            events.push(event);
        }
        (events, reason)
    }

    #[tokio::test]
    async fn test_pump_forwards_records_in_order() {
        let (events, reason) = run_pump(
            vec![
                text("t1\tpinger\t{\"type\": \"INFO\", \"message\": \"one\"}"),
                text("unstructured line"),
                Ok(Message::Ping(vec![1])),
                text("t2\tponger\traw"),
            ],
            ProcessFilter::allow_all(),
        )
        .await;

        let messages: Vec<_> = events
            .iter()
            .map(|e| match e {
                TailEvent::Record(r) => r.message.clone(),
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(messages, vec!["one", "unstructured line", "raw"]);
        assert_eq!(reason, "connection closed");
    }

    #[tokio::test]
    async fn test_pump_applies_filter() {
        let (events, _) = run_pump(
            vec![text("t1\tA\tkeep"), text("t2\tC\tdrop"), text("t3\tB\tkeep too")],
            ProcessFilter::only(["A", "B"]),
        )
        .await;

        assert_eq!(events.len(), 2);
        assert!(
            events
                .iter()
                .all(|e| matches!(e, TailEvent::Record(r) if r.process_name != "C"))
        );
    }

    #[tokio::test]
    async fn test_pump_stops_at_close_frame() {
        let (events, reason) = run_pump(
            vec![
                text("t1\tA\tbefore"),
                Ok(Message::Close(None)),
                text("t2\tA\tafter"),
            ],
            ProcessFilter::allow_all(),
        )
        .await;

        assert_eq!(events.len(), 1);
        assert_eq!(reason, "closed by server");
    }

    #[tokio::test]
    async fn test_pump_reports_transport_error() {
        let (events, reason) = run_pump(
            vec![text("t1\tA\tbefore"), Err(tungstenite::Error::ConnectionClosed)],
            ProcessFilter::allow_all(),
        )
        .await;

        assert_eq!(events.len(), 1);
        assert_eq!(reason, tungstenite::Error::ConnectionClosed.to_string());
    }

    #[tokio::test]
    async fn test_pump_honours_close_request() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (_filter_tx, filter_rx) = watch::channel(ProcessFilter::allow_all());
        let (close_tx, close_rx) = oneshot::channel();
        close_tx.send(()).unwrap();

        let reason = pump(
            stream::pending::<std::result::Result<Message, tungstenite::Error>>(),
            filter_rx,
            &events_tx,
            close_rx,
        )
        .await;
        assert_eq!(reason, "closed by client");
    }

    /// Accept one client, send `frames`, then close with `close_reason`
    /// or wait for the client to close. Returns the tail URL.
    async fn serve_once(frames: Vec<&'static str>, close_reason: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(socket).await.unwrap();

            for frame in frames {
                ws.send(Message::Text(frame.to_string())).await.unwrap();
            }
            if let Some(reason) = close_reason {
                let _ = ws
                    .close(Some(CloseFrame {
                        code: CloseCode::Normal,
                        reason: reason.into(),
                    }))
                    .await;
            }
            while let Some(Ok(_)) = ws.next().await {}
        });

        format!("ws://{}/ws/tail", addr)
    }

    fn record_messages(events: &[TailEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                TailEvent::Record(r) => Some(r.message.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_open_delivers_connected_records_then_disconnected() {
        let url = serve_once(
            vec![
                "t1\tA\t{\"type\": \"INFO\", \"message\": \"one\"}",
                "t2\tB\ttwo",
                "plain line",
            ],
            Some("bye"),
        )
        .await;

        let mut tail = TailStream::open(&url).await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = tail.next_event().await {
            events.push(event);
        }

        assert_eq!(events.first(), Some(&TailEvent::Connected));
        assert_eq!(record_messages(&events), vec!["one", "two", "plain line"]);
        assert_eq!(
            events.last(),
            Some(&TailEvent::Disconnected {
                reason: "bye".to_string()
            })
        );
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn test_on_record_receives_every_event() {
        let url = serve_once(vec!["t1\tA\tfirst", "t2\tA\tsecond"], Some("done")).await;

        let mut tail = TailStream::open(&url).await.unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let consumer = tail
            .on_record(move |event| sink.lock().unwrap().push(event))
            .unwrap();

        // Only one consumer may own the events
        assert!(matches!(
            tail.on_record(|_| {}),
            Err(ClientError::InvalidRequest(_))
        ));

        consumer.await.unwrap();
        let events = seen.lock().unwrap().clone();
        assert_eq!(events[0], TailEvent::Connected);
        assert_eq!(record_messages(&events), vec!["first", "second"]);
        assert!(matches!(
            events.last(),
            Some(TailEvent::Disconnected { reason }) if reason == "done"
        ));
        assert_eq!(tail.next_event().await, None);
    }

    #[tokio::test]
    async fn test_close_still_reports_disconnected() {
        let url = serve_once(vec!["t1\tA\thello"], None).await;

        let mut tail = TailStream::open(&url).await.unwrap();
        assert_eq!(tail.next_event().await, Some(TailEvent::Connected));
        assert!(matches!(tail.next_event().await, Some(TailEvent::Record(_))));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let consumer = tail
            .on_record(move |event| sink.lock().unwrap().push(event))
            .unwrap();

        tail.close().await;
        consumer.await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![TailEvent::Disconnected {
                reason: "closed by client".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_open_fails_without_server() {
        // Nothing listens on port 9 (discard) in the test environment
        let result = TailStream::open("ws://127.0.0.1:9/ws/tail").await;
        assert!(matches!(result, Err(ClientError::WebSocket(_))));
    }

    #[test]
    fn test_accept_frame() {
        let filter = ProcessFilter::only(["A"]);
        assert!(accept_frame("t\tA\tmsg", &filter).is_some());
        assert!(accept_frame("t\tC\tmsg", &filter).is_none());
        assert!(accept_frame("stack trace line", &filter).is_some());
    }
}
