//! In-memory stand-ins for the store collaborators and the processor.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use error_stack::report;
use futures::lock::Mutex;

use super::{
    order::{CartInterface, OrderInterface},
    soap::{SoapRequest, SoapResponse, SoapTransport},
};
use crate::{
    errors::{CustomResult, TransportError},
    types::{OrderMetaKey, OrderStatus},
};

#[derive(Clone, Debug, Default)]
pub struct MockOrder {
    status: OrderStatus,
    notes: Vec<String>,
    meta: HashMap<OrderMetaKey, String>,
    status_changes: usize,
    transaction_id: Option<String>,
}

impl MockOrder {
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Number of times the status actually changed.
    pub fn status_changes(&self) -> usize {
        self.status_changes
    }

    pub fn meta(&self, key: OrderMetaKey) -> Option<&str> {
        self.meta.get(&key).map(String::as_str)
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    fn set_status(&mut self, status: OrderStatus) {
        if self.status != status {
            self.status = status;
            self.status_changes += 1;
        }
    }
}

impl OrderInterface for MockOrder {
    fn status(&self) -> OrderStatus {
        self.status
    }

    fn update_status(&mut self, status: OrderStatus, note: &str) {
        self.set_status(status);
        self.notes.push(note.to_string());
    }

    fn add_order_note(&mut self, note: &str) {
        self.notes.push(note.to_string());
    }

    fn update_meta(&mut self, key: OrderMetaKey, value: &str) {
        self.meta.insert(key, value.to_string());
    }

    fn get_meta(&self, key: OrderMetaKey) -> Option<String> {
        self.meta.get(&key).cloned()
    }

    fn payment_complete(&mut self, transaction_id: &str) {
        self.transaction_id = Some(transaction_id.to_string());
        self.set_status(OrderStatus::Processing);
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockCart {
    pub items: usize,
    pub times_emptied: usize,
}

impl MockCart {
    pub fn with_items(items: usize) -> Self {
        Self {
            items,
            times_emptied: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }
}

impl CartInterface for MockCart {
    fn empty_cart(&mut self) {
        self.items = 0;
        self.times_emptied += 1;
    }
}

/// Scripted reply of [`MockTransport`].
#[derive(Clone, Debug)]
pub enum MockReply {
    Envelope { status_code: u16, body: String },
    ConnectionFailure(String),
}

/// Answers requests with scripted replies, in order, and keeps every request it received.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<SoapRequest>>>,
}

impl MockTransport {
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            requests: Default::default(),
        }
    }

    /// A transport that answers once with `body` and HTTP 200.
    pub fn replying(body: impl Into<String>) -> Self {
        Self::new([MockReply::Envelope {
            status_code: 200,
            body: body.into(),
        }])
    }

    pub async fn requests(&self) -> Vec<SoapRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SoapTransport for MockTransport {
    async fn send(&self, request: SoapRequest) -> CustomResult<SoapResponse, TransportError> {
        self.requests.lock().await.push(request);

        match self.replies.lock().await.pop_front() {
            Some(MockReply::Envelope { status_code, body }) => Ok(SoapResponse {
                status_code,
                body: body.into_bytes(),
            }),
            Some(MockReply::ConnectionFailure(message)) => {
                Err(report!(TransportError::ConnectionFailed { message }))
            }
            None => Err(report!(TransportError::ConnectionFailed {
                message: "no scripted reply left".to_string(),
            })),
        }
    }
}
