//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, U256};
use cfd_runner::blockchain::{
    Ledger, LedgerError, LedgerResult, Receipt, TokenGateway, TradeRequest,
};
use cfd_runner::load_balancer::PairId;
use cfd_runner::proof::{FetchResult, ProofTransport, RawResponse};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.into(),
        }
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/html"),
            body: body.into(),
        }
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the raw request head and produces the response.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;
                        let response = f(head).await;
                        let status_text = match response.status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let content_type = response
                            .content_type
                            .map(|ct| format!("Content-Type: {}\r\n", ct))
                            .unwrap_or_default();

                        let response_str = format!(
                            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            content_type,
                            response.body.len(),
                            response.body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Proof transport that replays scripted responses, then repeats the last.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<FetchResult<RawResponse>>>,
    fallback: RawResponse,
    requests: Mutex<Vec<PairId>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<FetchResult<RawResponse>>, fallback: RawResponse) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request answered with `body` as JSON.
    pub fn always(status: u16, body: &str) -> Self {
        Self::new(Vec::new(), RawResponse::json(status, body))
    }

    pub fn requests(&self) -> Vec<PairId> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProofTransport for ScriptedTransport {
    fn get<'a>(&'a self, pair: PairId, _user_agent: &'a str) -> BoxFuture<'a, FetchResult<RawResponse>> {
        self.requests.lock().unwrap().push(pair);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()));
        futures_util::future::ready(next).boxed()
    }
}

/// How the scripted ledger answers a submission.
#[derive(Debug, Clone, Copy)]
pub enum SubmitBehavior {
    /// Mined with the given status on the first receipt lookup.
    Mined { success: bool },
    /// Rejected at pre-flight.
    PreflightRevert,
    /// Accepted but never mined.
    NeverMined,
}

/// Ledger whose submissions follow a script, then repeat the last entry.
pub struct ScriptedLedger {
    script: Mutex<VecDeque<SubmitBehavior>>,
    last: Mutex<SubmitBehavior>,
    mined: Mutex<Vec<(TxHash, bool)>>,
    submissions: Mutex<Vec<TradeRequest>>,
}

impl ScriptedLedger {
    pub fn new(script: Vec<SubmitBehavior>) -> Self {
        let last = script
            .last()
            .copied()
            .unwrap_or(SubmitBehavior::Mined { success: true });
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(last),
            mined: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<TradeRequest> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Ledger for ScriptedLedger {
    fn get_receipt(&self, tx_hash: TxHash) -> BoxFuture<'_, LedgerResult<Option<Receipt>>> {
        let receipt = self
            .mined
            .lock()
            .unwrap()
            .iter()
            .find(|(hash, _)| *hash == tx_hash)
            .map(|(hash, success)| Receipt {
                tx_hash: *hash,
                success: *success,
                block_number: Some(100),
            });
        futures_util::future::ready(Ok(receipt)).boxed()
    }

    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        _timeout: Duration,
    ) -> BoxFuture<'_, LedgerResult<Option<Receipt>>> {
        self.get_receipt(tx_hash)
    }

    fn submit_trade<'a>(&'a self, trade: &'a TradeRequest) -> BoxFuture<'a, LedgerResult<TxHash>> {
        let behavior = {
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(next) => {
                    *self.last.lock().unwrap() = next;
                    next
                }
                None => *self.last.lock().unwrap(),
            }
        };

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(trade.clone());
        let result = match behavior {
            SubmitBehavior::Mined { success } => {
                let tx_hash = TxHash::with_last_byte(submissions.len() as u8);
                self.mined.lock().unwrap().push((tx_hash, success));
                Ok(tx_hash)
            }
            SubmitBehavior::PreflightRevert => {
                Err(LedgerError::Preflight("execution reverted".to_string()))
            }
            SubmitBehavior::NeverMined => Ok(TxHash::with_last_byte(submissions.len() as u8)),
        };
        futures_util::future::ready(result).boxed()
    }
}

/// Token gateway whose every call fails at the RPC layer.
pub struct FailingTokens;

impl FailingTokens {
    fn fail<T: Send + 'static>() -> BoxFuture<'static, LedgerResult<T>> {
        futures_util::future::ready(Err(LedgerError::Rpc("connection refused".to_string()))).boxed()
    }
}

impl TokenGateway for FailingTokens {
    fn owner(&self) -> Address {
        Address::repeat_byte(0x01)
    }

    fn balance_of(&self, _owner: Address) -> BoxFuture<'_, LedgerResult<U256>> {
        Self::fail()
    }

    fn allowance(&self, _owner: Address, _spender: Address) -> BoxFuture<'_, LedgerResult<U256>> {
        Self::fail()
    }

    fn approve(&self, _spender: Address, _amount: U256) -> BoxFuture<'_, LedgerResult<TxHash>> {
        Self::fail()
    }

    fn claim_faucet(&self) -> BoxFuture<'_, LedgerResult<TxHash>> {
        Self::fail()
    }
}
