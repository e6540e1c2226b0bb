//! RethinkDB V1_0 connection: SCRAM handshake and query framing.
//!
//! Handshake messages are null-terminated JSON. Queries are framed as an
//! 8-byte little-endian token, a 4-byte little-endian length and the JSON
//! query; responses use the same frame.

use super::reql::{self, ResponseType};
use super::scram::ScramClient;
use super::types::SourceOptions;
use super::ReqlError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

const V1_0_MAGIC: u32 = 0x34c2_bdc3;
const PROTOCOL_VERSION: u32 = 0;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);
/// Guards against reading a corrupt length prefix.
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Handshake replies are small JSON objects.
const MAX_HANDSHAKE_BYTES: u64 = 64 * 1024;

pub struct Connection<S> {
    stream: BufReader<S>,
    next_token: u64,
}

#[derive(Debug, Deserialize)]
struct HandshakeReply {
    success: bool,
    #[serde(default)]
    authentication: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<u64>,
    #[serde(default)]
    server_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Response {
    t: u64,
    #[serde(default)]
    r: Vec<Value>,
}

/// Open a TCP connection and authenticate.
pub async fn connect(options: &SourceOptions) -> Result<Connection<TcpStream>, ReqlError> {
    let address = format!("{}:{}", options.host, options.port);
    let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&address))
        .await
        .map_err(|_| ReqlError::Connect {
            address: address.clone(),
            source: std::io::ErrorKind::TimedOut.into(),
        })?
        .map_err(|source| ReqlError::Connect {
            address: address.clone(),
            source,
        })?;
    stream.set_nodelay(true)?;

    let scram = ScramClient::new(&options.username, &options.password);
    let connection = Connection::handshake(stream, &options.username, scram).await?;
    info!(%address, user = %options.username, "Connected to RethinkDB");
    Ok(connection)
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub async fn handshake(
        stream: S,
        username: &str,
        scram: ScramClient,
    ) -> Result<Self, ReqlError> {
        let mut connection = Self {
            stream: BufReader::new(stream),
            next_token: 1,
        };

        let first = json!({
            "protocol_version": PROTOCOL_VERSION,
            "authentication_method": "SCRAM-SHA-256",
            "authentication": scram.client_first(),
        });
        connection.stream.write_all(&V1_0_MAGIC.to_le_bytes()).await?;
        connection.write_message(&first).await?;

        let hello = connection.read_reply().await?;
        debug!(
            server_version = hello.server_version.as_deref().unwrap_or("unknown"),
            user = username,
            "RethinkDB handshake started"
        );

        let server_first = connection.read_reply().await?;
        let server_first = server_first
            .authentication
            .ok_or_else(|| ReqlError::Handshake("server-first message missing".into()))?;
        let last = scram.handle_server_first(&server_first)?;

        connection
            .write_message(&json!({ "authentication": last.client_final() }))
            .await?;

        let server_final = connection.read_reply().await?;
        let server_final = server_final
            .authentication
            .ok_or_else(|| ReqlError::Handshake("server-final message missing".into()))?;
        last.verify(&server_final)?;

        Ok(connection)
    }

    /// Run one term to completion, draining partial sequences.
    pub async fn run(&mut self, term: Value) -> Result<Value, ReqlError> {
        let token = self.next_token;
        self.next_token += 1;

        self.write_query(token, &reql::start(term)).await?;
        let mut rows = Vec::new();
        loop {
            let response = self.read_response(token).await?;
            let kind = ResponseType::from_code(response.t).ok_or_else(|| {
                ReqlError::Protocol(format!("unknown response type {}", response.t))
            })?;

            match kind {
                ResponseType::SuccessAtom => {
                    return Ok(response.r.into_iter().next().unwrap_or(Value::Null));
                }
                ResponseType::SuccessSequence => {
                    rows.extend(response.r);
                    return Ok(Value::Array(rows));
                }
                ResponseType::SuccessPartial => {
                    rows.extend(response.r);
                    self.write_query(token, &reql::continue_query()).await?;
                }
                ResponseType::WaitComplete | ResponseType::ServerInfo => {
                    return Ok(response.r.into_iter().next().unwrap_or(Value::Null));
                }
                ResponseType::ClientError => return Err(ReqlError::Client(message(response.r))),
                ResponseType::CompileError => return Err(ReqlError::Compile(message(response.r))),
                ResponseType::RuntimeError => return Err(ReqlError::Runtime(message(response.r))),
            }
        }
    }

    pub async fn close(mut self) -> Result<(), ReqlError> {
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn write_message(&mut self, message: &Value) -> Result<(), ReqlError> {
        let mut bytes = serde_json::to_vec(message).map_err(protocol)?;
        bytes.push(0);
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<HandshakeReply, ReqlError> {
        let mut bytes = Vec::new();
        let read = (&mut self.stream)
            .take(MAX_HANDSHAKE_BYTES)
            .read_until(0, &mut bytes)
            .await?;
        if bytes.pop() != Some(0) {
            if read as u64 >= MAX_HANDSHAKE_BYTES {
                return Err(ReqlError::Handshake(format!(
                    "handshake message exceeds {MAX_HANDSHAKE_BYTES} bytes"
                )));
            }
            return Err(ReqlError::Handshake("connection closed during handshake".into()));
        }

        let reply: HandshakeReply = match serde_json::from_slice(&bytes) {
            Ok(reply) => reply,
            // Pre-V1_0 servers answer with a bare error string.
            Err(_) => {
                return Err(ReqlError::Handshake(
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            }
        };

        if !reply.success {
            let error = reply.error.unwrap_or_else(|| "handshake rejected".into());
            return Err(match reply.error_code {
                Some(10..=20) => ReqlError::Auth(error),
                _ => ReqlError::Handshake(error),
            });
        }
        Ok(reply)
    }

    async fn write_query(&mut self, token: u64, query: &Value) -> Result<(), ReqlError> {
        let body = serde_json::to_vec(query).map_err(protocol)?;
        let length = u32::try_from(body.len())
            .map_err(|_| ReqlError::Protocol("query too large".into()))?;

        let mut frame = Vec::with_capacity(12 + body.len());
        frame.extend_from_slice(&token.to_le_bytes());
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&body);
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self, token: u64) -> Result<Response, ReqlError> {
        let received = self.stream.read_u64_le().await?;
        let length = self.stream.read_u32_le().await? as usize;
        if received != token {
            return Err(ReqlError::Protocol(format!(
                "response token {received} does not match query token {token}"
            )));
        }
        if length > MAX_RESPONSE_BYTES {
            return Err(ReqlError::Protocol(format!("response of {length} bytes too large")));
        }

        let mut body = vec![0u8; length];
        self.stream.read_exact(&mut body).await?;
        serde_json::from_slice(&body).map_err(protocol)
    }
}

fn message(r: Vec<Value>) -> String {
    match r.into_iter().next() {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => "unknown error".to_string(),
    }
}

fn protocol(error: serde_json::Error) -> ReqlError {
    ReqlError::Protocol(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::DuplexStream;

    const CLIENT_NONCE: &str = "rOprNGfwEbeRWgbNEkqO";
    const SERVER_FIRST: &str =
        "r=rOprNGfwEbeRWgbNEkqO%hvYDpWUa2RaTCAfuxFIlj)hNlF$k0,s=W22ZaJ0SNY7soEsUEjb6gQ==,i=4096";
    const CLIENT_FINAL: &str = "c=biws,r=rOprNGfwEbeRWgbNEkqO%hvYDpWUa2RaTCAfuxFIlj)hNlF$k0,p=dHzbZapWIk4jUhN+Ute9ytag9zjfMHgsqmmiz7AndVQ=";
    const SERVER_FINAL: &str = "v=6rriTRBi23WpRR/wtup+mMhUZUn/dB5nLTJRsjl95G4=";

    /// Server side of a duplex pipe speaking the V1_0 protocol.
    struct FakeServer {
        stream: BufReader<DuplexStream>,
    }

    impl FakeServer {
        async fn read_message(&mut self) -> Value {
            let mut bytes = Vec::new();
            self.stream.read_until(0, &mut bytes).await.unwrap();
            assert_eq!(bytes.pop(), Some(0));
            serde_json::from_slice(&bytes).unwrap()
        }

        async fn send_message(&mut self, message: Value) {
            let mut bytes = serde_json::to_vec(&message).unwrap();
            bytes.push(0);
            self.stream.write_all(&bytes).await.unwrap();
        }

        async fn accept(&mut self) {
            let magic = self.stream.read_u32_le().await.unwrap();
            assert_eq!(magic, V1_0_MAGIC);

            let first = self.read_message().await;
            assert_eq!(first["authentication_method"], "SCRAM-SHA-256");
            assert_eq!(
                first["authentication"],
                format!("n,,n=user,r={CLIENT_NONCE}")
            );

            self.send_message(json!({
                "success": true,
                "min_protocol_version": 0,
                "max_protocol_version": 0,
                "server_version": "2.4.4"
            }))
            .await;
            self.send_message(json!({ "success": true, "authentication": SERVER_FIRST }))
                .await;

            let last = self.read_message().await;
            assert_eq!(last["authentication"], CLIENT_FINAL);
            self.send_message(json!({ "success": true, "authentication": SERVER_FINAL }))
                .await;
        }

        async fn read_query(&mut self) -> (u64, Value) {
            let token = self.stream.read_u64_le().await.unwrap();
            let length = self.stream.read_u32_le().await.unwrap() as usize;
            let mut body = vec![0u8; length];
            self.stream.read_exact(&mut body).await.unwrap();
            (token, serde_json::from_slice(&body).unwrap())
        }

        async fn respond(&mut self, token: u64, response: Value) {
            let body = serde_json::to_vec(&response).unwrap();
            self.stream.write_all(&token.to_le_bytes()).await.unwrap();
            self.stream
                .write_all(&(body.len() as u32).to_le_bytes())
                .await
                .unwrap();
            self.stream.write_all(&body).await.unwrap();
        }
    }

    fn pipe() -> (DuplexStream, FakeServer) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        (
            client,
            FakeServer {
                stream: BufReader::new(server),
            },
        )
    }

    fn scram() -> ScramClient {
        ScramClient::with_nonce("user", "pencil", CLIENT_NONCE)
    }

    #[tokio::test]
    async fn test_handshake_and_atom_query() {
        let (client, mut server) = pipe();
        let server_task = tokio::spawn(async move {
            server.accept().await;
            let (token, query) = server.read_query().await;
            assert_eq!(query, json!([1, [59, []], {}]));
            server
                .respond(token, json!({ "t": 1, "r": [["rethinkdb", "test"]] }))
                .await;
        });

        let mut connection = Connection::handshake(client, "user", scram()).await.unwrap();
        let databases = connection.run(reql::db_list()).await.unwrap();
        assert_eq!(databases, json!(["rethinkdb", "test"]));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_sequences_are_drained() {
        let (client, mut server) = pipe();
        let server_task = tokio::spawn(async move {
            server.accept().await;
            let (token, _) = server.read_query().await;
            server
                .respond(token, json!({ "t": 3, "r": [{ "id": 1 }, { "id": 2 }] }))
                .await;
            let (next, query) = server.read_query().await;
            assert_eq!(next, token);
            assert_eq!(query, json!([2]));
            server.respond(token, json!({ "t": 2, "r": [{ "id": 3 }] })).await;
        });

        let mut connection = Connection::handshake(client, "user", scram()).await.unwrap();
        let rows = connection.run(reql::table("app", "users")).await.unwrap();
        assert_eq!(rows, json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_runtime_error() {
        let (client, mut server) = pipe();
        let server_task = tokio::spawn(async move {
            server.accept().await;
            let (token, _) = server.read_query().await;
            server
                .respond(
                    token,
                    json!({ "t": 18, "r": ["Table `app.missing` does not exist."] }),
                )
                .await;
        });

        let mut connection = Connection::handshake(client, "user", scram()).await.unwrap();
        let err = connection
            .run(reql::table("app", "missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReqlError::Runtime(ref m) if m == "Table `app.missing` does not exist."));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let (client, mut server) = pipe();
        let server_task = tokio::spawn(async move {
            server.stream.read_u32_le().await.unwrap();
            server.read_message().await;
            server
                .send_message(json!({ "success": true, "server_version": "2.4.4" }))
                .await;
            server
                .send_message(json!({
                    "success": false,
                    "error": "Wrong password",
                    "error_code": 12
                }))
                .await;
        });

        let err = Connection::handshake(client, "user", scram())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ReqlError::Auth(ref m) if m == "Wrong password"));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_handshake_reply() {
        let (client, mut server) = pipe();
        let server_task = tokio::spawn(async move {
            server.stream.read_u32_le().await.unwrap();
            server.read_message().await;
            let flood = vec![b'x'; MAX_HANDSHAKE_BYTES as usize + 1024];
            // The client hangs up once the limit is reached.
            let _ = server.stream.write_all(&flood).await;
        });

        let err = Connection::handshake(client, "user", scram())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ReqlError::Handshake(ref m) if m.contains("exceeds")));
        server_task.await.unwrap();
    }
}
