//! Just enough HTTP/1.1 for the proxy: one request per connection,
//! `Content-Length` bodies only, `Connection: close` on every response.

use crate::proxy::ProxyResponse;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("body of {size} bytes exceeds limit of {max}")]
    TooLarge { size: usize, max: usize },

    #[error("headers exceed {0} bytes")]
    HeadersTooLarge(usize),

    /// Peer closed the connection partway through the request.
    #[error("connection closed mid-request")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HttpError {
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::TooLarge { .. } => 413,
            Self::HeadersTooLarge(_) => 431,
            Self::Closed | Self::Io(_) => 400,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

/// Reads one line into `buf`, consuming at most `budget + 1` bytes so an
/// unterminated line cannot grow past the header limit.
async fn read_capped_line<R>(reader: &mut BufReader<R>, buf: &mut Vec<u8>, budget: usize) -> Result<usize, HttpError>
where
    R: AsyncRead + Unpin,
{
    buf.clear();
    let cap = budget as u64 + 1;
    let n = (&mut *reader).take(cap).read_until(b'\n', buf).await?;
    Ok(n)
}

/// Reads one request. `Ok(None)` means the peer closed before sending anything.
pub async fn read_request<R>(reader: &mut BufReader<R>, limits: Limits) -> Result<Option<HttpRequest>, HttpError>
where
    R: AsyncRead + Unpin,
{
    let mut header_bytes = 0usize;
    let mut buf = Vec::new();
    let mut headers = Vec::new();
    let mut request_line: Option<(String, String)> = None;

    loop {
        let budget = limits.max_header_bytes.saturating_sub(header_bytes);
        let n = read_capped_line(reader, &mut buf, budget).await?;
        if n == 0 {
            return match request_line {
                None => Ok(None),
                Some(_) => Err(HttpError::Closed),
            };
        }
        header_bytes += n;
        if header_bytes > limits.max_header_bytes {
            return Err(HttpError::HeadersTooLarge(limits.max_header_bytes));
        }
        if buf.last() != Some(&b'\n') {
            return Err(HttpError::Closed);
        }

        let line = std::str::from_utf8(&buf)
            .map_err(|_| HttpError::BadRequest("request head is not valid UTF-8".into()))?;
        let l = line.trim_end_matches(|c: char| c == '\r' || c == '\n');

        if request_line.is_none() {
            let mut parts = l.split_whitespace();
            let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
                (Some(m), Some(t), Some(v)) => (m, t, v),
                _ => return Err(HttpError::BadRequest(format!("bad request line: {:?}", l))),
            };
            if !version.starts_with("HTTP/1.") {
                return Err(HttpError::BadRequest(format!("unsupported version {}", version)));
            }
            request_line = Some((method.to_string(), target.to_string()));
            continue;
        }

        if l.is_empty() {
            break;
        }
        let (k, v) = l
            .split_once(':')
            .ok_or_else(|| HttpError::BadRequest(format!("bad header line: {:?}", l)))?;
        headers.push((k.trim().to_string(), v.trim().to_string()));
    }

    let Some((method, target)) = request_line else {
        return Err(HttpError::Closed);
    };
    let mut req = HttpRequest {
        method,
        target,
        headers,
        body: Vec::new(),
    };

    if req
        .header("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    {
        return Err(HttpError::BadRequest("chunked bodies are not supported".into()));
    }

    let len = match req.header("content-length") {
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| HttpError::BadRequest(format!("bad content-length: {}", v)))?,
        None => 0,
    };
    if len > limits.max_body_bytes {
        return Err(HttpError::TooLarge {
            size: len,
            max: limits.max_body_bytes,
        });
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(HttpError::Closed),
        Err(e) => return Err(e.into()),
    }
    req.body = body;
    Ok(Some(req))
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
];

pub fn encode_response(resp: &ProxyResponse) -> Vec<u8> {
    let body = resp
        .body
        .as_ref()
        .map(|v| serde_json::to_vec(v).unwrap_or_default())
        .unwrap_or_default();

    let mut head = format!("HTTP/1.1 {} {}\r\n", resp.status, reason(resp.status));
    for (k, v) in CORS_HEADERS {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    if resp.body.is_some() {
        head.push_str("Content-Type: application/json\r\n");
    }
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str("Connection: close\r\n\r\n");

    let mut out = head.into_bytes();
    out.extend_from_slice(&body);
    out
}

pub async fn write_response<W>(w: &mut W, resp: &ProxyResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    w.write_all(&encode_response(resp)).await?;
    w.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: Limits = Limits {
        max_header_bytes: 1024,
        max_body_bytes: 64,
    };

    async fn parse(raw: &str) -> Result<Option<HttpRequest>, HttpError> {
        let mut r = BufReader::new(raw.as_bytes());
        read_request(&mut r, LIMITS).await
    }

    #[tokio::test]
    async fn parses_post_with_body() {
        let raw = "POST /api/tts?action=voices HTTP/1.1\r\nHost: x\r\nContent-Length: 4\r\n\r\n{}  ";
        let req = parse(raw).await.unwrap().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.target, "/api/tts?action=voices");
        assert_eq!(req.header("HOST"), Some("x"));
        assert_eq!(req.body, b"{}  ");
    }

    #[tokio::test]
    async fn empty_stream_is_none() {
        assert!(parse("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_oversized_body_and_chunked() {
        let raw = "POST / HTTP/1.1\r\nContent-Length: 65\r\n\r\n";
        assert_eq!(parse(raw).await.unwrap_err().status(), 413);

        let raw = "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        assert_eq!(parse(raw).await.unwrap_err().status(), 400);
    }

    #[tokio::test]
    async fn unterminated_line_stops_at_header_limit() {
        let raw = format!("POST /{}", "a".repeat(4096));
        let mut r = BufReader::new(raw.as_bytes());
        let err = read_request(&mut r, LIMITS).await.unwrap_err();
        assert_eq!(err.status(), 431);

        let raw = format!("POST / HTTP/1.1\r\nX-Pad: {}", "b".repeat(4096));
        let mut r = BufReader::new(raw.as_bytes());
        let err = read_request(&mut r, LIMITS).await.unwrap_err();
        assert_eq!(err.status(), 431);
    }

    #[tokio::test]
    async fn truncated_body_is_closed() {
        let raw = "POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert!(matches!(parse(raw).await.unwrap_err(), HttpError::Closed));

        let raw = "POST / HTTP/1.1\r\nHost: x";
        assert!(matches!(parse(raw).await.unwrap_err(), HttpError::Closed));
    }

    #[test]
    fn response_carries_cors_and_length() {
        let resp = ProxyResponse {
            status: 405,
            body: Some(serde_json::json!({"error": "Method not allowed"})),
        };
        let text = String::from_utf8(encode_response(&resp)).unwrap();
        assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Content-Length: 30\r\n"));
        assert!(text.ends_with(r#"{"error":"Method not allowed"}"#));
    }
}
