//! Minimal HTTP/1.1 adapter for the notebook gateway.
//!
//! # Responsibility
//! - Parse one request from a byte stream and dispatch it to the
//!   collection service.
//! - Map store and payload failures to HTTP status codes.
//!
//! # Invariants
//! - One request per connection; every response carries `Connection: close`.
//! - Request handling is generic over `BufRead`/`Write` so dispatch is
//!   testable with in-memory buffers.

use cellpad_core::{Cell, Collection, CollectionStore, NotebookService};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Instant;

/// One parsed HTTP request.
struct Request {
    method: String,
    path: String,
    body: Vec<u8>,
}

/// Write request body for `POST /cells`.
#[derive(Debug, Deserialize)]
struct ReplaceRequest {
    cells: Vec<Cell>,
}

struct Response {
    status: u16,
    reason: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn json(status: u16, reason: &'static str, body: Vec<u8>) -> Self {
        Self {
            status,
            reason,
            body,
        }
    }

    fn error(status: u16, reason: &'static str, message: &str) -> Self {
        Self::json(status, reason, json!({ "error": message }).to_string().into_bytes())
    }
}

/// Serves all requests arriving on one accepted TCP connection.
pub fn handle_stream<S: CollectionStore>(service: &NotebookService<S>, stream: TcpStream) {
    let mut reader = BufReader::new(&stream);
    let mut writer = &stream;
    if let Err(message) = serve_connection(service, &mut reader, &mut writer) {
        warn!("event=http_connection module=http status=error error={message}");
    }
}

/// Reads one request, dispatches it, and writes the response.
///
/// Returns `Ok(())` when the peer closed the connection before sending a
/// request line.
fn serve_connection<S, R, W>(
    service: &NotebookService<S>,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), String>
where
    S: CollectionStore,
    R: BufRead,
    W: Write,
{
    let started_at = Instant::now();
    let response = match read_request(reader) {
        Ok(None) => return Ok(()),
        Ok(Some(request)) => {
            let response = handle_request(service, &request);
            info!(
                "event=http_request module=http method={} path={} status={} duration_ms={}",
                request.method,
                request.path,
                response.status,
                started_at.elapsed().as_millis()
            );
            response
        }
        Err(message) => {
            warn!("event=http_request module=http status=400 error={message}");
            Response::error(400, "Bad Request", &message)
        }
    };
    write_response(writer, &response).map_err(|err| format!("could not write response: {err}"))
}

fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Request>, String> {
    let mut line = String::new();
    let bytes_read = reader
        .read_line(&mut line)
        .map_err(|err| format!("could not read request line: {err}"))?;
    if bytes_read == 0 {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version)) if version.starts_with("HTTP/") => {
            (method.to_string(), target.to_string())
        }
        _ => return Err(format!("malformed request line `{}`", line.trim_end())),
    };

    let mut content_length: usize = 0;
    loop {
        let mut header = String::new();
        let bytes_read = reader
            .read_line(&mut header)
            .map_err(|err| format!("could not read header line: {err}"))?;
        if bytes_read == 0 {
            return Err("unexpected EOF while reading headers".to_string());
        }
        let trimmed = header.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|err| format!("invalid Content-Length `{}`: {err}", value.trim()))?;
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader
        .read_exact(&mut body)
        .map_err(|err| format!("could not read request body: {err}"))?;

    // Query strings are irrelevant to routing here.
    let path = target
        .split('?')
        .next()
        .unwrap_or(target.as_str())
        .to_string();

    Ok(Some(Request { method, path, body }))
}

fn handle_request<S: CollectionStore>(service: &NotebookService<S>, request: &Request) -> Response {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/cells") => fetch_cells(service),
        ("POST", "/cells") => replace_cells(service, &request.body),
        (_, "/cells") => Response::error(405, "Method Not Allowed", "use GET or POST"),
        _ => Response::error(404, "Not Found", "not found"),
    }
}

fn fetch_cells<S: CollectionStore>(service: &NotebookService<S>) -> Response {
    let collection = match service.fetch_all() {
        Ok(collection) => collection,
        Err(err) => return Response::error(500, "Internal Server Error", &err.to_string()),
    };
    match serde_json::to_vec(&collection.to_cells()) {
        Ok(body) => Response::json(200, "OK", body),
        Err(err) => Response::error(500, "Internal Server Error", &err.to_string()),
    }
}

fn replace_cells<S: CollectionStore>(service: &NotebookService<S>, body: &[u8]) -> Response {
    let request: ReplaceRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => return Response::error(400, "Bad Request", &err.to_string()),
    };
    let collection = match Collection::from_cells(request.cells) {
        Ok(collection) => collection,
        Err(err) => return Response::error(400, "Bad Request", &err.to_string()),
    };
    match service.replace_all(&collection) {
        Ok(()) => Response::json(200, "OK", json!({ "status": "ok" }).to_string().into_bytes()),
        Err(err) => Response::error(500, "Internal Server Error", &err.to_string()),
    }
}

fn write_response<W: Write>(writer: &mut W, response: &Response) -> std::io::Result<()> {
    write!(
        writer,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.reason,
        response.body.len()
    )?;
    writer.write_all(&response.body)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::serve_connection;
    use cellpad_core::{seed_cells, Cell, CellType, FileCollectionStore, NotebookService};
    use serde_json::Value;
    use std::io::Cursor;
    use tempfile::{tempdir, TempDir};

    fn service_in(dir: &TempDir) -> NotebookService<FileCollectionStore> {
        NotebookService::new(FileCollectionStore::new(dir.path(), "notebook.json"))
    }

    fn raw_request(method: &str, path: &str, body: Option<&str>) -> Vec<u8> {
        let body = body.unwrap_or_default();
        format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
        .into_bytes()
    }

    fn run(service: &NotebookService<FileCollectionStore>, request: Vec<u8>) -> (String, Value) {
        let mut reader = Cursor::new(request);
        let mut writer = Vec::<u8>::new();
        serve_connection(service, &mut reader, &mut writer).expect("serve connection");

        let output = String::from_utf8(writer).expect("utf8 response");
        let (head, body) = output.split_once("\r\n\r\n").expect("header/body split");
        let status_line = head.lines().next().expect("status line").to_string();
        let body = serde_json::from_str(body).expect("json body");
        (status_line, body)
    }

    #[test]
    fn get_on_missing_file_returns_seed_array() {
        let dir = tempdir().unwrap();
        let (status, body) = run(&service_in(&dir), raw_request("GET", "/cells", None));

        assert_eq!(status, "HTTP/1.1 200 OK");
        let expected = serde_json::to_value(seed_cells()).unwrap();
        assert_eq!(body, expected);
    }

    #[test]
    fn post_then_get_round_trips_the_cells() {
        let dir = tempdir().unwrap();
        let service = service_in(&dir);
        let payload = r##"{"cells":[{"id":"a","type":"text","content":"# hi"},{"id":"b","type":"code","content":"show(2);"}]}"##;

        let (status, body) = run(&service, raw_request("POST", "/cells", Some(payload)));
        assert_eq!(status, "HTTP/1.1 200 OK");
        assert_eq!(body, serde_json::json!({ "status": "ok" }));

        let (status, body) = run(&service, raw_request("GET", "/cells", None));
        assert_eq!(status, "HTTP/1.1 200 OK");
        let cells: Vec<Cell> = serde_json::from_value(body).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].id, "a");
        assert_eq!(cells[1].kind, CellType::Code);
    }

    #[test]
    fn unknown_path_returns_404() {
        let dir = tempdir().unwrap();
        let (status, body) = run(&service_in(&dir), raw_request("GET", "/bundles", None));
        assert_eq!(status, "HTTP/1.1 404 Not Found");
        assert!(body.get("error").is_some());
    }

    #[test]
    fn wrong_method_on_cells_returns_405() {
        let dir = tempdir().unwrap();
        let (status, _) = run(&service_in(&dir), raw_request("DELETE", "/cells", None));
        assert_eq!(status, "HTTP/1.1 405 Method Not Allowed");
    }

    #[test]
    fn malformed_post_body_returns_400() {
        let dir = tempdir().unwrap();
        let (status, body) = run(
            &service_in(&dir),
            raw_request("POST", "/cells", Some("{ not json")),
        );
        assert_eq!(status, "HTTP/1.1 400 Bad Request");
        assert!(body.get("error").is_some());
    }

    #[test]
    fn duplicate_cell_ids_in_post_return_400() {
        let dir = tempdir().unwrap();
        let payload = r#"{"cells":[{"id":"a","type":"text","content":""},{"id":"a","type":"text","content":""}]}"#;
        let (status, body) = run(&service_in(&dir), raw_request("POST", "/cells", Some(payload)));
        assert_eq!(status, "HTTP/1.1 400 Bad Request");
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("duplicate"));
    }

    #[test]
    fn get_over_corrupt_file_returns_500_and_preserves_the_file() {
        let dir = tempdir().unwrap();
        let service = service_in(&dir);
        let path = dir.path().join("notebook.json");
        std::fs::write(&path, "{ corrupt").unwrap();

        let (status, body) = run(&service, raw_request("GET", "/cells", None));
        assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
        assert!(body.get("error").is_some());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ corrupt");
    }

    #[test]
    fn malformed_request_line_returns_400() {
        let dir = tempdir().unwrap();
        let mut reader = Cursor::new(b"nonsense\r\n\r\n".to_vec());
        let mut writer = Vec::<u8>::new();
        serve_connection(&service_in(&dir), &mut reader, &mut writer).expect("serve connection");

        let output = String::from_utf8(writer).unwrap();
        assert!(output.starts_with("HTTP/1.1 400 Bad Request"));
    }

    #[test]
    fn query_string_is_ignored_for_routing() {
        let dir = tempdir().unwrap();
        let (status, _) = run(&service_in(&dir), raw_request("GET", "/cells?ts=1", None));
        assert_eq!(status, "HTTP/1.1 200 OK");
    }
}
