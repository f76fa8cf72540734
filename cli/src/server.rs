//! HTTP front end: the editor page on `GET`, completions on `POST /gofill`.

use crate::clamp_offset;
use crate::error::CliError;
use crate::error::Result;
use gofill_core::QueryEngine;
use std::io::Read;
use std::sync::Arc;
use tiny_http::Header;
use tiny_http::Method;
use tiny_http::Response;
use tiny_http::Server;
use tracing::debug;
use tracing::info;
use tracing::warn;

const EDITOR_PAGE: &str = include_str!("../static/editor.html");

/// Path completion requests are posted to.
pub const COMPLETION_PATH: &str = "/gofill";

/// A response before it is handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionHandler {
    engine: Arc<QueryEngine>,
}

impl CompletionHandler {
    pub const fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    /// Route one request. `body` is the raw form-encoded request body.
    pub fn handle(&self, method: &Method, url: &str, body: &[u8]) -> Reply {
        match method {
            Method::Get => Reply::html(EDITOR_PAGE),
            Method::Post => {
                let path = url.split('?').next().unwrap_or(url);
                if path != COMPLETION_PATH {
                    return Reply::error(404, format!("no handler for {path}"));
                }
                self.complete(body)
            }
            _ => Reply::error(405, "GET or POST only"),
        }
    }

    fn complete(&self, body: &[u8]) -> Reply {
        let mut src = String::new();
        let mut offset = None;
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "src" => src = value.into_owned(),
                "offset" => offset = Some(value.into_owned()),
                _ => {}
            }
        }

        let offset = match offset.as_deref().map(str::parse::<usize>) {
            Some(Ok(offset)) => clamp_offset(&src, offset),
            Some(Err(err)) => return Reply::error(400, format!("offset: {err}")),
            None => return Reply::error(400, "offset: missing"),
        };

        let result = self.engine.query(&src, offset);
        debug!(offset, suggestions = result.suggestions.len(), "completion request");
        match result.to_json() {
            Ok(json) => Reply::json(json),
            Err(err) => Reply::error(500, err.to_string()),
        }
    }
}

/// Serve requests on `addr` until the process exits.
pub fn serve(addr: &str, handler: &CompletionHandler) -> Result<()> {
    let server = Server::http(addr).map_err(|err| CliError::Listen {
        addr: addr.to_string(),
        message: err.to_string(),
    })?;
    info!("gofill service listening on http://{addr}");

    for mut request in server.incoming_requests() {
        let mut body = Vec::new();
        if let Err(err) = request.as_reader().read_to_end(&mut body) {
            warn!("failed to read request body: {err}");
            continue;
        }

        let reply = handler.handle(request.method(), request.url(), &body);
        let mut response = Response::from_string(reply.body).with_status_code(reply.status);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        {
            response = response.with_header(header);
        }

        if let Err(err) = request.respond(response) {
            warn!("failed to send response: {err}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofill_core::Indexer;
    use gofill_core::IndexerConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn handler() -> CompletionHandler {
        let dir = TempDir::new().unwrap();
        let fmt = dir.path().join("fmt");
        std::fs::create_dir(&fmt).unwrap();
        std::fs::write(
            fmt.join("print.go"),
            "package fmt\n\n// Println prints a line.\nfunc Println() {}\n\nfunc Printf() {}\n",
        )
        .unwrap();

        let catalog = Indexer::new(IndexerConfig::default()).build(dir.path());
        CompletionHandler::new(Arc::new(QueryEngine::new(Arc::new(catalog))))
    }

    fn form(src: &str, offset: &str) -> Vec<u8> {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("src", src)
            .append_pair("offset", offset)
            .finish()
            .into_bytes()
    }

    #[test]
    fn test_get_serves_editor() {
        let reply = handler().handle(&Method::Get, "/", b"");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(reply.body.contains(COMPLETION_PATH));
    }

    #[test]
    fn test_post_returns_suggestions() {
        let src = "package main\n\nfunc main() { fmt. }\n";
        let offset = src.find(". }").unwrap() + 1;
        let body = form(src, &offset.to_string());
        let reply = handler().handle(&Method::Post, COMPLETION_PATH, &body);

        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        let names: Vec<&str> = value["suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Printf", "Println"]);
        assert_eq!(value["suggestions"][1]["doc"], "Println prints a line.\n");
        assert_eq!(value["suggestions"][0]["range"]["start"], offset);
    }

    #[test]
    fn test_post_clamps_offset() {
        let body = form("package main\n", "999");
        let reply = handler().handle(&Method::Post, COMPLETION_PATH, &body);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "{}");
    }

    #[test]
    fn test_post_rejects_bad_offset() {
        let reply = handler().handle(&Method::Post, COMPLETION_PATH, &form("x", "abc"));
        assert_eq!(reply.status, 400);
        assert!(reply.body.starts_with("offset:"));

        let reply = handler().handle(&Method::Post, COMPLETION_PATH, b"src=x");
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_routing() {
        let handler = handler();
        assert_eq!(handler.handle(&Method::Put, COMPLETION_PATH, b"").status, 405);
        assert_eq!(handler.handle(&Method::Post, "/elsewhere", b"").status, 404);
        assert_eq!(
            handler
                .handle(&Method::Post, "/gofill?x=1", &form("", "0"))
                .status,
            200
        );
    }
}
