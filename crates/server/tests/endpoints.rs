use std::sync::Arc;

use canned_server::{App, serve_connection};
use indoc::indoc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Debug)]
struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    fn content_length(&self) -> usize {
        self.header("content-length").unwrap().parse().unwrap()
    }
}

/// Writes `input` to a fresh connection and reads until the server closes it.
async fn exchange(input: &str) -> String {
    let app = Arc::new(App::new().unwrap());
    let (mut client, server) = tokio::io::duplex(64 * 1024);

    let task = tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(server);
        serve_connection(app, reader, writer, None).await;
    });

    client.write_all(input.as_bytes()).await.unwrap();
    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    task.await.unwrap();
    output
}

/// Splits raw output into responses, using `Content-Length` unless `head_only` is set.
fn parse_replies(mut output: &str, head_only: bool) -> Vec<Reply> {
    let mut replies = Vec::new();
    while !output.is_empty() {
        let (head, rest) = output.split_once("\r\n\r\n").unwrap();
        let mut lines = head.split("\r\n");
        let status = lines.next().unwrap().split(' ').nth(1).unwrap().parse().unwrap();
        let headers = lines
            .map(|line| {
                let (name, value) = line.split_once(": ").unwrap();
                (name.to_owned(), value.to_owned())
            })
            .collect();

        let mut reply = Reply { status, headers, body: String::new() };
        let body_len = if head_only { 0 } else { reply.content_length() };
        reply.body = rest[..body_len].to_owned();
        output = &rest[body_len..];
        replies.push(reply);
    }
    replies
}

async fn get(path: &str, accept: Option<&str>) -> Reply {
    let accept = accept.map(|accept| format!("Accept: {accept}\r\n")).unwrap_or_default();
    let input = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n{accept}Connection: close\r\n\r\n");
    parse_replies(&exchange(&input).await, false).pop().unwrap()
}

async fn post(path: &str, content_type: &str, body: &str) -> Reply {
    let input = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    parse_replies(&exchange(&input).await, false).pop().unwrap()
}

const JSON_CASES: [(&str, u16, &str); 9] = [
    ("/success", 200, r#"{"message":"This is a successful response"}"#),
    ("/badRequest", 400, r#"{"message":"Missing valid query parameter set to true","id":"badRequest"}"#),
    ("/badRequest?valid=true", 200, r#"{"message":"This request has the required parameters"}"#),
    ("/unauthorized", 401, r#"{"message":"Missing loggedIn query parameter set to yes","id":"unauthorized"}"#),
    ("/unauthorized?loggedIn=yes", 200, r#"{"message":"You have successfully viewed the content"}"#),
    ("/forbidden", 403, r#"{"message":"You do not have access to this content","id":"forbidden"}"#),
    ("/internal", 500, r#"{"message":"Internal server error, something went wrong.","id":"internalError"}"#),
    (
        "/notImplemented",
        501,
        r#"{"message":"A get request for this page has not been implemented yet. Check again later for updated content","id":"notImplemented"}"#,
    ),
    ("/doesnotexist", 404, r#"{"message":"The page you are looking for was not found.","id":"notFound"}"#),
];

const XML_CASES: [(&str, u16, &str); 9] = [
    ("/success", 200, "<response><message>This is a successful message</message></response>"),
    ("/badRequest", 400, "<response><message>Missing valid query parameter set to true</message><id>badRequest</id></response>"),
    ("/badRequest?valid=true", 200, "<response><message>This request has the required parameters</message></response>"),
    (
        "/unauthorized",
        401,
        "<response><message>Missing loggedIn queryParameter set to yet</message><id>unauthorized</id></response>",
    ),
    ("/unauthorized?loggedIn=yes", 200, "<response><message>You have successfully viewed the content</message></response>"),
    ("/forbidden", 403, "<response><message>You do not have access to this content</message><id>forbidden</id></response>"),
    (
        "/internal",
        500,
        "<response><message>Internal server error, something went wrong</message><id>internalError</id></response>",
    ),
    (
        "/notImplemented",
        501,
        "<response><message>A get request for this page has not been implemented yet. Check again later for updated content</message><id>notImplemented</id></response>",
    ),
    (
        "/doesnotexist",
        404,
        "<response><message>The page you are looking for was not found</message><id>notFound</id></response>",
    ),
];

#[tokio::test]
async fn json_is_the_default() {
    for (path, status, body) in JSON_CASES {
        for accept in [None, Some("application/json")] {
            let reply = get(path, accept).await;
            assert_eq!(reply.status, status, "{path}");
            assert_eq!(reply.header("content-type"), Some("application/json"), "{path}");
            assert_eq!(reply.body, body, "{path}");
            assert_eq!(reply.content_length(), body.len(), "{path}");
        }
    }
}

#[tokio::test]
async fn xml_on_request() {
    for (path, status, body) in XML_CASES {
        let reply = get(path, Some("text/xml")).await;
        assert_eq!(reply.status, status, "{path}");
        assert_eq!(reply.header("content-type"), Some("text/xml"), "{path}");
        assert_eq!(reply.body, body, "{path}");
        assert_eq!(reply.content_length(), body.len(), "{path}");
    }
}

#[tokio::test]
async fn head_has_get_headers_and_no_body() {
    for path in ["/success", "/forbidden", "/doesnotexist", "/", "/style.css"] {
        let get_reply = get(path, Some("text/xml")).await;

        let input = format!("HEAD {path} HTTP/1.1\r\nAccept: text/xml\r\nConnection: close\r\n\r\n");
        let output = exchange(&input).await;
        let head_reply = parse_replies(&output, true).pop().unwrap();

        assert_eq!(head_reply.status, get_reply.status, "{path}");
        assert_eq!(head_reply.headers, get_reply.headers, "{path}");
        assert!(output.ends_with("\r\n\r\n"), "{path}");
    }
}

#[tokio::test]
async fn static_assets() {
    let index = get("/", None).await;
    assert_eq!(index.status, 200);
    assert_eq!(index.header("content-type"), Some("text/html"));
    assert!(index.body.contains("/style.css"));

    let stylesheet = get("/style.css", None).await;
    assert_eq!(stylesheet.status, 200);
    assert_eq!(stylesheet.header("content-type"), Some("text/css"));
    assert_eq!(stylesheet.content_length(), stylesheet.body.len());
}

#[tokio::test]
async fn post_json_runs_the_handler() {
    let reply = post("/success", "application/json", r#"{"a":1}"#).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"message":"This is a successful response"}"#);

    let reply = post("/badRequest?valid=true", "application/json; charset=utf-8", "[1,2,3]").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"message":"This request has the required parameters"}"#);

    let reply = post("/badRequest", "application/x-www-form-urlencoded", "valid=true").await;
    assert_eq!(reply.status, 400, "the flag comes from the query string, not the body");
}

#[tokio::test]
async fn post_with_unsupported_content_type() {
    let reply = post("/success", "text/plain", "hello").await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.header("content-type"), Some("application/json"));
    assert_eq!(reply.body, r#"{"error":"invalid data format"}"#);
}

#[tokio::test]
async fn post_with_malformed_json() {
    let reply = post("/success", "application/json", "{\"a\":").await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, r#"{"error":"malformed request body"}"#);
}

#[tokio::test]
async fn chunked_post_is_reassembled() {
    let input = concat!(
        "POST /forbidden HTTP/1.1\r\n",
        "Content-Type: application/json\r\n",
        "Transfer-Encoding: chunked\r\n",
        "Accept: text/xml\r\n",
        "Connection: close\r\n",
        "\r\n",
        "4\r\n{\"a\"\r\n",
        "3\r\n:[1\r\n",
        "2\r\n]}\r\n",
        "0\r\n\r\n",
    );
    let reply = parse_replies(&exchange(input).await, false).pop().unwrap();

    assert_eq!(reply.status, 403);
    assert_eq!(reply.body, "<response><message>You do not have access to this content</message><id>forbidden</id></response>");
}

#[tokio::test]
async fn keep_alive_until_close() {
    let input = indoc! {"
        GET /success HTTP/1.1
        Host: localhost

        GET /notImplemented HTTP/1.1
        Host: localhost
        Accept: text/xml

        GET /badRequest?valid=1 HTTP/1.1
        Host: localhost
        Connection: close

    "};
    let replies = parse_replies(&exchange(input).await, false);

    let statuses: Vec<u16> = replies.iter().map(|reply| reply.status).collect();
    assert_eq!(statuses, [200, 501, 200]);
    assert_eq!(replies[1].header("content-type"), Some("text/xml"));
}

#[tokio::test]
async fn truncated_body_gets_bad_request_and_closes() {
    let app = Arc::new(App::new().unwrap());
    let (mut client, server) = tokio::io::duplex(64 * 1024);

    let task = tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(server);
        serve_connection(app, reader, writer, None).await;
    });

    client.write_all(b"POST /success HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 20\r\n\r\n{\"a\"").await.unwrap();
    client.shutdown().await.unwrap();

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    task.await.unwrap();

    let reply = parse_replies(&output, false).pop().unwrap();
    assert_eq!(reply.status, 400);
    assert!(reply.body.is_empty());
}
