//! A local stand-in for a panel's `player_api.php`, for unit tests.
#![allow(clippy::unwrap_used)]

use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::client::{REQUEST_TIMEOUT, USER_AGENT, XtreamClient};
use crate::config::Credentials;

/// `(action, status line, body)`.
pub type Route = (&'static str, &'static str, &'static str);

/// Answers each request with the route whose action matches the request's
/// `action=` parameter, or 404 when none does.
pub struct MockPanel {
    pub address: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockPanel {
    pub fn start(routes: &[Route]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = routes.to_vec();
        let seen = Arc::clone(&requests);
        // Never joined; it dies with the test process
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                respond(stream, &routes, &seen);
            }
        });
        Self { address, requests }
    }

    /// Request heads received so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// A client for this panel that bypasses any proxy from the environment.
    pub fn client(&self) -> XtreamClient {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()
            .unwrap();
        XtreamClient::with_http(Credentials::new(&self.address, "alice", "s3cr&t"), http)
            .unwrap()
    }
}

fn respond(mut stream: TcpStream, routes: &[Route], seen: &Mutex<Vec<String>>) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&request).into_owned();
    let action = action_of(&head);
    seen.lock().unwrap().push(head);

    let (status, body) = routes
        .iter()
        .find(|(name, _, _)| Some(*name) == action.as_deref())
        .map_or(("HTTP/1.1 404 Not Found", "{}"), |(_, status, body)| {
            (*status, *body)
        });
    let response = format!(
        "{status}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}

fn action_of(head: &str) -> Option<String> {
    let target = head.lines().next()?.split(' ').nth(1)?;
    let query = target.split_once('?')?.1;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("action="))
        .map(str::to_string)
}
