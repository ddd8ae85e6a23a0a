mod crypto;

use std::io::Read;

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tiny_http::{Method, Response, Server, StatusCode};

use crate::logging::LOG_TARGET;
use crypto::Key;

#[derive(Deserialize)]
struct EncryptRequest {
    plaintext_b64: String,
}

#[derive(Serialize)]
struct EncryptResponse {
    alg: &'static str,
    ciphertext_b64: String,
}

#[derive(Deserialize)]
struct ValidateRequest {
    ciphertext_b64: String,
}

#[derive(Serialize)]
struct ValidateResponse {
    valid: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

const ALG: &str = "AES-128-CBC";

/// Runs the reference oracle service until the process is killed. One
/// fixed key for the process lifetime; every request is handled
/// synchronously on the calling thread, matching `tiny_http`'s blocking
/// request iterator -- there's no concurrency to reason about because
/// there's nothing here worth parallelizing.
pub fn run(bind: &str) -> Result<()> {
    let key = Key::random();
    let server = Server::http(bind).map_err(|e| anyhow::anyhow!("Failed to bind `{}`: {}", bind, e))?;
    info!(target: LOG_TARGET, "demo_api listening on {}", bind);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let result = match (&method, url.as_str()) {
            (Method::Post, "/encrypt") => handle_encrypt(&mut request, &key),
            (Method::Post, "/validate") => handle_validate(&mut request, &key),
            _ => Err((StatusCode(404), format!("No such route: {} {}", method, url))),
        };

        let response = match result {
            Ok(body) => Response::from_string(body).with_status_code(StatusCode(200)),
            Err((status, detail)) => {
                warn!(target: LOG_TARGET, "{} {} -> {}: {}", method, url, status.0, detail);
                let body = serde_json::to_string(&ErrorResponse { detail }).unwrap_or_default();
                Response::from_string(body).with_status_code(status)
            }
        };

        if let Err(e) = request.respond(response) {
            error!(target: LOG_TARGET, "Failed to write response: {}", e);
        }
    }

    Ok(())
}

fn read_body(request: &mut tiny_http::Request) -> Result<String, (StatusCode, String)> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| (StatusCode(400), format!("Failed to read request body: {}", e)))?;
    Ok(body)
}

fn handle_encrypt(request: &mut tiny_http::Request, key: &Key) -> Result<String, (StatusCode, String)> {
    let body = read_body(request)?;
    let req: EncryptRequest = serde_json::from_str(&body)
        .map_err(|e| (StatusCode(400), format!("Malformed request: {}", e)))?;

    let plaintext = base64::decode(&req.plaintext_b64)
        .map_err(|e| (StatusCode(400), format!("Encryption error: invalid base64: {}", e)))?;

    let ciphertext = key.encrypt(&plaintext);
    let response = EncryptResponse {
        alg: ALG,
        ciphertext_b64: base64::encode(&ciphertext),
    };
    serde_json::to_string(&response).map_err(|e| (StatusCode(500), e.to_string()))
}

/// The endpoint that's vulnerable to the padding-oracle attack: the status
/// code itself *is* the oracle (200 valid padding, 400 invalid), so a web
/// client never even has to parse the body to drive the attack.
fn handle_validate(request: &mut tiny_http::Request, key: &Key) -> Result<String, (StatusCode, String)> {
    let body = read_body(request)?;
    let req: ValidateRequest = serde_json::from_str(&body)
        .map_err(|e| (StatusCode(400), format!("Malformed request: {}", e)))?;

    let ciphertext = base64::decode(&req.ciphertext_b64)
        .map_err(|e| (StatusCode(400), format!("Invalid base64: {}", e)))?;

    let valid = key
        .validate(&ciphertext)
        .map_err(|e| (StatusCode(400), e.to_string()))?;

    if valid {
        serde_json::to_string(&ValidateResponse { valid: true }).map_err(|e| (StatusCode(500), e.to_string()))
    } else {
        Err((StatusCode(400), "Invalid PKCS#7 padding".to_string()))
    }
}
