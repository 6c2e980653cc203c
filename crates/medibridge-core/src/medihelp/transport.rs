//! Blocking libcurl transport. Runs in the current thread; call from
//! `spawn_blocking` if used from async code.

use std::str;
use std::time::Duration;

use super::response::UpstreamResponse;

#[derive(Debug, Clone)]
pub(crate) enum Method {
    Get,
    /// PUT with an empty body.
    Put,
    PostJson(Vec<u8>),
}

/// Transport-level failure, with whatever body bytes arrived before it.
#[derive(Debug)]
pub(crate) struct TransportFailure {
    pub error: curl::Error,
    pub partial_body: Vec<u8>,
}

impl From<curl::Error> for TransportFailure {
    fn from(error: curl::Error) -> Self {
        Self {
            error,
            partial_body: Vec::new(),
        }
    }
}

impl TransportFailure {
    /// Partial body if any arrived, else the curl error text.
    pub fn detail(&self) -> String {
        let partial = String::from_utf8_lossy(&self.partial_body);
        if partial.trim().is_empty() {
            self.error.to_string()
        } else {
            partial.into_owned()
        }
    }
}

pub(crate) fn perform(
    method: &Method,
    url: &str,
    timeout: Duration,
) -> Result<UpstreamResponse, TransportFailure> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(5)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    match method {
        Method::Get => {
            easy.get(true)?;
        }
        Method::Put => {
            easy.custom_request("PUT")?;
            list.append("Content-Length: 0")?;
        }
        Method::PostJson(payload) => {
            easy.post(true)?;
            easy.post_fields_copy(payload)?;
            list.append("Content-Type: application/json")?;
            list.append("Expect:")?;
        }
    }
    easy.http_headers(list)?;

    let outcome = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()
    };

    if let Err(error) = outcome {
        return Err(TransportFailure {
            error,
            partial_body: body,
        });
    }

    let status = easy.response_code()?;
    Ok(UpstreamResponse {
        status,
        content_type: content_type(&header_lines),
        body,
    })
}

/// `Content-Type` of the last response block (redirect hops each start a new block).
fn content_type(lines: &[String]) -> Option<String> {
    let mut found = None;
    for line in lines {
        if line.starts_with("HTTP/") {
            found = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                found = Some(value.trim().to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_last_block() {
        let lines = [
            "HTTP/1.1 302 Found".to_string(),
            "Content-Type: text/html".to_string(),
            "Location: /x".to_string(),
            String::new(),
            "HTTP/1.1 200 OK".to_string(),
            "content-type: application/json; charset=utf-8".to_string(),
        ];
        assert_eq!(
            content_type(&lines).as_deref(),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn content_type_missing() {
        let lines = ["HTTP/1.1 200 OK".to_string(), "Content-Length: 2".to_string()];
        assert_eq!(content_type(&lines), None);
    }

    #[test]
    fn failure_detail_prefers_partial_body() {
        let with_body = TransportFailure {
            error: curl::Error::new(28),
            partial_body: b"{\"error\": \"half".to_vec(),
        };
        assert_eq!(with_body.detail(), "{\"error\": \"half");
        let without = TransportFailure::from(curl::Error::new(28));
        assert!(!without.detail().is_empty());
    }
}
