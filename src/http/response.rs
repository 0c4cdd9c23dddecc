use crate::error::ServerError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl Response {
    pub fn new(status: u16) -> Response {
        Response {
            status,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    // Chainable status setter
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    // Generic body setter
    pub fn body<T: AsRef<str>>(&mut self, body: T) -> &mut Self {
        self.body = body.as_ref().to_string();
        self
    }

    // Generic header setter
    pub fn header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.headers
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    // Set multiple headers at once
    pub fn headers(&mut self, headers: HashMap<String, String>) -> &mut Self {
        self.headers.extend(headers);
        self
    }

    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, ServerError> {
        let json_string = serde_json::to_string(value)
            .map_err(|e| ServerError::InternalError(format!("JSON serialization error: {}", e)))?;
        self.header("Content-Type", "application/json");
        self.body(json_string);
        Ok(self)
    }

    // Static constructors for common responses
    pub fn ok<T: Serialize>(data: &T) -> Result<Response, ServerError> {
        let mut response = Response::new(200);
        response.json(data)?;
        Ok(response)
    }

    pub fn no_content() -> Response {
        Response::new(204)
    }

    pub fn error(err: ServerError) -> Response {
        let status = err.status_code();
        let error_message = err.to_string();
        let mut response = Response::new(status);
        response
            .json(&serde_json::json!({
                "error": {
                    "message": error_message,
                    "status": status
                }
            }))
            .expect("Error creating JSON response");
        response
    }

    pub fn text<T: AsRef<str>>(content: T) -> Response {
        let mut response = Response::new(200);
        response.header("Content-Type", "text/plain").body(content);
        response
    }

    pub fn html<T: AsRef<str>>(content: T) -> Response {
        let mut response = Response::new(200);
        response.header("Content-Type", "text/html").body(content);
        response
    }

    pub fn redirect(location: &str) -> Response {
        Response::redirect_status(302, location)
    }

    pub fn permanent_redirect(location: &str) -> Response {
        Response::redirect_status(301, location)
    }

    pub fn redirect_status(status: u16, location: &str) -> Response {
        let mut response = Response::new(status);
        response.header("Location", location);
        response
    }
}

#[macro_export]
macro_rules! ok_json {
    ($($json:tt)+) => {{
        let mut response = $crate::http::Response::new(200);
        response.json(&$crate::json!($($json)+)).expect("Error creating JSON response");
        Ok(response)
    }};
}
