use crate::plugins::Plugins;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl Method {
    pub fn from_string(s: &str) -> Method {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "CONNECT" => Method::CONNECT,
            "OPTIONS" => Method::OPTIONS,
            "TRACE" => Method::TRACE,
            "PATCH" => Method::PATCH,
            _ => Method::GET,
        }
    }
}

#[derive(Debug)]
pub struct Body {
    pub(crate) content_type: String,
    pub(crate) data: Vec<u8>,
}

impl Body {
    pub fn new() -> Body {
        Body {
            content_type: String::new(),
            data: Vec::new(),
        }
    }

    pub fn from_string(s: &str) -> Body {
        Body {
            content_type: "text/plain".to_string(),
            data: s.as_bytes().to_vec(),
        }
    }

    pub fn from_bytes(b: Vec<u8>) -> Body {
        Body {
            content_type: "application/octet-stream".to_string(),
            data: b,
        }
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn json<T>(&self) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.content_type == "application/json" {
            serde_json::from_slice(&self.data).ok()
        } else {
            None
        }
    }

    pub fn x_www_form_urlencoded<T>(&self) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.content_type == "application/x-www-form-urlencoded" {
            serde_json::from_value(Self::parse_urlencoded(&self.data)?).ok()
        } else {
            None
        }
    }

    fn parse_urlencoded(data: &[u8]) -> Option<Value> {
        let data_str = String::from_utf8_lossy(data);
        let mut json = Map::new();

        for pair in data_str.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = pair.split_once('=')?;
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            json.insert(key, Value::String(value));
        }

        Some(Value::Object(json))
    }
}

impl Default for Body {
    fn default() -> Body {
        Body::new()
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Body {
        Body::from_bytes(b)
    }
}

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub data: HashMap<String, Value>,
    pub body: Body,
    pub plugins: Plugins,
}

impl Request {
    /// Builds a request from a method and a request target such as
    /// `/users/42?page=2`. The path is normalized the same way route
    /// registration normalizes it (trailing slashes trimmed), so dispatch
    /// lookups and registered paths always agree.
    pub fn new(method: Method, target: &str) -> Request {
        let mut parts = target.split('?');
        let path = parts.next().unwrap_or("/").trim_end_matches('/').to_string();
        let path = if path.is_empty() { "/".to_string() } else { path };
        let query = parts.next().map(Self::parse_query).unwrap_or_default();

        Request {
            method,
            path,
            query,
            params: HashMap::new(),
            headers: HashMap::new(),
            data: HashMap::new(),
            body: Body::new(),
            plugins: Plugins::new(),
        }
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    pub fn get_method(&self) -> &Method {
        &self.method
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set_data<T>(&mut self, key: &str, value: T)
    where
        T: serde::Serialize,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), value);
        }
    }

    pub fn get_typed_data<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.to_owned()).ok())
    }

    fn parse_query(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|s| !s.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.split('=');
                Some((
                    parts.next()?.to_string(),
                    parts.next().unwrap_or("").to_string(),
                ))
            })
            .collect()
    }
}
