//! Route definitions forwarded unchanged to every instance of a selection

use crate::DefinitionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP method a route answers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(DefinitionError::UnknownMethod(s.to_string())),
        }
    }
}

/// Request as seen by a route handler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Reply produced by a route handler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    /// 200 reply with a plain text body
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    /// 200 reply with a JSON body
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn not_found(path: &str) -> Self {
        Self::text(format!("Not Found: {}\n", path)).with_status(404)
    }
}

/// Route handler shared by every instance the route is forwarded to
pub type Handler = Arc<dyn Fn(&Request) -> Reply + Send + Sync>;

/// A route definition: method, path and handler
#[derive(Clone)]
pub struct RouteDefinition {
    pub method: Method,
    pub path: String,
    pub handler: Handler,
}

impl RouteDefinition {
    pub fn new<F>(method: Method, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        Self {
            method,
            path: path.into(),
            handler: Arc::new(handler),
        }
    }

    /// GET route shorthand
    pub fn get<F>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        Self::new(Method::Get, path, handler)
    }

    /// Route answering every request with a fixed text body
    pub fn text(method: Method, path: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(method, path, move |_| Reply::text(body.clone()))
    }

    /// Check the definition before it is forwarded anywhere
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if !self.path.starts_with('/') || self.path.chars().any(char::is_whitespace) {
            return Err(DefinitionError::InvalidPath(self.path.clone()));
        }
        Ok(())
    }

    /// Invoke the handler
    pub fn handle(&self, request: &Request) -> Reply {
        (self.handler)(request)
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn test_route_validation() {
        assert!(RouteDefinition::text(Method::Get, "/all", "all").validate().is_ok());
        assert_eq!(
            RouteDefinition::text(Method::Get, "all", "all").validate(),
            Err(DefinitionError::InvalidPath("all".to_string()))
        );
        assert!(RouteDefinition::text(Method::Get, "/a b", "x").validate().is_err());
    }

    #[test]
    fn test_handler_invocation() {
        let route = RouteDefinition::get("/echo", |req| Reply::text(req.path.clone()));
        let reply = route.handle(&Request::new(Method::Get, "/echo"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "/echo");
    }

    #[test]
    fn test_reply_not_found() {
        let reply = Reply::not_found("/missing");
        assert_eq!(reply.status, 404);
        assert!(reply.body.contains("/missing"));
    }
}
