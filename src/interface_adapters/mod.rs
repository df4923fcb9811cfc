// Interface adapters: wire protocol, HTTP/WebSocket handlers and outbound clients.

pub mod clients;
pub mod http;
pub mod net;
pub mod protocol;
pub mod routes;
pub mod state;
