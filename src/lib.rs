//! Single-endpoint HTTP calculator.
//!
//! `POST /` with form field `query={"op":"+","ops":[1,2,3]}` answers
//! `{"result":6}`; any failure answers `{"result":null}`, always with
//! status 200.

pub mod calc;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
