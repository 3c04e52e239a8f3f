//! Ferrous Dig Domain Layer
pub mod config;
pub mod errors;
pub mod message;
pub mod rdata;
pub mod record_class;
pub mod record_type;
pub mod server_addr;

pub use config::{CliOverrides, DigConfig, EdnsConfig, LoggingConfig};
pub use errors::DnsError;
pub use message::{Header, HeaderFlags, Message, Opcode, Question, ResourceRecord, ResponseCode};
pub use rdata::{EdnsOption, OptData, RData};
pub use record_class::{class_name, RecordClass};
pub use record_type::{type_name, RecordType};
pub use server_addr::ServerAddr;
