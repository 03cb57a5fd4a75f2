//! Query Tool Adapter: Power BI access exposed as agent tools.

pub mod powerbi;
pub mod toolkit;

pub use powerbi::{BiError, ClientSecretCredential, PowerBiClient, QueryBackend, QueryResult};
pub use toolkit::{BiToolkit, ListTablesTool, QueryTool, SchemaTool};
