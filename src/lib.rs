//! how - ask your terminal how to do something.
//!
//! A natural-language question goes in, a directly executable shell command
//! comes out. The pipeline for one invocation is:
//!
//! 1. [`context`] - snapshot OS, shell, working directory, files and tools
//! 2. [`credentials`] - resolve the API key (environment, key file, prompt)
//! 3. [`prompt`] - render context and question into the request payload
//! 4. [`completion`] - one remote call, with the [`spinner`] running meanwhile
//! 5. [`sanitize`] - strip code fences and stray comment markers
//! 6. [`render`] - print instantly or typed out, then copy to the clipboard
//! 7. [`history`] - append the question and command lines to the log
//!
//! [`pipeline`] wires these together; [`config`] holds the paths and model
//! settings every stage reads, and [`error`] is the shared failure type.
//!
//! The generated command is only printed and copied. It is never executed.
//!
//! # Example
//!
//! ```ignore
//! use how_cli::config::Config;
//! use how_cli::pipeline::{Options, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::new(&config, Options::default());
//!     let output = pipeline.run("show disk usage of this directory").await?;
//!     assert!(!output.is_empty());
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod history;
pub mod http_client;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod render;
pub mod sanitize;
pub mod spinner;
