//! CI build matrix driver.
//!
//! Expands the recipe in `qtforge.toml` against the host platform and
//! the CI environment: which compiler versions, architectures, build
//! types, and (on macOS) deployment targets to build, which channel the
//! result publishes to, and which remotes receive it.
//!
//! The matrix runs on the platforms the project ships from, Windows and
//! macOS. Linux builds go through the recipe layer directly.

pub mod channel;
pub mod env;
pub mod error;
pub mod plan;
pub mod remotes;

pub use channel::{effective_channel, resolve_channel, Channel};
pub use env::{vars, CiEnv};
pub use error::{MatrixError, MatrixResult};
pub use plan::{BuildPlan, BuildVariant, PlanConfig};
pub use remotes::{masked_command_line, upload_steps, Credentials, Remote};
