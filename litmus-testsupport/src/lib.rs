//! Support for writing tests: the identity of the running test, directory and
//! data file resolution, lifecycle tracing and a persistent index of test
//! runs. The matchers of [`litmus_matchers`] are re-exported as [`matchers`].

pub mod config;
mod data;
mod error;
pub mod events;
pub mod index;
mod info;
mod support;
mod trace_categories;
mod tracer;
mod util;

pub use config::SupportConfig;
pub use data::TestData;
pub use error::Error;
pub use index::{IndexedTest, TestIndex, relative_path};
pub use info::TestInfo;
pub use support::TestSupport;
pub use tracer::{TestTracer, TraceGuard};
pub use util::TestUtil;

pub use litmus_matchers as matchers;
