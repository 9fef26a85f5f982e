pub mod checksum;
pub mod commit;
pub mod deletion;
pub mod error;
pub mod line_index;
pub mod mirror;
pub mod navigation;
pub mod range_reader;
pub mod sampler;
pub mod session;
pub mod window;

pub use checksum::Checksum;
pub use commit::{CommitCheck, CommitOutcome, CommitPlan};
pub use deletion::DeletionSet;
pub use error::{CoreError, Phase, Result};
pub use line_index::LineIndex;
pub use navigation::Navigator;
pub use range_reader::RangeReader;
pub use sampler::{FixedSampler, LineSampler, SeededSampler};
pub use session::{Command, Effect, Finish, Session, SessionOptions, SessionView};
pub use window::{LineBuffer, WindowSpan, WindowView, BUFFER_CAPACITY, WINDOW_HEIGHT};

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests;
