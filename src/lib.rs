pub mod error;
pub mod framing;
pub mod io_stream;
pub mod codec;
pub mod bulk;
pub mod dispatch;
pub mod staging;
pub mod collections;
pub mod packer;
pub mod perf;

pub use error::{HeaderKind, PackError, Result};
pub use codec::{Blittable, Formatter, FormatterRegistry, RawFormatter, RawLayout};
pub use collections::{ReadOnlyCollection, Stack};
pub use io_stream::{Reader, Writer};
pub use packer::{PackOptions, Packer};
pub use staging::{StagingPool, StagingStats};
