pub mod axis;
pub mod codec;
pub mod compositor;
pub mod debug;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod reconcile;
pub mod rect;
pub mod timeline;

pub use axis::Axis;
pub use compositor::{CrossSizePolicy, Layout, Resample, Sizeable};
pub use error::{Advisory, MergeError, SyncFailure};
pub use frame::{Frame, FrameSequence, LoopCount, TotalDuration};
pub use pipeline::{merge, MergeConfig, Merged};
