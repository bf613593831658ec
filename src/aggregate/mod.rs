pub mod event;
pub mod root;
pub mod shared;
pub mod stream;

pub use event::RecordedEvent;
pub use root::{AggregateRoot, AggregateState};
pub use shared::Shared;
pub use stream::EventStream;
