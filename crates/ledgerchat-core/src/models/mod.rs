pub mod conversation;
pub mod message;
pub mod network;
pub mod stream;
pub mod timestamp;

pub use conversation::Conversation;
pub use message::{Message, MessageKind, PendingAction};
pub use network::NetworkStatus;
pub use stream::MessageStream;
pub use timestamp::Timestamp;
