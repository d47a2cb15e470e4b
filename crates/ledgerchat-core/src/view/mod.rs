pub mod offline;
pub mod pagination;
pub mod read_state;
pub mod session;
pub mod unread_marker;
pub mod visibility;

pub use pagination::{BoundaryLoader, BoundaryState, Edge, EdgeStatus, PageRequest};
pub use read_state::ReadState;
pub use session::{ConversationView, OpenOptions, ViewSnapshot};
pub use unread_marker::{resolve_unread_boundary, BoundaryInputs, VisibleSnapshot};
