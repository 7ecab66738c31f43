//! friendgraph-core: In-memory social graph engine.
//!
//! A pure Rust library that maintains a user directory with a username
//! index, an undirected friendship graph over integer user ids, a FIFO
//! friend-request inbox, and a suggestion engine that mines the two- and
//! three-hop neighborhood and ranks candidates by mutual friends plus a
//! weighted score.
//!
//! The engine is synchronous and single-threaded by design. Credential
//! checks, persistence formats, and all user-facing rendering belong to
//! the surrounding application, which drives the engine through
//! [`Session`] and serializes the snapshot accessors however it likes.

mod directory;
mod graph;
mod inbox;
mod session;
mod suggest;

pub use directory::{RegisterError, User, UserDirectory, UserId};
pub use graph::{EdgeError, FriendGraph};
pub use inbox::{FriendRequest, RequestInbox, SendError};
pub use session::{NamedFriend, NamedSuggestion, RequestError, Session};
pub use suggest::{suggest, SuggestError, Suggestion, MAX_SUGGESTIONS};
