use log::{debug, info, warn};
use thiserror::Error;

use crate::directory::{RegisterError, User, UserDirectory, UserId};
use crate::graph::{EdgeError, FriendGraph};
use crate::inbox::{FriendRequest, RequestInbox, SendError};
use crate::suggest::{suggest, SuggestError, Suggestion};

/// Shown wherever an id no longer resolves to a user record.
const UNKNOWN_NAME: &str = "Unknown";

/// A friend entry joined with its display name, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFriend {
    pub user_id: UserId,
    pub display_name: String,
}

/// A suggestion joined with its display name, ready for rendering.
#[derive(Debug, Clone)]
pub struct NamedSuggestion {
    pub suggestion: Suggestion,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("cannot send a friend request to yourself")]
    SelfRequest,
    #[error("no user with id {0}")]
    UnknownUser(UserId),
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("request is already pending")]
    AlreadyPending,
}

/// One logical session over the whole in-memory state.
///
/// Owns the user directory, the friendship graph, and the request inbox;
/// the surrounding application touches them only through here. The
/// session is synchronous and single-threaded — if it is ever shared,
/// one mutex around the whole session is the required (and sufficient)
/// boundary, since none of the operations suspend or parallelize.
pub struct Session {
    directory: UserDirectory,
    graph: FriendGraph,
    inbox: RequestInbox,
}

impl Session {
    /// Fresh session with a fixed id capacity shared by the directory
    /// and the graph.
    pub fn new(capacity: usize) -> Self {
        Self {
            directory: UserDirectory::new(capacity),
            graph: FriendGraph::new(capacity),
            inbox: RequestInbox::new(),
        }
    }

    /// Rebuild a session from the rows a persistence collaborator loaded.
    ///
    /// Malformed or out-of-range rows are skipped with a log entry; a
    /// bad row never aborts the restore.
    pub fn restore<U, E, R>(capacity: usize, users: U, edges: E, requests: R) -> Self
    where
        U: IntoIterator<Item = User>,
        E: IntoIterator<Item = (UserId, UserId)>,
        R: IntoIterator<Item = (UserId, UserId)>,
    {
        let mut session = Self::new(capacity);
        for user in users {
            let id = user.id;
            if let Err(e) = session.directory.insert_restored(user) {
                debug!("skipping restored user {}: {}", id, e);
            }
        }
        session.graph.load_edges(edges);
        session.inbox.load_requests(requests);
        info!(
            "restored session: {} users, {} friendships, {} pending requests",
            session.directory.len(),
            session.graph.edge_count(),
            session.inbox.len()
        );
        session
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn graph(&self) -> &FriendGraph {
        &self.graph
    }

    pub fn inbox(&self) -> &RequestInbox {
        &self.inbox
    }

    /// Register a new user and return its id.
    pub fn register(
        &mut self,
        username: &str,
        first_name: &str,
        last_name: &str,
        credential_ref: &str,
    ) -> Result<UserId, RegisterError> {
        let id = self
            .directory
            .register(username, first_name, last_name, credential_ref)?;
        info!("registered user {} ('{}')", id, username);
        Ok(id)
    }

    /// Remove a user record. Edges and pending requests that mention the
    /// id stay behind and render as unknown from now on.
    pub fn remove_user(&mut self, id: UserId) -> Option<User> {
        self.directory.remove(id)
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.directory.find_by_username(username)
    }

    /// Display name for an id, falling back to a placeholder when the id
    /// no longer resolves.
    pub fn display_name(&self, id: UserId) -> String {
        self.directory
            .display_name(id)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    /// Queue a friend request after the interactive-flow checks: both
    /// users must exist, be distinct, and not already be friends or have
    /// this exact request pending.
    pub fn send_request(&mut self, from: UserId, to: UserId) -> Result<(), RequestError> {
        if self.directory.find_by_id(from).is_none() {
            return Err(RequestError::UnknownUser(from));
        }
        if self.directory.find_by_id(to).is_none() {
            return Err(RequestError::UnknownUser(to));
        }
        if from == to {
            return Err(RequestError::SelfRequest);
        }
        if self.graph.are_friends(from, to) {
            return Err(RequestError::AlreadyFriends);
        }
        self.inbox.send(from, to).map_err(|e| match e {
            SendError::AlreadyPending => RequestError::AlreadyPending,
        })?;
        info!("friend request queued: {} -> {}", from, to);
        Ok(())
    }

    /// Pending requests for a recipient, oldest first, with sender names.
    pub fn pending_requests_for(&self, recipient: UserId) -> Vec<(FriendRequest, String)> {
        self.inbox
            .pending_for(recipient)
            .map(|&r| (r, self.display_name(r.from)))
            .collect()
    }

    /// Accept the oldest pending request addressed to `recipient`,
    /// turning it into a friendship edge. Returns the accepted request,
    /// or `None` when nothing is pending.
    pub fn accept_next_request(&mut self, recipient: UserId) -> Option<FriendRequest> {
        let request = self.inbox.pop_first_for(recipient)?;
        match self.graph.add_edge(request.from, request.to) {
            Ok(()) => info!("accepted request: {} -> {}", request.from, request.to),
            // The pair became friends some other way while the request
            // sat in the inbox; the request is still consumed.
            Err(EdgeError::AlreadyFriends) => {
                debug!("request {} -> {} was already satisfied", request.from, request.to)
            }
            Err(e) => warn!(
                "accepted request {} -> {} but edge was rejected: {}",
                request.from, request.to, e
            ),
        }
        Some(request)
    }

    /// Add a friendship directly (admin path — no request involved).
    pub fn add_friendship(&mut self, u: UserId, v: UserId) -> Result<(), EdgeError> {
        self.graph.add_edge(u, v)?;
        info!("friendship added: {} - {}", u, v);
        Ok(())
    }

    pub fn remove_friendship(&mut self, u: UserId, v: UserId) -> Result<(), EdgeError> {
        self.graph.remove_edge(u, v)?;
        info!("friendship removed: {} - {}", u, v);
        Ok(())
    }

    /// A user's friends with display names, for rendering.
    pub fn friends_of(&self, id: UserId) -> Vec<NamedFriend> {
        self.graph
            .neighbors(id)
            .iter()
            .map(|&f| NamedFriend {
                user_id: f,
                display_name: self.display_name(f),
            })
            .collect()
    }

    /// Ranked suggestions for a user, with display names resolved.
    pub fn suggestions_for(&self, id: UserId) -> Result<Vec<NamedSuggestion>, SuggestError> {
        let suggestions = suggest(&self.graph, id)?;
        Ok(suggestions
            .into_iter()
            .map(|suggestion| NamedSuggestion {
                display_name: self.display_name(suggestion.user_id),
                suggestion,
            })
            .collect())
    }

    // --- Snapshot accessors for the persistence collaborator ---

    pub fn users(&self) -> &[User] {
        self.directory.users()
    }

    pub fn friendships(&self) -> Vec<(UserId, UserId)> {
        self.graph.edges().collect()
    }

    pub fn pending_requests(&self) -> Vec<FriendRequest> {
        self.inbox.requests().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Session with four users: alice(0), bob(1), carol(2), dave(3).
    fn make_session() -> Session {
        let mut s = Session::new(16);
        for (username, first, last) in [
            ("alice", "Alice", "Anderson"),
            ("bob", "Bob", "Brown"),
            ("carol", "Carol", "Clark"),
            ("dave", "Dave", "Dunn"),
        ] {
            s.register(username, first, last, "pw").unwrap();
        }
        s
    }

    #[test]
    fn test_request_then_accept_creates_friendship() {
        let mut s = make_session();
        s.send_request(0, 1).unwrap();
        assert!(!s.graph().are_friends(0, 1));

        let accepted = s.accept_next_request(1).unwrap();
        assert_eq!(accepted, FriendRequest { from: 0, to: 1 });
        assert!(s.graph().are_friends(0, 1));
        assert!(s.inbox().is_empty());
    }

    #[test]
    fn test_send_request_validation() {
        let mut s = make_session();
        assert_eq!(s.send_request(0, 0), Err(RequestError::SelfRequest));
        assert_eq!(s.send_request(0, 99), Err(RequestError::UnknownUser(99)));
        assert_eq!(s.send_request(99, 0), Err(RequestError::UnknownUser(99)));

        s.send_request(0, 1).unwrap();
        assert_eq!(s.send_request(0, 1), Err(RequestError::AlreadyPending));

        s.add_friendship(0, 2).unwrap();
        assert_eq!(s.send_request(0, 2), Err(RequestError::AlreadyFriends));
    }

    #[test]
    fn test_accept_with_no_pending_is_none() {
        let mut s = make_session();
        assert!(s.accept_next_request(2).is_none());
    }

    #[test]
    fn test_accept_consumes_request_even_if_already_friends() {
        let mut s = make_session();
        s.send_request(0, 1).unwrap();
        s.add_friendship(0, 1).unwrap();

        let accepted = s.accept_next_request(1).unwrap();
        assert_eq!(accepted.from, 0);
        assert!(s.inbox().is_empty());
        assert!(s.graph().are_friends(0, 1));
    }

    #[test]
    fn test_pending_requests_resolve_sender_names() {
        let mut s = make_session();
        s.send_request(0, 2).unwrap();
        s.send_request(1, 2).unwrap();

        let pending = s.pending_requests_for(2);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].1, "Alice Anderson");
        assert_eq!(pending[1].1, "Bob Brown");
    }

    #[test]
    fn test_friends_of_with_names() {
        let mut s = make_session();
        s.add_friendship(0, 1).unwrap();
        s.add_friendship(0, 2).unwrap();

        let mut friends = s.friends_of(0);
        friends.sort_by_key(|f| f.user_id);
        assert_eq!(
            friends,
            vec![
                NamedFriend { user_id: 1, display_name: "Bob Brown".into() },
                NamedFriend { user_id: 2, display_name: "Carol Clark".into() },
            ]
        );
    }

    #[test]
    fn test_dangling_id_renders_unknown() {
        let mut s = make_session();
        s.add_friendship(0, 3).unwrap();
        s.remove_user(3).unwrap();

        // The edge survives the directory removal; the name does not.
        let friends = s.friends_of(0);
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].display_name, "Unknown");
        assert_eq!(s.display_name(3), "Unknown");
    }

    #[test]
    fn test_suggestions_with_names() {
        let mut s = make_session();
        s.add_friendship(0, 1).unwrap();
        s.add_friendship(1, 2).unwrap();

        let suggestions = s.suggestions_for(0).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].suggestion.user_id, 2);
        assert_eq!(suggestions[0].display_name, "Carol Clark");
    }

    #[test]
    fn test_suggestions_invalid_user() {
        let s = make_session();
        assert!(matches!(
            s.suggestions_for(99),
            Err(SuggestError::InvalidUser(99))
        ));
    }

    #[test]
    fn test_restore_skips_bad_rows() {
        let users = vec![
            User {
                id: 0,
                username: "alice".into(),
                first_name: "Alice".into(),
                last_name: "Anderson".into(),
                credential_ref: "pw".into(),
            },
            User {
                id: 2,
                username: "carol".into(),
                first_name: "Carol".into(),
                last_name: "Clark".into(),
                credential_ref: "pw".into(),
            },
            // Out of range: skipped, not fatal.
            User {
                id: 99,
                username: "ghost".into(),
                first_name: "G".into(),
                last_name: "H".into(),
                credential_ref: "pw".into(),
            },
        ];
        let edges = vec![(0, 2), (0, 0), (5, 77)];
        let requests = vec![(2, 0), (2, 0)];

        let s = Session::restore(8, users, edges, requests);
        assert_eq!(s.directory().len(), 2);
        assert!(s.graph().are_friends(0, 2));
        assert_eq!(s.graph().edge_count(), 1);
        assert_eq!(s.inbox().len(), 1);
    }

    #[test]
    fn test_snapshot_accessors_round_trip() {
        let mut s = make_session();
        s.add_friendship(0, 1).unwrap();
        s.add_friendship(1, 2).unwrap();
        s.send_request(3, 0).unwrap();

        let users: Vec<User> = s.users().to_vec();
        let edges = s.friendships();
        let requests: Vec<(UserId, UserId)> =
            s.pending_requests().iter().map(|r| (r.from, r.to)).collect();

        let restored = Session::restore(16, users, edges, requests);
        assert!(restored.graph().are_friends(0, 1));
        assert!(restored.graph().are_friends(1, 2));
        assert!(restored.inbox().exists(3, 0));
        assert_eq!(restored.directory().len(), 4);
    }

    #[test]
    fn test_registration_continues_after_restore() {
        let users = vec![User {
            id: 5,
            username: "eve".into(),
            first_name: "Eve".into(),
            last_name: "Evans".into(),
            credential_ref: "pw".into(),
        }];
        let mut s = Session::restore(16, users, vec![], vec![]);
        let id = s.register("frank", "Frank", "Field", "pw").unwrap();
        assert_eq!(id, 6);
    }
}
