use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A user the panel allows on this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric user id, used when asking the proxy to kick the user.
    pub id: i64,
    /// The credential a connecting client presents.
    pub uuid: String,
    /// Speed limit hint in Mbps. Passed through untouched.
    #[serde(default)]
    pub speed_limit: Option<u32>,
}

/// Body of the panel's user list response.
#[derive(Debug, Clone, Deserialize)]
pub struct UserList {
    /// All users currently allowed on this node.
    pub users: Vec<Identity>,
}

/// The set of users authorized as of one successful fetch, keyed by credential.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    users: HashMap<String, Identity>,
}

impl Snapshot {
    /// Looks up a user by credential.
    pub fn get(&self, uuid: &str) -> Option<&Identity> {
        self.users.get(uuid)
    }

    /// Whether a user with this credential is present.
    pub fn contains(&self, uuid: &str) -> bool {
        self.users.contains_key(uuid)
    }

    /// Number of distinct credentials.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the snapshot holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterates over all users in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.users.values()
    }
}

/// Later entries with the same credential replace earlier ones.
impl FromIterator<Identity> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let users = iter.into_iter().map(|user| (user.uuid.clone(), user)).collect();

        Self { users }
    }
}
