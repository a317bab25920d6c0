//! Authorization capability.
//!
//! The engine only asks yes/no questions; how permissions are decided is up
//! to the implementor.

use std::collections::HashSet;

/// What: Pure capability check used to gate list actions.
pub trait Authorisation: Send + Sync {
    /// What: Whether `permission` is granted on `model`.
    fn can(&self, model: &str, permission: &str) -> bool;
}

/// What: Fixed set of granted `(model, permission)` pairs.
#[derive(Clone, Debug, Default)]
pub struct PermissionSet {
    /// Granted pairs.
    granted: HashSet<(String, String)>,
}

impl PermissionSet {
    /// What: Build a set from `(model, permission)` pairs.
    #[must_use]
    pub fn new<I, M, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (M, P)>,
        M: Into<String>,
        P: Into<String>,
    {
        Self {
            granted: pairs
                .into_iter()
                .map(|(m, p)| (m.into(), p.into()))
                .collect(),
        }
    }

    /// What: Grant one more pair.
    pub fn grant(&mut self, model: &str, permission: &str) {
        self.granted
            .insert((model.to_string(), permission.to_string()));
    }
}

impl Authorisation for PermissionSet {
    fn can(&self, model: &str, permission: &str) -> bool {
        self.granted
            .contains(&(model.to_string(), permission.to_string()))
    }
}
