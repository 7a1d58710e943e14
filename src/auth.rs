//! User store consulted by AUTH and ACL.
//!
//! Passwords are kept only as lowercase hex SHA-256 digests.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

pub const DEFAULT_USER: &str = "default";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct User {
    pub flags: BTreeSet<String>,
    pub passwords: BTreeSet<String>,
}

impl User {
    pub fn nopass(&self) -> bool {
        self.flags.contains("nopass")
    }
}

#[derive(Debug, PartialEq)]
pub enum AclRuleError {
    UnknownRule(String),
}

#[derive(Debug)]
pub struct UserStore {
    users: BTreeMap<String, User>,
}

impl Default for UserStore {
    fn default() -> Self {
        let mut default_user = User::default();
        default_user.flags.insert("nopass".to_string());

        Self {
            users: BTreeMap::from([(DEFAULT_USER.to_string(), default_user)]),
        }
    }
}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// New connections start authenticated only while `default` needs no password.
    pub fn default_user_nopass(&self) -> bool {
        self.users.get(DEFAULT_USER).is_some_and(User::nopass)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let Some(user) = self.users.get(username) else {
            return false;
        };

        if user.nopass() {
            return true;
        }

        user.passwords.contains(&hash_password(password))
    }

    /// Applies `>password` and `nopass` rules, creating the user if needed.
    ///
    /// Rules are validated before any of them is applied.
    pub fn set_user(&mut self, username: &str, rules: &[String]) -> Result<(), AclRuleError> {
        if let Some(rule) = rules
            .iter()
            .find(|rule| !rule.starts_with('>') && !rule.eq_ignore_ascii_case("nopass"))
        {
            return Err(AclRuleError::UnknownRule(rule.clone()));
        }

        let user = self.users.entry(username.to_string()).or_default();

        for rule in rules {
            if let Some(password) = rule.strip_prefix('>') {
                user.passwords.insert(hash_password(password));
                user.flags.remove("nopass");
            } else {
                user.flags.insert("nopass".to_string());
                user.passwords.clear();
            }
        }

        Ok(())
    }
}
