//! Request field validation.
//!
//! [`Validator`] collects every field error of a request before failing, so
//! clients get the full list in one response.

use crate::errors::{BoError, FieldError};
use crate::models::{Category, Role, Team};
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Non-blank string, returned trimmed.
    pub fn required<'a>(
        &mut self,
        value: Option<&'a str>,
        field: &str,
        label: &str,
    ) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(field, format!("{} field is empty!", label));
                None
            }
        }
    }

    pub fn email<'a>(&mut self, value: Option<&'a str>, field: &str) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if is_valid_email(v) => Some(v),
            _ => {
                self.push(field, "Invalid email address!");
                None
            }
        }
    }

    pub fn role(&mut self, value: Option<&str>, field: &str) -> Option<Role> {
        match value.map(str::trim).map(str::parse::<Role>) {
            Some(Ok(role)) => Some(role),
            _ => {
                self.push(field, "Invalid user role!");
                None
            }
        }
    }

    pub fn team(&mut self, value: Option<&str>, field: &str) -> Option<Team> {
        match value.map(str::trim).map(str::parse::<Team>) {
            Some(Ok(team)) => Some(team),
            _ => {
                self.push(field, "Invalid user team!");
                None
            }
        }
    }

    /// An absent or blank team is accepted as "no change"; anything else must
    /// name a real team.
    pub fn optional_team(&mut self, value: Option<&str>, field: &str) -> Option<Team> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some(v) => self.team(Some(v), field),
        }
    }

    /// Parse every category; unknown names each add a field error.
    pub fn categories(&mut self, values: &[String], field: &str) -> BTreeSet<Category> {
        let mut parsed = BTreeSet::new();
        for value in values {
            match value.trim().parse::<Category>() {
                Ok(category) => {
                    parsed.insert(category);
                }
                Err(_) => self.push(field, format!("Invalid category type {}!", value)),
            }
        }
        parsed
    }

    pub fn finish(self) -> Result<(), BoError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BoError::Validation(self.errors))
        }
    }
}

/// Word characters as understood by the address grammar: ASCII letters,
/// digits and underscore.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Runs of word characters joined by single `.` or `-` separators, with no
/// leading, trailing or doubled separator.
fn is_word_run(s: &str) -> bool {
    !s.is_empty()
        && s
            .split(['.', '-'])
            .all(|segment| !segment.is_empty() && segment.chars().all(is_word_char))
}

/// Address check used for invites, bootstrap and login.
///
/// Accepts `local@domain` where both sides are dot/dash separated word runs
/// and the domain ends in a `.` followed by a two- or three-character label
/// (`user.name@mail-host.example.com`, `a_b@c.io`).
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if !is_word_run(local) || !is_word_run(domain) {
        return false;
    }

    let Some((head, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    // The final separator must be the dot itself.
    !head.is_empty()
        && !tld.contains('-')
        && (2..=3).contains(&tld.chars().count())
}
