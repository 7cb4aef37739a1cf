use serde::{Deserialize, Serialize};

use crate::error::{invalid_request_error, Error};

const MIN_NAME_LEN: usize = 2;
const MIN_MOBILE_DIGITS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, mobile: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            mobile: mobile.into(),
            email,
        }
    }

    /// Trims every field and folds an empty email into `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            email: self
                .email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(invalid_request_error(
                "name must be at least 2 characters",
            ));
        }

        let digits = self.mobile.chars().filter(|c| c.is_ascii_digit()).count();
        if digits < MIN_MOBILE_DIGITS {
            return Err(invalid_request_error(
                "mobile number must be at least 10 digits",
            ));
        }

        if let Some(email) = self.email.as_deref().map(str::trim) {
            if !email.is_empty() && !looks_like_email(email) {
                return Err(invalid_request_error("invalid email address"));
            }
        }

        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}
