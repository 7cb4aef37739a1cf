use oso::PolarClass;
use serde::{Deserialize, Serialize};

/// Caller identity as asserted by the upstream authentication proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub roles: Vec<String>,
}

impl User {
    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma separated role list such as `"operator, supervisor"`.
    pub fn from_header(value: &str) -> Self {
        Self::with_roles(
            value
                .split(',')
                .map(|role| role.trim().to_ascii_lowercase())
                .filter(|role| !role.is_empty()),
        )
    }

    fn has_role(&self, role: String) -> bool {
        self.roles.iter().any(|x| x == &role)
    }
}

impl PolarClass for User {
    fn get_polar_class_builder() -> oso::ClassBuilder<User> {
        oso::Class::builder()
            .name("User")
            .add_attribute_getter("roles", |recv: &User| recv.roles.clone())
            .add_method("has_role", User::has_role)
    }

    fn get_polar_class() -> oso::Class {
        let builder = User::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roles_are_trimmed_and_lowercased() {
        let user = User::from_header(" Operator,supervisor ,, ");

        assert_eq!(user.roles, vec!["operator", "supervisor"]);
        assert!(user.has_role("supervisor".into()));
        assert!(!user.has_role("rider".into()));
    }
}
