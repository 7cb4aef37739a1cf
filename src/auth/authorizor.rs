use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::error::{unauthorized_error, Error};

/// Role-based gate in front of the booking API.
#[derive(Clone)]
pub struct Authorizor {
    oso: Oso,
}

impl Authorizor {
    pub fn new() -> Result<Self, Error> {
        let mut oso = Oso::new();

        oso.register_class(Platform::get_polar_class())?;
        oso.register_class(User::get_polar_class())?;

        oso.load_str(include_str!("rules.polar"))?;

        Ok(Self { oso })
    }

    pub fn authorize(&self, user: &User, action: &str) -> Result<(), Error> {
        if self
            .oso
            .is_allowed(user.clone(), action.to_string(), Platform::booking())?
        {
            return Ok(());
        }

        tracing::info!(roles = ?user.roles, action, "denied");

        Err(unauthorized_error())
    }
}

#[test]
fn rider_role_test() {
    let authorizor = Authorizor::new().unwrap();
    let rider = User::with_roles(["rider"]);

    let result = authorizor
        .oso
        .query_rule("has_role", (rider.clone(), "rider", Platform::booking()));
    assert!(result.unwrap().next().unwrap().is_ok());

    assert!(authorizor.authorize(&rider, "quote").is_ok());
    assert!(authorizor.authorize(&rider, "book").is_ok());
    assert!(authorizor.authorize(&rider, "list_bookings").is_err());
    assert!(authorizor.authorize(&rider, "transition_booking").is_err());
}

#[test]
fn operator_role_test() {
    let authorizor = Authorizor::new().unwrap();
    let operator = User::with_roles(["operator"]);

    for action in [
        "read_booking",
        "list_bookings",
        "transition_booking",
        "delete_booking",
        "manage_vehicles",
    ] {
        assert!(authorizor.authorize(&operator, action).is_ok(), "{}", action);
    }

    let err = authorizor
        .authorize(&operator, "reinstate_booking")
        .unwrap_err();
    assert_eq!(err.kind, crate::error::ErrorKind::Unauthorized);
}

#[test]
fn supervisor_role_test() {
    let authorizor = Authorizor::new().unwrap();
    let supervisor = User::with_roles(["supervisor"]);

    assert!(authorizor.authorize(&supervisor, "reinstate_booking").is_ok());
    assert!(authorizor.authorize(&supervisor, "transition_booking").is_ok());
    assert!(authorizor.authorize(&supervisor, "book").is_err());
}

#[test]
fn anonymous_user_test() {
    let authorizor = Authorizor::new().unwrap();
    let anonymous = User::default();

    assert!(authorizor.authorize(&anonymous, "quote").is_err());
    assert!(authorizor.authorize(&anonymous, "read_booking").is_err());
}
