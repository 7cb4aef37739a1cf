mod authorizor;
mod platform;
mod user;

pub use authorizor::Authorizor;
pub use platform::Platform;
pub use user::User;
