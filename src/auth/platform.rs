use oso::PolarClass;
use serde::{Deserialize, Serialize};

/// The booking service as a whole; every permission is granted on it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Platform {
    name: String,
}

impl Platform {
    pub fn booking() -> Self {
        Self {
            name: "booking".into(),
        }
    }
}

impl PolarClass for Platform {
    fn get_polar_class_builder() -> oso::ClassBuilder<Platform> {
        oso::Class::builder()
            .name("Platform")
            .add_attribute_getter("name", |recv: &Platform| recv.name.clone())
            .add_class_method("booking", Platform::booking)
    }

    fn get_polar_class() -> oso::Class {
        let builder = Platform::get_polar_class_builder();
        builder.build()
    }
}
