// Domain-layer modules and shared errors/models
pub mod scoring {
    pub use crate::scoring::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod report {
    pub use crate::report::*;
}

pub mod repository {
    pub use crate::repository::*;
}

pub mod errors {
    pub use crate::errors::*;
}
