pub mod configure;
pub mod revoke;
pub mod sync;
