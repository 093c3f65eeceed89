#[routegen::generate_endpoints]
pub struct Startup;

// Cannot be named from the crate root, so no unit is emitted for it.
#[allow(dead_code)]
mod internal {
    #[routegen::generate_endpoints]
    pub struct Hidden;
}
