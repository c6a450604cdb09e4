pub mod email;
pub mod siren;
