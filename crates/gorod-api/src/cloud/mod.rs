// Elektronny Gorod cloud API surface.
//
// `client.rs` owns transport mechanics and envelope unwrapping; the
// endpoint modules (auth, places, cameras, finance) add inherent methods
// per REST resource.

mod auth;
mod cameras;
mod client;
mod finance;
pub mod models;
mod places;

pub use client::CloudClient;
