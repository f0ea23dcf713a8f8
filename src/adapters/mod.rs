// Adapters layer: concrete lunar providers behind the domain port.

pub mod astronomical_provider;
pub mod ephemeris;
pub mod memory_provider;
pub mod table_provider;
