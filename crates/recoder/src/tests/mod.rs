mod property_partition;
pub mod utils;
