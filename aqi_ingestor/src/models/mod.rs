pub mod location;
pub mod reading;
pub mod request_params;
