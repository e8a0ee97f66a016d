pub mod generate;
pub mod odata_url;
pub mod paginate;
pub mod status;
